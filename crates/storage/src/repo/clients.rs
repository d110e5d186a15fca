// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `clients` repository, backing the `X-Client-Id` executor-identity
//! flow supplemented from `original_source/client_identity.py`.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Utc};
use indexer_core::IndexerError;

pub struct ClientRepository {
    pool: Pool,
}

#[derive(Debug, Clone)]
pub struct Client {
    pub id: String,
    pub display_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub last_seen_at: Option<DateTime<Utc>>,
}

impl ClientRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Registers a client on first sight, bumping `last_seen_at` otherwise.
    /// Client-scope operations (watched roots, locks) call this before
    /// trusting an `X-Client-Id` header.
    pub async fn touch(&self, client_id: &str) -> Result<Client, IndexerError> {
        let row: (String, Option<String>, DateTime<Utc>, Option<DateTime<Utc>>) = sqlx::query_as(
            "insert into clients (id, last_seen_at) values ($1, now())
             on conflict (id) do update set last_seen_at = now()
             returning id, display_name, created_at, last_seen_at",
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(Client { id: row.0, display_name: row.1, created_at: row.2, last_seen_at: row.3 })
    }

    pub async fn get(&self, client_id: &str) -> Result<Option<Client>, IndexerError> {
        let row: Option<(String, Option<String>, DateTime<Utc>, Option<DateTime<Utc>>)> =
            sqlx::query_as("select id, display_name, created_at, last_seen_at from clients where id = $1")
                .bind(client_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(|(id, display_name, created_at, last_seen_at)| Client {
            id,
            display_name,
            created_at,
            last_seen_at,
        }))
    }
}
