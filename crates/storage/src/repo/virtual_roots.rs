// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `virtual_roots` repository: name→path mapping per client.

use crate::error::map_sqlx_error;
use crate::Pool;
use indexer_core::{IndexerError, VirtualRoot};

pub struct VirtualRootRepository {
    pool: Pool,
}

impl VirtualRootRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, root: &VirtualRoot) -> Result<(), IndexerError> {
        sqlx::query(
            "insert into virtual_roots (name, client_id, local_path) values ($1, $2, $3)
             on conflict (name, client_id) do update set local_path = excluded.local_path",
        )
        .bind(&root.name)
        .bind(&root.client_id)
        .bind(&root.local_path)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn find(&self, name: &str, client_id: &str) -> Result<Option<VirtualRoot>, IndexerError> {
        let row: Option<(String, String, String)> = sqlx::query_as(
            "select name, client_id, local_path from virtual_roots where name = $1 and client_id = $2",
        )
        .bind(name)
        .bind(client_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(|(name, client_id, local_path)| VirtualRoot { name, client_id, local_path }))
    }

    pub async fn list_for_client(&self, client_id: &str) -> Result<Vec<VirtualRoot>, IndexerError> {
        let rows: Vec<(String, String, String)> = sqlx::query_as(
            "select name, client_id, local_path from virtual_roots where client_id = $1 order by name",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, client_id, local_path)| VirtualRoot { name, client_id, local_path })
            .collect())
    }
}
