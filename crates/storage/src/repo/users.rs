// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `users` repository backing `daemon::http::auth`'s role resolution: a
//! validated API key is upserted into a `User` row on first use, and its
//! role is looked up through the stacked role provider on every request
//! after that so `owner_id`/`user_id` references elsewhere in the data
//! model (chunk ownership, activity log, SAML sessions) resolve to a real
//! identity rather than always admin.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Utc};
use indexer_core::IndexerError;
use uuid::Uuid;

pub struct UserRepository {
    pool: Pool,
}

#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub auth_provider: String,
    pub api_key_id: Option<Uuid>,
    pub client_id: Option<String>,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

type UserRow = (
    Uuid,
    String,
    Option<String>,
    String,
    String,
    Option<Uuid>,
    Option<String>,
    bool,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<DateTime<Utc>>,
);

fn from_row(row: UserRow) -> User {
    User {
        id: row.0,
        email: row.1,
        display_name: row.2,
        role: row.3,
        auth_provider: row.4,
        api_key_id: row.5,
        client_id: row.6,
        is_active: row.7,
        created_at: row.8,
        updated_at: row.9,
        last_login_at: row.10,
    }
}

const SELECT_COLUMNS: &str = "id, email, display_name, role, auth_provider, api_key_id, \
     client_id, is_active, created_at, updated_at, last_login_at";

impl UserRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Registers (or reactivates) the user backing a validated API key.
    /// `role` only takes effect on first creation — a later login for the
    /// same key does not reset a role an admin has since reassigned.
    pub async fn upsert_for_api_key(
        &self,
        email: &str,
        role: &str,
        api_key_id: Uuid,
    ) -> Result<User, IndexerError> {
        let query = format!(
            "insert into users (email, role, auth_provider, api_key_id)
             values ($1, $2, 'api_key', $3)
             on conflict (email) do update set
                api_key_id = excluded.api_key_id,
                is_active = true, updated_at = now(), last_login_at = now()
             returning {SELECT_COLUMNS}"
        );
        let row: UserRow = sqlx::query_as(&query)
            .bind(email)
            .bind(role)
            .bind(api_key_id)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(from_row(row))
    }

    pub async fn get(&self, id: Uuid) -> Result<Option<User>, IndexerError> {
        let query = format!("select {SELECT_COLUMNS} from users where id = $1");
        let row: Option<UserRow> =
            sqlx::query_as(&query).bind(id).fetch_optional(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(row.map(from_row))
    }

    pub async fn list(&self) -> Result<Vec<User>, IndexerError> {
        let query = format!("select {SELECT_COLUMNS} from users order by email");
        let rows: Vec<UserRow> =
            sqlx::query_as(&query).fetch_all(&self.pool).await.map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(from_row).collect())
    }

    /// Count of active admin users, used to detect the bootstrap window
    /// before any admin has been assigned.
    pub async fn count_admins(&self) -> Result<i64, IndexerError> {
        let (count,): (i64,) =
            sqlx::query_as("select count(*) from users where role = 'admin' and is_active = true")
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(count)
    }
}
