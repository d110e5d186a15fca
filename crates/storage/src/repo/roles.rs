// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `roles` repository and its [`RoleProvider`] adapter: the
//! database-backed tier of the stacked role provider.

use crate::error::map_sqlx_error;
use crate::Pool;
use indexer_core::{IndexerError, Role, RoleProvider};
use serde_json::Value;

pub struct RoleRepository {
    pool: Pool,
}

impl RoleRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn upsert(&self, role: &Role) -> Result<(), IndexerError> {
        let permissions = Value::Array(role.permissions.iter().cloned().map(Value::String).collect());
        sqlx::query(
            "insert into roles (name, description, permissions, is_system)
             values ($1, $2, $3, $4)
             on conflict (name) do update set
                description = excluded.description, permissions = excluded.permissions",
        )
        .bind(&role.name)
        .bind(&role.description)
        .bind(permissions)
        .bind(role.is_system)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn get(&self, name: &str) -> Result<Option<Role>, IndexerError> {
        let row: Option<(String, String, Value, bool)> = sqlx::query_as(
            "select name, description, permissions, is_system from roles where name = $1",
        )
        .bind(name)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(|(name, description, permissions, is_system)| Role {
            name,
            description,
            permissions: permissions
                .as_array()
                .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                .unwrap_or_default(),
            is_system,
        }))
    }

    pub async fn list(&self) -> Result<Vec<Role>, IndexerError> {
        let rows: Vec<(String, String, Value, bool)> =
            sqlx::query_as("select name, description, permissions, is_system from roles order by name")
                .fetch_all(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(rows
            .into_iter()
            .map(|(name, description, permissions, is_system)| Role {
                name,
                description,
                permissions: permissions
                    .as_array()
                    .map(|a| a.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                    .unwrap_or_default(),
                is_system,
            })
            .collect())
    }
}

/// Blocking shim over [`RoleRepository`] for the [`RoleProvider`] trait,
/// which is synchronous to keep it implementable by file- and built-in-backed
/// providers that have no I/O at all. The daemon constructs this with a
/// `tokio::runtime::Handle` so `get_role` can block on the async query from
/// inside synchronous permission-check call sites.
pub struct DbRoleProvider {
    pool: Pool,
    runtime: tokio::runtime::Handle,
}

impl DbRoleProvider {
    pub fn new(pool: Pool, runtime: tokio::runtime::Handle) -> Self {
        Self { pool, runtime }
    }
}

impl RoleProvider for DbRoleProvider {
    fn get_role(&self, name: &str) -> Option<Role> {
        let repo = RoleRepository::new(self.pool.clone());
        let name = name.to_string();
        tokio::task::block_in_place(|| {
            self.runtime.block_on(async move { repo.get(&name).await.ok().flatten() })
        })
    }
}
