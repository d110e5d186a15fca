// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `activity_log` repository: append-only audit
//! stream.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Utc};
use indexer_core::{ActivityLogEntry, ActivityId, ExecutionScope, IndexerError, RootId, RunId};
use serde_json::Value;
use uuid::Uuid;

pub struct ActivityLogRepository {
    pool: Pool,
}

#[derive(Debug, sqlx::FromRow)]
struct ActivityLogRow {
    id: Uuid,
    ts: DateTime<Utc>,
    action: String,
    client_id: Option<String>,
    user_id: Option<String>,
    details: Value,
    executor_scope: Option<String>,
    executor_id: Option<String>,
    root_id: Option<Uuid>,
    run_id: Option<Uuid>,
}

impl ActivityLogRow {
    fn into_domain(self) -> ActivityLogEntry {
        ActivityLogEntry {
            id: ActivityId::from_uuid(self.id),
            ts: self.ts,
            action: self.action,
            client_id: self.client_id,
            user_id: self.user_id,
            details: self.details,
            executor_scope: self.executor_scope.map(|s| {
                if s == "client" { ExecutionScope::Client } else { ExecutionScope::Server }
            }),
            executor_id: self.executor_id,
            root_id: self.root_id.map(RootId::from_uuid),
            run_id: self.run_id.map(RunId::from_uuid),
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, ts, action, client_id, user_id, details, executor_scope, executor_id, root_id, run_id";

impl ActivityLogRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn append(&self, entry: &ActivityLogEntry) -> Result<(), IndexerError> {
        sqlx::query(
            "insert into activity_log
                (id, ts, action, client_id, user_id, details, executor_scope, executor_id, root_id, run_id)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
        )
        .bind(entry.id.as_uuid())
        .bind(entry.ts)
        .bind(&entry.action)
        .bind(&entry.client_id)
        .bind(&entry.user_id)
        .bind(&entry.details)
        .bind(entry.executor_scope.map(|s| s.to_string()))
        .bind(&entry.executor_id)
        .bind(entry.root_id.map(|id| id.as_uuid()))
        .bind(entry.run_id.map(|id| id.as_uuid()))
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn list_recent(&self, limit: i64, offset: i64) -> Result<Vec<ActivityLogEntry>, IndexerError> {
        let rows: Vec<ActivityLogRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from activity_log order by ts desc limit $1 offset $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ActivityLogRow::into_domain).collect())
    }

    /// `apply_activity_retention`.
    pub async fn delete_older_than(&self, days: i64) -> Result<u64, IndexerError> {
        let result = sqlx::query("delete from activity_log where ts < now() - make_interval(days => $1)")
            .bind(days as i32)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
