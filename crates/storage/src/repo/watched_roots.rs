// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `watched_folders` repository: Root Registry CRUD plus
//! scheduling watermark updates.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Utc};
use indexer_core::{ExecutionScope, IndexerError, NewWatchedRoot, RootId, WatchedRoot};
use serde_json::Value;
use uuid::Uuid;

pub struct WatchedRootRepository {
    pool: Pool,
}

#[derive(Debug, sqlx::FromRow)]
struct WatchedRootRow {
    id: Uuid,
    folder_path: String,
    normalized_folder_path: String,
    execution_scope: String,
    executor_id: Option<String>,
    root_id: Uuid,
    schedule_cron: String,
    enabled: bool,
    paused: bool,
    max_concurrency: i32,
    consecutive_failures: i32,
    last_scan_started_at: Option<DateTime<Utc>>,
    last_scan_completed_at: Option<DateTime<Utc>>,
    last_successful_scan_at: Option<DateTime<Utc>>,
    last_error_at: Option<DateTime<Utc>>,
    last_scanned_at: Option<DateTime<Utc>>,
    last_run_id: Option<Uuid>,
    metadata: Value,
}

impl WatchedRootRow {
    fn into_domain(self) -> WatchedRoot {
        WatchedRoot {
            id: RootId::from_uuid(self.id),
            folder_path: self.folder_path,
            normalized_folder_path: self.normalized_folder_path,
            execution_scope: if self.execution_scope == "client" {
                ExecutionScope::Client
            } else {
                ExecutionScope::Server
            },
            executor_id: self.executor_id,
            root_id: RootId::from_uuid(self.root_id),
            schedule_cron: self.schedule_cron,
            enabled: self.enabled,
            paused: self.paused,
            max_concurrency: self.max_concurrency.max(1) as u32,
            consecutive_failures: self.consecutive_failures.max(0) as u32,
            last_scan_started_at: self.last_scan_started_at,
            last_scan_completed_at: self.last_scan_completed_at,
            last_successful_scan_at: self.last_successful_scan_at,
            last_error_at: self.last_error_at,
            last_scanned_at: self.last_scanned_at,
            last_run_id: self.last_run_id.map(|id| id.to_string()),
            metadata: self
                .metadata
                .as_object()
                .map(|m| m.clone().into_iter().collect())
                .unwrap_or_default(),
        }
    }
}

const SELECT_COLUMNS: &str = "id, folder_path, normalized_folder_path, execution_scope,
    executor_id, root_id, schedule_cron, enabled, paused, max_concurrency, consecutive_failures,
    last_scan_started_at, last_scan_completed_at, last_successful_scan_at, last_error_at,
    last_scanned_at, last_run_id, metadata";

impl WatchedRootRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// `add_folder`: upserts on `(scope, normalized_folder_path)`.
    pub async fn add_folder(&self, params: NewWatchedRoot) -> Result<WatchedRoot, IndexerError> {
        let root = WatchedRoot::new(params)?;
        let scope_str = root.execution_scope.to_string();
        let metadata = Value::Object(root.metadata.clone().into_iter().collect());

        let row: WatchedRootRow = sqlx::query_as(&format!(
            "insert into watched_folders
                (folder_path, normalized_folder_path, execution_scope, executor_id, root_id,
                 schedule_cron, enabled, paused, max_concurrency, metadata)
             values ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
             returning {SELECT_COLUMNS}"
        ))
        .bind(&root.folder_path)
        .bind(&root.normalized_folder_path)
        .bind(scope_str)
        .bind(&root.executor_id)
        .bind(root.root_id.as_uuid())
        .bind(&root.schedule_cron)
        .bind(root.enabled)
        .bind(root.paused)
        .bind(root.max_concurrency as i32)
        .bind(metadata)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match &e {
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => IndexerError::Conflict(
                "a watched root already exists for this scope and path".to_string(),
            ),
            _ => map_sqlx_error(e),
        })?;

        Ok(row.into_domain())
    }

    pub async fn get_folder(&self, id: Uuid) -> Result<Option<WatchedRoot>, IndexerError> {
        let row: Option<WatchedRootRow> =
            sqlx::query_as(&format!("select {SELECT_COLUMNS} from watched_folders where id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.map(WatchedRootRow::into_domain))
    }

    pub async fn get_folder_by_root_id(
        &self,
        root_id: Uuid,
    ) -> Result<Option<WatchedRoot>, IndexerError> {
        let row: Option<WatchedRootRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from watched_folders where root_id = $1"
        ))
        .bind(root_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(WatchedRootRow::into_domain))
    }

    pub async fn list_folders(
        &self,
        enabled_only: bool,
        scope: Option<ExecutionScope>,
        executor_id: Option<&str>,
    ) -> Result<Vec<WatchedRoot>, IndexerError> {
        let scope_str = scope.map(|s| s.to_string());
        let rows: Vec<WatchedRootRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from watched_folders
             where ($1 = false or enabled = true)
               and ($2::text is null or execution_scope = $2)
               and ($3::text is null or executor_id = $3)
             order by folder_path"
        ))
        .bind(enabled_only)
        .bind(scope_str)
        .bind(executor_id)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(WatchedRootRow::into_domain).collect())
    }

    pub async fn remove_folder(&self, id: Uuid) -> Result<bool, IndexerError> {
        let result = sqlx::query("delete from watched_folders where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// `update_folder`: partial update; scope changes must go
    /// through [`WatchedRootRepository::transition_scope`].
    #[allow(clippy::too_many_arguments)]
    pub async fn update_folder(
        &self,
        id: Uuid,
        schedule_cron: Option<String>,
        enabled: Option<bool>,
        paused: Option<bool>,
        max_concurrency: Option<i32>,
        metadata: Option<Value>,
    ) -> Result<Option<WatchedRoot>, IndexerError> {
        let row: Option<WatchedRootRow> = sqlx::query_as(&format!(
            "update watched_folders set
                schedule_cron = coalesce($2, schedule_cron),
                enabled = coalesce($3, enabled),
                paused = coalesce($4, paused),
                max_concurrency = coalesce($5, max_concurrency),
                metadata = coalesce($6, metadata)
             where id = $1
             returning {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(schedule_cron)
        .bind(enabled)
        .bind(paused)
        .bind(max_concurrency)
        .bind(metadata)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(WatchedRootRow::into_domain))
    }

    /// `transition_scope`: verifies no conflicting row exists
    /// in the target scope before flipping, inside one transaction so the
    /// check-then-act is atomic.
    pub async fn transition_scope(
        &self,
        id: Uuid,
        target_scope: ExecutionScope,
        executor_id: Option<String>,
    ) -> Result<WatchedRoot, IndexerError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        let current: Option<WatchedRootRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from watched_folders where id = $1 for update"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;
        let Some(current) = current else {
            return Err(IndexerError::DocumentNotFound(id.to_string()));
        };

        let resolved_executor_id = match target_scope {
            ExecutionScope::Client => {
                let executor_id = executor_id.filter(|s| !s.is_empty()).ok_or_else(|| {
                    IndexerError::InvalidScope(
                        "client-scope roots require a non-empty executor_id".to_string(),
                    )
                })?;
                Some(executor_id)
            }
            ExecutionScope::Server => None,
        };

        let scope_str = target_scope.to_string();
        let conflict: Option<(Uuid,)> = match target_scope {
            ExecutionScope::Client => sqlx::query_as(
                "select id from watched_folders
                 where execution_scope = 'client' and executor_id = $1
                   and normalized_folder_path = $2 and id != $3",
            )
            .bind(&resolved_executor_id)
            .bind(&current.normalized_folder_path)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?,
            ExecutionScope::Server => sqlx::query_as(
                "select id from watched_folders
                 where execution_scope = 'server' and normalized_folder_path = $1 and id != $2",
            )
            .bind(&current.normalized_folder_path)
            .bind(id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(map_sqlx_error)?,
        };
        if conflict.is_some() {
            return Err(IndexerError::Conflict(
                "target scope already has a watched root for this path".to_string(),
            ));
        }

        let row: WatchedRootRow = sqlx::query_as(&format!(
            "update watched_folders set execution_scope = $2, executor_id = $3
             where id = $1
             returning {SELECT_COLUMNS}"
        ))
        .bind(id)
        .bind(scope_str)
        .bind(resolved_executor_id)
        .fetch_one(&mut *tx)
        .await
        .map_err(map_sqlx_error)?;

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(row.into_domain())
    }

    pub async fn mark_scanned(
        &self,
        id: Uuid,
        run_id: Option<Uuid>,
    ) -> Result<(), IndexerError> {
        sqlx::query(
            "update watched_folders set last_scanned_at = now(), last_run_id = coalesce($2, last_run_id)
             where id = $1",
        )
        .bind(id)
        .bind(run_id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn watermark_started(&self, id: Uuid) -> Result<(), IndexerError> {
        sqlx::query("update watched_folders set last_scan_started_at = now() where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn watermark_completed_success(&self, id: Uuid) -> Result<(), IndexerError> {
        sqlx::query(
            "update watched_folders set
                last_scan_completed_at = now(),
                last_successful_scan_at = now(),
                consecutive_failures = 0
             where id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn watermark_completed_error(&self, id: Uuid) -> Result<(), IndexerError> {
        sqlx::query(
            "update watched_folders set
                last_scan_completed_at = now(),
                last_error_at = now(),
                consecutive_failures = consecutive_failures + 1
             where id = $1",
        )
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn reset_failures(&self, id: Uuid) -> Result<(), IndexerError> {
        sqlx::query("update watched_folders set consecutive_failures = 0 where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn set_paused(&self, id: Uuid, paused: bool) -> Result<(), IndexerError> {
        sqlx::query("update watched_folders set paused = $2 where id = $1")
            .bind(id)
            .bind(paused)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    /// Roots due for a scan right now, pre-filtered on
    /// the backoff condition so the scheduler loop only needs `cron_to_seconds`.
    pub async fn due_server_scope_roots(
        &self,
        failure_backoff_seconds: i64,
        max_consecutive_failures: i32,
    ) -> Result<Vec<WatchedRoot>, IndexerError> {
        let rows: Vec<WatchedRootRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from watched_folders
             where execution_scope = 'server' and enabled = true and paused = false
               and not (
                   consecutive_failures >= $1
                   and last_error_at is not null
                   and last_error_at > now() - make_interval(secs => $2)
               )
             order by folder_path"
        ))
        .bind(max_consecutive_failures)
        .bind(failure_backoff_seconds as f64)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(WatchedRootRow::into_domain).collect())
    }
}
