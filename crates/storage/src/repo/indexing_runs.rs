// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `indexing_runs` repository: Run Recorder persistence
//! and retention.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Utc};
use indexer_core::{IndexingRun, IndexerError, RunError, RunId, RunStatus, RunTrigger};
use serde_json::Value;
use uuid::Uuid;

pub struct IndexingRunRepository {
    pool: Pool,
}

#[derive(Debug, sqlx::FromRow)]
struct IndexingRunRow {
    id: Uuid,
    trigger: String,
    source_uri: Option<String>,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
    status: String,
    files_scanned: i32,
    files_added: i32,
    files_updated: i32,
    files_skipped: i32,
    files_failed: i32,
    errors: Value,
    metadata: Value,
    client_id: Option<String>,
}

fn parse_trigger(s: &str) -> RunTrigger {
    match s {
        "upload" => RunTrigger::Upload,
        "cli" => RunTrigger::Cli,
        "scheduled" => RunTrigger::Scheduled,
        "api" => RunTrigger::Api,
        _ => RunTrigger::Manual,
    }
}

fn parse_status(s: &str) -> RunStatus {
    match s {
        "success" => RunStatus::Success,
        "partial" => RunStatus::Partial,
        "failed" => RunStatus::Failed,
        _ => RunStatus::Running,
    }
}

impl IndexingRunRow {
    fn into_domain(self) -> IndexingRun {
        let errors: Vec<RunError> = serde_json::from_value(self.errors).unwrap_or_default();
        IndexingRun {
            id: RunId::from_uuid(self.id),
            trigger: parse_trigger(&self.trigger),
            source_uri: self.source_uri,
            started_at: self.started_at,
            completed_at: self.completed_at,
            status: parse_status(&self.status),
            files_scanned: self.files_scanned.max(0) as u32,
            files_added: self.files_added.max(0) as u32,
            files_updated: self.files_updated.max(0) as u32,
            files_skipped: self.files_skipped.max(0) as u32,
            files_failed: self.files_failed.max(0) as u32,
            errors,
            metadata: self
                .metadata
                .as_object()
                .map(|m| m.clone().into_iter().collect())
                .unwrap_or_default(),
            client_id: self.client_id,
        }
    }
}

const SELECT_COLUMNS: &str = "id, trigger, source_uri, started_at, completed_at, status,
    files_scanned, files_added, files_updated, files_skipped, files_failed, errors, metadata,
    client_id";

impl IndexingRunRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    pub async fn start_run(
        &self,
        trigger: RunTrigger,
        source_uri: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<Uuid, IndexerError> {
        let trigger_str = format!("{trigger:?}").to_lowercase();
        let row: (Uuid,) = sqlx::query_as(
            "insert into indexing_runs (trigger, source_uri, status, client_id)
             values ($1, $2, 'running', $3) returning id",
        )
        .bind(trigger_str)
        .bind(source_uri)
        .bind(client_id)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.0)
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn complete_run(
        &self,
        run_id: Uuid,
        status: RunStatus,
        files_scanned: u32,
        files_added: u32,
        files_updated: u32,
        files_skipped: u32,
        files_failed: u32,
        errors: &[RunError],
    ) -> Result<(), IndexerError> {
        let status_str = status.to_string();
        let errors_json = serde_json::to_value(errors).unwrap_or_else(|_| Value::Array(vec![]));
        sqlx::query(
            "update indexing_runs set
                status = $2, completed_at = now(),
                files_scanned = $3, files_added = $4, files_updated = $5,
                files_skipped = $6, files_failed = $7, errors = $8
             where id = $1",
        )
        .bind(run_id)
        .bind(status_str)
        .bind(files_scanned as i32)
        .bind(files_added as i32)
        .bind(files_updated as i32)
        .bind(files_skipped as i32)
        .bind(files_failed as i32)
        .bind(errors_json)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn get_run(&self, id: Uuid) -> Result<Option<IndexingRun>, IndexerError> {
        let row: Option<IndexingRunRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from indexing_runs where id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(row.map(IndexingRunRow::into_domain))
    }

    pub async fn list_runs(&self, limit: i64, offset: i64) -> Result<Vec<IndexingRun>, IndexerError> {
        let rows: Vec<IndexingRunRow> = sqlx::query_as(&format!(
            "select {SELECT_COLUMNS} from indexing_runs order by started_at desc limit $1 offset $2"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(IndexingRunRow::into_domain).collect())
    }

    /// `apply_indexing_runs_retention`: deletes only terminal-status rows
    /// older than `days`. The `status in
    /// (...)` predicate is what keeps a `running` row un-deletable even if
    /// its process died and it never transitions — the caller is trusted not
    /// to pass a status list containing `'running'`.
    pub async fn delete_terminal_older_than(&self, days: i64) -> Result<u64, IndexerError> {
        let result = sqlx::query(
            "delete from indexing_runs
             where status in ('success', 'partial', 'failed')
               and started_at < now() - make_interval(days => $1)",
        )
        .bind(days as i32)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_trigger_round_trips_known_values() {
        for (s, expected) in [
            ("upload", RunTrigger::Upload),
            ("cli", RunTrigger::Cli),
            ("scheduled", RunTrigger::Scheduled),
            ("api", RunTrigger::Api),
            ("manual", RunTrigger::Manual),
        ] {
            assert_eq!(parse_trigger(s), expected);
        }
    }

    #[test]
    fn parse_trigger_defaults_to_manual_on_unknown() {
        assert_eq!(parse_trigger("bogus"), RunTrigger::Manual);
    }

    #[test]
    fn parse_status_round_trips_known_values() {
        for (s, expected) in [
            ("success", RunStatus::Success),
            ("partial", RunStatus::Partial),
            ("failed", RunStatus::Failed),
            ("running", RunStatus::Running),
        ] {
            assert_eq!(parse_status(s), expected);
        }
    }

    #[test]
    fn parse_status_defaults_to_running_on_unknown() {
        assert_eq!(parse_status("bogus"), RunStatus::Running);
    }
}
