// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Path, Query, State};
use axum::Json;
use indexer_core::IndexingRun;
use indexer_wire::IndexingRunSummary;
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::{ApiError, ApiResult};
use crate::http::state::AppState;

fn to_summary(run: IndexingRun) -> IndexingRunSummary {
    IndexingRunSummary {
        id: run.id.to_string(),
        trigger: format!("{:?}", run.trigger).to_lowercase(),
        status: run.status.to_string(),
        started_at: run.started_at,
        completed_at: run.completed_at,
        files_scanned: run.files_scanned,
        files_failed: run.files_failed,
    }
}

#[derive(Debug, Deserialize)]
pub struct ListRunsQuery {
    #[serde(default)]
    limit: Option<i64>,
    #[serde(default)]
    offset: Option<i64>,
}

/// `GET /indexing/runs`.
pub async fn list_runs(
    State(state): State<AppState>,
    Query(query): Query<ListRunsQuery>,
) -> ApiResult<Json<Vec<IndexingRunSummary>>> {
    let limit = query.limit.unwrap_or(50).clamp(1, 500);
    let offset = query.offset.unwrap_or(0).max(0);
    let runs = state.daemon.runs.list_runs(limit, offset).await?;
    Ok(Json(runs.into_iter().map(to_summary).collect()))
}

/// `GET /indexing/runs/summary`: counts by terminal status over
/// the same page the caller would see from `list_runs`, for a dashboard-style
/// at-a-glance view without paging through every row.
pub async fn summary(
    State(state): State<AppState>,
    Query(query): Query<ListRunsQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let limit = query.limit.unwrap_or(500).clamp(1, 5000);
    let runs = state.daemon.runs.list_runs(limit, 0).await?;

    let mut success = 0u32;
    let mut partial = 0u32;
    let mut failed = 0u32;
    let mut running = 0u32;
    for run in &runs {
        match run.status {
            indexer_core::RunStatus::Success => success += 1,
            indexer_core::RunStatus::Partial => partial += 1,
            indexer_core::RunStatus::Failed => failed += 1,
            indexer_core::RunStatus::Running => running += 1,
        }
    }

    Ok(Json(serde_json::json!({
        "total": runs.len(),
        "success": success,
        "partial": partial,
        "failed": failed,
        "running": running,
    })))
}

/// `GET /indexing/runs/{id}`.
pub async fn get_run(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<IndexingRunSummary>> {
    let run = state
        .daemon
        .runs
        .get_run(id)
        .await?
        .ok_or_else(|| ApiError::from(indexer_core::IndexerError::DocumentNotFound(id.to_string())))?;
    Ok(Json(to_summary(run)))
}
