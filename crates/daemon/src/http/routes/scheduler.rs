// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Path, State};
use axum::Json;
use indexer_wire::SchedulerStatusResponse;
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::http::state::AppState;
use crate::scheduler;

/// `GET /scheduler/status`.
pub async fn status(State(state): State<AppState>) -> Json<SchedulerStatusResponse> {
    Json(state.scheduler.status())
}

/// `POST /scheduler/roots/{id}/pause`.
pub async fn pause(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    scheduler::pause(&state.daemon, id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /scheduler/roots/{id}/resume`.
pub async fn resume(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    scheduler::resume(&state.daemon, id).await?;
    Ok(Json(serde_json::json!({ "ok": true })))
}

/// `POST /scheduler/roots/{id}/scan-now`: server-scope
/// only, runs outside the poll cadence and wakes the loop so `last_poll_at`
/// reflects the out-of-band run too.
pub async fn scan_now(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<serde_json::Value>> {
    let run_id = scheduler::scan_now(&state.daemon, id).await?;
    state.scheduler.wake();
    Ok(Json(serde_json::json!({ "run_id": run_id.to_string() })))
}
