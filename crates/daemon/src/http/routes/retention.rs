// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::State;
use axum::Json;
use indexer_wire::{RetentionRunRequest, RetentionRunResponse};

use crate::http::state::AppState;
use crate::retention;

/// `POST /retention/run`: an admin-triggered retention
/// pass outside the orchestrator's own interval.
pub async fn run(
    State(state): State<AppState>,
    Json(body): Json<RetentionRunRequest>,
) -> Json<RetentionRunResponse> {
    let result = retention::apply_retention(
        &state.daemon,
        body.activity_days,
        body.quarantine_days,
        body.indexing_runs_days,
        body.cleanup_saml_sessions,
    )
    .await;
    Json(result)
}
