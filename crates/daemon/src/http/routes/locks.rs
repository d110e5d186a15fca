// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::State;
use axum::Json;
use indexer_storage::repo::document_locks::LockOutcome;
use indexer_wire::{
    AcquireLockRequest, AcquireLockResponse, CheckLockRequest, LockHolder, ReleaseLockRequest,
};
use uuid::Uuid;

use crate::http::error::ApiResult;
use crate::http::state::AppState;

fn parse_root_id(raw: Option<&str>) -> Option<Uuid> {
    raw.and_then(|s| Uuid::parse_str(s).ok())
}

/// `POST /documents/locks/acquire`.
pub async fn acquire(
    State(state): State<AppState>,
    Json(body): Json<AcquireLockRequest>,
) -> ApiResult<Json<AcquireLockResponse>> {
    let outcome = state
        .daemon
        .locks
        .acquire_lock(
            &body.source_uri,
            &body.client_id,
            body.ttl_minutes as i64,
            &body.lock_reason,
            parse_root_id(body.root_id.as_deref()),
            body.relative_path.as_deref(),
        )
        .await?;

    let response = match outcome {
        LockOutcome::Acquired { lock, extended } => {
            AcquireLockResponse { ok: true, extended, holder: None, expires_at: Some(lock.expires_at) }
        }
        LockOutcome::Held { holder } => AcquireLockResponse {
            ok: false,
            extended: false,
            holder: Some(LockHolder { client_id: holder.client_id, expires_at: holder.expires_at }),
            expires_at: None,
        },
    };
    Ok(Json(response))
}

/// `POST /documents/locks/release`.
pub async fn release(
    State(state): State<AppState>,
    Json(body): Json<ReleaseLockRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let released = state
        .daemon
        .locks
        .release_lock(
            &body.source_uri,
            &body.client_id,
            parse_root_id(body.root_id.as_deref()),
            body.relative_path.as_deref(),
        )
        .await?;
    Ok(Json(serde_json::json!({ "released": released })))
}

/// `POST /documents/locks/force-release`: admin-only, drops the lock
/// regardless of which client holds it.
pub async fn force_release(
    State(state): State<AppState>,
    Json(body): Json<ReleaseLockRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let released = state
        .daemon
        .locks
        .force_release_lock(
            &body.source_uri,
            parse_root_id(body.root_id.as_deref()),
            body.relative_path.as_deref(),
        )
        .await?;
    Ok(Json(serde_json::json!({ "released": released })))
}

/// `POST /documents/locks/check`.
pub async fn check(
    State(state): State<AppState>,
    Json(body): Json<CheckLockRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let lock = state
        .daemon
        .locks
        .check_lock(&body.source_uri, parse_root_id(body.root_id.as_deref()), body.relative_path.as_deref())
        .await?;
    match lock {
        Some(lock) => Ok(Json(serde_json::json!({
            "locked": true,
            "client_id": lock.client_id,
            "expires_at": lock.expires_at,
            "lock_reason": lock.lock_reason,
        }))),
        None => Ok(Json(serde_json::json!({ "locked": false }))),
    }
}

/// `POST /documents/locks/cleanup`: sweeps expired locks on demand,
/// outside of the lazy delete-on-acquire path.
pub async fn cleanup(State(state): State<AppState>) -> ApiResult<Json<serde_json::Value>> {
    let removed = state.daemon.locks.cleanup_expired_locks().await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}
