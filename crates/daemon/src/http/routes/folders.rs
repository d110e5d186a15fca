// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Path, Query, State};
use axum::Json;
use indexer_core::canonical_identity::Scope;
use indexer_core::{ExecutionScope, NewWatchedRoot, RunTrigger};
use indexer_engine::ScanRequest as EngineScanRequest;
use indexer_wire::{
    AddFolderRequest, DryRunScanResponse, ScanRequest, ScanRunResponse, TransitionScopeRequest,
    UpdateFolderRequest, WatchedFolderResponse,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::http::error::{ApiError, ApiResult};
use crate::http::state::AppState;

fn to_response(root: indexer_core::WatchedRoot) -> WatchedFolderResponse {
    WatchedFolderResponse {
        id: root.id.to_string(),
        folder_path: root.folder_path,
        execution_scope: root.execution_scope,
        executor_id: root.executor_id,
        root_id: root.root_id.to_string(),
        schedule_cron: root.schedule_cron,
        enabled: root.enabled,
        paused: root.paused,
        max_concurrency: root.max_concurrency,
        consecutive_failures: root.consecutive_failures,
        last_scanned_at: root.last_scanned_at,
    }
}

/// `POST /watched-folders`.
pub async fn add_folder(
    State(state): State<AppState>,
    Json(body): Json<AddFolderRequest>,
) -> ApiResult<Json<WatchedFolderResponse>> {
    let params = NewWatchedRoot {
        folder_path: body.folder_path,
        schedule_cron: body.schedule_cron,
        execution_scope: body.execution_scope,
        executor_id: body.executor_id,
        enabled: body.enabled,
        paused: body.paused,
        max_concurrency: body.max_concurrency,
        metadata: body.metadata,
    };
    let root = state.daemon.roots.add_folder(params).await?;
    Ok(Json(to_response(root)))
}

#[derive(Debug, Deserialize)]
pub struct ListFoldersQuery {
    #[serde(default)]
    enabled_only: bool,
    #[serde(default)]
    scope: Option<ExecutionScope>,
    #[serde(default)]
    executor_id: Option<String>,
}

/// `GET /watched-folders`.
pub async fn list_folders(
    State(state): State<AppState>,
    Query(query): Query<ListFoldersQuery>,
) -> ApiResult<Json<Vec<WatchedFolderResponse>>> {
    let roots = state
        .daemon
        .roots
        .list_folders(query.enabled_only, query.scope, query.executor_id.as_deref())
        .await?;
    Ok(Json(roots.into_iter().map(to_response).collect()))
}

/// `DELETE /watched-folders/{id}`.
pub async fn remove_folder(State(state): State<AppState>, Path(id): Path<Uuid>) -> ApiResult<Json<serde_json::Value>> {
    let removed = state.daemon.roots.remove_folder(id).await?;
    Ok(Json(serde_json::json!({ "removed": removed })))
}

/// `PATCH /watched-folders/{id}`.
pub async fn update_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<UpdateFolderRequest>,
) -> ApiResult<Json<WatchedFolderResponse>> {
    let root = state
        .daemon
        .roots
        .update_folder(
            id,
            body.schedule_cron,
            body.enabled,
            body.paused,
            body.max_concurrency.map(|v| v as i32),
            body.metadata.map(|m| serde_json::Value::Object(m.into_iter().collect())),
        )
        .await?
        .ok_or_else(|| ApiError::from(indexer_core::IndexerError::DocumentNotFound(id.to_string())))?;
    Ok(Json(to_response(root)))
}

/// `POST /watched-folders/{id}/transition-scope`.
pub async fn transition_scope(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<TransitionScopeRequest>,
) -> ApiResult<Json<WatchedFolderResponse>> {
    let root = state.daemon.roots.transition_scope(id, body.target_scope, body.executor_id).await?;
    Ok(Json(to_response(root)))
}

/// `POST /watched-folders/{id}/scan`: a manual scan of a single
/// watched root, server- or client-scope, with optional dry-run preview.
pub async fn scan_folder(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(body): Json<ScanRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let root = state
        .daemon
        .roots
        .get_folder_by_root_id(id)
        .await?
        .ok_or_else(|| ApiError::from(indexer_core::IndexerError::DocumentNotFound(id.to_string())))?;

    let (scope, identity, lock_client_id) = match root.execution_scope {
        ExecutionScope::Server => {
            if body.client_id.is_some() {
                return Err(ApiError::from(indexer_core::IndexerError::NotServerScope));
            }
            (Scope::Server, root.root_id.to_string(), "manual-scan".to_string())
        }
        ExecutionScope::Client => {
            let executor_id = root.executor_id.clone().unwrap_or_default();
            let lock_client_id = body.client_id.clone().unwrap_or_else(|| executor_id.clone());
            (Scope::Client, executor_id, lock_client_id)
        }
    };

    if !body.dry_run {
        state.daemon.roots.watermark_started(root.id.as_uuid()).await?;
    }

    let request = EngineScanRequest {
        folder_path: root.folder_path.clone(),
        trigger: RunTrigger::Manual,
        client_id: body.client_id,
        dry_run: body.dry_run,
        root_id: Some(root.root_id),
        scope,
        identity,
        lock_client_id,
    };

    let result = state.daemon.scan_engine.scan(request).await;
    if body.dry_run {
        let result = result?;
        let dry_run = result.dry_run.unwrap_or(indexer_engine::DryRunOutcome {
            total_files: 0,
            would_index: Vec::new(),
            would_quarantine: Vec::new(),
        });
        let response = DryRunScanResponse {
            dry_run: true,
            status: result.status.to_string(),
            total_files: dry_run.total_files,
            would_index: dry_run.would_index,
            would_quarantine: dry_run.would_quarantine,
        };
        return Ok(Json(serde_json::to_value(response).unwrap_or(serde_json::Value::Null)));
    }

    match &result {
        Ok(scan_result) => {
            state.daemon.roots.mark_scanned(root.id.as_uuid(), Some(scan_result.run_id)).await?;
            if matches!(scan_result.status, indexer_core::RunStatus::Failed) {
                state.daemon.roots.watermark_completed_error(root.id.as_uuid()).await?;
            } else {
                state.daemon.roots.watermark_completed_success(root.id.as_uuid()).await?;
            }
        }
        Err(_) => {
            state.daemon.roots.watermark_completed_error(root.id.as_uuid()).await?;
        }
    }
    let result = result?;
    let response = ScanRunResponse {
        run_id: result.run_id.to_string(),
        status: result.status.to_string(),
        files_scanned: result.counters.files_scanned,
        files_added: result.counters.files_added,
        files_updated: result.counters.files_updated,
        files_skipped: result.counters.files_skipped,
        files_failed: result.counters.files_failed,
    };
    Ok(Json(serde_json::to_value(response).unwrap_or(serde_json::Value::Null)))
}
