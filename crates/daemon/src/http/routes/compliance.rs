// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `GET /compliance/export`: an admin-only ZIP
//! bundling recent activity log rows and indexing run summaries, for
//! operators who need an offline audit snapshot.

use std::io::{Cursor, Write};

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Extension;
use indexer_core::{IndexerError, Requester};
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::http::error::ApiError;
use crate::http::state::AppState;

const ACTIVITY_LIMIT: i64 = 5000;
const RUNS_LIMIT: i64 = 1000;

/// `GET /compliance/export`.
pub async fn export(
    State(state): State<AppState>,
    Extension(requester): Extension<Requester>,
) -> Result<Response, ApiError> {
    if !matches!(requester, Requester::Admin) {
        return Err(ApiError::from(IndexerError::Forbidden));
    }

    let activity = state.daemon.activity.list_recent(ACTIVITY_LIMIT, 0).await?;
    let runs = state.daemon.runs.list_runs(RUNS_LIMIT, 0).await?;

    let activity_json = serde_json::to_vec_pretty(&activity)
        .map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;
    let runs_json = serde_json::to_vec_pretty(&runs)
        .map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;

    let mut cursor = Cursor::new(Vec::new());
    {
        let mut zip = ZipWriter::new(&mut cursor);
        let options = FileOptions::default().compression_method(zip::CompressionMethod::Deflated);

        zip.start_file("activity_log.json", options)
            .map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;
        zip.write_all(&activity_json)
            .map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;

        zip.start_file("indexing_runs.json", options)
            .map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;
        zip.write_all(&runs_json)
            .map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;

        zip.finish().map_err(|e| ApiError::from(IndexerError::InternalServerError(e.to_string())))?;
    }

    Ok((
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, "application/zip"),
            (header::CONTENT_DISPOSITION, "attachment; filename=\"compliance-export.zip\""),
        ],
        cursor.into_inner(),
    )
        .into_response())
}
