// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Multipart, State};
use axum::Json;
use indexer_core::IndexerError;
use indexer_engine::IndexOptions;
use indexer_wire::{
    EncryptedPdfListResponse, EncryptedPdfSightingResponse, IndexRequest, IndexResponse, IndexStatus,
};
use std::path::Path;

use crate::http::error::{ApiError, ApiResult};
use crate::http::state::AppState;

/// Records a sighting before letting the error continue to the caller —
/// indexing still fails, but operators can see the PDF was seen.
fn record_if_encrypted(state: &AppState, source_uri: &str, error: &IndexerError) {
    if let IndexerError::EncryptedPdf(_) = error {
        state.daemon.encrypted_pdfs.record(source_uri.to_string(), chrono::Utc::now());
    }
}

/// `POST /index`: index a file already on disk by URI.
pub async fn index(
    State(state): State<AppState>,
    Json(body): Json<IndexRequest>,
) -> ApiResult<Json<IndexResponse>> {
    let options = IndexOptions {
        force_reindex: body.force_reindex,
        custom_metadata: body.metadata.map(|m| m.into_iter().collect()),
        ocr_mode: false,
    };
    let outcome = state
        .daemon
        .pipeline
        .index_document(Path::new(&body.source_uri), options)
        .await
        .map_err(|e| {
            record_if_encrypted(&state, &body.source_uri, &e);
            ApiError::from(e)
        })?;
    Ok(Json(outcome_to_response(outcome)))
}

/// `GET /documents/encrypted`: the bounded, in-memory log of encrypted-PDF
/// sightings seen since the daemon last restarted.
pub async fn list_encrypted(State(state): State<AppState>) -> Json<EncryptedPdfListResponse> {
    let sightings = state
        .daemon
        .encrypted_pdfs
        .recent()
        .into_iter()
        .map(|s| EncryptedPdfSightingResponse { source_uri: s.source_uri, seen_at: s.seen_at })
        .collect();
    Json(EncryptedPdfListResponse { sightings })
}

/// `POST /upload-and-index`: multipart upload, indexed from
/// the in-memory bytes rather than a path on disk.
pub async fn upload_and_index(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<Json<IndexResponse>> {
    let mut bytes: Option<Vec<u8>> = None;
    let mut custom_source_uri: Option<String> = None;
    let mut original_filename: Option<String> = None;
    let mut force_reindex = false;
    let mut ocr_mode = false;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::from(IndexerError::DocumentProcessingFailed(e.to_string())))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "file" => {
                original_filename = field.file_name().map(str::to_string);
                bytes = Some(
                    field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::from(IndexerError::DocumentProcessingFailed(e.to_string())))?
                        .to_vec(),
                );
            }
            "custom_source_uri" => {
                custom_source_uri = Some(
                    field
                        .text()
                        .await
                        .map_err(|e| ApiError::from(IndexerError::DocumentProcessingFailed(e.to_string())))?,
                );
            }
            "force_reindex" => {
                force_reindex = field.text().await.unwrap_or_default() == "true";
            }
            "ocr_mode" => {
                ocr_mode = !field.text().await.unwrap_or_default().is_empty();
            }
            _ => {}
        }
    }

    let bytes = bytes.ok_or_else(|| {
        ApiError::from(IndexerError::DocumentProcessingFailed("missing file field".to_string()))
    })?;
    let display_name = custom_source_uri
        .or(original_filename)
        .ok_or_else(|| ApiError::from(IndexerError::DocumentProcessingFailed("missing filename".to_string())))?;

    let options = IndexOptions { force_reindex, custom_metadata: None, ocr_mode };
    let outcome = state
        .daemon
        .pipeline
        .index_uploaded_bytes(&display_name, &bytes, options)
        .await
        .map_err(|e| {
            record_if_encrypted(&state, &display_name, &e);
            ApiError::from(e)
        })?;
    Ok(Json(outcome_to_response(outcome)))
}

fn outcome_to_response(outcome: indexer_engine::IndexOutcome) -> IndexResponse {
    match outcome {
        indexer_engine::IndexOutcome::Success { document_id, source_uri, chunks_indexed } => {
            IndexResponse {
                status: IndexStatus::Success,
                document_id: document_id.as_str().to_string(),
                source_uri,
                chunks_indexed,
            }
        }
        indexer_engine::IndexOutcome::Skipped { document_id, source_uri } => IndexResponse {
            status: IndexStatus::Skipped,
            document_id: document_id.as_str().to_string(),
            source_uri,
            chunks_indexed: 0,
        },
    }
}
