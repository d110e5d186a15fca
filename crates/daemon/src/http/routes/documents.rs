// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use axum::extract::{Path, Query, State};
use axum::Json;
use indexer_core::DocumentId;
use indexer_storage::repo::chunks::{SortBy as RepoSortBy, SortDir as RepoSortDir};
use indexer_wire::{
    BulkDeleteRequest, BulkDeleteResponse, DocumentListResponse, DocumentSortBy, DocumentSummary,
    ExportRequest, ListDocumentsQuery, RestoreRequest, SortDir,
};

use crate::http::error::ApiResult;
use crate::http::state::AppState;

const DEFAULT_PAGE: u32 = 1;
const DEFAULT_PAGE_SIZE: u32 = 50;

fn to_repo_sort_by(sort_by: DocumentSortBy) -> RepoSortBy {
    match sort_by {
        DocumentSortBy::IndexedAt => RepoSortBy::IndexedAt,
        DocumentSortBy::LastUpdated => RepoSortBy::LastUpdated,
        DocumentSortBy::SourceUri => RepoSortBy::SourceUri,
        DocumentSortBy::ChunkCount => RepoSortBy::ChunkCount,
        DocumentSortBy::DocumentId => RepoSortBy::DocumentId,
        // No `document_type` column exists on the chunk store; fall back to
        // the closest stable ordering rather than erroring on a supplemented
        // sort key the storage layer doesn't carry.
        DocumentSortBy::DocumentType => RepoSortBy::DocumentId,
    }
}

fn to_repo_sort_dir(sort_dir: SortDir) -> RepoSortDir {
    match sort_dir {
        SortDir::Asc => RepoSortDir::Asc,
        SortDir::Desc => RepoSortDir::Desc,
    }
}

/// The directory component of a source URI, used to group documents when
/// `group_by=source_prefix` is requested — the original's folder-grouping
/// view (`document_tree.py`), exposed on this endpoint rather than a new one.
fn source_prefix_of(source_uri: &str) -> String {
    match source_uri.rfind('/') {
        Some(idx) => source_uri[..idx].to_string(),
        None => String::new(),
    }
}

/// `GET /documents`. `group_by=source_prefix`
/// returns the same page grouped by directory instead of a flat list.
pub async fn list_documents(
    State(state): State<AppState>,
    Query(query): Query<ListDocumentsQuery>,
) -> ApiResult<Json<serde_json::Value>> {
    let page = query.page.unwrap_or(DEFAULT_PAGE).max(1);
    let page_size = query.page_size.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, 500);
    let sort_by = to_repo_sort_by(query.sort_by.unwrap_or(DocumentSortBy::IndexedAt));
    let sort_dir = to_repo_sort_dir(query.sort_dir.unwrap_or(SortDir::Desc));

    let (rows, total) = state
        .daemon
        .pipeline
        .list_documents(query.source_prefix.as_deref(), sort_by, sort_dir, page as i64, page_size as i64)
        .await?;

    let documents: Vec<DocumentSummary> = rows
        .into_iter()
        .map(|row| DocumentSummary {
            document_id: row.document_id,
            source_uri: row.source_uri,
            chunk_count: row.chunk_count as u32,
            indexed_at: row.indexed_at,
            last_updated: row.last_updated,
            document_type: None,
        })
        .collect();

    if query.group_by.as_deref() == Some("source_prefix") {
        let mut groups: std::collections::BTreeMap<String, Vec<DocumentSummary>> = Default::default();
        for doc in documents {
            groups.entry(source_prefix_of(&doc.source_uri)).or_default().push(doc);
        }
        return Ok(Json(serde_json::json!({
            "groups": groups,
            "total": total as u64,
            "page": page,
            "page_size": page_size,
        })));
    }

    let response = DocumentListResponse { documents, total: total as u64, page, page_size };
    Ok(Json(serde_json::to_value(response).unwrap_or(serde_json::Value::Null)))
}

/// `DELETE /documents/{id}`.
pub async fn delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<serde_json::Value>> {
    let document_id = DocumentId::from_raw(id);
    let chunks_deleted = state.daemon.pipeline.delete_document(&document_id).await?;
    Ok(Json(serde_json::json!({ "chunks_deleted": chunks_deleted })))
}

/// `POST /documents/bulk-delete`.
pub async fn bulk_delete(
    State(state): State<AppState>,
    Json(body): Json<BulkDeleteRequest>,
) -> ApiResult<Json<BulkDeleteResponse>> {
    let outcome = state.daemon.pipeline.bulk_delete(body.filters, body.preview).await?;
    let response = match outcome {
        indexer_engine::BulkDeleteOutcome::Preview(preview) => {
            BulkDeleteResponse::Preview(indexer_wire::BulkDeletePreview {
                document_count: preview.document_count,
                sample_documents: preview.sample_documents,
                filters_applied: preview.filters_applied,
            })
        }
        indexer_engine::BulkDeleteOutcome::Deleted { chunks_deleted } => {
            BulkDeleteResponse::Deleted { chunks_deleted }
        }
    };
    Ok(Json(response))
}

/// `POST /documents/export`.
pub async fn export(
    State(state): State<AppState>,
    Json(body): Json<ExportRequest>,
) -> ApiResult<Json<Vec<serde_json::Value>>> {
    let chunks = state.daemon.pipeline.export_documents(body.filters).await?;
    let values = chunks
        .into_iter()
        .map(|chunk| serde_json::to_value(ExportedChunk::from(chunk)).unwrap_or(serde_json::Value::Null))
        .collect();
    Ok(Json(values))
}

/// `POST /documents/restore`.
pub async fn restore(
    State(state): State<AppState>,
    Json(body): Json<RestoreRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    let chunks: Vec<indexer_core::Chunk> = body
        .backup_data
        .into_iter()
        .filter_map(|v| serde_json::from_value::<ExportedChunk>(v).ok())
        .map(ExportedChunk::into_chunk)
        .collect();
    let restored = state.daemon.pipeline.restore_documents(chunks).await?;
    Ok(Json(serde_json::json!({ "chunks_restored": restored })))
}

/// Wire shape for export/restore round-trips — deliberately narrower than
/// the full [`indexer_core::Chunk`] (no embedding vector; it's recomputed
/// on restore via `restore_batch`'s own insert path instead of round-tripped
/// as JSON).
#[derive(serde::Serialize, serde::Deserialize)]
struct ExportedChunk {
    document_id: String,
    chunk_index: i32,
    text: String,
    source_uri: String,
    metadata: indexer_core::ChunkMetadata,
    canonical_source_key: Option<String>,
}

impl From<indexer_core::Chunk> for ExportedChunk {
    fn from(chunk: indexer_core::Chunk) -> Self {
        Self {
            document_id: chunk.document_id.as_str().to_string(),
            chunk_index: chunk.chunk_index,
            text: chunk.text,
            source_uri: chunk.source_uri,
            metadata: chunk.metadata,
            canonical_source_key: chunk.canonical_source_key,
        }
    }
}

impl ExportedChunk {
    fn into_chunk(self) -> indexer_core::Chunk {
        let now = chrono::Utc::now();
        indexer_core::Chunk {
            id: None,
            document_id: DocumentId::from_raw(self.document_id),
            chunk_index: self.chunk_index,
            text: self.text,
            source_uri: self.source_uri,
            embedding: Vec::new(),
            metadata: self.metadata,
            indexed_at: now,
            updated_at: now,
            canonical_source_key: self.canonical_source_key,
            owner_id: None,
            visibility: None,
            quarantined_at: None,
            quarantine_reason: None,
        }
    }
}
