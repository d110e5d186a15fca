// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Indexer Pipeline: processes a document into chunks,
//! embeds them, and bulk-inserts. Also fronts the bulk delete/export/restore
//! and search operations that read and write the same chunk store.

use crate::embedding::EmbeddingService;
use crate::processor::{ProcessedDocument, Processor};
use indexer_core::{Chunk, ChunkMetadata, DocumentId, IndexerError, Requester, Visibility};
use indexer_storage::repo::chunks::{ChunkRepository, SortBy, SortDir};
use serde_json::Value;
use std::collections::HashMap;
use std::path::Path;

pub struct IndexOptions {
    pub force_reindex: bool,
    pub custom_metadata: Option<ChunkMetadata>,
    pub ocr_mode: bool,
}

impl Default for IndexOptions {
    fn default() -> Self {
        Self { force_reindex: false, custom_metadata: None, ocr_mode: false }
    }
}

#[derive(Debug, Clone)]
pub enum IndexOutcome {
    Success { document_id: DocumentId, source_uri: String, chunks_indexed: u32 },
    Skipped { document_id: DocumentId, source_uri: String },
}

pub struct BulkDeletePreview {
    pub document_count: u64,
    pub sample_documents: Vec<String>,
    pub filters_applied: HashMap<String, Value>,
}

pub enum BulkDeleteOutcome {
    Preview(BulkDeletePreview),
    Deleted { chunks_deleted: u64 },
}

pub struct SearchOptions {
    pub top_k: i64,
    pub min_score: f32,
    pub use_hybrid: bool,
    pub alpha: f32,
}

pub struct SearchHit {
    pub chunk: Chunk,
    pub score: f32,
}

/// Hashes-and-inserts business logic sitting between the Processor/Embedding
/// seams and the `document_chunks` repository.
pub struct IndexerPipeline {
    chunks: ChunkRepository,
    embeddings: Box<dyn EmbeddingService>,
    processor: Box<dyn Processor>,
}

impl IndexerPipeline {
    pub fn new(
        chunks: ChunkRepository,
        embeddings: Box<dyn EmbeddingService>,
        processor: Box<dyn Processor>,
    ) -> Self {
        Self { chunks, embeddings, processor }
    }

    /// `index_document`: processes a file on disk.
    pub async fn index_document(
        &self,
        path: &Path,
        options: IndexOptions,
    ) -> Result<IndexOutcome, IndexerError> {
        let processed = self.processor.process_path(path, options.ocr_mode)?;
        self.index_processed(processed, options).await
    }

    /// The upload variant of `index_document`: the caller has already
    /// streamed the upload to a temp file and read its bytes; `display_name`
    /// (the `custom_source_uri` hint or original filename) drives the
    /// document id and source_uri, never the temp path.
    pub async fn index_uploaded_bytes(
        &self,
        display_name: &str,
        bytes: &[u8],
        options: IndexOptions,
    ) -> Result<IndexOutcome, IndexerError> {
        let processed = self.processor.process_bytes(display_name, bytes, options.ocr_mode)?;
        self.index_processed(processed, options).await
    }

    async fn index_processed(
        &self,
        processed: ProcessedDocument,
        options: IndexOptions,
    ) -> Result<IndexOutcome, IndexerError> {
        let ProcessedDocument { document_id, source_uri, mut metadata, chunk_texts } = processed;

        if self.chunks.document_exists(&document_id).await? {
            if !options.force_reindex {
                return Ok(IndexOutcome::Skipped { document_id, source_uri });
            }
            self.chunks.delete_document(&document_id).await?;
        }

        Chunk::merge_custom_metadata(&mut metadata, options.custom_metadata);

        let embeddings = self.embeddings.encode_batch(&chunk_texts)?;
        if embeddings.len() != chunk_texts.len() {
            return Err(IndexerError::InternalServerError(
                "embedding service returned a mismatched batch size".to_string(),
            ));
        }

        let now = chrono::Utc::now();
        let rows: Vec<Chunk> = chunk_texts
            .into_iter()
            .zip(embeddings)
            .enumerate()
            .map(|(index, (text, embedding))| Chunk {
                id: None,
                document_id: document_id.clone(),
                chunk_index: index as i32,
                text,
                source_uri: source_uri.clone(),
                embedding,
                metadata: metadata.clone(),
                indexed_at: now,
                updated_at: now,
                canonical_source_key: None,
                owner_id: None,
                visibility: None,
                quarantined_at: None,
                quarantine_reason: None,
            })
            .collect();

        let chunks_indexed = rows.len() as u32;
        self.chunks.insert_batch(&rows).await?;

        Ok(IndexOutcome::Success { document_id, source_uri, chunks_indexed })
    }

    pub async fn delete_document(&self, document_id: &DocumentId) -> Result<u64, IndexerError> {
        self.chunks.delete_document(document_id).await
    }

    /// `bulk_delete(filters)` / its `preview=true` variant.
    pub async fn bulk_delete(
        &self,
        filters: HashMap<String, Value>,
        preview: bool,
    ) -> Result<BulkDeleteOutcome, IndexerError> {
        if preview {
            let document_count = self.chunks.count_by_filters(&filters).await?;
            let sample_documents = self.chunks.sample_documents_by_filters(&filters, 10).await?;
            return Ok(BulkDeleteOutcome::Preview(BulkDeletePreview {
                document_count,
                sample_documents,
                filters_applied: filters,
            }));
        }
        let chunks_deleted = self.chunks.bulk_delete_by_filters(&filters).await?;
        Ok(BulkDeleteOutcome::Deleted { chunks_deleted })
    }

    pub async fn export_documents(
        &self,
        filters: HashMap<String, Value>,
    ) -> Result<Vec<Chunk>, IndexerError> {
        self.chunks.export_by_filters(&filters).await
    }

    /// `restore_documents(backup_data)`: conflicting `(document_id,
    /// chunk_index)` rows are skipped rather than erroring.
    pub async fn restore_documents(&self, backup: Vec<Chunk>) -> Result<u64, IndexerError> {
        self.chunks.restore_batch(&backup).await
    }

    /// Search the index: encodes the
    /// query, runs vector or hybrid search, then ANDs in the visibility
    /// filter in-process (the repository query does not know about
    /// requester identity).
    pub async fn search(
        &self,
        query: &str,
        requester: &Requester,
        options: SearchOptions,
    ) -> Result<Vec<SearchHit>, IndexerError> {
        let query_embedding = self
            .embeddings
            .encode_batch(std::slice::from_ref(&query.to_string()))?
            .into_iter()
            .next()
            .ok_or_else(|| {
                IndexerError::InternalServerError("embedding service returned no vector".to_string())
            })?;

        let rows = self
            .chunks
            .search(
                &query_embedding,
                options.top_k,
                options.min_score,
                options.use_hybrid,
                options.alpha,
                query,
            )
            .await?;

        Ok(rows
            .into_iter()
            .filter(|(chunk, _)| {
                indexer_core::visibility::can_view(
                    requester,
                    chunk.owner_id.as_deref(),
                    chunk.visibility,
                )
            })
            .map(|(chunk, score)| SearchHit { chunk, score })
            .collect())
    }

    pub async fn list_documents(
        &self,
        source_prefix: Option<&str>,
        sort_by: SortBy,
        sort_dir: SortDir,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<indexer_storage::repo::chunks::DocumentSummaryRow>, i64), IndexerError> {
        self.chunks.list_documents(source_prefix, sort_by, sort_dir, page, page_size).await
    }
}

/// Chunk visibility/ownership is orthogonal to indexing; this helper is used
/// by the daemon's mutation endpoints to apply the ownership rules.
pub fn default_visibility_for(owner_id: Option<&str>) -> Option<Visibility> {
    owner_id.map(|_| Visibility::Private)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_visibility_is_private_only_when_owned() {
        assert_eq!(default_visibility_for(Some("u1")), Some(Visibility::Private));
        assert_eq!(default_visibility_for(None), None);
    }
}
