// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `document_chunks` repository: insert,
//! delete, bulk operations, quarantine transitions, canonical-key backfill,
//! and vector/hybrid search.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Utc};
use indexer_core::{Chunk, DocumentId, IndexerError, Visibility};
use serde_json::Value;
use sqlx::Row;
use std::collections::HashMap;

pub struct ChunkRepository {
    pool: Pool,
}

#[derive(Debug, sqlx::FromRow)]
struct ChunkRow {
    id: i64,
    document_id: String,
    chunk_index: i32,
    text: String,
    source_uri: String,
    embedding: Vec<f32>,
    metadata: Value,
    indexed_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    canonical_source_key: Option<String>,
    owner_id: Option<String>,
    visibility: Option<String>,
    quarantined_at: Option<DateTime<Utc>>,
    quarantine_reason: Option<String>,
}

impl ChunkRow {
    fn into_chunk(self) -> Chunk {
        Chunk {
            id: Some(self.id),
            document_id: DocumentId::from_raw(self.document_id),
            chunk_index: self.chunk_index,
            text: self.text,
            source_uri: self.source_uri,
            embedding: self.embedding,
            metadata: self
                .metadata
                .as_object()
                .map(|m| m.clone().into_iter().collect())
                .unwrap_or_default(),
            indexed_at: self.indexed_at,
            updated_at: self.updated_at,
            canonical_source_key: self.canonical_source_key,
            owner_id: self.owner_id,
            visibility: self.visibility.and_then(|v| match v.as_str() {
                "shared" => Some(Visibility::Shared),
                "private" => Some(Visibility::Private),
                _ => None,
            }),
            quarantined_at: self.quarantined_at,
            quarantine_reason: self.quarantine_reason,
        }
    }
}

/// A summary row for `GET /api/v1/documents`.
#[derive(Debug, Clone)]
pub struct DocumentSummaryRow {
    pub document_id: String,
    pub source_uri: String,
    pub chunk_count: i64,
    pub indexed_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortBy {
    IndexedAt,
    LastUpdated,
    SourceUri,
    ChunkCount,
    DocumentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDir {
    Asc,
    Desc,
}

impl ChunkRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Bulk insert in a single transaction: either all
    /// rows land or none do, so a failed batch never leaves a partial
    /// document behind.
    pub async fn insert_batch(&self, rows: &[Chunk]) -> Result<(), IndexerError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        for chunk in rows {
            let metadata = Value::Object(chunk.metadata.clone().into_iter().collect());
            let visibility = chunk.visibility.map(|v| v.as_str().to_string());
            sqlx::query(
                "insert into document_chunks
                    (document_id, chunk_index, text, source_uri, embedding, metadata,
                     canonical_source_key, owner_id, visibility)
                 values ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
            )
            .bind(chunk.document_id.as_str())
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.source_uri)
            .bind(&chunk.embedding)
            .bind(metadata)
            .bind(&chunk.canonical_source_key)
            .bind(&chunk.owner_id)
            .bind(visibility)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(())
    }

    pub async fn document_exists(&self, document_id: &DocumentId) -> Result<bool, IndexerError> {
        let row: (bool,) =
            sqlx::query_as("select exists(select 1 from document_chunks where document_id = $1)")
                .bind(document_id.as_str())
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.0)
    }

    pub async fn delete_document(&self, document_id: &DocumentId) -> Result<u64, IndexerError> {
        let result = sqlx::query("delete from document_chunks where document_id = $1")
            .bind(document_id.as_str())
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    /// Count matching a flat metadata-key filter, for `bulk_delete`'s
    /// `preview=true` branch.
    pub async fn count_by_filters(
        &self,
        filters: &HashMap<String, Value>,
    ) -> Result<i64, IndexerError> {
        let predicate = Value::Object(filters.clone().into_iter().collect());
        let row: (i64,) =
            sqlx::query_as("select count(distinct document_id) from document_chunks where metadata @> $1")
                .bind(predicate)
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?;
        Ok(row.0)
    }

    pub async fn sample_documents_by_filters(
        &self,
        filters: &HashMap<String, Value>,
        limit: i64,
    ) -> Result<Vec<String>, IndexerError> {
        let predicate = Value::Object(filters.clone().into_iter().collect());
        let rows: Vec<(String,)> = sqlx::query_as(
            "select distinct document_id from document_chunks where metadata @> $1 limit $2",
        )
        .bind(predicate)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(|(id,)| id).collect())
    }

    pub async fn bulk_delete_by_filters(
        &self,
        filters: &HashMap<String, Value>,
    ) -> Result<u64, IndexerError> {
        let predicate = Value::Object(filters.clone().into_iter().collect());
        let result = sqlx::query("delete from document_chunks where metadata @> $1")
            .bind(predicate)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    pub async fn export_by_filters(
        &self,
        filters: &HashMap<String, Value>,
    ) -> Result<Vec<Chunk>, IndexerError> {
        let predicate = Value::Object(filters.clone().into_iter().collect());
        let rows: Vec<ChunkRow> = sqlx::query_as(
            "select id, document_id, chunk_index, text, source_uri, embedding, metadata,
                    indexed_at, updated_at, canonical_source_key, owner_id, visibility,
                    quarantined_at, quarantine_reason
             from document_chunks where metadata @> $1 order by document_id, chunk_index",
        )
        .bind(predicate)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ChunkRow::into_chunk).collect())
    }

    /// Insert exported rows back, skipping any whose `(document_id,
    /// chunk_index)` already exists.
    pub async fn restore_batch(&self, rows: &[Chunk]) -> Result<u64, IndexerError> {
        let mut inserted = 0u64;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        for chunk in rows {
            let metadata = Value::Object(chunk.metadata.clone().into_iter().collect());
            let visibility = chunk.visibility.map(|v| v.as_str().to_string());
            let result = sqlx::query(
                "insert into document_chunks
                    (document_id, chunk_index, text, source_uri, embedding, metadata,
                     canonical_source_key, owner_id, visibility)
                 values ($1, $2, $3, $4, $5, $6, $7, $8, $9)
                 on conflict (document_id, chunk_index) do nothing",
            )
            .bind(chunk.document_id.as_str())
            .bind(chunk.chunk_index)
            .bind(&chunk.text)
            .bind(&chunk.source_uri)
            .bind(&chunk.embedding)
            .bind(metadata)
            .bind(&chunk.canonical_source_key)
            .bind(&chunk.owner_id)
            .bind(visibility)
            .execute(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            inserted += result.rows_affected();
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(inserted)
    }

    /// Nearest-neighbor search by cosine distance, optionally blended with a
    /// trigram keyword signal for hybrid mode.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        top_k: i64,
        min_score: f32,
        use_hybrid: bool,
        alpha: f32,
        keyword: &str,
    ) -> Result<Vec<(Chunk, f32)>, IndexerError> {
        let sql = if use_hybrid {
            "select id, document_id, chunk_index, text, source_uri, embedding, metadata,
                    indexed_at, updated_at, canonical_source_key, owner_id, visibility,
                    quarantined_at, quarantine_reason,
                    ($4 * (1 - (embedding <=> $1)) + (1 - $4) * similarity(text, $5)) as score
             from document_chunks
             where quarantined_at is null
             order by score desc
             limit $2"
        } else {
            "select id, document_id, chunk_index, text, source_uri, embedding, metadata,
                    indexed_at, updated_at, canonical_source_key, owner_id, visibility,
                    quarantined_at, quarantine_reason,
                    (1 - (embedding <=> $1)) as score
             from document_chunks
             where quarantined_at is null
             order by score desc
             limit $2"
        };

        let rows = sqlx::query(sql)
            .bind(query_embedding)
            .bind(top_k)
            .bind(min_score)
            .bind(alpha)
            .bind(keyword)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let mut results = Vec::with_capacity(rows.len());
        for row in rows {
            let score: f32 = row.try_get("score").map_err(map_sqlx_error)?;
            if score < min_score {
                continue;
            }
            let chunk_row = ChunkRow {
                id: row.try_get("id").map_err(map_sqlx_error)?,
                document_id: row.try_get("document_id").map_err(map_sqlx_error)?,
                chunk_index: row.try_get("chunk_index").map_err(map_sqlx_error)?,
                text: row.try_get("text").map_err(map_sqlx_error)?,
                source_uri: row.try_get("source_uri").map_err(map_sqlx_error)?,
                embedding: row.try_get("embedding").map_err(map_sqlx_error)?,
                metadata: row.try_get("metadata").map_err(map_sqlx_error)?,
                indexed_at: row.try_get("indexed_at").map_err(map_sqlx_error)?,
                updated_at: row.try_get("updated_at").map_err(map_sqlx_error)?,
                canonical_source_key: row.try_get("canonical_source_key").map_err(map_sqlx_error)?,
                owner_id: row.try_get("owner_id").map_err(map_sqlx_error)?,
                visibility: row.try_get("visibility").map_err(map_sqlx_error)?,
                quarantined_at: row.try_get("quarantined_at").map_err(map_sqlx_error)?,
                quarantine_reason: row.try_get("quarantine_reason").map_err(map_sqlx_error)?,
            };
            results.push((chunk_row.into_chunk(), score));
        }
        Ok(results)
    }

    pub async fn list_documents(
        &self,
        source_prefix: Option<&str>,
        sort_by: SortBy,
        sort_dir: SortDir,
        page: i64,
        page_size: i64,
    ) -> Result<(Vec<DocumentSummaryRow>, i64), IndexerError> {
        let prefix_pattern = source_prefix.map(|p| format!("{p}%"));

        let total: i64 = if let Some(ref pattern) = prefix_pattern {
            sqlx::query_scalar(
                "select count(distinct document_id) from document_chunks where source_uri like $1",
            )
            .bind(pattern)
            .fetch_one(&self.pool)
            .await
            .map_err(map_sqlx_error)?
        } else {
            sqlx::query_scalar("select count(distinct document_id) from document_chunks")
                .fetch_one(&self.pool)
                .await
                .map_err(map_sqlx_error)?
        };

        let order_column = match sort_by {
            SortBy::IndexedAt => "min(indexed_at)",
            SortBy::LastUpdated => "max(updated_at)",
            SortBy::SourceUri => "min(source_uri)",
            SortBy::ChunkCount => "count(*)",
            SortBy::DocumentId => "document_id",
        };
        let direction = match sort_dir {
            SortDir::Asc => "asc",
            SortDir::Desc => "desc",
        };
        let offset = page.saturating_sub(1).max(0) * page_size;

        let sql = format!(
            "select document_id, min(source_uri) as source_uri, count(*) as chunk_count,
                    min(indexed_at) as indexed_at, max(updated_at) as last_updated
             from document_chunks
             where ($1::text is null or source_uri like $1)
             group by document_id
             order by {order_column} {direction}
             limit $2 offset $3"
        );

        let rows: Vec<(String, String, i64, DateTime<Utc>, DateTime<Utc>)> = sqlx::query_as(&sql)
            .bind(prefix_pattern)
            .bind(page_size)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let summaries = rows
            .into_iter()
            .map(|(document_id, source_uri, chunk_count, indexed_at, last_updated)| {
                DocumentSummaryRow { document_id, source_uri, chunk_count, indexed_at, last_updated }
            })
            .collect();

        Ok((summaries, total))
    }

    pub async fn quarantine_chunks(
        &self,
        source_uri: &str,
        reason: &str,
    ) -> Result<u64, IndexerError> {
        let result = sqlx::query(
            "update document_chunks set quarantined_at = now(), quarantine_reason = $2
             where source_uri = $1 and quarantined_at is null",
        )
        .bind(source_uri)
        .bind(reason)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    pub async fn restore_chunks(&self, source_uri: &str) -> Result<u64, IndexerError> {
        let result = sqlx::query(
            "update document_chunks set quarantined_at = null, quarantine_reason = null
             where source_uri = $1 and quarantined_at is not null",
        )
        .bind(source_uri)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    pub async fn purge_expired_quarantine(
        &self,
        retention_days: i64,
    ) -> Result<u64, IndexerError> {
        let result = sqlx::query(
            "delete from document_chunks
             where quarantined_at is not null
               and quarantined_at < now() - make_interval(days => $1)",
        )
        .bind(retention_days as i32)
        .execute(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    /// Distinct source URIs currently indexed under `folder_path`, for
    /// `_quarantine_missing_sources`.
    pub async fn distinct_source_uris_under(
        &self,
        folder_path_prefix: &str,
    ) -> Result<Vec<(String, bool)>, IndexerError> {
        let pattern = format!("{folder_path_prefix}%");
        let rows: Vec<(String, bool)> = sqlx::query_as(
            "select distinct source_uri, bool_or(quarantined_at is not null)
             from document_chunks where source_uri like $1 group by source_uri",
        )
        .bind(pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows)
    }

    /// `bulk_set_canonical_keys`: sets the key for every
    /// chunk under `root_prefix` whose `canonical_source_key` is still null.
    pub async fn bulk_set_canonical_keys_under(
        &self,
        root_prefix: &str,
        key_for_source_uri: impl Fn(&str) -> String,
    ) -> Result<u64, IndexerError> {
        let pattern = format!("{root_prefix}%");
        let rows: Vec<(i64, String)> = sqlx::query_as(
            "select id, source_uri from document_chunks
             where source_uri like $1 and canonical_source_key is null",
        )
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        let mut updated = 0u64;
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;
        for (id, source_uri) in rows {
            let key = key_for_source_uri(&source_uri);
            sqlx::query("update document_chunks set canonical_source_key = $2 where id = $1")
                .bind(id)
                .bind(key)
                .execute(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
            updated += 1;
        }
        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(updated)
    }

    pub async fn find_by_canonical_key(&self, key: &str) -> Result<Vec<Chunk>, IndexerError> {
        let rows: Vec<ChunkRow> = sqlx::query_as(
            "select id, document_id, chunk_index, text, source_uri, embedding, metadata,
                    indexed_at, updated_at, canonical_source_key, owner_id, visibility,
                    quarantined_at, quarantine_reason
             from document_chunks where canonical_source_key = $1 order by chunk_index",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(map_sqlx_error)?;
        Ok(rows.into_iter().map(ChunkRow::into_chunk).collect())
    }
}
