// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Chunk entity: the atomic unit of the index.

use crate::ids::DocumentId;
use crate::visibility::Visibility;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata keys reserved by the system; caller-supplied custom metadata may
/// not override them.
pub const RESERVED_METADATA_KEYS: &[&str] = &["type", "file_type", "custom_source_uri"];

pub type ChunkMetadata = HashMap<String, Value>;

/// Embedding vector dimension used by the default embedding service.
pub const EMBEDDING_DIM: usize = 384;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chunk {
    /// Surrogate integer id. `None` until persisted.
    pub id: Option<i64>,
    pub document_id: DocumentId,
    /// 0-based, dense, unique per document.
    pub chunk_index: i32,
    pub text: String,
    /// Absolute source URI, raw (preserves OS separators).
    pub source_uri: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
    pub indexed_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub canonical_source_key: Option<String>,
    pub owner_id: Option<String>,
    pub visibility: Option<Visibility>,
    pub quarantined_at: Option<DateTime<Utc>>,
    pub quarantine_reason: Option<String>,
}

impl Chunk {
    pub fn is_quarantined(&self) -> bool {
        self.quarantined_at.is_some()
    }

    /// Merge caller-supplied custom metadata into the base metadata built by
    /// the pipeline. Caller fields win on collision, except the reserved
    /// id/uri fields.
    pub fn merge_custom_metadata(base: &mut ChunkMetadata, custom: Option<ChunkMetadata>) {
        let Some(custom) = custom else { return };
        for (key, value) in custom {
            if key == "document_id" || key == "source_uri" {
                continue;
            }
            base.insert(key, value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_custom_metadata_overrides_non_reserved_keys() {
        let mut base = ChunkMetadata::new();
        base.insert("file_type".to_string(), Value::String("txt".to_string()));
        base.insert("document_id".to_string(), Value::String("orig".to_string()));

        let mut custom = ChunkMetadata::new();
        custom.insert("file_type".to_string(), Value::String("markdown".to_string()));
        custom.insert("document_id".to_string(), Value::String("hijacked".to_string()));
        custom.insert("team".to_string(), Value::String("platform".to_string()));

        Chunk::merge_custom_metadata(&mut base, Some(custom));

        assert_eq!(base.get("file_type").unwrap(), "markdown");
        assert_eq!(base.get("document_id").unwrap(), "orig");
        assert_eq!(base.get("team").unwrap(), "platform");
    }

    #[test]
    fn is_quarantined_reflects_quarantined_at() {
        let now = Utc::now();
        let chunk = Chunk {
            id: Some(1),
            document_id: DocumentId::from_source_identity("/x"),
            chunk_index: 0,
            text: String::new(),
            source_uri: "/x".to_string(),
            embedding: vec![0.0; EMBEDDING_DIM],
            metadata: ChunkMetadata::new(),
            indexed_at: now,
            updated_at: now,
            canonical_source_key: None,
            owner_id: None,
            visibility: None,
            quarantined_at: None,
            quarantine_reason: None,
        };
        assert!(!chunk.is_quarantined());
    }
}
