// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request bodies for the HTTP surface.

use indexer_core::watched_root::ExecutionScope;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexRequest {
    pub source_uri: String,
    #[serde(default)]
    pub force_reindex: bool,
    #[serde(default)]
    pub metadata: Option<Map<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadAndIndexForm {
    #[serde(default)]
    pub force_reindex: bool,
    #[serde(default)]
    pub custom_source_uri: Option<String>,
    #[serde(default)]
    pub document_type: Option<String>,
    #[serde(default)]
    pub ocr_mode: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    #[serde(default)]
    pub min_score: f32,
    #[serde(default)]
    pub filters: HashMap<String, Value>,
    #[serde(default)]
    pub use_hybrid: bool,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
}

fn default_top_k() -> u32 {
    10
}

fn default_alpha() -> f32 {
    0.5
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentSortBy {
    IndexedAt,
    LastUpdated,
    SourceUri,
    DocumentType,
    ChunkCount,
    DocumentId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDir {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ListDocumentsQuery {
    #[serde(default)]
    pub sort_by: Option<DocumentSortBy>,
    #[serde(default)]
    pub sort_dir: Option<SortDir>,
    #[serde(default)]
    pub source_prefix: Option<String>,
    #[serde(default)]
    pub group_by: Option<String>,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub page_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeleteRequest {
    pub filters: HashMap<String, Value>,
    #[serde(default)]
    pub preview: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportRequest {
    pub filters: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestoreRequest {
    pub backup_data: Vec<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireLockRequest {
    pub source_uri: String,
    pub client_id: String,
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: u32,
    #[serde(default = "default_lock_reason")]
    pub lock_reason: String,
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub relative_path: Option<String>,
}

fn default_ttl_minutes() -> u32 {
    10
}

fn default_lock_reason() -> String {
    "indexing".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseLockRequest {
    pub source_uri: String,
    pub client_id: String,
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckLockRequest {
    pub source_uri: String,
    #[serde(default)]
    pub root_id: Option<String>,
    #[serde(default)]
    pub relative_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddFolderRequest {
    pub folder_path: String,
    pub schedule_cron: String,
    pub execution_scope: ExecutionScope,
    #[serde(default)]
    pub executor_id: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default)]
    pub paused: bool,
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: u32,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

fn default_true() -> bool {
    true
}

fn default_max_concurrency() -> u32 {
    1
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateFolderRequest {
    #[serde(default)]
    pub schedule_cron: Option<String>,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default)]
    pub paused: Option<bool>,
    #[serde(default)]
    pub max_concurrency: Option<u32>,
    #[serde(default)]
    pub metadata: Option<HashMap<String, Value>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransitionScopeRequest {
    pub target_scope: ExecutionScope,
    #[serde(default)]
    pub executor_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScanRequest {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub dry_run: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RetentionRunRequest {
    #[serde(default)]
    pub activity_days: Option<u32>,
    #[serde(default)]
    pub quarantine_days: Option<u32>,
    #[serde(default)]
    pub indexing_runs_days: Option<u32>,
    #[serde(default = "default_true")]
    pub cleanup_saml_sessions: bool,
}
