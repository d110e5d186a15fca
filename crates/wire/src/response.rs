// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Response bodies for the HTTP surface.

use chrono::{DateTime, Utc};
use indexer_core::watched_root::ExecutionScope;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IndexStatus {
    Success,
    Skipped,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexResponse {
    pub status: IndexStatus,
    pub document_id: String,
    pub source_uri: String,
    pub chunks_indexed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub chunk_id: i64,
    pub document_id: String,
    pub source_uri: String,
    pub text: String,
    pub score: f32,
    pub metadata: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub document_id: String,
    pub source_uri: String,
    pub chunk_count: u32,
    pub indexed_at: DateTime<Utc>,
    pub last_updated: DateTime<Utc>,
    pub document_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentListResponse {
    pub documents: Vec<DocumentSummary>,
    pub total: u64,
    pub page: u32,
    pub page_size: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkDeletePreview {
    pub document_count: u64,
    pub sample_documents: Vec<String>,
    pub filters_applied: HashMap<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BulkDeleteResponse {
    Preview(BulkDeletePreview),
    Deleted { chunks_deleted: u64 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockHolder {
    pub client_id: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquireLockResponse {
    pub ok: bool,
    pub extended: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder: Option<LockHolder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedFolderResponse {
    pub id: String,
    pub folder_path: String,
    pub execution_scope: ExecutionScope,
    pub executor_id: Option<String>,
    pub root_id: String,
    pub schedule_cron: String,
    pub enabled: bool,
    pub paused: bool,
    pub max_concurrency: u32,
    pub consecutive_failures: u32,
    pub last_scanned_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DryRunScanResponse {
    pub dry_run: bool,
    pub status: String,
    pub total_files: u32,
    pub would_index: Vec<String>,
    pub would_quarantine: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanRunResponse {
    pub run_id: String,
    pub status: String,
    pub files_scanned: u32,
    pub files_added: u32,
    pub files_updated: u32,
    pub files_skipped: u32,
    pub files_failed: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulerStatusResponse {
    pub enabled: bool,
    pub running: bool,
    pub lease_held: bool,
    pub last_poll_at: Option<DateTime<Utc>>,
    pub active_scans: u32,
    pub poll_interval_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetentionRunResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub activity_deleted: u64,
    pub quarantine_purged: u64,
    pub indexing_runs_deleted: u64,
    pub saml_sessions_deleted: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPdfSightingResponse {
    pub source_uri: String,
    pub seen_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EncryptedPdfListResponse {
    pub sightings: Vec<EncryptedPdfSightingResponse>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingRunSummary {
    pub id: String,
    pub trigger: String,
    pub status: String,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub files_scanned: u32,
    pub files_failed: u32,
}
