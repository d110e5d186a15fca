// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Scan Engine: walks a watched root, drives the Indexer
//! Pipeline per file, then hands off to canonical-key backfill and
//! quarantine reconciliation.

use crate::pipeline::{IndexOptions, IndexOutcome, IndexerPipeline};
use crate::processor::FileTypePolicy;
use indexer_core::canonical_identity::{CanonicalKey, Scope};
use indexer_core::{IndexerError, RootId, RunError, RunStatus, RunTrigger};
use indexer_storage::repo::chunks::ChunkRepository;
use indexer_storage::repo::document_locks::{DocumentLockRepository, LockOutcome};
use indexer_storage::repo::indexing_runs::IndexingRunRepository;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Parameters a caller (Server Scheduler, CLI, or an HTTP handler) supplies
/// for one scan of a watched root.
pub struct ScanRequest {
    pub folder_path: String,
    pub trigger: RunTrigger,
    pub client_id: Option<String>,
    pub dry_run: bool,
    /// When set, drives the dual-key lock identity and the canonical-key
    /// backfill at the end of the scan.
    pub root_id: Option<RootId>,
    pub scope: Scope,
    /// `executor_id` for client scope, `root_id` as text for server scope.
    pub identity: String,
    pub lock_client_id: String,
}

#[derive(Debug, Clone)]
pub struct DryRunOutcome {
    pub total_files: u32,
    pub would_index: Vec<String>,
    pub would_quarantine: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ScanCounters {
    pub files_scanned: u32,
    pub files_added: u32,
    pub files_updated: u32,
    pub files_skipped: u32,
    pub files_failed: u32,
}

pub struct ScanResult {
    pub run_id: Uuid,
    pub status: RunStatus,
    pub counters: ScanCounters,
    pub dry_run: Option<DryRunOutcome>,
}

pub struct ScanEngine {
    pipeline: IndexerPipeline,
    chunks: ChunkRepository,
    locks: DocumentLockRepository,
    runs: IndexingRunRepository,
    file_type_policy: Box<dyn FileTypePolicy>,
}

const LOCK_TTL_MINUTES: i64 = 10;
const LOCK_REASON: &str = "indexing";

impl ScanEngine {
    pub fn new(
        pipeline: IndexerPipeline,
        chunks: ChunkRepository,
        locks: DocumentLockRepository,
        runs: IndexingRunRepository,
        file_type_policy: Box<dyn FileTypePolicy>,
    ) -> Self {
        Self { pipeline, chunks, locks, runs, file_type_policy }
    }

    /// Recursively enumerate every regular file under `folder_path` whose
    /// extension the file-type policy does not outright skip.
    /// Skipped-by-policy files are simply absent from the walk;
    /// the pipeline itself counts `Skip`/`Ocr`-without-`ocr_mode` outcomes.
    fn walk(&self, folder_path: &Path) -> Result<Vec<PathBuf>, IndexerError> {
        let mut out = Vec::new();
        let mut stack = vec![folder_path.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let entries = std::fs::read_dir(&dir).map_err(|e| {
                IndexerError::PathValidationFailed(format!("cannot read {}: {e}", dir.display()))
            })?;
            for entry in entries {
                let entry = entry.map_err(|e| {
                    IndexerError::PathValidationFailed(format!(
                        "cannot read entry under {}: {e}",
                        dir.display()
                    ))
                })?;
                let path = entry.path();
                let file_type = entry.file_type().map_err(|e| {
                    IndexerError::PathValidationFailed(format!(
                        "cannot stat {}: {e}",
                        path.display()
                    ))
                })?;
                if file_type.is_dir() {
                    stack.push(path);
                    continue;
                }
                if !file_type.is_file() {
                    continue;
                }
                let extension =
                    path.extension().and_then(|e| e.to_str()).unwrap_or("").to_ascii_lowercase();
                if !matches!(
                    self.file_type_policy.action_for(&extension),
                    crate::processor::FileTypeAction::Skip
                ) {
                    out.push(path);
                }
            }
        }
        Ok(out)
    }

    /// Run a full scan of `request.folder_path`.
    pub async fn scan(&self, request: ScanRequest) -> Result<ScanResult, IndexerError> {
        let run_id = self
            .runs
            .start_run(request.trigger, Some(&request.folder_path), request.client_id.as_deref())
            .await?;

        let folder_path = Path::new(&request.folder_path);
        if !folder_path.exists() {
            let error = RunError {
                source_uri: request.folder_path.clone(),
                error: "folder does not exist".to_string(),
            };
            self.runs
                .complete_run(run_id, RunStatus::Failed, 0, 0, 0, 0, 0, std::slice::from_ref(&error))
                .await?;
            return Ok(ScanResult {
                run_id,
                status: RunStatus::Failed,
                counters: ScanCounters::default(),
                dry_run: None,
            });
        }

        let files = self.walk(folder_path)?;

        if request.dry_run {
            let would_quarantine = self.compute_would_quarantine(&request.folder_path).await?;
            let would_index: Vec<String> =
                files.iter().map(|p| p.to_string_lossy().to_string()).collect();
            let total_files = would_index.len() as u32;
            self.runs
                .complete_run(run_id, RunStatus::Success, total_files, 0, 0, total_files, 0, &[])
                .await?;
            return Ok(ScanResult {
                run_id,
                status: RunStatus::Success,
                counters: ScanCounters { files_scanned: total_files, ..Default::default() },
                dry_run: Some(DryRunOutcome { total_files, would_index, would_quarantine }),
            });
        }

        let mut counters = ScanCounters::default();
        let mut errors = Vec::new();

        for path in &files {
            counters.files_scanned += 1;
            match self.index_one_file(&request, path).await {
                Ok(IndexOutcome::Success { chunks_indexed, .. }) => {
                    if chunks_indexed > 0 {
                        counters.files_added += 1;
                    } else {
                        counters.files_skipped += 1;
                    }
                }
                Ok(IndexOutcome::Skipped { .. }) => counters.files_updated += 1,
                Err(IndexerError::UnsupportedFormat(_)) => counters.files_skipped += 1,
                Err(err) => {
                    counters.files_failed += 1;
                    errors.push(RunError {
                        source_uri: path.to_string_lossy().to_string(),
                        error: err.to_string(),
                    });
                }
            }
        }

        self.quarantine_missing_sources(&request.folder_path).await?;

        if let Some(root_id) = request.root_id {
            self.bulk_set_canonical_keys(root_id, &request.folder_path, request.scope, &request.identity)
                .await?;
        }

        let status = if counters.files_failed == 0 {
            RunStatus::Success
        } else if counters.files_failed < counters.files_scanned {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        };

        self.runs
            .complete_run(
                run_id,
                status,
                counters.files_scanned,
                counters.files_added,
                counters.files_updated,
                counters.files_skipped,
                counters.files_failed,
                &errors,
            )
            .await?;

        Ok(ScanResult { run_id, status, counters, dry_run: None })
    }

    /// Acquire the per-file Document Lock, index, then always release —
    /// even on a pipeline failure, so a one-off processing error doesn't
    /// strand the lock for the rest of the scan's TTL.
    async fn index_one_file(
        &self,
        request: &ScanRequest,
        path: &Path,
    ) -> Result<IndexOutcome, IndexerError> {
        let source_uri = path.to_string_lossy().to_string();
        let root_id_uuid = request.root_id.map(|r| r.as_uuid());
        let relative_path = request
            .root_id
            .map(|_| indexer_core::path_utils::extract_relative_path(&request.folder_path, &source_uri));

        let outcome = self
            .locks
            .acquire_lock(
                &source_uri,
                &request.lock_client_id,
                LOCK_TTL_MINUTES,
                LOCK_REASON,
                root_id_uuid,
                relative_path.as_deref(),
            )
            .await?;

        let _lock = match outcome {
            LockOutcome::Acquired { lock, .. } => lock,
            LockOutcome::Held { holder } => {
                return Err(IndexerError::LockHeld { holder_client_id: holder.client_id });
            }
        };

        let result = self.pipeline.index_document(path, IndexOptions::default()).await;

        let _ = self
            .locks
            .release_lock(&source_uri, &request.lock_client_id, root_id_uuid, relative_path.as_deref())
            .await;

        result
    }

    async fn compute_would_quarantine(&self, folder_path: &str) -> Result<Vec<String>, IndexerError> {
        let rows = self.chunks.distinct_source_uris_under(folder_path).await?;
        Ok(rows
            .into_iter()
            .filter(|(uri, already_quarantined)| !already_quarantined && !Path::new(uri).exists())
            .map(|(uri, _)| uri)
            .collect())
    }

    /// `_quarantine_missing_sources(folder_path)`: for every
    /// distinct indexed source under the folder, quarantine what has
    /// vanished from disk and restore what has reappeared.
    async fn quarantine_missing_sources(&self, folder_path: &str) -> Result<(), IndexerError> {
        let rows = self.chunks.distinct_source_uris_under(folder_path).await?;
        for (source_uri, already_quarantined) in rows {
            let exists = Path::new(&source_uri).exists();
            if !exists && !already_quarantined {
                self.chunks.quarantine_chunks(&source_uri, "source_file_missing").await?;
            } else if exists && already_quarantined {
                self.chunks.restore_chunks(&source_uri).await?;
            }
        }
        Ok(())
    }

    /// `bulk_set_canonical_keys(root_id, folder_path, scope, identity)`
    ///: computed and applied after the scan's per-file work,
    /// so every chunk just inserted already has a `source_uri` to key off.
    async fn bulk_set_canonical_keys(
        &self,
        _root_id: RootId,
        folder_path: &str,
        scope: Scope,
        identity: &str,
    ) -> Result<u64, IndexerError> {
        let folder_path = folder_path.to_string();
        let identity = identity.to_string();
        self.chunks
            .bulk_set_canonical_keys_under(&folder_path, |source_uri| {
                let relative_path =
                    indexer_core::path_utils::extract_relative_path(&folder_path, source_uri);
                CanonicalKey::build(scope, &identity, &relative_path)
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_counters_default_to_zero() {
        let counters = ScanCounters::default();
        assert_eq!(counters.files_scanned, 0);
        assert_eq!(counters.files_failed, 0);
    }
}
