// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

mod startup;

pub use startup::startup;

use indexer_core::{BuiltinRoleProvider, EncryptedPdfLog, FileRoleProvider, StackedRoleProvider};
use indexer_engine::{DefaultFileTypePolicy, HashingEmbeddingService, IndexerPipeline, PlainTextProcessor, ScanEngine};
use indexer_storage::repo::{
    ActivityLogRepository, ApiKeyRepository, ChunkRepository, ClientRepository,
    DbRoleProvider, DocumentLockRepository, IndexingRunRepository, RoleRepository,
    SamlSessionRepository, UserRepository, VirtualRootRepository, WatchedRootRepository,
};
use indexer_storage::Pool;
use std::sync::Arc;

use crate::config::Config;

/// Postgres advisory lock id the Server Scheduler uses to ensure only one
/// daemon instance runs scheduled scans at a time.
pub const SERVER_SCHEDULER_LOCK_ID: i64 = 0x2f1b_9a7c;

#[derive(thiserror::Error, Debug)]
pub enum LifecycleError {
    #[error("database connection failed: {0}")]
    Database(#[from] sqlx::Error),
}

/// Everything the HTTP surface, the Server Scheduler, and the Retention
/// Orchestrator all need — built once in [`startup`] and shared behind an
/// `Arc`, in explicit construction order.
pub struct DaemonState {
    pub config: Config,
    pub pool: Pool,

    pub chunks: ChunkRepository,
    pub locks: DocumentLockRepository,
    pub roots: WatchedRootRepository,
    pub runs: IndexingRunRepository,
    pub activity: ActivityLogRepository,
    pub api_keys: ApiKeyRepository,
    pub clients: ClientRepository,
    pub virtual_roots: VirtualRootRepository,
    pub saml_sessions: SamlSessionRepository,
    pub users: UserRepository,
    pub roles: RoleRepository,
    pub role_provider: StackedRoleProvider,
    pub encrypted_pdfs: EncryptedPdfLog,

    pub pipeline: Arc<IndexerPipeline>,
    pub scan_engine: Arc<ScanEngine>,
}

/// Build a fresh [`IndexerPipeline`] (for direct HTTP use) and a
/// [`ScanEngine`] wrapping its own pipeline instance, all sharing the same
/// underlying connection pool. Neither repository
/// type nor `IndexerPipeline` implements `Clone` — each consumer gets its
/// own thin wrapper over a cloned `Pool` instead, which is the cheap part.
pub fn build_engines(
    pool: Pool,
    locks: DocumentLockRepository,
    runs: IndexingRunRepository,
) -> (IndexerPipeline, ScanEngine) {
    let pipeline = IndexerPipeline::new(
        ChunkRepository::new(pool.clone()),
        Box::new(HashingEmbeddingService::new(indexer_core::chunk::EMBEDDING_DIM)),
        Box::new(PlainTextProcessor::new(Box::new(DefaultFileTypePolicy::new()))),
    );

    let pipeline_for_scan = IndexerPipeline::new(
        ChunkRepository::new(pool.clone()),
        Box::new(HashingEmbeddingService::new(indexer_core::chunk::EMBEDDING_DIM)),
        Box::new(PlainTextProcessor::new(Box::new(DefaultFileTypePolicy::new()))),
    );
    let scan_engine = ScanEngine::new(
        pipeline_for_scan,
        ChunkRepository::new(pool),
        locks,
        runs,
        Box::new(DefaultFileTypePolicy::new()),
    );

    (pipeline, scan_engine)
}

/// `RoleProvider` stacking the `roles` table, an optional JSON config file,
/// and the compiled-in defaults, tried in that order: a role defined in
/// the database shadows one
/// from the config file, which in turn shadows a built-in of the same
/// name, and the built-ins keep the system usable before any row or file
/// exists.
pub fn build_role_provider(
    pool: Pool,
    runtime: tokio::runtime::Handle,
    role_permissions_config_path: Option<&str>,
) -> StackedRoleProvider {
    let mut providers: Vec<Box<dyn indexer_core::RoleProvider>> =
        vec![Box::new(DbRoleProvider::new(pool, runtime))];
    if let Some(path) = role_permissions_config_path {
        providers.push(Box::new(FileRoleProvider::load(path)));
    }
    providers.push(Box::new(BuiltinRoleProvider::new()));
    StackedRoleProvider::new(providers)
}
