// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use indexer_storage::repo::{
    ActivityLogRepository, ApiKeyRepository, ChunkRepository, ClientRepository,
    DocumentLockRepository, IndexingRunRepository, RoleRepository, SamlSessionRepository,
    UserRepository, VirtualRootRepository, WatchedRootRepository,
};
use indexer_storage::PoolConfig;
use tracing::info;

use indexer_core::EncryptedPdfLog;

use super::{build_engines, build_role_provider, DaemonState, LifecycleError};
use crate::config::Config;

/// Construct every long-lived dependency the daemon needs, in order:
/// load config, open the DB pool, build
/// the embedding service, build the repositories, then the scan/retention/
/// scheduler loops, each wired from the pieces built before it.
pub async fn startup(config: Config) -> Result<Arc<DaemonState>, LifecycleError> {
    info!(database_url = %redact(&config.database_url), "starting indexerd");

    // 1. Open the database pool (also runs embedded migrations).
    let pool_config = PoolConfig {
        database_url: config.database_url.clone(),
        max_connections: config.db_max_connections,
        connect_timeout_secs: config.db_connect_timeout_secs,
        statement_timeout_ms: config.db_statement_timeout_ms,
    };
    let pool = indexer_storage::connect(&pool_config).await?;
    info!("database pool ready");

    // 2. Build the repositories. Each is a thin wrapper over a cloned pool
    // handle, so there's no shared-state concern in constructing many.
    let chunks = ChunkRepository::new(pool.clone());
    let locks = DocumentLockRepository::new(pool.clone());
    let roots = WatchedRootRepository::new(pool.clone());
    let runs = IndexingRunRepository::new(pool.clone());
    let activity = ActivityLogRepository::new(pool.clone());
    let api_keys = ApiKeyRepository::new(pool.clone(), config.api_key_prefix.clone());
    let clients = ClientRepository::new(pool.clone());
    let virtual_roots = VirtualRootRepository::new(pool.clone());
    let saml_sessions = SamlSessionRepository::new(pool.clone());
    let users = UserRepository::new(pool.clone());
    let roles = RoleRepository::new(pool.clone());
    let role_provider = build_role_provider(
        pool.clone(),
        tokio::runtime::Handle::current(),
        config.role_permissions_config_path.as_deref(),
    );

    // 3. Build the embedding service + Indexer Pipeline + Scan Engine.
    let (pipeline, scan_engine) = build_engines(
        pool.clone(),
        DocumentLockRepository::new(pool.clone()),
        IndexingRunRepository::new(pool.clone()),
    );

    Ok(Arc::new(DaemonState {
        config,
        pool,
        chunks,
        locks,
        roots,
        runs,
        activity,
        api_keys,
        clients,
        virtual_roots,
        saml_sessions,
        users,
        roles,
        role_provider,
        encrypted_pdfs: EncryptedPdfLog::default(),
        pipeline: Arc::new(pipeline),
        scan_engine: Arc::new(scan_engine),
    }))
}

fn redact(database_url: &str) -> String {
    match database_url.find('@') {
        Some(at) => format!("***{}", &database_url[at..]),
        None => "***".to_string(),
    }
}
