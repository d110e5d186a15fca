// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `indexerd`: the daemon binary. Loads config, opens the shared database
//! pool, builds the engines, then serves HTTP while the Server Scheduler and
//! Retention Orchestrator run as independent background loops.

mod config;
mod http;
mod license;
mod lifecycle;
mod retention;
mod scheduler;

use std::net::SocketAddr;
use std::sync::Arc;

use indexer_core::SystemClock;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .compact()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = config::Config::load();
    let http_addr = config.http_addr.clone();
    let scheduler_enabled = config.server_scheduler_enabled;
    let scheduler_poll_interval = config.scheduler_poll_interval_seconds;
    let retention_enabled = config.retention_maintenance_enabled;
    let retention_interval = config.retention_maintenance_interval_seconds;

    let daemon = lifecycle::startup(config).await?;

    let scheduler_handle = scheduler::SchedulerHandle::new(scheduler_enabled, scheduler_poll_interval);
    let retention_handle = retention::RetentionHandle::new(retention_enabled, retention_interval);

    let scheduler_task = tokio::spawn(scheduler::run(
        Arc::clone(&daemon),
        Arc::clone(&scheduler_handle),
        SystemClock,
    ));
    let retention_task = tokio::spawn(retention::run(Arc::clone(&daemon), Arc::clone(&retention_handle)));

    let app_state = http::state::AppState {
        daemon: Arc::clone(&daemon),
        scheduler: Arc::clone(&scheduler_handle),
        retention: Arc::clone(&retention_handle),
    };
    let app = http::build_router(app_state);

    let listener = tokio::net::TcpListener::bind(&http_addr).await?;
    tracing::info!(addr = %http_addr, "indexerd listening");

    axum::serve(listener, app.into_make_service_with_connect_info::<SocketAddr>())
        .with_graceful_shutdown(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received, draining background loops");
            scheduler_handle.shutdown();
            retention_handle.shutdown();
        })
        .await?;

    scheduler_task.abort();
    retention_task.abort();
    Ok(())
}
