// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Server Scheduler: a singleton loop that polls
//! server-scope watched roots and scans the ones that are due, holding a
//! Postgres advisory lock so only one replica of the daemon drives scans at
//! a time.

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use chrono::Utc;
use indexer_core::canonical_identity::Scope;
use indexer_core::{Clock, IndexerError, RunTrigger};
use indexer_engine::ScanRequest;
use indexer_storage::AdvisoryLock;
use indexer_wire::SchedulerStatusResponse;
use parking_lot::Mutex;
use tokio::sync::Notify;
use tracing::{error, info, warn};

use crate::lifecycle::{DaemonState, SERVER_SCHEDULER_LOCK_ID};

const LOCK_CLIENT_ID: &str = "server-scheduler";

/// Shared, lock-free bits the HTTP status/admin endpoints read and write
/// without going through the scheduler's own task.
pub struct SchedulerHandle {
    enabled: AtomicBool,
    running: AtomicBool,
    active_scans: AtomicU32,
    last_poll_at: Mutex<Option<chrono::DateTime<Utc>>>,
    lease_held: AtomicBool,
    poll_interval_seconds: u64,
    wake: Notify,
    shutdown: Notify,
}

impl SchedulerHandle {
    pub fn new(enabled: bool, poll_interval_seconds: u64) -> Arc<Self> {
        Arc::new(Self {
            enabled: AtomicBool::new(enabled),
            running: AtomicBool::new(false),
            active_scans: AtomicU32::new(0),
            last_poll_at: Mutex::new(None),
            lease_held: AtomicBool::new(false),
            poll_interval_seconds,
            wake: Notify::new(),
            shutdown: Notify::new(),
        })
    }

    pub fn status(&self) -> SchedulerStatusResponse {
        SchedulerStatusResponse {
            enabled: self.enabled.load(Ordering::Relaxed),
            running: self.running.load(Ordering::Relaxed),
            lease_held: self.lease_held.load(Ordering::Relaxed),
            last_poll_at: *self.last_poll_at.lock(),
            active_scans: self.active_scans.load(Ordering::Relaxed),
            poll_interval_seconds: self.poll_interval_seconds,
        }
    }

    /// Wake the loop immediately instead of waiting out the poll interval,
    /// used by the admin `scan_now` operation.
    pub fn wake(&self) {
        self.wake.notify_one();
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Runs until [`SchedulerHandle::shutdown`] is called. Intended to be
/// `tokio::spawn`ed once from `main`.
pub async fn run<C: Clock>(state: Arc<DaemonState>, handle: Arc<SchedulerHandle>, clock: C) {
    if !handle.enabled.load(Ordering::Relaxed) {
        info!("server scheduler disabled, not starting poll loop");
        return;
    }

    let mut lock = AdvisoryLock::new(state.pool.clone(), SERVER_SCHEDULER_LOCK_ID);
    let mut last_housekeeping = clock.now();
    let housekeeping_interval =
        chrono::Duration::seconds(crate::config::QUARANTINE_HOUSEKEEPING_INTERVAL_SECONDS as i64);

    handle.running.store(true, Ordering::Relaxed);
    loop {
        let acquired = match lock.try_acquire().await {
            Ok(acquired) => acquired,
            Err(err) => {
                error!(%err, "advisory lock acquisition failed");
                false
            }
        };
        handle.lease_held.store(acquired, Ordering::Relaxed);

        if acquired {
            if let Err(err) = poll_once(&state, &clock).await {
                error!(%err, "scheduler poll failed");
            }
            *handle.last_poll_at.lock() = Some(clock.now());

            if clock.now() - last_housekeeping >= housekeeping_interval {
                if let Err(err) = state.chunks.purge_expired_quarantine(state.config.quarantine_retention_days).await
                {
                    error!(%err, "quarantine housekeeping during scheduler loop failed");
                }
                last_housekeeping = clock.now();
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(handle.poll_interval_seconds)) => {}
            _ = handle.wake.notified() => {}
            _ = handle.shutdown.notified() => break,
        }
    }

    let _ = lock.release().await;
    handle.running.store(false, Ordering::Relaxed);
}

/// One pass over `due_server_scope_roots`: "due" is computed from
/// `cron_to_seconds(schedule_cron)` against `last_scanned_at`,
/// since the repository query only pre-filters on the failure backoff.
async fn poll_once<C: Clock>(state: &Arc<DaemonState>, clock: &C) -> Result<(), IndexerError> {
    let roots = state
        .roots
        .due_server_scope_roots(
            state.config.scheduler_failure_backoff_seconds,
            state.config.scheduler_max_consecutive_failures,
        )
        .await?;

    let now = clock.now();
    for root in roots {
        if root.paused {
            continue;
        }
        let interval_seconds = indexer_core::cron_to_seconds(&root.schedule_cron) as i64;
        let due = match root.last_scanned_at {
            None => true,
            Some(last) => (now - last).num_seconds() >= interval_seconds,
        };
        if !due {
            continue;
        }

        if let Err(err) = scan_one(state, &root).await {
            warn!(root_id = %root.root_id, %err, "scheduled scan failed");
        }
    }

    Ok(())
}

async fn scan_one(state: &Arc<DaemonState>, root: &indexer_core::WatchedRoot) -> Result<(), IndexerError> {
    state.roots.watermark_started(root.id.as_uuid()).await?;

    let request = ScanRequest {
        folder_path: root.folder_path.clone(),
        trigger: RunTrigger::Scheduled,
        client_id: None,
        dry_run: false,
        root_id: Some(root.root_id),
        scope: Scope::Server,
        identity: root.root_id.to_string(),
        lock_client_id: LOCK_CLIENT_ID.to_string(),
    };

    let result = state.scan_engine.scan(request).await;
    match &result {
        Ok(scan_result) => {
            state.roots.mark_scanned(root.id.as_uuid(), Some(scan_result.run_id)).await?;
            if scan_result.status.is_terminal() && !matches!(scan_result.status, indexer_core::RunStatus::Failed) {
                state.roots.watermark_completed_success(root.id.as_uuid()).await?;
            } else {
                state.roots.watermark_completed_error(root.id.as_uuid()).await?;
            }
        }
        Err(_) => {
            state.roots.watermark_completed_error(root.id.as_uuid()).await?;
        }
    }
    result.map(|_| ())
}

/// `scan_now(root_id)`: an admin-triggered scan outside the
/// poll cadence. Rejects a non-server-scope root since client-scope roots
/// are driven by the owning desktop client, never the daemon.
pub async fn scan_now(state: &Arc<DaemonState>, root_id: uuid::Uuid) -> Result<uuid::Uuid, IndexerError> {
    let root = state
        .roots
        .get_folder_by_root_id(root_id)
        .await?
        .ok_or(IndexerError::DocumentNotFound(root_id.to_string()))?;
    if root.execution_scope != indexer_core::ExecutionScope::Server {
        return Err(IndexerError::NotServerScope);
    }

    state.roots.watermark_started(root.id.as_uuid()).await?;
    let request = ScanRequest {
        folder_path: root.folder_path.clone(),
        trigger: RunTrigger::Api,
        client_id: None,
        dry_run: false,
        root_id: Some(root.root_id),
        scope: Scope::Server,
        identity: root.root_id.to_string(),
        lock_client_id: LOCK_CLIENT_ID.to_string(),
    };
    let result = state.scan_engine.scan(request).await?;
    state.roots.mark_scanned(root.id.as_uuid(), Some(result.run_id)).await?;
    if matches!(result.status, indexer_core::RunStatus::Failed) {
        state.roots.watermark_completed_error(root.id.as_uuid()).await?;
    } else {
        state.roots.watermark_completed_success(root.id.as_uuid()).await?;
    }
    Ok(result.run_id)
}

/// `pause(root_id)` / `resume(root_id)`: resume also resets
/// the failure streak so a root that had tripped the backoff gets an
/// immediate chance to run again at the next due poll.
pub async fn pause(state: &Arc<DaemonState>, root_id: uuid::Uuid) -> Result<(), IndexerError> {
    let root = state
        .roots
        .get_folder_by_root_id(root_id)
        .await?
        .ok_or(IndexerError::DocumentNotFound(root_id.to_string()))?;
    state.roots.set_paused(root.id.as_uuid(), true).await
}

pub async fn resume(state: &Arc<DaemonState>, root_id: uuid::Uuid) -> Result<(), IndexerError> {
    let root = state
        .roots
        .get_folder_by_root_id(root_id)
        .await?
        .ok_or(IndexerError::DocumentNotFound(root_id.to_string()))?;
    state.roots.set_paused(root.id.as_uuid(), false).await?;
    state.roots.reset_failures(root.id.as_uuid()).await
}
