// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Retention Orchestrator: an independent loop that
//! periodically purges expired activity log entries, quarantined chunks,
//! terminal indexing runs, and stale SAML sessions.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use indexer_wire::RetentionRunResponse;
use tokio::sync::Notify;
use tracing::{error, info};

use crate::lifecycle::DaemonState;

pub struct RetentionHandle {
    enabled: AtomicBool,
    interval_seconds: u64,
    shutdown: Notify,
}

impl RetentionHandle {
    pub fn new(enabled: bool, interval_seconds: u64) -> Arc<Self> {
        Arc::new(Self { enabled: AtomicBool::new(enabled), interval_seconds, shutdown: Notify::new() })
    }

    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }
}

/// Runs until [`RetentionHandle::shutdown`] is called, applying default
/// retention windows from config at every tick.
pub async fn run(state: Arc<DaemonState>, handle: Arc<RetentionHandle>) {
    if !handle.enabled.load(Ordering::Relaxed) {
        info!("retention maintenance disabled, not starting loop");
        return;
    }

    loop {
        let result = apply_retention(&state, None, None, None, true).await;
        if !result.ok {
            error!(error = ?result.error, "retention run reported a failure");
        } else {
            info!(
                activity_deleted = result.activity_deleted,
                quarantine_purged = result.quarantine_purged,
                indexing_runs_deleted = result.indexing_runs_deleted,
                saml_sessions_deleted = result.saml_sessions_deleted,
                "retention run complete"
            );
        }

        tokio::select! {
            _ = tokio::time::sleep(std::time::Duration::from_secs(handle.interval_seconds)) => {}
            _ = handle.shutdown.notified() => break,
        }
    }
}

/// `apply_retention`: each category is independent — a
/// failure in one does not stop the others, and the response reports
/// `ok=false` with the first error seen while still returning whatever
/// counts did complete.
pub async fn apply_retention(
    state: &Arc<DaemonState>,
    activity_days: Option<u32>,
    quarantine_days: Option<u32>,
    indexing_runs_days: Option<u32>,
    cleanup_saml_sessions: bool,
) -> RetentionRunResponse {
    let mut ok = true;
    let mut first_error: Option<String> = None;

    let activity_days = activity_days.map(i64::from).unwrap_or(state.config.activity_retention_days);
    let activity_deleted = match state.activity.delete_older_than(activity_days).await {
        Ok(n) => n,
        Err(err) => {
            ok = false;
            first_error.get_or_insert(err.to_string());
            0
        }
    };

    let quarantine_days =
        quarantine_days.map(i64::from).unwrap_or(state.config.quarantine_retention_days);
    let quarantine_purged = match state.chunks.purge_expired_quarantine(quarantine_days).await {
        Ok(n) => n,
        Err(err) => {
            ok = false;
            first_error.get_or_insert(err.to_string());
            0
        }
    };

    let indexing_runs_days =
        indexing_runs_days.map(i64::from).unwrap_or(state.config.indexing_runs_retention_days);
    let indexing_runs_deleted = match state.runs.delete_terminal_older_than(indexing_runs_days).await {
        Ok(n) => n,
        Err(err) => {
            ok = false;
            first_error.get_or_insert(err.to_string());
            0
        }
    };

    let saml_sessions_deleted = if cleanup_saml_sessions {
        match state.saml_sessions.delete_expired_or_inactive().await {
            Ok(n) => n,
            Err(err) => {
                ok = false;
                first_error.get_or_insert(err.to_string());
                0
            }
        }
    } else {
        0
    };

    RetentionRunResponse {
        ok,
        error: first_error,
        activity_deleted,
        quarantine_purged,
        indexing_runs_deleted,
        saml_sessions_deleted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retention_handle_reports_disabled() {
        let handle = RetentionHandle::new(false, 3600);
        assert!(!handle.enabled.load(Ordering::Relaxed));
    }
}
