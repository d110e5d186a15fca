// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Watched Root entity: configuration of a directory kept indexed on a
//! schedule, plus the scheduling watermarks the Server Scheduler and Scan
//! Engine update.

use crate::error::IndexerError;
use crate::ids::RootId;
use crate::path_utils::normalize_folder_path;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExecutionScope {
    Client,
    Server,
}

impl fmt::Display for ExecutionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ExecutionScope::Client => "client",
            ExecutionScope::Server => "server",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchedRoot {
    pub id: RootId,
    pub folder_path: String,
    pub normalized_folder_path: String,
    pub execution_scope: ExecutionScope,
    pub executor_id: Option<String>,
    /// Globally unique root id, independent of the surrogate `id` column
    /// so legacy clients that cached it survive a row's primary key churn.
    pub root_id: RootId,
    pub schedule_cron: String,
    pub enabled: bool,
    pub paused: bool,
    pub max_concurrency: u32,
    pub consecutive_failures: u32,
    pub last_scan_started_at: Option<DateTime<Utc>>,
    pub last_scan_completed_at: Option<DateTime<Utc>>,
    pub last_successful_scan_at: Option<DateTime<Utc>>,
    pub last_error_at: Option<DateTime<Utc>>,
    pub last_scanned_at: Option<DateTime<Utc>>,
    pub last_run_id: Option<String>,
    pub metadata: HashMap<String, Value>,
}

/// Parameters for [`WatchedRoot::new`] / `add_folder`.
pub struct NewWatchedRoot {
    pub folder_path: String,
    pub schedule_cron: String,
    pub execution_scope: ExecutionScope,
    pub executor_id: Option<String>,
    pub enabled: bool,
    pub paused: bool,
    pub max_concurrency: u32,
    pub metadata: HashMap<String, Value>,
}

impl WatchedRoot {
    /// Build a new watched root, validating the scope/executor check
    /// constraint and normalizing `folder_path`.
    ///
    /// For server scope the executor is always forced to `None`, matching
    /// `add_folder`'s documented behavior.
    pub fn new(params: NewWatchedRoot) -> Result<Self, IndexerError> {
        let executor_id = match params.execution_scope {
            ExecutionScope::Client => {
                let executor_id = params.executor_id.filter(|s| !s.is_empty()).ok_or_else(|| {
                    IndexerError::InvalidScope(
                        "client-scope roots require a non-empty executor_id".to_string(),
                    )
                })?;
                Some(executor_id)
            }
            ExecutionScope::Server => None,
        };

        let normalized_folder_path = normalize_folder_path(&params.folder_path);
        let max_concurrency = params.max_concurrency.max(1);

        Ok(WatchedRoot {
            id: RootId::new(),
            folder_path: params.folder_path,
            normalized_folder_path,
            execution_scope: params.execution_scope,
            executor_id,
            root_id: RootId::new(),
            schedule_cron: params.schedule_cron,
            enabled: params.enabled,
            paused: params.paused,
            max_concurrency,
            consecutive_failures: 0,
            last_scan_started_at: None,
            last_scan_completed_at: None,
            last_successful_scan_at: None,
            last_error_at: None,
            last_scanned_at: None,
            last_run_id: None,
            metadata: params.metadata,
        })
    }

    /// Checks the invariant `(scope=client) ⇔ (executor_id IS NOT NULL)`.
    pub fn satisfies_scope_invariant(&self) -> bool {
        match self.execution_scope {
            ExecutionScope::Client => self.executor_id.is_some(),
            ExecutionScope::Server => self.executor_id.is_none(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params(scope: ExecutionScope, executor_id: Option<&str>) -> NewWatchedRoot {
        NewWatchedRoot {
            folder_path: "/data/docs".to_string(),
            schedule_cron: "0 */6 * * *".to_string(),
            execution_scope: scope,
            executor_id: executor_id.map(str::to_string),
            enabled: true,
            paused: false,
            max_concurrency: 1,
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn client_scope_requires_executor_id() {
        let err = WatchedRoot::new(params(ExecutionScope::Client, None)).unwrap_err();
        assert!(matches!(err, IndexerError::InvalidScope(_)));
    }

    #[test]
    fn server_scope_forces_executor_id_to_none() {
        let root = WatchedRoot::new(params(ExecutionScope::Server, Some("desktop-1"))).unwrap();
        assert!(root.executor_id.is_none());
        assert!(root.satisfies_scope_invariant());
    }

    #[test]
    fn client_scope_keeps_executor_id_and_satisfies_invariant() {
        let root = WatchedRoot::new(params(ExecutionScope::Client, Some("desktop-1"))).unwrap();
        assert_eq!(root.executor_id.as_deref(), Some("desktop-1"));
        assert!(root.satisfies_scope_invariant());
    }

    #[test]
    fn max_concurrency_floors_at_one() {
        let mut p = params(ExecutionScope::Server, None);
        p.max_concurrency = 0;
        let root = WatchedRoot::new(p).unwrap();
        assert_eq!(root.max_concurrency, 1);
    }
}
