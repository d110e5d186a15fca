// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Indexing Run entity: an audit record for one scan or index operation.

use crate::ids::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunTrigger {
    Manual,
    Upload,
    Cli,
    Scheduled,
    Api,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Running,
    Success,
    Partial,
    Failed,
}

impl RunStatus {
    /// Terminal states are safe for retention deletion.
    pub fn is_terminal(self) -> bool {
        matches!(self, RunStatus::Success | RunStatus::Partial | RunStatus::Failed)
    }
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunStatus::Running => "running",
            RunStatus::Success => "success",
            RunStatus::Partial => "partial",
            RunStatus::Failed => "failed",
        };
        write!(f, "{s}")
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunError {
    pub source_uri: String,
    pub error: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexingRun {
    pub id: RunId,
    pub trigger: RunTrigger,
    pub source_uri: Option<String>,
    pub started_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub files_scanned: u32,
    pub files_added: u32,
    pub files_updated: u32,
    pub files_skipped: u32,
    pub files_failed: u32,
    pub errors: Vec<RunError>,
    pub metadata: HashMap<String, Value>,
    pub client_id: Option<String>,
}

impl IndexingRun {
    pub fn started(trigger: RunTrigger, source_uri: Option<String>, client_id: Option<String>, now: DateTime<Utc>) -> Self {
        IndexingRun {
            id: RunId::new(),
            trigger,
            source_uri,
            started_at: now,
            completed_at: None,
            status: RunStatus::Running,
            files_scanned: 0,
            files_added: 0,
            files_updated: 0,
            files_skipped: 0,
            files_failed: 0,
            errors: Vec::new(),
            metadata: HashMap::new(),
            client_id,
        }
    }

    /// Resolve the final status from per-file outcomes.
    pub fn resolve_status(files_failed: u32, files_scanned: u32) -> RunStatus {
        if files_failed == 0 {
            RunStatus::Success
        } else if files_failed < files_scanned {
            RunStatus::Partial
        } else {
            RunStatus::Failed
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_states_are_success_partial_failed() {
        assert!(RunStatus::Success.is_terminal());
        assert!(RunStatus::Partial.is_terminal());
        assert!(RunStatus::Failed.is_terminal());
        assert!(!RunStatus::Running.is_terminal());
    }

    #[test]
    fn resolve_status_all_succeeded() {
        assert_eq!(IndexingRun::resolve_status(0, 5), RunStatus::Success);
    }

    #[test]
    fn resolve_status_some_failed_is_partial() {
        assert_eq!(IndexingRun::resolve_status(2, 5), RunStatus::Partial);
    }

    #[test]
    fn resolve_status_all_failed_is_failed() {
        assert_eq!(IndexingRun::resolve_status(5, 5), RunStatus::Failed);
    }

    #[test]
    fn resolve_status_zero_scanned_zero_failed_is_success() {
        assert_eq!(IndexingRun::resolve_status(0, 0), RunStatus::Success);
    }
}
