// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Activity Log entity: an append-only audit stream.

use crate::ids::{ActivityId, RootId, RunId};
use crate::watched_root::ExecutionScope;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityLogEntry {
    pub id: ActivityId,
    pub ts: DateTime<Utc>,
    pub action: String,
    pub client_id: Option<String>,
    pub user_id: Option<String>,
    pub details: Value,
    pub executor_scope: Option<ExecutionScope>,
    pub executor_id: Option<String>,
    pub root_id: Option<RootId>,
    pub run_id: Option<RunId>,
}

impl ActivityLogEntry {
    pub fn new(action: impl Into<String>, details: Value, now: DateTime<Utc>) -> Self {
        ActivityLogEntry {
            id: ActivityId::new(),
            ts: now,
            action: action.into(),
            client_id: None,
            user_id: None,
            details,
            executor_scope: None,
            executor_id: None,
            root_id: None,
            run_id: None,
        }
    }

    pub fn with_executor(mut self, scope: ExecutionScope, executor_id: Option<String>) -> Self {
        self.executor_scope = Some(scope);
        self.executor_id = executor_id;
        self
    }

    pub fn with_root(mut self, root_id: RootId) -> Self {
        self.root_id = Some(root_id);
        self
    }

    pub fn with_run(mut self, run_id: RunId) -> Self {
        self.run_id = Some(run_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_methods_set_expected_fields() {
        let now = Utc::now();
        let root_id = RootId::new();
        let run_id = RunId::new();
        let entry = ActivityLogEntry::new("scan.completed", Value::Null, now)
            .with_executor(ExecutionScope::Server, None)
            .with_root(root_id)
            .with_run(run_id);

        assert_eq!(entry.action, "scan.completed");
        assert_eq!(entry.executor_scope, Some(ExecutionScope::Server));
        assert_eq!(entry.root_id, Some(root_id));
        assert_eq!(entry.run_id, Some(run_id));
    }
}
