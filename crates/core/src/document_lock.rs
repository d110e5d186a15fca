// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Document Lock entity and its dual-key identity.

use crate::ids::{LockId, RootId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentLock {
    pub id: LockId,
    pub source_uri: String,
    pub client_id: String,
    pub locked_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub lock_reason: String,
    pub root_id: Option<RootId>,
    pub relative_path: Option<String>,
}

impl DocumentLock {
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }

    pub fn identity(&self) -> LockIdentity {
        LockIdentity::of(self.root_id, self.relative_path.as_deref(), &self.source_uri)
    }
}

/// The identity a lock is keyed on: `(root_id, relative_path)` when both are
/// provided, else `source_uri`. This dual-keying is what prevents the same
/// logical document under different absolute paths from being locked twice
/// concurrently.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum LockIdentity {
    Canonical { root_id: RootId, relative_path: String },
    SourceUri(String),
}

impl LockIdentity {
    pub fn of(root_id: Option<RootId>, relative_path: Option<&str>, source_uri: &str) -> Self {
        match (root_id, relative_path) {
            (Some(root_id), Some(rel)) => {
                LockIdentity::Canonical { root_id, relative_path: rel.to_string() }
            }
            _ => LockIdentity::SourceUri(source_uri.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_prefers_canonical_key_when_both_present() {
        let root_id = RootId::new();
        let identity = LockIdentity::of(Some(root_id), Some("/a/b.md"), "/abs/a/b.md");
        assert_eq!(
            identity,
            LockIdentity::Canonical { root_id, relative_path: "/a/b.md".to_string() }
        );
    }

    #[test]
    fn identity_falls_back_to_source_uri() {
        let identity = LockIdentity::of(None, None, "/abs/a/b.md");
        assert_eq!(identity, LockIdentity::SourceUri("/abs/a/b.md".to_string()));
    }

    #[test]
    fn different_absolute_paths_same_canonical_identity_collide() {
        let root_id = RootId::new();
        let a = LockIdentity::of(Some(root_id), Some("/a/b.md"), "/mnt/x/a/b.md");
        let b = LockIdentity::of(Some(root_id), Some("/a/b.md"), "/mnt/y/a/b.md");
        assert_eq!(a, b);
    }

    #[test]
    fn is_expired_true_when_now_at_or_past_expiry() {
        let now = Utc::now();
        let lock = DocumentLock {
            id: LockId::new(),
            source_uri: "/x".to_string(),
            client_id: "c1".to_string(),
            locked_at: now - chrono::Duration::minutes(20),
            expires_at: now - chrono::Duration::minutes(10),
            lock_reason: "indexing".to_string(),
            root_id: None,
            relative_path: None,
        };
        assert!(lock.is_expired(now));
    }
}
