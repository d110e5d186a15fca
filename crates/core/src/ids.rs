// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Identifier types used across the indexer workspace.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use uuid::Uuid;

/// Define a UUID-backed newtype ID wrapper.
///
/// Unlike the nanoid-prefixed IDs used for ephemeral job-runner entities,
/// every durable entity in this system (watched roots, locks, runs, activity
/// log rows, virtual roots) is keyed by a plain UUID, so the wrapper here is
/// a thin `Uuid` newtype rather than a fixed-width buffer.
macro_rules! define_uuid_id {
    ($(#[$meta:meta])* pub struct $name:ident;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            pub fn as_uuid(&self) -> Uuid {
                self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::str::FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Ok(Self(Uuid::parse_str(s)?))
            }
        }
    };
}

define_uuid_id! {
    /// A watched root's globally unique identifier.
    pub struct RootId;
}

define_uuid_id! {
    /// An indexing run's identifier.
    pub struct RunId;
}

define_uuid_id! {
    /// A document lock's identifier.
    pub struct LockId;
}

define_uuid_id! {
    /// An activity log entry's identifier.
    pub struct ActivityId;
}

/// Length in hex characters of a [`DocumentId`].
pub const DOCUMENT_ID_LEN: usize = 16;

/// Logical document identity: a 16-hex-char prefix of a SHA-256 digest.
///
/// This implementation commits to the URI-hash strategy: `document_id` is
/// derived from the source URI (or, for uploads, from the caller-supplied
/// display name), never from file content. This keeps `index_document`
/// idempotent under `force_reindex`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(String);

impl DocumentId {
    /// Derive a document id from a source identity string (URI or display name).
    pub fn from_source_identity(identity: &str) -> Self {
        let digest = Sha256::digest(identity.as_bytes());
        let hex = hex_encode(&digest);
        Self(hex[..DOCUMENT_ID_LEN].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Reconstruct a [`DocumentId`] from a value already stored in the
    /// database. Unlike [`DocumentId::from_source_identity`], this does not
    /// hash anything — it trusts the caller that `raw` is a previously
    /// computed id, so repositories can round-trip the `document_id` column
    /// without rehashing on every read.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{b:02x}").expect("writing to a String cannot fail");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_id_is_sixteen_hex_chars() {
        let id = DocumentId::from_source_identity("/test/ml.txt");
        assert_eq!(id.as_str().len(), DOCUMENT_ID_LEN);
        assert!(id.as_str().chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn document_id_is_deterministic_per_identity() {
        let a = DocumentId::from_source_identity("/data/f.md");
        let b = DocumentId::from_source_identity("/data/f.md");
        let c = DocumentId::from_source_identity("/data/g.md");
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn root_id_round_trips_through_string() {
        let id = RootId::new();
        let parsed: RootId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }
}
