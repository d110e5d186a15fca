// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Canonical identity: builds and parses the scope-qualified
//! stable identifier `<scope>:<identity>:<relative_path>` that lets a chunk
//! be recognized as "the same logical document" regardless of which
//! absolute path a particular scan walked it under.

use crate::path_utils::normalize_folder_path;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which world owns a watched root: the desktop client, or the server itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Client,
    Server,
}

impl Scope {
    pub fn as_str(self) -> &'static str {
        match self {
            Scope::Client => "client",
            Scope::Server => "server",
        }
    }

    fn parse(s: &str) -> Option<Self> {
        match s {
            "client" => Some(Scope::Client),
            "server" => Some(Scope::Server),
            _ => None,
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A resolved canonical key: `scope`, `identity` (executor id or root id as
/// text), and the normalized `relative_path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalKey {
    pub scope: Scope,
    pub identity: String,
    pub relative_path: String,
}

impl CanonicalKey {
    /// Build the canonical key string for a chunk.
    pub fn build(scope: Scope, identity: &str, relative_path: &str) -> String {
        let rel = normalize_relative_path(relative_path);
        format!("{scope}:{identity}:{rel}")
    }

    /// Parse a canonical key string. Returns `None` if malformed: not
    /// exactly two `:` separators, or an unknown scope.
    pub fn resolve(key: &str) -> Option<CanonicalKey> {
        if key.matches(':').count() != 2 {
            return None;
        }
        let mut parts = key.splitn(3, ':');
        let scope_str = parts.next()?;
        let identity = parts.next()?;
        let relative_path = parts.next()?;
        let scope = Scope::parse(scope_str)?;
        Some(CanonicalKey {
            scope,
            identity: identity.to_string(),
            relative_path: normalize_relative_path(relative_path),
        })
    }
}

/// Relative-path normalization used by canonical keys: leading `/`, forward
/// slashes, no doubled `/`, no trailing `/` except the bare root.
fn normalize_relative_path(rel: &str) -> String {
    let normalized = normalize_folder_path(rel);
    if normalized.starts_with('/') {
        normalized
    } else {
        format!("/{normalized}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_basic_client_key() {
        assert_eq!(
            CanonicalKey::build(Scope::Client, "abc", "/docs/readme.md"),
            "client:abc:/docs/readme.md"
        );
    }

    #[test]
    fn build_normalizes_relative_path() {
        assert_eq!(CanonicalKey::build(Scope::Server, "R", "//a//b/"), "server:R:/a/b");
    }

    #[test]
    fn resolve_well_formed_key() {
        let resolved = CanonicalKey::resolve("client:abc:/x").unwrap();
        assert_eq!(resolved.scope, Scope::Client);
        assert_eq!(resolved.identity, "abc");
        assert_eq!(resolved.relative_path, "/x");
    }

    #[test]
    fn resolve_rejects_garbage() {
        assert!(CanonicalKey::resolve("garbage").is_none());
    }

    #[test]
    fn resolve_rejects_unknown_scope() {
        assert!(CanonicalKey::resolve("weird:abc:/x").is_none());
    }

    #[test]
    fn resolve_rejects_extra_separators() {
        assert!(CanonicalKey::resolve("client:abc:extra:/x").is_none());
        assert!(CanonicalKey::resolve("client:abc").is_none());
    }

    #[cfg(feature = "test-support")]
    mod props {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn round_trips_for_well_formed_triples(
                identity in "[a-zA-Z0-9_-]{1,20}",
                rel in "[a-zA-Z0-9/_.-]{1,40}",
                client_scope in any::<bool>(),
            ) {
                let scope = if client_scope { Scope::Client } else { Scope::Server };
                let key = CanonicalKey::build(scope, &identity, &rel);
                let resolved = CanonicalKey::resolve(&key).expect("well-formed key must resolve");
                prop_assert_eq!(resolved.scope, scope);
                prop_assert_eq!(resolved.identity, identity);
            }
        }
    }
}
