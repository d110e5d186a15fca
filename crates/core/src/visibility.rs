// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Chunk visibility and the ownership access rule.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A chunk's visibility. Absence of `visibility` on a row is treated as
/// `Shared`, per the ownership rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    Shared,
    Private,
}

impl Visibility {
    pub fn as_str(self) -> &'static str {
        match self {
            Visibility::Shared => "shared",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Default for Visibility {
    fn default() -> Self {
        Visibility::Shared
    }
}

/// The caller making a request, for visibility filtering purposes.
#[derive(Debug, Clone, Default)]
pub enum Requester {
    /// No authenticated user: only shared chunks are visible.
    #[default]
    Unauthenticated,
    /// An authenticated non-admin user: shared chunks plus their own private ones.
    User { user_id: String },
    /// An admin: sees everything.
    Admin,
}

/// Can `requester` see a chunk owned by `owner_id` with the given `visibility`?
///
/// `owner_id`/`visibility` absent (`None`) on the row is treated as shared.
pub fn can_view(requester: &Requester, owner_id: Option<&str>, visibility: Option<Visibility>) -> bool {
    let effective_visibility = visibility.unwrap_or_default();
    match requester {
        Requester::Admin => true,
        Requester::Unauthenticated => matches!(effective_visibility, Visibility::Shared),
        Requester::User { user_id } => match effective_visibility {
            Visibility::Shared => true,
            Visibility::Private => owner_id == Some(user_id.as_str()),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_visibility_is_shared() {
        assert!(can_view(&Requester::Unauthenticated, None, None));
    }

    #[test]
    fn unauthenticated_cannot_see_private() {
        assert!(!can_view(&Requester::Unauthenticated, Some("u1"), Some(Visibility::Private)));
    }

    #[test]
    fn owner_can_see_their_own_private_chunk() {
        let requester = Requester::User { user_id: "u1".to_string() };
        assert!(can_view(&requester, Some("u1"), Some(Visibility::Private)));
    }

    #[test]
    fn non_owner_cannot_see_others_private_chunk() {
        let requester = Requester::User { user_id: "u2".to_string() };
        assert!(!can_view(&requester, Some("u1"), Some(Visibility::Private)));
    }

    #[test]
    fn admin_sees_everything() {
        assert!(can_view(&Requester::Admin, Some("u1"), Some(Visibility::Private)));
    }
}
