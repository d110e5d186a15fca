// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Dynamic role/permission model.
//!
//! Roles are configurable rather than a fixed enum. A [`RoleProvider`] is an
//! interface returning `(name, permissions)`; the daemon stacks three
//! implementations and tries them in order: database-backed, file-backed,
//! then built-ins. Any permission check is
//! `provider.has(role, permission) || provider.has(role, "system.admin")`.

use std::collections::HashMap;
use std::path::PathBuf;

pub type Permission = String;

#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub permissions: Vec<Permission>,
    pub is_system: bool,
}

impl Role {
    pub const ADMIN_PERMISSION: &'static str = "system.admin";

    pub fn has_permission(&self, permission: &str) -> bool {
        self.permissions.iter().any(|p| p == permission) || self.is_admin()
    }

    pub fn is_admin(&self) -> bool {
        self.permissions.iter().any(|p| p == Self::ADMIN_PERMISSION)
    }
}

/// Looks up a role's permission set. Implementors may back this with a
/// database table, a config file, or compiled-in defaults.
pub trait RoleProvider: Send + Sync {
    fn get_role(&self, name: &str) -> Option<Role>;

    /// `provider.has(role, permission) || provider.has(role, "system.admin")`.
    fn has(&self, role_name: &str, permission: &str) -> bool {
        match self.get_role(role_name) {
            Some(role) => role.has_permission(permission),
            None => false,
        }
    }
}

/// Tries each provider in order, returning the first role definition found.
pub struct StackedRoleProvider {
    providers: Vec<Box<dyn RoleProvider>>,
}

impl StackedRoleProvider {
    pub fn new(providers: Vec<Box<dyn RoleProvider>>) -> Self {
        Self { providers }
    }
}

impl RoleProvider for StackedRoleProvider {
    fn get_role(&self, name: &str) -> Option<Role> {
        self.providers.iter().find_map(|p| p.get_role(name))
    }
}

/// Compiled-in default roles: `admin` (all permissions) and `viewer`
/// (read-only search/list access). Always present as the bottom of the
/// provider stack so the system is usable before any role config exists.
pub struct BuiltinRoleProvider {
    roles: HashMap<String, Role>,
}

impl BuiltinRoleProvider {
    pub fn new() -> Self {
        let mut roles = HashMap::new();
        roles.insert(
            "admin".to_string(),
            Role {
                name: "admin".to_string(),
                description: "Full access".to_string(),
                permissions: vec![Role::ADMIN_PERMISSION.to_string()],
                is_system: true,
            },
        );
        roles.insert(
            "viewer".to_string(),
            Role {
                name: "viewer".to_string(),
                description: "Read-only access".to_string(),
                permissions: vec!["documents.read".to_string(), "search.query".to_string()],
                is_system: true,
            },
        );
        Self { roles }
    }
}

impl Default for BuiltinRoleProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleProvider for BuiltinRoleProvider {
    fn get_role(&self, name: &str) -> Option<Role> {
        self.roles.get(name).cloned()
    }
}

#[derive(Debug, serde::Deserialize)]
struct FileRoleEntry {
    #[serde(default)]
    description: String,
    #[serde(default)]
    permissions: Vec<Permission>,
    #[serde(default)]
    is_system: bool,
}

/// Middle tier of the stack, between the database and the compiled-in
/// defaults: a JSON config file shaped like `role_permissions.json`
/// (`{"role_name": {"description", "permissions", "is_system"}}`). Read
/// once at construction; a missing or unparsable file just yields an empty
/// provider rather than an error, so it's safe to point this at a path
/// that may not exist.
pub struct FileRoleProvider {
    roles: HashMap<String, Role>,
}

impl FileRoleProvider {
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let roles = std::fs::read_to_string(&path)
            .ok()
            .and_then(|contents| serde_json::from_str::<HashMap<String, FileRoleEntry>>(&contents).ok())
            .map(|entries| {
                entries
                    .into_iter()
                    .map(|(name, entry)| {
                        let role = Role {
                            name: name.clone(),
                            description: entry.description,
                            permissions: entry.permissions,
                            is_system: entry.is_system,
                        };
                        (name, role)
                    })
                    .collect()
            })
            .unwrap_or_default();
        Self { roles }
    }
}

impl RoleProvider for FileRoleProvider {
    fn get_role(&self, name: &str) -> Option<Role> {
        self.roles.get(name).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admin_has_all_permissions_via_system_admin() {
        let provider = BuiltinRoleProvider::new();
        assert!(provider.has("admin", "anything.at.all"));
    }

    #[test]
    fn viewer_has_only_its_declared_permissions() {
        let provider = BuiltinRoleProvider::new();
        assert!(provider.has("viewer", "documents.read"));
        assert!(!provider.has("viewer", "documents.delete"));
    }

    #[test]
    fn unknown_role_has_no_permissions() {
        let provider = BuiltinRoleProvider::new();
        assert!(!provider.has("ghost", "documents.read"));
    }

    #[test]
    fn file_role_provider_reads_a_json_config() {
        let dir = std::env::temp_dir();
        let path = dir.join(format!("indexer-role-provider-test-{}.json", std::process::id()));
        std::fs::write(
            &path,
            r#"{"sre": {"description": "ops", "permissions": ["documents.read", "audit.view"], "is_system": false}}"#,
        )
        .unwrap();

        let provider = FileRoleProvider::load(&path);
        assert!(provider.has("sre", "audit.view"));
        assert!(!provider.has("sre", "documents.delete"));
        assert!(provider.get_role("ghost").is_none());

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn file_role_provider_tolerates_a_missing_file() {
        let provider = FileRoleProvider::load("/nonexistent/role_permissions.json");
        assert!(provider.get_role("admin").is_none());
    }

    struct FileRole(Role);
    impl RoleProvider for FileRole {
        fn get_role(&self, name: &str) -> Option<Role> {
            (name == self.0.name).then(|| self.0.clone())
        }
    }

    #[test]
    fn stacked_provider_tries_in_order() {
        let custom = Role {
            name: "viewer".to_string(),
            description: "overridden".to_string(),
            permissions: vec!["documents.delete".to_string()],
            is_system: false,
        };
        let stacked = StackedRoleProvider::new(vec![
            Box::new(FileRole(custom)),
            Box::new(BuiltinRoleProvider::new()),
        ]);
        // The file-backed override shadows the builtin definition.
        assert!(stacked.has("viewer", "documents.delete"));
        assert!(!stacked.has("viewer", "documents.read"));
        // Falls through to builtins for a role the file provider doesn't define.
        assert!(stacked.has("admin", "anything"));
    }
}
