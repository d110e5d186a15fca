// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One module per durable entity, mirroring the teacher's
//! per-entity `state/{jobs,workers,...}.rs` split.

pub mod activity_log;
pub mod api_keys;
pub mod chunks;
pub mod clients;
pub mod document_locks;
pub mod indexing_runs;
pub mod roles;
pub mod saml_sessions;
pub mod users;
pub mod virtual_roots;
pub mod watched_roots;

pub use activity_log::ActivityLogRepository;
pub use api_keys::ApiKeyRepository;
pub use chunks::ChunkRepository;
pub use clients::ClientRepository;
pub use document_locks::DocumentLockRepository;
pub use indexing_runs::IndexingRunRepository;
pub use roles::{DbRoleProvider, RoleRepository};
pub use saml_sessions::SamlSessionRepository;
pub use users::UserRepository;
pub use virtual_roots::VirtualRootRepository;
pub use watched_roots::WatchedRootRepository;
