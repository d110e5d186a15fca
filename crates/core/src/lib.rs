// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! indexer-core: domain types shared by every crate in the indexer workspace.

pub mod activity_log;
pub mod canonical_identity;
pub mod chunk;
pub mod clock;
pub mod cron;
pub mod document_lock;
pub mod encrypted_pdf;
pub mod error;
pub mod ids;
pub mod indexing_run;
pub mod path_utils;
pub mod role;
pub mod virtual_root;
pub mod visibility;
pub mod watched_root;

pub use activity_log::ActivityLogEntry;
pub use canonical_identity::{CanonicalKey, Scope};
pub use chunk::{Chunk, ChunkMetadata, RESERVED_METADATA_KEYS};
pub use clock::{Clock, FakeClock, SystemClock};
pub use cron::cron_to_seconds;
pub use document_lock::{DocumentLock, LockIdentity};
pub use encrypted_pdf::{EncryptedPdfLog, EncryptedPdfSighting};
pub use error::{ErrorCategory, IndexerError};
pub use ids::{ActivityId, DocumentId, LockId, RootId, RunId};
pub use indexing_run::{IndexingRun, RunError, RunStatus, RunTrigger};
pub use path_utils::normalize_folder_path;
pub use role::{BuiltinRoleProvider, FileRoleProvider, Permission, Role, RoleProvider, StackedRoleProvider};
pub use virtual_root::VirtualRoot;
pub use visibility::{Requester, Visibility};
pub use watched_root::{ExecutionScope, WatchedRoot};
