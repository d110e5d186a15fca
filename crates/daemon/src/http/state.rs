// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::sync::Arc;

use crate::lifecycle::DaemonState;
use crate::retention::RetentionHandle;
use crate::scheduler::SchedulerHandle;

/// Everything an axum handler needs, cloned cheaply (all `Arc`) into each
/// request's extractor.
#[derive(Clone)]
pub struct AppState {
    pub daemon: Arc<DaemonState>,
    pub scheduler: Arc<SchedulerHandle>,
    pub retention: Arc<RetentionHandle>,
}
