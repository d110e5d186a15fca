// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `LicenseState` (grounded on `generate_license_key.py`): a read-only gate
//! checked once per request by
//! [`require_valid_license`], mirroring the original's enforcement on
//! mutation endpoints while defaulting to a no-op so the core subsystem
//! stays testable without a license server.

use std::sync::OnceLock;

use axum::extract::Request;
use axum::http::Method;
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use chrono::{DateTime, Utc};
use indexer_core::IndexerError;

use crate::http::error::ApiError;

#[derive(Debug, Clone)]
pub enum LicenseState {
    /// `LICENSE_ENFORCEMENT_ENABLED` is unset or false: every check passes.
    Disabled,
    Valid { expires_at: Option<DateTime<Utc>> },
    Missing,
    Expired,
}

static LICENSE_STATE: OnceLock<LicenseState> = OnceLock::new();

impl LicenseState {
    pub fn global() -> &'static LicenseState {
        LICENSE_STATE.get_or_init(Self::load_from_env)
    }

    fn load_from_env() -> Self {
        let enabled = std::env::var("LICENSE_ENFORCEMENT_ENABLED")
            .ok()
            .and_then(|s| s.parse::<bool>().ok())
            .unwrap_or(false);
        if !enabled {
            return LicenseState::Disabled;
        }

        match std::env::var("LICENSE_KEY").ok().filter(|s| !s.is_empty()) {
            None => LicenseState::Missing,
            Some(_) => {
                let expires_at = std::env::var("LICENSE_EXPIRES_AT")
                    .ok()
                    .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
                    .map(|dt| dt.with_timezone(&Utc));
                if expires_at.is_some_and(|exp| exp <= Utc::now()) {
                    LicenseState::Expired
                } else {
                    LicenseState::Valid { expires_at }
                }
            }
        }
    }

    pub fn check(&self) -> Result<(), IndexerError> {
        match self {
            LicenseState::Disabled | LicenseState::Valid { .. } => Ok(()),
            LicenseState::Missing => Err(IndexerError::LicenseNotFound),
            LicenseState::Expired => Err(IndexerError::LicenseExpired),
        }
    }
}

/// Gates mutating requests on [`LicenseState::check`]; reads never require a
/// license, matching the original's scope (it only ever gated writes).
pub async fn require_valid_license(req: Request, next: Next) -> Response {
    let mutating =
        matches!(*req.method(), Method::POST | Method::PUT | Method::DELETE | Method::PATCH);
    if mutating {
        if let Err(err) = LicenseState::global().check() {
            return ApiError::from(err).into_response();
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_state_always_passes() {
        assert!(LicenseState::Disabled.check().is_ok());
    }

    #[test]
    fn missing_state_reports_license_not_found() {
        assert!(matches!(LicenseState::Missing.check(), Err(IndexerError::LicenseNotFound)));
    }

    #[test]
    fn expired_state_reports_license_expired() {
        assert!(matches!(LicenseState::Expired.check(), Err(IndexerError::LicenseExpired)));
    }
}
