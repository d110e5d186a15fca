// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `AuthGate::check`: a valid `X-API-Key` (or loopback origin, or
//! `API_REQUIRE_AUTH=false`) is required unconditionally — there is no
//! window in which an unauthenticated caller is granted access. The one
//! bootstrap exception is narrower: before any admin user has been
//! assigned, a caller who has already presented a *valid* key is treated
//! as admin, so the very first role can be granted without a chicken-and-
//! egg problem. Once a validated key resolves to a user, its real role is
//! looked up through the stacked role provider and carried as
//! [`Requester::User`] unless that role holds `system.admin`.

use std::net::SocketAddr;

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, Method};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use indexer_core::{IndexerError, Requester, Role, RoleProvider};

use super::error::ApiError;
use super::state::AppState;

pub struct AuthGate;

impl AuthGate {
    pub async fn check(
        state: &AppState,
        headers: &HeaderMap,
        peer: Option<SocketAddr>,
    ) -> Result<Requester, IndexerError> {
        if !state.daemon.config.api_require_auth {
            return Ok(Requester::Unauthenticated);
        }

        if peer.map(|addr| addr.ip().is_loopback()).unwrap_or(false) {
            return Ok(Requester::Admin);
        }

        let key = extract_key(headers).ok_or(IndexerError::Unauthorized)?;
        let record = state
            .daemon
            .api_keys
            .validate(&key)
            .await?
            .ok_or(IndexerError::InvalidApiKey)?;

        // Bootstrap: before any admin exists, a validated key is trusted as
        // admin outright so the first role assignment can happen at all.
        let bootstrap = state.daemon.users.count_admins().await? == 0;
        let default_role = if bootstrap { "admin" } else { "viewer" };
        let email = format!("{}@api-key.local", record.name);
        let user = state.daemon.users.upsert_for_api_key(&email, default_role, record.id).await?;

        if bootstrap || state.daemon.role_provider.has(&user.role, Role::ADMIN_PERMISSION) {
            Ok(Requester::Admin)
        } else {
            Ok(Requester::User { user_id: user.id.to_string() })
        }
    }
}

fn extract_key(headers: &HeaderMap) -> Option<String> {
    if let Some(value) = headers.get("x-api-key").and_then(|v| v.to_str().ok()) {
        return Some(value.to_string());
    }
    headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::to_string)
}

/// Resolves a [`Requester`] per request and stashes it in the request
/// extensions for handlers to pull out. A loopback peer is exempt from the
/// `X-API-Key` requirement.
pub async fn auth_middleware(State(state): State<AppState>, mut req: Request, next: Next) -> Response {
    let peer = req.extensions().get::<ConnectInfo<SocketAddr>>().map(|info| info.0);
    match AuthGate::check(&state, req.headers(), peer).await {
        Ok(requester) => {
            req.extensions_mut().insert(requester);
            next.run(req).await
        }
        Err(err) => ApiError::from(err).into_response(),
    }
}

/// Requests this daemon still serves while `DEMO_MODE` is set, even though
/// they arrive as POST — a whitelist of read-path POSTs.
const DEMO_MODE_POST_ALLOWLIST: &[&str] = &["/api/v1/search", "/search"];

pub async fn demo_mode_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if state.daemon.config.demo_mode {
        let mutating = matches!(
            *req.method(),
            Method::POST | Method::PUT | Method::DELETE | Method::PATCH
        );
        let allowlisted = DEMO_MODE_POST_ALLOWLIST.contains(&req.uri().path());
        if mutating && !allowlisted {
            return ApiError::from(IndexerError::DemoModeRestriction).into_response();
        }
    }
    next.run(req).await
}

/// `X-Client-Id` executor-identity flow (grounded on `client_identity.py`):
/// a client-scope caller's id is registered on first
/// sight via [`indexer_storage::repo::ClientRepository::touch`] so Root
/// Registry/Document Lock operations can later reference it as a foreign
/// key. Absence of the header is not an error — most requests are
/// server-scope and carry no client identity at all.
pub async fn client_identity_middleware(State(state): State<AppState>, req: Request, next: Next) -> Response {
    if let Some(client_id) = req.headers().get("x-client-id").and_then(|v| v.to_str().ok()) {
        if let Err(err) = state.daemon.clients.touch(client_id).await {
            return ApiError::from(err).into_response();
        }
    }
    next.run(req).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extract_key_prefers_x_api_key_header() {
        let mut headers = HeaderMap::new();
        headers.insert("x-api-key", "abc".parse().unwrap());
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer def".parse().unwrap());
        assert_eq!(extract_key(&headers).as_deref(), Some("abc"));
    }

    #[test]
    fn extract_key_falls_back_to_bearer() {
        let mut headers = HeaderMap::new();
        headers.insert(axum::http::header::AUTHORIZATION, "Bearer def".parse().unwrap());
        assert_eq!(extract_key(&headers).as_deref(), Some("def"));
    }
}
