// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The HTTP surface: routes live under `/api/v1/` and are also
//! mounted at `/` for backward compatibility, the bare mount carrying RFC
//! 8594 deprecation headers.

pub mod auth;
pub mod error;
pub mod routes;
pub mod state;

use axum::extract::Request;
use axum::http::HeaderName;
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{delete, get, post};
use axum::Router;
use chrono::{Duration, Utc};
use indexer_wire::DeprecationNotice;

use self::state::AppState;
use crate::license;

fn versioned_routes() -> Router<AppState> {
    Router::new()
        .route("/index", post(routes::index::index))
        .route("/upload-and-index", post(routes::index::upload_and_index))
        .route("/search", post(routes::search::search))
        .route(
            "/documents",
            get(routes::documents::list_documents),
        )
        .route("/documents/encrypted", get(routes::index::list_encrypted))
        .route("/documents/bulk-delete", post(routes::documents::bulk_delete))
        .route("/documents/export", post(routes::documents::export))
        .route("/documents/restore", post(routes::documents::restore))
        .route("/documents/:id", delete(routes::documents::delete_document))
        .route("/documents/locks/acquire", post(routes::locks::acquire))
        .route("/documents/locks/release", post(routes::locks::release))
        .route("/documents/locks/force-release", post(routes::locks::force_release))
        .route("/documents/locks/check", post(routes::locks::check))
        .route("/documents/locks/cleanup", post(routes::locks::cleanup))
        .route(
            "/watched-folders",
            get(routes::folders::list_folders).post(routes::folders::add_folder),
        )
        .route(
            "/watched-folders/:id",
            delete(routes::folders::remove_folder)
                .put(routes::folders::update_folder)
                .patch(routes::folders::update_folder),
        )
        .route("/watched-folders/:id/scan", post(routes::folders::scan_folder))
        .route(
            "/watched-folders/:id/transition-scope",
            post(routes::folders::transition_scope),
        )
        .route("/scheduler/status", get(routes::scheduler::status))
        .route("/scheduler/roots/:id/pause", post(routes::scheduler::pause))
        .route("/scheduler/roots/:id/resume", post(routes::scheduler::resume))
        .route("/scheduler/roots/:id/scan-now", post(routes::scheduler::scan_now))
        .route("/retention/run", post(routes::retention::run))
        .route("/indexing/runs", get(routes::runs::list_runs))
        .route("/indexing/runs/summary", get(routes::runs::summary))
        .route("/indexing/runs/:id", get(routes::runs::get_run))
        .route("/compliance/export", get(routes::compliance::export))
}

/// Tags every response from the legacy bare mount with RFC 8594 deprecation
/// headers, pointing at the `/api/v1` successor for the same path.
async fn deprecation_headers(req: Request, next: Next) -> Response {
    let successor_path = format!("/api/v1{}", req.uri().path());
    let notice = DeprecationNotice { sunset: Utc::now() + Duration::days(180), successor_path };
    let mut response = next.run(req).await;
    for (name, value) in notice.headers() {
        if let (Ok(name), Ok(value)) = (HeaderName::from_bytes(name.as_bytes()), value.parse()) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}

/// Assemble the full router: versioned routes under `/api/v1`, the same
/// routes again at `/` for legacy clients, both behind auth and demo-mode
/// guards.
pub fn build_router(state: AppState) -> Router {
    let legacy = versioned_routes().layer(middleware::from_fn(deprecation_headers));

    Router::new()
        .nest("/api/v1", versioned_routes())
        .merge(legacy)
        .layer(middleware::from_fn(license::require_valid_license))
        .layer(middleware::from_fn_with_state(state.clone(), auth::demo_mode_guard))
        .layer(middleware::from_fn_with_state(state.clone(), auth::client_identity_middleware))
        .layer(middleware::from_fn_with_state(state.clone(), auth::auth_middleware))
        .with_state(state)
}
