// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps [`IndexerError`] onto an HTTP response carrying a [`ErrorEnvelope`]
//! body: the status comes from `IndexerError::http_status`, the body from
//! `ErrorEnvelope::from(&err)`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use indexer_core::IndexerError;
use indexer_wire::ErrorEnvelope;

pub struct ApiError(pub IndexerError);

impl From<IndexerError> for ApiError {
    fn from(err: IndexerError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.0.http_status()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let envelope = ErrorEnvelope::from(&self.0);
        (status, Json(envelope)).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
