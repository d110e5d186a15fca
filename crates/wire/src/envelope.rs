// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error envelope: `{error_code, message, details?}`.

use indexer_core::IndexerError;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ErrorEnvelope {
    pub error_code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ErrorEnvelope {
    pub fn new(error_code: impl Into<String>, message: impl Into<String>) -> Self {
        Self { error_code: error_code.into(), message: message.into(), details: None }
    }

    pub fn with_details(mut self, details: Value) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&IndexerError> for ErrorEnvelope {
    fn from(err: &IndexerError) -> Self {
        ErrorEnvelope::new(err.error_code(), err.to_string())
    }
}

/// Unknown exceptions become `InternalServerError` with a generic message;
/// the real cause is logged, never echoed back to the caller.
pub fn internal_error_envelope() -> ErrorEnvelope {
    ErrorEnvelope::new("SYS.InternalServerError", "an internal error occurred")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_from_error_carries_stable_code() {
        let err = IndexerError::DocumentNotFound("abc".to_string());
        let envelope = ErrorEnvelope::from(&err);
        assert_eq!(envelope.error_code, "DOC.DocumentNotFound");
    }

    #[test]
    fn details_are_omitted_when_absent() {
        let envelope = ErrorEnvelope::new("SYS.InternalServerError", "boom");
        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("details").is_none());
    }
}
