// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Maps `sqlx::Error` onto the stable taxonomy: every
//! repository method returns `Result<_, IndexerError>`, never a raw
//! `sqlx::Error`, so callers above this crate never match on driver types.

use indexer_core::IndexerError;

pub fn map_sqlx_error(err: sqlx::Error) -> IndexerError {
    match &err {
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) => {
            IndexerError::DatabaseConnectionError(err.to_string())
        }
        _ => IndexerError::DatabaseQueryError(err.to_string()),
    }
}
