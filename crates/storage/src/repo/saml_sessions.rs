// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `saml_sessions` repository: only the retention
//! sweep intersects the core subsystem — SAML protocol handling itself is
//! out of scope.

use crate::error::map_sqlx_error;
use crate::Pool;

pub struct SamlSessionRepository {
    pool: Pool,
}

impl SamlSessionRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// `cleanup_saml_sessions`: deletes sessions that are
    /// expired or already marked inactive.
    pub async fn delete_expired_or_inactive(&self) -> Result<u64, indexer_core::IndexerError> {
        let result = sqlx::query("delete from saml_sessions where expires_at < now() or is_active = false")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }
}
