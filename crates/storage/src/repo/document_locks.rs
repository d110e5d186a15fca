// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `document_locks` repository: dual-keyed TTL locks.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Duration, Utc};
use indexer_core::{DocumentLock, IndexerError, LockId, RootId};
use uuid::Uuid;

pub struct DocumentLockRepository {
    pool: Pool,
}

#[derive(Debug, sqlx::FromRow)]
struct DocumentLockRow {
    id: Uuid,
    source_uri: String,
    client_id: String,
    locked_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
    lock_reason: String,
    root_id: Option<Uuid>,
    relative_path: Option<String>,
}

impl DocumentLockRow {
    fn into_domain(self) -> DocumentLock {
        DocumentLock {
            id: LockId::from_uuid(self.id),
            source_uri: self.source_uri,
            client_id: self.client_id,
            locked_at: self.locked_at,
            expires_at: self.expires_at,
            lock_reason: self.lock_reason,
            root_id: self.root_id.map(RootId::from_uuid),
            relative_path: self.relative_path,
        }
    }
}

const SELECT_COLUMNS: &str =
    "id, source_uri, client_id, locked_at, expires_at, lock_reason, root_id, relative_path";

pub enum LockOutcome {
    Acquired { lock: DocumentLock, extended: bool },
    Held { holder: DocumentLock },
}

impl DocumentLockRepository {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// `acquire_lock`: runs the delete-expired / read-active /
    /// extend-or-insert sequence inside one transaction so a concurrent
    /// acquire for the same identity can't interleave between steps.
    pub async fn acquire_lock(
        &self,
        source_uri: &str,
        client_id: &str,
        ttl_minutes: i64,
        lock_reason: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
    ) -> Result<LockOutcome, IndexerError> {
        let mut tx = self.pool.begin().await.map_err(map_sqlx_error)?;

        Self::delete_expired_identity_tx(&mut tx, source_uri, root_id, relative_path).await?;

        let existing: Option<DocumentLockRow> =
            Self::find_active_identity_tx(&mut tx, source_uri, root_id, relative_path).await?;

        let outcome = if let Some(existing) = existing {
            if existing.client_id == client_id {
                let new_expiry = Utc::now() + Duration::minutes(ttl_minutes);
                let row: DocumentLockRow = sqlx::query_as(&format!(
                    "update document_locks set expires_at = $2, lock_reason = $3
                     where id = $1
                     returning {SELECT_COLUMNS}"
                ))
                .bind(existing.id)
                .bind(new_expiry)
                .bind(lock_reason)
                .fetch_one(&mut *tx)
                .await
                .map_err(map_sqlx_error)?;
                LockOutcome::Acquired { lock: row.into_domain(), extended: true }
            } else {
                LockOutcome::Held { holder: existing.into_domain() }
            }
        } else {
            let expires_at = Utc::now() + Duration::minutes(ttl_minutes);
            let row: DocumentLockRow = sqlx::query_as(&format!(
                "insert into document_locks
                    (source_uri, client_id, expires_at, lock_reason, root_id, relative_path)
                 values ($1, $2, $3, $4, $5, $6)
                 returning {SELECT_COLUMNS}"
            ))
            .bind(source_uri)
            .bind(client_id)
            .bind(expires_at)
            .bind(lock_reason)
            .bind(root_id)
            .bind(relative_path)
            .fetch_one(&mut *tx)
            .await
            .map_err(map_sqlx_error)?;
            LockOutcome::Acquired { lock: row.into_domain(), extended: false }
        };

        tx.commit().await.map_err(map_sqlx_error)?;
        Ok(outcome)
    }

    pub async fn release_lock(
        &self,
        source_uri: &str,
        client_id: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
    ) -> Result<bool, IndexerError> {
        let result = self
            .delete_identity(source_uri, root_id, relative_path, Some(client_id))
            .await?;
        Ok(result)
    }

    pub async fn force_release_lock(
        &self,
        source_uri: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
    ) -> Result<bool, IndexerError> {
        self.delete_identity(source_uri, root_id, relative_path, None).await
    }

    pub async fn check_lock(
        &self,
        source_uri: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
    ) -> Result<Option<DocumentLock>, IndexerError> {
        let row = match (root_id, relative_path) {
            (Some(root_id), Some(relative_path)) => sqlx::query_as::<_, DocumentLockRow>(&format!(
                "select {SELECT_COLUMNS} from document_locks
                 where root_id = $1 and relative_path = $2 and expires_at > now()"
            ))
            .bind(root_id)
            .bind(relative_path)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?,
            _ => sqlx::query_as::<_, DocumentLockRow>(&format!(
                "select {SELECT_COLUMNS} from document_locks
                 where source_uri = $1 and expires_at > now()"
            ))
            .bind(source_uri)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?,
        };
        Ok(row.map(DocumentLockRow::into_domain))
    }

    pub async fn cleanup_expired_locks(&self) -> Result<u64, IndexerError> {
        let result = sqlx::query("delete from document_locks where expires_at <= now()")
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected())
    }

    async fn delete_identity(
        &self,
        source_uri: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
        client_id: Option<&str>,
    ) -> Result<bool, IndexerError> {
        let result = match (root_id, relative_path) {
            (Some(root_id), Some(relative_path)) => {
                sqlx::query(
                    "delete from document_locks
                     where root_id = $1 and relative_path = $2
                       and ($3::text is null or client_id = $3)",
                )
                .bind(root_id)
                .bind(relative_path)
                .bind(client_id)
                .execute(&self.pool)
                .await
            }
            _ => {
                sqlx::query(
                    "delete from document_locks
                     where source_uri = $1 and ($2::text is null or client_id = $2)",
                )
                .bind(source_uri)
                .bind(client_id)
                .execute(&self.pool)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete_expired_identity_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        source_uri: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
    ) -> Result<(), IndexerError> {
        match (root_id, relative_path) {
            (Some(root_id), Some(relative_path)) => {
                sqlx::query(
                    "delete from document_locks
                     where root_id = $1 and relative_path = $2 and expires_at <= now()",
                )
                .bind(root_id)
                .bind(relative_path)
                .execute(&mut **tx)
                .await
            }
            _ => {
                sqlx::query(
                    "delete from document_locks where source_uri = $1 and expires_at <= now()",
                )
                .bind(source_uri)
                .execute(&mut **tx)
                .await
            }
        }
        .map_err(map_sqlx_error)?;
        Ok(())
    }

    async fn find_active_identity_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
        source_uri: &str,
        root_id: Option<Uuid>,
        relative_path: Option<&str>,
    ) -> Result<Option<DocumentLockRow>, IndexerError> {
        let row = match (root_id, relative_path) {
            (Some(root_id), Some(relative_path)) => sqlx::query_as(&format!(
                "select {SELECT_COLUMNS} from document_locks
                 where root_id = $1 and relative_path = $2 and expires_at > now()
                 for update"
            ))
            .bind(root_id)
            .bind(relative_path)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx_error)?,
            _ => sqlx::query_as(&format!(
                "select {SELECT_COLUMNS} from document_locks
                 where source_uri = $1 and expires_at > now()
                 for update"
            ))
            .bind(source_uri)
            .fetch_optional(&mut **tx)
            .await
            .map_err(map_sqlx_error)?,
        };
        Ok(row)
    }
}
