// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Server Scheduler's singleton lease: a process-wide
//! Postgres advisory lock identified by a compile-time constant, acquired
//! non-blocking so a losing replica just retries at the next poll.

use crate::error::map_sqlx_error;
use crate::Pool;
use indexer_core::IndexerError;
use sqlx::pool::PoolConnection;
use sqlx::Postgres;

/// `CRC32("indexer_server_scheduler")`, computed once and pinned here so the
/// lock id never drifts across builds.
pub const SERVER_SCHEDULER_LOCK_ID: i64 = 0x1d61_297a;

/// `pg_try_advisory_lock` is session-scoped: the lock lives as long as the
/// connection that took it stays open. Going through the pool per call would
/// silently acquire and release on different connections, so this holds one
/// dedicated [`PoolConnection`] for the lifetime of the lease rather than
/// borrowing from the pool per query.
pub struct AdvisoryLock {
    pool: Pool,
    lock_id: i64,
    conn: Option<PoolConnection<Postgres>>,
}

impl AdvisoryLock {
    pub fn new(pool: Pool, lock_id: i64) -> Self {
        Self { pool, lock_id, conn: None }
    }

    /// Non-blocking acquisition. Checks out a fresh connection and tries the
    /// lock on it; on failure the connection is dropped back to the pool
    /// immediately so it isn't held idle by a losing replica.
    pub async fn try_acquire(&mut self) -> Result<bool, IndexerError> {
        if self.conn.is_some() {
            return Ok(true);
        }
        let mut conn = self.pool.acquire().await.map_err(map_sqlx_error)?;
        let row: (bool,) = sqlx::query_as("select pg_try_advisory_lock($1)")
            .bind(self.lock_id)
            .fetch_one(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        if row.0 {
            self.conn = Some(conn);
            Ok(true)
        } else {
            Ok(false)
        }
    }

    /// Explicit release, used on clean shutdown. A crashed or killed process
    /// loses the lock automatically when its session closes, so this is a
    /// courtesy, not a correctness requirement.
    pub async fn release(&mut self) -> Result<(), IndexerError> {
        let Some(mut conn) = self.conn.take() else { return Ok(()) };
        sqlx::query("select pg_advisory_unlock($1)")
            .bind(self.lock_id)
            .execute(&mut *conn)
            .await
            .map_err(map_sqlx_error)?;
        Ok(())
    }

    pub fn is_held(&self) -> bool {
        self.conn.is_some()
    }
}
