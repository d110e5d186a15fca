// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! indexer-storage: the Postgres-backed repositories behind every durable
//! entity, plus the scheduler's advisory lock.

pub mod advisory_lock;
pub mod error;
pub mod repo;

pub use advisory_lock::AdvisoryLock;
pub use error::map_sqlx_error;

use sqlx::postgres::{PgPoolOptions, PgSslMode};
use sqlx::ConnectOptions;
use std::str::FromStr;
use std::time::Duration;

pub type Pool = sqlx::PgPool;

/// Connection parameters, set by `daemon::config` and passed down rather
/// than read from the environment here — this crate has no env access of
/// its own; construction order is config, then pool.
#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connect_timeout_secs: u64,
    pub statement_timeout_ms: u64,
}

/// Open the pool and run embedded migrations. Connection establishment is
/// the one time this crate blocks on I/O outside a repository method.
pub async fn connect(config: &PoolConfig) -> Result<Pool, sqlx::Error> {
    let mut options = sqlx::postgres::PgConnectOptions::from_str(&config.database_url)?
        .ssl_mode(PgSslMode::Prefer);
    options = options.log_statements(tracing::log::LevelFilter::Debug);

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(Duration::from_secs(config.connect_timeout_secs))
        .after_connect({
            let statement_timeout_ms = config.statement_timeout_ms;
            move |conn, _meta| {
                Box::pin(async move {
                    sqlx::query(&format!("set statement_timeout = {statement_timeout_ms}"))
                        .execute(conn)
                        .await?;
                    Ok(())
                })
            }
        })
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    Ok(pool)
}
