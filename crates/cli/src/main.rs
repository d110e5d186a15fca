// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `indexer`: the admin CLI for API key lifecycle management.
//! Talks to the database directly rather than through the daemon's HTTP
//! surface, so key management works even while `indexerd` is down.

mod commands;
mod exit_error;

use clap::Parser;
use exit_error::ExitError;
use indexer_storage::repo::ApiKeyRepository;
use indexer_storage::PoolConfig;

#[derive(Parser)]
#[command(name = "indexer", about = "Admin CLI for the indexing service")]
struct Cli {
    #[command(subcommand)]
    command: commands::keys::KeyCommand,
}

fn load_pool_config() -> PoolConfig {
    let _ = dotenvy::dotenv();
    PoolConfig {
        database_url: std::env::var("DATABASE_URL")
            .unwrap_or_else(|_| "postgres://localhost/indexer".to_string()),
        max_connections: std::env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5),
        connect_timeout_secs: std::env::var("DATABASE_CONNECT_TIMEOUT_SECONDS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(10),
        statement_timeout_ms: std::env::var("DATABASE_STATEMENT_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(5_000),
    }
}

async fn run() -> Result<(), ExitError> {
    let cli = Cli::parse();
    let pool_config = load_pool_config();
    let key_prefix =
        std::env::var("API_KEY_PREFIX").unwrap_or_else(|_| "idx_sk_".to_string());

    let pool = indexer_storage::connect(&pool_config)
        .await
        .map_err(|e| ExitError::new(1, format!("database connection failed: {e}")))?;
    let api_keys = ApiKeyRepository::new(pool, key_prefix);

    commands::keys::handle(cli.command, &api_keys)
        .await
        .map_err(|e| ExitError::new(1, e.to_string()))
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("error: {err}");
        std::process::exit(err.code);
    }
}
