// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::time::Duration;

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key).ok().and_then(|s| s.parse::<bool>().ok()).unwrap_or(default)
}

fn env_u64(key: &str, default: u64) -> u64 {
    std::env::var(key).ok().and_then(|s| s.parse::<u64>().ok()).unwrap_or(default)
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key).ok().and_then(|s| s.parse::<i64>().ok()).unwrap_or(default)
}

/// Everything the daemon reads from the environment, captured once at
/// startup so the rest of the process never touches `std::env` directly.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub db_max_connections: u32,
    pub db_connect_timeout_secs: u64,
    pub db_statement_timeout_ms: u64,

    pub http_addr: String,
    pub api_key_prefix: String,
    pub api_require_auth: bool,
    pub demo_mode: bool,

    pub server_scheduler_enabled: bool,
    pub scheduler_poll_interval_seconds: u64,
    pub scheduler_failure_backoff_seconds: i64,
    pub scheduler_max_consecutive_failures: i32,

    pub retention_maintenance_enabled: bool,
    pub retention_maintenance_interval_seconds: u64,
    pub activity_retention_days: i64,
    pub indexing_runs_retention_days: i64,
    pub quarantine_retention_days: i64,

    pub role_permissions_config_path: Option<String>,
}

/// Bootstrap-window and scheduling constants that are not spec-mandated
/// env vars, kept as named constants rather than magic numbers scattered
/// across call sites.
pub const DEFAULT_LOCK_TTL_MINUTES: i64 = 10;
pub const FAILURE_BACKOFF_SECONDS_DEFAULT: i64 = 60 * 60;
pub const MAX_CONSECUTIVE_FAILURES_DEFAULT: i32 = 5;
pub const SCHEDULER_POLL_INTERVAL_SECONDS_DEFAULT: u64 = 60;
pub const QUARANTINE_HOUSEKEEPING_INTERVAL_SECONDS: u64 = 24 * 60 * 60;

impl Config {
    /// Load from the environment, with `.env` loaded opportunistically
    /// (missing is not an error — the original service only loads one when
    /// present too).
    pub fn load() -> Self {
        let _ = dotenvy::dotenv();

        Self {
            database_url: std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| "postgres://localhost/indexer".to_string()),
            db_max_connections: env_u64("DATABASE_MAX_CONNECTIONS", 10) as u32,
            db_connect_timeout_secs: env_u64("DATABASE_CONNECT_TIMEOUT_SECONDS", 10),
            db_statement_timeout_ms: env_u64("DATABASE_STATEMENT_TIMEOUT_MS", 5_000),

            http_addr: std::env::var("HTTP_ADDR").unwrap_or_else(|_| "0.0.0.0:8080".to_string()),
            api_key_prefix: std::env::var("API_KEY_PREFIX").unwrap_or_else(|_| "idx_sk_".to_string()),
            api_require_auth: env_bool("API_REQUIRE_AUTH", true),
            demo_mode: env_bool("DEMO_MODE", false),

            server_scheduler_enabled: env_bool("SERVER_SCHEDULER_ENABLED", false),
            scheduler_poll_interval_seconds: env_u64(
                "SCHEDULER_POLL_INTERVAL_SECONDS",
                SCHEDULER_POLL_INTERVAL_SECONDS_DEFAULT,
            ),
            scheduler_failure_backoff_seconds: env_i64(
                "SCHEDULER_FAILURE_BACKOFF_SECONDS",
                FAILURE_BACKOFF_SECONDS_DEFAULT,
            ),
            scheduler_max_consecutive_failures: env_u64(
                "SCHEDULER_MAX_CONSECUTIVE_FAILURES",
                MAX_CONSECUTIVE_FAILURES_DEFAULT as u64,
            ) as i32,

            retention_maintenance_enabled: env_bool("RETENTION_MAINTENANCE_ENABLED", true),
            retention_maintenance_interval_seconds: env_u64(
                "RETENTION_MAINTENANCE_INTERVAL_SECONDS",
                24 * 60 * 60,
            ),
            activity_retention_days: env_i64("ACTIVITY_RETENTION_DAYS", 2555),
            indexing_runs_retention_days: env_i64("INDEXING_RUNS_RETENTION_DAYS", 10_950),
            quarantine_retention_days: env_i64("QUARANTINE_RETENTION_DAYS", 30),

            role_permissions_config_path: std::env::var("ROLE_PERMISSIONS_CONFIG").ok(),
        }
    }

    pub fn scheduler_poll_interval(&self) -> Duration {
        Duration::from_secs(self.scheduler_poll_interval_seconds)
    }

    pub fn retention_interval(&self) -> Duration {
        Duration::from_secs(self.retention_maintenance_interval_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_bool_falls_back_on_missing_or_unparsable() {
        assert!(env_bool("INDEXER_DAEMON_CONFIG_TEST_MISSING_VAR", true));
        assert!(!env_bool("INDEXER_DAEMON_CONFIG_TEST_MISSING_VAR", false));
    }
}
