// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `api_keys` repository: key issuance, lookup for
//! auth, revocation with a 24h grace window, and rotation.

use crate::error::map_sqlx_error;
use crate::Pool;
use chrono::{DateTime, Duration, Utc};
use indexer_core::IndexerError;
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// API keys use a 24h grace window after revocation so an in-flight key
/// rotation doesn't break callers mid-request.
pub const REVOCATION_GRACE_HOURS: i64 = 24;

pub struct ApiKeyRepository {
    pool: Pool,
    key_prefix: String,
}

#[derive(Debug, Clone)]
pub struct ApiKey {
    pub id: Uuid,
    pub name: String,
    pub key_prefix: String,
    pub created_at: DateTime<Utc>,
    pub last_used_at: Option<DateTime<Utc>>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Returned once, at creation time; the plaintext secret is never stored or
/// retrievable afterward.
pub struct IssuedApiKey {
    pub record: ApiKey,
    pub plaintext: String,
}

fn hash_key(plaintext: &str) -> String {
    let digest = Sha256::digest(plaintext.as_bytes());
    format!("{digest:x}")
}

impl ApiKeyRepository {
    pub fn new(pool: Pool, key_prefix: impl Into<String>) -> Self {
        Self { pool, key_prefix: key_prefix.into() }
    }

    pub async fn create(&self, name: &str) -> Result<IssuedApiKey, IndexerError> {
        // Two v4 UUIDs (32 random bytes) give a secret long enough that
        // brute-forcing the hash is infeasible, without pulling in a
        // dedicated CSPRNG crate the rest of the workspace doesn't use.
        let secret_bytes: Vec<u8> =
            Uuid::new_v4().as_bytes().iter().chain(Uuid::new_v4().as_bytes()).copied().collect();
        let secret_hex = hex_encode(&secret_bytes);
        let plaintext = format!("{}{}", self.key_prefix, secret_hex);
        let key_hash = hash_key(&plaintext);

        let row: (Uuid, DateTime<Utc>) = sqlx::query_as(
            "insert into api_keys (name, key_hash, key_prefix) values ($1, $2, $3)
             returning id, created_at",
        )
        .bind(name)
        .bind(&key_hash)
        .bind(&self.key_prefix)
        .fetch_one(&self.pool)
        .await
        .map_err(map_sqlx_error)?;

        Ok(IssuedApiKey {
            record: ApiKey {
                id: row.0,
                name: name.to_string(),
                key_prefix: self.key_prefix.clone(),
                created_at: row.1,
                last_used_at: None,
                revoked_at: None,
                expires_at: None,
            },
            plaintext,
        })
    }

    pub async fn list(&self) -> Result<Vec<ApiKey>, IndexerError> {
        let rows: Vec<(Uuid, String, String, DateTime<Utc>, Option<DateTime<Utc>>, Option<DateTime<Utc>>, Option<DateTime<Utc>>)> =
            sqlx::query_as(
                "select id, name, key_prefix, created_at, last_used_at, revoked_at, expires_at
                 from api_keys order by created_at desc",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(rows
            .into_iter()
            .map(|(id, name, key_prefix, created_at, last_used_at, revoked_at, expires_at)| ApiKey {
                id,
                name,
                key_prefix,
                created_at,
                last_used_at,
                revoked_at,
                expires_at,
            })
            .collect())
    }

    pub async fn revoke(&self, id: Uuid) -> Result<bool, IndexerError> {
        let result = sqlx::query("update api_keys set revoked_at = now() where id = $1 and revoked_at is null")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        Ok(result.rows_affected() > 0)
    }

    /// Revokes the old key and issues a replacement under the same name.
    pub async fn rotate(&self, id: Uuid) -> Result<IssuedApiKey, IndexerError> {
        let name: Option<(String,)> = sqlx::query_as("select name from api_keys where id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;
        let Some((name,)) = name else {
            return Err(IndexerError::DocumentNotFound(id.to_string()));
        };
        self.revoke(id).await?;
        self.create(&name).await
    }

    /// Validates a presented key against the stored hash, accepting keys
    /// still inside their revocation grace window.
    pub async fn validate(&self, plaintext: &str) -> Result<Option<ApiKey>, IndexerError> {
        let key_hash = hash_key(plaintext);
        let row: Option<(Uuid, String, String, DateTime<Utc>, Option<DateTime<Utc>>, Option<DateTime<Utc>>, Option<DateTime<Utc>>)> =
            sqlx::query_as(
                "select id, name, key_prefix, created_at, last_used_at, revoked_at, expires_at
                 from api_keys where key_hash = $1",
            )
            .bind(&key_hash)
            .fetch_optional(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        let Some((id, name, key_prefix, created_at, last_used_at, revoked_at, expires_at)) = row else {
            return Ok(None);
        };

        if let Some(expires_at) = expires_at {
            if expires_at <= Utc::now() {
                return Ok(None);
            }
        }
        if let Some(revoked_at) = revoked_at {
            if Utc::now() > revoked_at + Duration::hours(REVOCATION_GRACE_HOURS) {
                return Ok(None);
            }
        }

        sqlx::query("update api_keys set last_used_at = now() where id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(map_sqlx_error)?;

        Ok(Some(ApiKey { id, name, key_prefix, created_at, last_used_at, revoked_at, expires_at }))
    }
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        write!(s, "{b:02x}").expect("writing to a String cannot fail");
    }
    s
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_key_is_deterministic() {
        assert_eq!(hash_key("idx_live_abc123"), hash_key("idx_live_abc123"));
    }

    #[test]
    fn hash_key_differs_on_different_input() {
        assert_ne!(hash_key("idx_live_abc123"), hash_key("idx_live_abc124"));
    }

    #[test]
    fn hex_encode_matches_known_bytes() {
        assert_eq!(hex_encode(&[0x00, 0x0f, 0xff]), "000fff");
    }
}
