// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! API key admin commands: the only way to mint, list,
//! revoke, or rotate keys is through this binary — the HTTP surface never
//! issues keys for itself.

use anyhow::Result;
use clap::Subcommand;
use indexer_storage::repo::ApiKeyRepository;
use uuid::Uuid;

#[derive(Subcommand)]
pub enum KeyCommand {
    /// Mint a new API key and print the plaintext secret once
    CreateKey {
        /// Human-readable label for the key
        #[arg(long)]
        name: String,
    },
    /// List all known API keys (never shows plaintext secrets)
    ListKeys {},
    /// Revoke an API key; it keeps working for a 24h grace window
    RevokeKey {
        /// Key id (uuid)
        #[arg(long)]
        id: Uuid,
    },
    /// Revoke an API key and mint a replacement under the same name
    RotateKey {
        /// Key id (uuid)
        #[arg(long)]
        id: Uuid,
    },
}

pub async fn handle(command: KeyCommand, api_keys: &ApiKeyRepository) -> Result<()> {
    match command {
        KeyCommand::CreateKey { name } => {
            let issued = api_keys.create(&name).await?;
            println!("Created key '{}' ({})", issued.record.name, issued.record.id);
            println!("{}", issued.plaintext);
            println!("Store this value now — it cannot be retrieved again.");
        }
        KeyCommand::ListKeys {} => {
            let keys = api_keys.list().await?;
            if keys.is_empty() {
                println!("No API keys found");
                return Ok(());
            }
            for key in keys {
                let status = if key.revoked_at.is_some() { "revoked" } else { "active" };
                let last_used = key
                    .last_used_at
                    .map(|t| t.to_rfc3339())
                    .unwrap_or_else(|| "never".to_string());
                println!(
                    "{}  {:<8}  {:<20}  {}...  last_used={}",
                    key.id, status, key.name, key.key_prefix, last_used
                );
            }
        }
        KeyCommand::RevokeKey { id } => {
            let revoked = api_keys.revoke(id).await?;
            if revoked {
                println!("Revoked key {id} (active for a 24h grace window)");
            } else {
                anyhow::bail!("no active key found with id {id}");
            }
        }
        KeyCommand::RotateKey { id } => {
            let issued = api_keys.rotate(id).await?;
            println!("Rotated key '{}' ({})", issued.record.name, issued.record.id);
            println!("{}", issued.plaintext);
            println!("Store this value now — it cannot be retrieved again.");
        }
    }
    Ok(())
}
