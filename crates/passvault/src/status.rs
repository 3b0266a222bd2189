// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `passvault status` command implementation.
//!
//! Reports what is persisted without unlocking: lifecycle state, vault
//! encoding, item count when visible, and whether a panic password is set.

use std::io::IsTerminal;

use passvault_config::model::PassVaultConfig;
use passvault_core::{EncryptedVault, PassVaultError, PersistentStore, SessionState, StoreKey};
use passvault_storage::SqliteStore;
use passvault_vault::VaultSession;
use serde::Serialize;

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub state: SessionState,
    pub database_path: String,
    pub format: Option<&'static str>,
    pub items: Option<usize>,
    pub panic_configured: bool,
    pub auto_lock_minutes: u32,
}

/// Run the `passvault status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &PassVaultConfig,
    json: bool,
    plain: bool,
) -> Result<(), PassVaultError> {
    let open = crate::open_session(config).await?;
    let result = report(&open.session, open.store.as_ref(), config, json, plain).await;
    open.finish(result).await
}

async fn report(
    session: &VaultSession,
    store: &SqliteStore,
    config: &PassVaultConfig,
    json: bool,
    plain: bool,
) -> Result<(), PassVaultError> {
    let vault = match store.get(StoreKey::Vault).await? {
        Some(blob) => serde_json::from_str::<EncryptedVault>(&blob).ok(),
        None => None,
    };
    let status = StatusResponse {
        state: session.state(),
        database_path: config.storage.database_path.clone(),
        format: vault.as_ref().map(format_name),
        items: vault.as_ref().and_then(EncryptedVault::item_count),
        panic_configured: store.contains(StoreKey::RecoveryHash).await?,
        auto_lock_minutes: session.auto_lock_minutes(),
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status, use_color);
    }
    Ok(())
}

fn format_name(vault: &EncryptedVault) -> &'static str {
    if vault.is_legacy() {
        "legacy"
    } else {
        "field-level"
    }
}

fn print_status(status: &StatusResponse, use_color: bool) {
    println!();
    println!("  passvault status");
    println!("  {}", "-".repeat(35));

    let state = status.state.to_string();
    if use_color {
        use colored::Colorize;
        let marker = match status.state {
            SessionState::Uninitialized => "○".yellow(),
            _ => "✓".green(),
        };
        println!("    State:     {marker} {state}");
    } else {
        println!("    State:     {state}");
    }

    println!("    Database:  {}", status.database_path);
    if let Some(format) = status.format {
        println!("    Format:    {format}");
    }
    if let Some(items) = status.items {
        println!("    Items:     {items}");
    }
    println!(
        "    Panic:     {}",
        if status.panic_configured { "configured" } else { "not set" }
    );
    println!("    Auto-lock: {} min", status.auto_lock_minutes);
    println!();

    if status.state == SessionState::Uninitialized {
        println!("  Create a vault with: passvault setup");
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_response_serializes() {
        let resp = StatusResponse {
            state: SessionState::Locked,
            database_path: "/tmp/pv.db".to_string(),
            format: Some("field-level"),
            items: Some(3),
            panic_configured: false,
            auto_lock_minutes: 15,
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"state\":\"Locked\""));
        assert!(json.contains("\"items\":3"));
    }

    #[test]
    fn legacy_vaults_are_named() {
        let vault: EncryptedVault =
            serde_json::from_str(r#"{"salt":"c2FsdA==","iv":"aXY=","data":"ZA=="}"#).unwrap();
        assert_eq!(format_name(&vault), "legacy");
    }
}
