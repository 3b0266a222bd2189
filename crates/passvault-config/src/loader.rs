// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports XDG hierarchy: `./passvault.toml` > `~/.config/passvault/passvault.toml` >
//! `/etc/passvault/passvault.toml` with environment variable overrides via `PASSVAULT_` prefix.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};

use crate::model::PassVaultConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/passvault/passvault.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_FILE: &str = "passvault.toml";

/// The per-user config file under the XDG config directory.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("passvault").join(LOCAL_CONFIG_FILE))
}

/// Load configuration from the standard XDG hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/passvault/passvault.toml` (system-wide)
/// 3. `~/.config/passvault/passvault.toml` (user XDG config)
/// 4. `./passvault.toml` (local directory)
/// 5. `PASSVAULT_*` environment variables
pub fn load_config() -> Result<PassVaultConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no XDG lookup, no env vars).
pub fn load_config_from_str(toml_content: &str) -> Result<PassVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassVaultConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from a specific file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<PassVaultConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(PassVaultConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Build the Figment used internally for config loading.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(PassVaultConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_FILE))
        .merge(env_provider())
}

/// Create the environment variable provider using explicit `map()` for section-to-dot mapping.
///
/// Uses `Env::map()` and not `Env::split("_")`: `PASSVAULT_VAULT_AUTO_LOCK_MINUTES`
/// must map to `vault.auto_lock_minutes`, not `vault.auto.lock.minutes`.
/// `PASSVAULT_MASTER_KEY` is a passphrase source, not config, and is ignored here.
fn env_provider() -> Env {
    Env::prefixed("PASSVAULT_")
        .ignore(&["master_key"])
        .map(|key| {
            // Figment hands over the key in its original (upper) case.
            let mapped = key
                .as_str()
                .to_ascii_lowercase()
                .replacen("app_", "app.", 1)
                .replacen("storage_", "storage.", 1)
                .replacen("vault_", "vault.", 1);
            mapped.into()
        })
}
