// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Config model.
//!
//! Every section and key is optional; missing ones take the `Default` impl.
//! Unknown keys are rejected so a typo never silently falls back to a default.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

pub const DEFAULT_LOG_LEVEL: &str = "info";
/// KiB.
pub const DEFAULT_KDF_MEMORY_COST: u32 = 65536;
pub const DEFAULT_KDF_ITERATIONS: u32 = 3;
pub const DEFAULT_KDF_PARALLELISM: u32 = 4;
pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 15;
pub const DEFAULT_MONITOR_TICK_MS: u64 = 1000;

/// Root of `passvault.toml`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct PassVaultConfig {
    pub app: AppConfig,
    pub storage: StorageConfig,
    pub vault: VaultConfig,
}

/// `[app]`
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    /// One of trace, debug, info, warn, error. `RUST_LOG` wins when set.
    pub log_level: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: DEFAULT_LOG_LEVEL.to_string(),
        }
    }
}

/// `[storage]`: where the key/value database lives.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageConfig {
    /// SQLite file. Parent directories are created on open.
    pub database_path: String,
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        let path = dirs::data_dir()
            .map(|dir| dir.join("passvault").join("passvault.db"))
            .unwrap_or_else(|| PathBuf::from("passvault.db"));
        Self {
            database_path: path.to_string_lossy().into_owned(),
            wal_mode: true,
        }
    }
}

/// `[vault]`: Argon2id cost and inactivity locking.
///
/// KDF parameters apply to newly written vaults. Existing vaults carry the
/// parameters they were written with.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct VaultConfig {
    /// KiB.
    pub kdf_memory_cost: u32,
    pub kdf_iterations: u32,
    pub kdf_parallelism: u32,
    /// Used until the vault's own settings record a value.
    pub auto_lock_minutes: u32,
    pub monitor_tick_ms: u64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_memory_cost: DEFAULT_KDF_MEMORY_COST,
            kdf_iterations: DEFAULT_KDF_ITERATIONS,
            kdf_parallelism: DEFAULT_KDF_PARALLELISM,
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
            monitor_tick_ms: DEFAULT_MONITOR_TICK_MS,
        }
    }
}
