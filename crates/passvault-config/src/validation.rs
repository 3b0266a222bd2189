// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Range and consistency checks run after the config parsed.
//!
//! Covers KDF cost floors, the auto-lock range, log levels, and paths.

use crate::diagnostic::ConfigError;
use crate::model::PassVaultConfig;

/// Lowest accepted Argon2id memory cost (32 MiB).
pub const MIN_KDF_MEMORY_COST: u32 = 32768;

/// Lowest accepted Argon2id iteration count.
pub const MIN_KDF_ITERATIONS: u32 = 2;

/// Highest accepted Argon2id memory cost (1 GiB).
pub const MAX_KDF_MEMORY_COST: u32 = 1024 * 1024;

/// Highest accepted Argon2id iteration count.
pub const MAX_KDF_ITERATIONS: u32 = 10;

/// Highest accepted Argon2id lane count.
pub const MAX_KDF_PARALLELISM: u32 = 16;

/// Shortest accepted auto-lock monitor tick.
pub const MIN_MONITOR_TICK_MS: u64 = 100;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Check `config`, reporting every violation rather than the first.
pub fn validate_config(config: &PassVaultConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();

    let level = config.app.log_level.trim().to_ascii_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        errors.push(ConfigError::Validation {
            message: format!(
                "app.log_level `{}` is not one of {}",
                config.app.log_level,
                LOG_LEVELS.join(", ")
            ),
        });
    }

    if config.storage.database_path.trim().is_empty() {
        errors.push(ConfigError::Validation {
            message: "storage.database_path must not be empty".to_string(),
        });
    }

    if !(MIN_KDF_MEMORY_COST..=MAX_KDF_MEMORY_COST).contains(&config.vault.kdf_memory_cost) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_memory_cost must be between {MIN_KDF_MEMORY_COST} (32 MiB) and {MAX_KDF_MEMORY_COST} (1 GiB), got {}",
                config.vault.kdf_memory_cost
            ),
        });
    }

    if !(MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(&config.vault.kdf_iterations) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_iterations must be between {MIN_KDF_ITERATIONS} and {MAX_KDF_ITERATIONS}, got {}",
                config.vault.kdf_iterations
            ),
        });
    }

    if !(1..=MAX_KDF_PARALLELISM).contains(&config.vault.kdf_parallelism) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.kdf_parallelism must be between 1 and {MAX_KDF_PARALLELISM}, got {}",
                config.vault.kdf_parallelism
            ),
        });
    }

    if !(1..=60).contains(&config.vault.auto_lock_minutes) {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.auto_lock_minutes must be between 1 and 60, got {}",
                config.vault.auto_lock_minutes
            ),
        });
    }

    if config.vault.monitor_tick_ms < MIN_MONITOR_TICK_MS {
        errors.push(ConfigError::Validation {
            message: format!(
                "vault.monitor_tick_ms must be at least {MIN_MONITOR_TICK_MS}, got {}",
                config.vault.monitor_tick_ms
            ),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
