// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PassVault configuration.
//!
//! Layered TOML files plus `PASSVAULT_*` environment overrides, strict key
//! checking, and semantic validation that reports every problem at once.
//!
//! ```no_run
//! let config = match passvault_config::load_and_validate() {
//!     Ok(config) => config,
//!     Err(errors) => {
//!         passvault_config::render_errors(&errors);
//!         std::process::exit(1);
//!     }
//! };
//! println!("database: {}", config.storage.database_path);
//! ```

pub mod diagnostic;
pub mod loader;
pub mod model;
pub mod validation;

use std::path::{Path, PathBuf};

pub use diagnostic::{render_errors, ConfigError};
pub use loader::{load_config, load_config_from_path, load_config_from_str};
pub use model::{AppConfig, PassVaultConfig, StorageConfig, VaultConfig};

/// Load from the standard file hierarchy and environment, then validate.
pub fn load_and_validate() -> Result<PassVaultConfig, Vec<ConfigError>> {
    finish(loader::load_config(), || {
        let mut layers = vec![PathBuf::from(loader::SYSTEM_CONFIG_PATH)];
        layers.extend(loader::user_config_path());
        layers.push(
            std::env::current_dir()
                .map(|dir| dir.join(loader::LOCAL_CONFIG_FILE))
                .unwrap_or_else(|_| PathBuf::from(loader::LOCAL_CONFIG_FILE)),
        );
        read_layers(&layers)
    })
}

/// Parse `toml_content` alone (no files, no environment), then validate.
pub fn load_and_validate_str(toml_content: &str) -> Result<PassVaultConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_str(toml_content), || {
        vec![("<inline>".to_string(), toml_content.to_string())]
    })
}

/// Load `path` plus environment overrides, then validate.
///
/// A missing file is not an error; defaults apply.
pub fn load_and_validate_path(path: &Path) -> Result<PassVaultConfig, Vec<ConfigError>> {
    finish(loader::load_config_from_path(path), || {
        read_layers(&[path.to_path_buf()])
    })
}

/// Validate a parsed config, or translate the parse failure.
///
/// `sources` is only evaluated on failure.
fn finish(
    parsed: Result<PassVaultConfig, figment::Error>,
    sources: impl FnOnce() -> Vec<(String, String)>,
) -> Result<PassVaultConfig, Vec<ConfigError>> {
    let config = parsed.map_err(|err| diagnostic::figment_to_config_errors(err, &sources()))?;
    validation::validate_config(&config)?;
    Ok(config)
}

/// `(display path, contents)` for each layer that exists and is readable.
fn read_layers(paths: &[PathBuf]) -> Vec<(String, String)> {
    paths
        .iter()
        .filter_map(|path| {
            std::fs::read_to_string(path)
                .ok()
                .map(|content| (path.display().to_string(), content))
        })
        .collect()
}
