// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `passvault export` and `passvault import` command implementation.
//!
//! Export writes the persisted vault blob verbatim; nothing is decrypted.
//! Import validates the file before asking for confirmation, then replaces
//! the persisted vault.

use std::path::{Path, PathBuf};

use colored::Colorize;
use passvault_config::model::PassVaultConfig;
use passvault_core::PassVaultError;
use passvault_vault::backup::{self, BackupArtifact};
use passvault_vault::VaultSession;
use tracing::info;

/// Run `passvault export`.
pub async fn run_export(
    config: &PassVaultConfig,
    out: Option<PathBuf>,
) -> Result<(), PassVaultError> {
    let vault = crate::open_session(config).await?;
    let path = out.unwrap_or_else(default_path);
    let result = export_to(&vault.session, &path).await;
    if let Ok(size) = &result {
        eprintln!("Backup complete: {size} bytes written to {}", path.display());
    }
    vault.finish(result).await.map(|_| ())
}

/// Run `passvault import`.
pub async fn run_import(
    config: &PassVaultConfig,
    path: &Path,
    yes: bool,
) -> Result<(), PassVaultError> {
    let artifact = read_artifact(path)?;
    let vault = crate::open_session(config).await?;
    let result = async {
        let confirmation = crate::confirm(
            yes,
            "Importing overwrites the current vault. Continue?",
        )?;
        vault.session.import(artifact, confirmation).await?;
        println!(
            "{} backup imported; unlock it with the backup's master password",
            "✓".green()
        );
        Ok::<_, PassVaultError>(())
    }
    .await;
    vault.finish(result).await
}

/// Write the persisted vault to `path`. Returns the number of bytes written.
pub async fn export_to(session: &VaultSession, path: &Path) -> Result<usize, PassVaultError> {
    let artifact = session.export().await?;
    std::fs::write(path, artifact.as_bytes()).map_err(PassVaultError::write)?;
    info!(path = %path.display(), "vault exported");
    Ok(artifact.as_bytes().len())
}

/// Read and validate a backup file.
pub fn read_artifact(path: &Path) -> Result<BackupArtifact, PassVaultError> {
    let bytes = std::fs::read(path).map_err(|e| {
        PassVaultError::ImportFormat(format!("cannot read {}: {e}", path.display()))
    })?;
    backup::parse_artifact(&bytes)
}

fn default_path() -> PathBuf {
    PathBuf::from(backup::default_file_name(chrono::Local::now().date_naive()))
}
