// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Master password acquisition via TTY prompt or the PASSVAULT_MASTER_KEY
//! environment variable.

use std::io::IsTerminal;

use passvault_core::PassVaultError;
use secrecy::{ExposeSecret, SecretString};

/// The environment variable name for providing the master password.
pub const MASTER_KEY_ENV_VAR: &str = "PASSVAULT_MASTER_KEY";

fn from_env() -> Option<SecretString> {
    std::env::var(MASTER_KEY_ENV_VAR)
        .ok()
        .filter(|key| !key.is_empty())
        .map(SecretString::from)
}

fn read_hidden(label: &str) -> Result<SecretString, PassVaultError> {
    eprint!("{label}: ");
    rpassword::read_password()
        .map(SecretString::from)
        .map_err(|e| PassVaultError::Internal(format!("failed to read password: {e}")))
}

fn no_source() -> PassVaultError {
    PassVaultError::Validation(format!(
        "no master password provided; set {MASTER_KEY_ENV_VAR} or run interactively"
    ))
}

/// Get the master password from the environment or an interactive prompt.
///
/// Priority:
/// 1. `PASSVAULT_MASTER_KEY` environment variable (scripts, CI)
/// 2. Interactive TTY prompt via `rpassword`
pub fn get_master_password() -> Result<SecretString, PassVaultError> {
    if let Some(key) = from_env() {
        return Ok(key);
    }
    if std::io::stdin().is_terminal() {
        let password = read_hidden("Master password")?;
        if password.expose_secret().is_empty() {
            return Err(PassVaultError::Validation(
                "empty password not allowed".to_string(),
            ));
        }
        return Ok(password);
    }
    Err(no_source())
}

/// Get a new master password, prompting twice and comparing.
///
/// The environment variable needs no confirmation.
pub fn get_master_password_with_confirm() -> Result<SecretString, PassVaultError> {
    if let Some(key) = from_env() {
        return Ok(key);
    }
    if std::io::stdin().is_terminal() {
        let first = read_hidden("New master password")?;
        let second = read_hidden("Confirm master password")?;
        if first.expose_secret() != second.expose_secret() {
            return Err(PassVaultError::Validation(
                "passwords do not match".to_string(),
            ));
        }
        return Ok(first);
    }
    Err(no_source())
}

/// Prompt for an optional secret such as the panic password.
///
/// Returns `None` when stdin is not a terminal or the answer is empty.
pub fn get_optional_secret(label: &str) -> Result<Option<SecretString>, PassVaultError> {
    if !std::io::stdin().is_terminal() {
        return Ok(None);
    }
    let secret = read_hidden(label)?;
    Ok((!secret.expose_secret().is_empty()).then_some(secret))
}
