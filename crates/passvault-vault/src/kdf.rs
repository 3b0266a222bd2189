// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Argon2id key derivation from a passphrase.
//!
//! Derives a 32-byte key using Argon2id (Algorithm::Argon2id, Version::V0x13).
//! The parameters travel with the vault so later config changes do not strand it.

use passvault_config::model::VaultConfig;
use passvault_config::validation::{
    MAX_KDF_ITERATIONS, MAX_KDF_MEMORY_COST, MAX_KDF_PARALLELISM, MIN_KDF_ITERATIONS,
    MIN_KDF_MEMORY_COST,
};
use passvault_core::{KdfParams, PassVaultError};
use zeroize::Zeroizing;

/// Salt length for freshly created vaults.
pub const SALT_LEN: usize = 16;

/// Shortest salt accepted when reading an existing vault.
pub const MIN_SALT_LEN: usize = 8;

/// Parameters used for vaults that predate the `kdf` record.
pub const LEGACY_PARAMS: KdfParams = KdfParams {
    memory_cost: 65536,
    iterations: 3,
    parallelism: 4,
};

/// Extract KDF parameters from the `[vault]` config section.
pub fn params_from_config(config: &VaultConfig) -> KdfParams {
    KdfParams {
        memory_cost: config.kdf_memory_cost,
        iterations: config.kdf_iterations,
        parallelism: config.kdf_parallelism,
    }
}

/// Reject parameters outside the range a vault may be written with.
///
/// Vault files carry their own parameters, so they are untrusted input.
pub fn check_params(params: KdfParams) -> Result<(), PassVaultError> {
    let in_range = (MIN_KDF_MEMORY_COST..=MAX_KDF_MEMORY_COST).contains(&params.memory_cost)
        && (MIN_KDF_ITERATIONS..=MAX_KDF_ITERATIONS).contains(&params.iterations)
        && (1..=MAX_KDF_PARALLELISM).contains(&params.parallelism);
    if in_range {
        Ok(())
    } else {
        Err(PassVaultError::Crypto(format!(
            "Argon2id parameters out of range: memory {} KiB, {} iterations, {} lanes",
            params.memory_cost, params.iterations, params.parallelism
        )))
    }
}

/// Derive a 32-byte key from passphrase using Argon2id.
///
/// The returned key is wrapped in [`Zeroizing`] for automatic memory zeroing
/// on drop.
pub fn derive_key(
    passphrase: &[u8],
    salt: &[u8],
    params: KdfParams,
) -> Result<Zeroizing<[u8; 32]>, PassVaultError> {
    if salt.len() < MIN_SALT_LEN {
        return Err(PassVaultError::Crypto(format!(
            "salt must be at least {MIN_SALT_LEN} bytes, got {}",
            salt.len()
        )));
    }
    check_params(params)?;

    let argon_params = argon2::Params::new(
        params.memory_cost,
        params.iterations,
        params.parallelism,
        Some(32),
    )
    .map_err(|e| PassVaultError::Crypto(format!("invalid Argon2id parameters: {e}")))?;

    let argon2 = argon2::Argon2::new(
        argon2::Algorithm::Argon2id,
        argon2::Version::V0x13,
        argon_params,
    );

    let mut output = Zeroizing::new([0u8; 32]);
    argon2
        .hash_password_into(passphrase, salt, output.as_mut())
        .map_err(|e| PassVaultError::Crypto(format!("Argon2id key derivation failed: {e}")))?;

    Ok(output)
}

/// Generate a random salt for a new vault.
pub fn generate_salt() -> Result<[u8; SALT_LEN], PassVaultError> {
    crate::crypto::random_bytes::<SALT_LEN>()
}
