// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Crypto engine trait: key derivation, vault encryption, and one-way hashing.

use async_trait::async_trait;
use secrecy::SecretString;

use crate::error::PassVaultError;
use crate::item::VaultItem;
use crate::wire::EncryptedVault;

/// The plaintext recovered from an [`EncryptedVault`].
pub struct DecryptedVault {
    pub items: Vec<VaultItem>,
    pub api_key: SecretString,
}

impl std::fmt::Debug for DecryptedVault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecryptedVault")
            .field("items", &self.items.len())
            .field("api_key", &"[REDACTED]")
            .finish()
    }
}

/// Cryptographic operations consumed by the session manager.
#[async_trait]
pub trait CryptoEngine: Send + Sync + 'static {
    /// Encrypt the full collection and API key under `password`.
    ///
    /// When `existing_salt` is given it must be reused verbatim; a fresh salt
    /// is generated only when it is `None` (first-ever save).
    async fn encrypt(
        &self,
        items: &[VaultItem],
        api_key: &SecretString,
        password: &SecretString,
        existing_salt: Option<&str>,
    ) -> Result<EncryptedVault, PassVaultError>;

    /// Decrypt either vault shape.
    ///
    /// Wrong passwords and failed integrity checks both return
    /// [`PassVaultError::DecryptionFailure`].
    async fn decrypt(
        &self,
        vault: &EncryptedVault,
        password: &SecretString,
    ) -> Result<DecryptedVault, PassVaultError>;

    /// One-way digest used only for panic-password comparison.
    async fn hash(&self, input: &SecretString) -> Result<String, PassVaultError>;
}
