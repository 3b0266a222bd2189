// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The built-in [`CryptoEngine`]: Argon2id key derivation with per-field
//! AES-256-GCM ciphering, plus a reader for legacy single-blob vaults.
//!
//! Each sensitive field is sealed independently as `base64(nonce || ct || tag)`.
//! The `integrity` value is a sealed SHA-256 digest over the serialized
//! encrypted items and API key, so reordering, dropping, or editing any
//! clear-text envelope field fails decryption the same way a wrong password does.
//!
//! Key derivation runs on the blocking pool.

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use tracing::debug;
use zeroize::Zeroizing;

use passvault_config::model::VaultConfig;
use passvault_core::{
    CryptoEngine, DecryptedVault, EncryptedItem, EncryptedVault, FlatItem, HistoryEntry,
    KdfParams, PassVaultError, VaultBody, VaultItem,
};

use crate::crypto::{self, NONCE_LEN};
use crate::kdf;

const INTEGRITY_PREFIX: &str = "pv-integrity-v1:";
const RECOVERY_HASH_DOMAIN: &[u8] = b"passvault-recovery-v1\0";

/// Field-level vault cipher backed by `argon2` and `ring`.
#[derive(Debug, Clone, Copy)]
pub struct FieldCipherEngine {
    params: KdfParams,
}

impl FieldCipherEngine {
    pub fn new(params: KdfParams) -> Self {
        Self { params }
    }

    pub fn from_config(config: &VaultConfig) -> Self {
        Self::new(kdf::params_from_config(config))
    }

    pub fn params(&self) -> KdfParams {
        self.params
    }
}

#[async_trait]
impl CryptoEngine for FieldCipherEngine {
    async fn encrypt(
        &self,
        items: &[VaultItem],
        api_key: &SecretString,
        password: &SecretString,
        existing_salt: Option<&str>,
    ) -> Result<EncryptedVault, PassVaultError> {
        let flat: Vec<FlatItem> = items.iter().map(FlatItem::from).collect();
        let api_key = Zeroizing::new(api_key.expose_secret().to_owned());
        let password = Zeroizing::new(password.expose_secret().to_owned());
        let existing_salt = existing_salt.map(str::to_owned);
        let params = self.params;

        let vault = tokio::task::spawn_blocking(move || {
            encrypt_blocking(&flat, &api_key, &password, existing_salt.as_deref(), params)
        })
        .await
        .map_err(|e| PassVaultError::Internal(format!("encryption task failed: {e}")))??;

        debug!(items = items.len(), "vault encrypted");
        Ok(vault)
    }

    async fn decrypt(
        &self,
        vault: &EncryptedVault,
        password: &SecretString,
    ) -> Result<DecryptedVault, PassVaultError> {
        let vault = vault.clone();
        let password = Zeroizing::new(password.expose_secret().to_owned());
        let fallback = self.params;

        tokio::task::spawn_blocking(move || decrypt_blocking(&vault, &password, fallback))
            .await
            .map_err(|e| PassVaultError::Internal(format!("decryption task failed: {e}")))?
    }

    async fn hash(&self, input: &SecretString) -> Result<String, PassVaultError> {
        let mut hasher = Sha256::new();
        hasher.update(RECOVERY_HASH_DOMAIN);
        hasher.update(input.expose_secret().as_bytes());
        Ok(hex::encode(hasher.finalize()))
    }
}

fn encrypt_blocking(
    items: &[FlatItem],
    api_key: &str,
    password: &str,
    existing_salt: Option<&str>,
    params: KdfParams,
) -> Result<EncryptedVault, PassVaultError> {
    let salt = match existing_salt {
        Some(salt) => salt.to_owned(),
        None => B64.encode(kdf::generate_salt()?),
    };
    let salt_bytes = B64
        .decode(&salt)
        .map_err(|_| PassVaultError::Crypto("stored salt is not valid base64".to_string()))?;
    let key = kdf::derive_key(password.as_bytes(), &salt_bytes, params)?;

    let sealed_items = items
        .iter()
        .map(|item| seal_item(&key, item))
        .collect::<Result<Vec<_>, _>>()?;

    let encrypted_api_key = if api_key.is_empty() {
        None
    } else {
        Some(crypto::seal_text(&key, api_key)?)
    };

    let digest = integrity_digest(&sealed_items, encrypted_api_key.as_deref())?;
    let integrity = crypto::seal_text(&key, &format!("{INTEGRITY_PREFIX}{digest}"))?;

    Ok(EncryptedVault {
        salt,
        kdf: Some(params),
        body: VaultBody::Fields {
            integrity,
            items: sealed_items,
            encrypted_api_key,
        },
    })
}

fn seal_item(key: &[u8; 32], item: &FlatItem) -> Result<EncryptedItem, PassVaultError> {
    let optional = |value: &str| -> Result<Option<String>, PassVaultError> {
        if value.is_empty() {
            Ok(None)
        } else {
            crypto::seal_text(key, value).map(Some)
        }
    };

    let history = if item.history.is_empty() {
        None
    } else {
        let json = serde_json::to_string(&item.history)
            .map_err(|e| PassVaultError::Crypto(format!("history encoding failed: {e}")))?;
        Some(crypto::seal_text(key, &json)?)
    };

    Ok(EncryptedItem {
        id: item.id.clone(),
        category: item.category.clone(),
        folder: item.folder.clone(),
        color: item.color.clone(),
        created_at: item.created_at,
        updated_at: item.updated_at,
        name: crypto::seal_text(key, &item.name)?,
        username: crypto::seal_text(key, &item.username)?,
        password: optional(&item.password)?,
        website: optional(&item.website)?,
        notes: optional(&item.notes)?,
        history,
    })
}

fn integrity_digest(
    items: &[EncryptedItem],
    encrypted_api_key: Option<&str>,
) -> Result<String, PassVaultError> {
    let encoded = serde_json::to_vec(items)
        .map_err(|e| PassVaultError::Crypto(format!("integrity encoding failed: {e}")))?;
    let mut hasher = Sha256::new();
    hasher.update(&encoded);
    hasher.update([0u8]);
    hasher.update(encrypted_api_key.unwrap_or_default().as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn decrypt_blocking(
    vault: &EncryptedVault,
    password: &str,
    fallback: KdfParams,
) -> Result<DecryptedVault, PassVaultError> {
    let salt = B64
        .decode(&vault.salt)
        .map_err(|_| PassVaultError::DecryptionFailure)?;
    let params = vault.kdf.unwrap_or(if vault.is_legacy() {
        kdf::LEGACY_PARAMS
    } else {
        fallback
    });
    let key = kdf::derive_key(password.as_bytes(), &salt, params)
        .map_err(|_| PassVaultError::DecryptionFailure)?;

    match &vault.body {
        VaultBody::Fields {
            integrity,
            items,
            encrypted_api_key,
        } => {
            let sealed_digest = crypto::open_text(&key, integrity)?;
            let expected = integrity_digest(items, encrypted_api_key.as_deref())?;
            if sealed_digest.strip_prefix(INTEGRITY_PREFIX) != Some(expected.as_str()) {
                debug!("vault integrity value does not match its items");
                return Err(PassVaultError::DecryptionFailure);
            }

            let items = items
                .iter()
                .map(|sealed| open_item(&key, sealed))
                .collect::<Result<Vec<_>, _>>()?;
            let api_key = match encrypted_api_key {
                Some(sealed) => crypto::open_text(&key, sealed)?,
                None => String::new(),
            };
            Ok(DecryptedVault {
                items,
                api_key: SecretString::from(api_key),
            })
        }
        VaultBody::Legacy { iv, data } => {
            let nonce: [u8; NONCE_LEN] = B64
                .decode(iv)
                .ok()
                .and_then(|bytes| bytes.try_into().ok())
                .ok_or(PassVaultError::DecryptionFailure)?;
            let ciphertext = B64
                .decode(data)
                .map_err(|_| PassVaultError::DecryptionFailure)?;
            let plaintext = Zeroizing::new(crypto::open(&key, &nonce, &ciphertext)?);
            let payload: LegacyPayload = serde_json::from_slice(&plaintext)
                .map_err(|_| PassVaultError::DecryptionFailure)?;
            let (flat, api_key) = match payload {
                LegacyPayload::Items(items) => (items, String::new()),
                LegacyPayload::Bundle { items, api_key } => (items, api_key),
            };
            let items = flat
                .into_iter()
                .map(|f| VaultItem::try_from(f).map_err(|_| PassVaultError::DecryptionFailure))
                .collect::<Result<Vec<_>, _>>()?;
            debug!(items = items.len(), "legacy vault decrypted");
            Ok(DecryptedVault {
                items,
                api_key: SecretString::from(api_key),
            })
        }
    }
}

/// Plaintext of a legacy blob: a bare item array, or items plus the API key.
#[derive(Deserialize)]
#[serde(untagged)]
enum LegacyPayload {
    Items(Vec<FlatItem>),
    Bundle {
        items: Vec<FlatItem>,
        #[serde(default, rename = "apiKey")]
        api_key: String,
    },
}

fn open_item(key: &[u8; 32], sealed: &EncryptedItem) -> Result<VaultItem, PassVaultError> {
    let optional = |value: &Option<String>| -> Result<String, PassVaultError> {
        match value {
            Some(v) => crypto::open_text(key, v),
            None => Ok(String::new()),
        }
    };

    let history: Vec<HistoryEntry> = match &sealed.history {
        Some(v) => serde_json::from_str(&crypto::open_text(key, v)?)
            .map_err(|_| PassVaultError::DecryptionFailure)?,
        None => Vec::new(),
    };

    let flat = FlatItem {
        id: sealed.id.clone(),
        name: crypto::open_text(key, &sealed.name)?,
        username: crypto::open_text(key, &sealed.username)?,
        password: optional(&sealed.password)?,
        website: optional(&sealed.website)?,
        notes: optional(&sealed.notes)?,
        category: sealed.category.clone(),
        folder: sealed.folder.clone(),
        color: sealed.color.clone(),
        created_at: sealed.created_at,
        updated_at: sealed.updated_at,
        history,
    };
    VaultItem::try_from(flat).map_err(|_| PassVaultError::DecryptionFailure)
}
