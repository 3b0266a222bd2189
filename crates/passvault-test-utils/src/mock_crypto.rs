// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock crypto engine for deterministic testing.
//!
//! `MockCryptoEngine` implements `CryptoEngine` without any real cryptography:
//! fields are stored as-is and the password is checked through a marker in
//! the integrity tag. Every call yields once so tests can observe whether
//! two operations ever overlap.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;

use passvault_core::{
    CryptoEngine, DecryptedVault, EncryptedItem, EncryptedVault, FlatItem, PassVaultError,
    VaultBody, VaultItem,
};

const INTEGRITY_PREFIX: &str = "mock-integrity:";
const HASH_PREFIX: &str = "mock-hash:";

/// A reversible stand-in for the real engine.
#[derive(Debug, Default)]
pub struct MockCryptoEngine {
    fail_encrypt: AtomicBool,
    fail_decrypt: AtomicBool,
    encrypt_calls: AtomicUsize,
    decrypt_calls: AtomicUsize,
    hash_calls: AtomicUsize,
    salts_generated: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    existing_salts: Mutex<Vec<Option<String>>>,
}

struct InFlight<'a>(&'a AtomicUsize);

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::AcqRel);
    }
}

impl MockCryptoEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `encrypt` call fail.
    pub fn fail_next_encrypt(&self) {
        self.fail_encrypt.store(true, Ordering::Release);
    }

    /// Make the next `decrypt` call fail.
    pub fn fail_next_decrypt(&self) {
        self.fail_decrypt.store(true, Ordering::Release);
    }

    pub fn encrypt_calls(&self) -> usize {
        self.encrypt_calls.load(Ordering::Acquire)
    }

    pub fn decrypt_calls(&self) -> usize {
        self.decrypt_calls.load(Ordering::Acquire)
    }

    pub fn hash_calls(&self) -> usize {
        self.hash_calls.load(Ordering::Acquire)
    }

    /// Highest number of calls observed running at the same time.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::Acquire)
    }

    /// The `existing_salt` argument of every `encrypt` call, in order.
    pub async fn existing_salts(&self) -> Vec<Option<String>> {
        self.existing_salts.lock().await.clone()
    }

    /// The digest `hash` returns for `input`.
    pub fn digest_of(input: &str) -> String {
        format!("{HASH_PREFIX}{input}")
    }

    async fn enter(&self) -> InFlight<'_> {
        let now = self.in_flight.fetch_add(1, Ordering::AcqRel) + 1;
        self.max_in_flight.fetch_max(now, Ordering::AcqRel);
        tokio::task::yield_now().await;
        InFlight(&self.in_flight)
    }
}

fn to_wire(item: &VaultItem) -> Result<EncryptedItem, PassVaultError> {
    let flat = FlatItem::from(item);
    let history =
        serde_json::to_string(&flat.history).map_err(|e| PassVaultError::Crypto(e.to_string()))?;
    Ok(EncryptedItem {
        id: flat.id,
        category: flat.category,
        folder: flat.folder,
        color: flat.color,
        created_at: flat.created_at,
        updated_at: flat.updated_at,
        name: flat.name,
        username: flat.username,
        password: Some(flat.password),
        website: Some(flat.website),
        notes: Some(flat.notes),
        history: Some(history),
    })
}

fn from_wire(item: &EncryptedItem) -> Result<VaultItem, PassVaultError> {
    let history = match &item.history {
        Some(json) => serde_json::from_str(json).map_err(|_| PassVaultError::DecryptionFailure)?,
        None => Vec::new(),
    };
    VaultItem::try_from(FlatItem {
        id: item.id.clone(),
        name: item.name.clone(),
        username: item.username.clone(),
        password: item.password.clone().unwrap_or_default(),
        website: item.website.clone().unwrap_or_default(),
        notes: item.notes.clone().unwrap_or_default(),
        category: item.category.clone(),
        folder: item.folder.clone(),
        color: item.color.clone(),
        created_at: item.created_at,
        updated_at: item.updated_at,
        history,
    })
}

#[async_trait]
impl CryptoEngine for MockCryptoEngine {
    async fn encrypt(
        &self,
        items: &[VaultItem],
        api_key: &SecretString,
        password: &SecretString,
        existing_salt: Option<&str>,
    ) -> Result<EncryptedVault, PassVaultError> {
        let _guard = self.enter().await;
        self.encrypt_calls.fetch_add(1, Ordering::AcqRel);
        self.existing_salts
            .lock()
            .await
            .push(existing_salt.map(str::to_owned));
        if self.fail_encrypt.swap(false, Ordering::AcqRel) {
            return Err(PassVaultError::Crypto("injected encrypt failure".to_string()));
        }

        let salt = match existing_salt {
            Some(salt) => salt.to_owned(),
            None => {
                let n = self.salts_generated.fetch_add(1, Ordering::AcqRel);
                format!("mock-salt-{n}")
            }
        };
        let api_key = api_key.expose_secret();
        Ok(EncryptedVault {
            salt,
            kdf: None,
            body: VaultBody::Fields {
                integrity: format!("{INTEGRITY_PREFIX}{}", password.expose_secret()),
                items: items.iter().map(to_wire).collect::<Result<_, _>>()?,
                encrypted_api_key: (!api_key.is_empty()).then(|| api_key.to_owned()),
            },
        })
    }

    async fn decrypt(
        &self,
        vault: &EncryptedVault,
        password: &SecretString,
    ) -> Result<DecryptedVault, PassVaultError> {
        let _guard = self.enter().await;
        self.decrypt_calls.fetch_add(1, Ordering::AcqRel);
        if self.fail_decrypt.swap(false, Ordering::AcqRel) {
            return Err(PassVaultError::DecryptionFailure);
        }

        match &vault.body {
            VaultBody::Fields {
                integrity,
                items,
                encrypted_api_key,
            } => {
                if integrity.strip_prefix(INTEGRITY_PREFIX) != Some(password.expose_secret()) {
                    return Err(PassVaultError::DecryptionFailure);
                }
                Ok(DecryptedVault {
                    items: items.iter().map(from_wire).collect::<Result<_, _>>()?,
                    api_key: SecretString::from(encrypted_api_key.clone().unwrap_or_default()),
                })
            }
            VaultBody::Legacy { iv, data } => {
                // Legacy mock blobs carry the password in `iv` and flat items in `data`.
                if iv != password.expose_secret() {
                    return Err(PassVaultError::DecryptionFailure);
                }
                let flat: Vec<FlatItem> =
                    serde_json::from_str(data).map_err(|_| PassVaultError::DecryptionFailure)?;
                Ok(DecryptedVault {
                    items: flat
                        .into_iter()
                        .map(VaultItem::try_from)
                        .collect::<Result<_, _>>()?,
                    api_key: SecretString::from(String::new()),
                })
            }
        }
    }

    async fn hash(&self, input: &SecretString) -> Result<String, PassVaultError> {
        let _guard = self.enter().await;
        self.hash_calls.fetch_add(1, Ordering::AcqRel);
        Ok(Self::digest_of(input.expose_secret()))
    }
}
