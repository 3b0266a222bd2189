// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! On-disk vault encodings.
//!
//! A persisted vault always carries a `salt` and exactly one body shape:
//! the legacy single ciphertext blob (`iv` + `data`), or the field-level
//! shape (`items` + `integrity`, optional `encryptedApiKey`).

use serde::{Deserialize, Serialize};

/// Key derivation parameters recorded alongside the salt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KdfParams {
    /// Argon2id memory cost in KiB.
    pub memory_cost: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

/// The persisted, encrypted vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedVault {
    /// Base64 KDF salt. Generated once per vault lifetime.
    pub salt: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
    #[serde(flatten)]
    pub body: VaultBody,
}

/// The two accepted body shapes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VaultBody {
    /// Each item's sensitive fields individually ciphered.
    Fields {
        integrity: String,
        items: Vec<EncryptedItem>,
        #[serde(
            rename = "encryptedApiKey",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        encrypted_api_key: Option<String>,
    },
    /// One ciphertext blob covering the whole item collection.
    Legacy { iv: String, data: String },
}

impl EncryptedVault {
    pub fn is_legacy(&self) -> bool {
        matches!(self.body, VaultBody::Legacy { .. })
    }

    /// Number of items, when visible without decryption.
    pub fn item_count(&self) -> Option<usize> {
        match &self.body {
            VaultBody::Fields { items, .. } => Some(items.len()),
            VaultBody::Legacy { .. } => None,
        }
    }
}

/// One item with its sensitive fields ciphered.
///
/// Identity, category, folder, color and timestamps stay in clear text so the
/// collection can be indexed without the key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EncryptedItem {
    pub id: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,

    pub name: String,
    pub username: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub history: Option<String>,
}
