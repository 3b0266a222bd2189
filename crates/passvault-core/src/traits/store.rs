// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent store trait: client-local key/value storage with no business logic.

use async_trait::async_trait;

use crate::error::PassVaultError;
use crate::types::StoreKey;

/// A key/value store holding JSON text under the [`StoreKey`] namespace.
///
/// Implementations must make each `put` atomic: a reader observes either the
/// previous value or the new one, never a partial write. Write failures are
/// reported as [`PassVaultError::StorageWrite`].
#[async_trait]
pub trait PersistentStore: Send + Sync + 'static {
    /// Read the value under `key`, if any.
    async fn get(&self, key: StoreKey) -> Result<Option<String>, PassVaultError>;

    /// Overwrite the value under `key`.
    async fn put(&self, key: StoreKey, value: &str) -> Result<(), PassVaultError>;

    /// Remove the value under `key`. Removing an absent key is not an error.
    async fn remove(&self, key: StoreKey) -> Result<(), PassVaultError>;

    /// Remove every key in the namespace.
    async fn clear(&self) -> Result<(), PassVaultError>;

    /// Whether a value exists under `key`.
    async fn contains(&self, key: StoreKey) -> Result<bool, PassVaultError> {
        Ok(self.get(key).await?.is_some())
    }
}
