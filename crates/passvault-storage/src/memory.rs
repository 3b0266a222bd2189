// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Volatile in-memory implementation of [`PersistentStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use passvault_core::{PassVaultError, PersistentStore, StoreKey};

/// A [`PersistentStore`] backed by a map. Nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<StoreKey, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a store with existing values.
    pub fn with_values<I>(values: I) -> Self
    where
        I: IntoIterator<Item = (StoreKey, String)>,
    {
        Self {
            values: RwLock::new(values.into_iter().collect()),
        }
    }

    /// Copy of every stored value.
    pub async fn snapshot(&self) -> HashMap<StoreKey, String> {
        self.values.read().await.clone()
    }
}

#[async_trait]
impl PersistentStore for MemoryStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, PassVaultError> {
        Ok(self.values.read().await.get(&key).cloned())
    }

    async fn put(&self, key: StoreKey, value: &str) -> Result<(), PassVaultError> {
        self.values.write().await.insert(key, value.to_string());
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), PassVaultError> {
        self.values.write().await.remove(&key);
        Ok(())
    }

    async fn clear(&self) -> Result<(), PassVaultError> {
        self.values.write().await.clear();
        Ok(())
    }
}
