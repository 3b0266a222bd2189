// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Store wrapper that fails writes on demand.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;

use passvault_core::{PassVaultError, PersistentStore, StoreKey};

/// Delegates to an inner store, except for injected `put` failures.
pub struct FlakyStore {
    inner: Arc<dyn PersistentStore>,
    fail_next_put: AtomicBool,
    fail_all_puts: AtomicBool,
    fail_clears: AtomicBool,
    puts: AtomicUsize,
}

impl FlakyStore {
    pub fn new(inner: Arc<dyn PersistentStore>) -> Self {
        Self {
            inner,
            fail_next_put: AtomicBool::new(false),
            fail_all_puts: AtomicBool::new(false),
            fail_clears: AtomicBool::new(false),
            puts: AtomicUsize::new(0),
        }
    }

    pub fn fail_next_put(&self) {
        self.fail_next_put.store(true, Ordering::Release);
    }

    /// Fail every `put` until called again with `false`.
    pub fn fail_puts(&self, fail: bool) {
        self.fail_all_puts.store(fail, Ordering::Release);
    }

    /// Fail every `clear` until called again with `false`.
    pub fn fail_clears(&self, fail: bool) {
        self.fail_clears.store(fail, Ordering::Release);
    }

    /// Number of successful writes.
    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::Acquire)
    }
}

#[async_trait]
impl PersistentStore for FlakyStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, PassVaultError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: StoreKey, value: &str) -> Result<(), PassVaultError> {
        if self.fail_next_put.swap(false, Ordering::AcqRel)
            || self.fail_all_puts.load(Ordering::Acquire)
        {
            return Err(PassVaultError::write(std::io::Error::other(format!(
                "injected write failure for {key}"
            ))));
        }
        self.inner.put(key, value).await?;
        self.puts.fetch_add(1, Ordering::AcqRel);
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), PassVaultError> {
        self.inner.remove(key).await
    }

    async fn clear(&self) -> Result<(), PassVaultError> {
        if self.fail_clears.load(Ordering::Acquire) {
            return Err(PassVaultError::write(std::io::Error::other(
                "injected clear failure",
            )));
        }
        self.inner.clear().await
    }
}
