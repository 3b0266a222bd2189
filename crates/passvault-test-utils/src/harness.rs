// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for session-level integration testing.
//!
//! `TestHarness` assembles a vault session over a [`FlakyStore`] and a
//! [`MockCryptoEngine`], optionally backed by a temp SQLite database, with an
//! auto-lock monitor already running.

use std::sync::Arc;
use std::time::Duration;

use secrecy::SecretString;

use passvault_config::model::VaultConfig;
use passvault_core::{PassVaultError, PersistentStore, StoreKey};
use passvault_storage::{MemoryStore, SqliteStore};
use passvault_vault::{ActivityClock, AutoLockMonitor, VaultSession};

use crate::flaky_store::FlakyStore;
use crate::mock_crypto::MockCryptoEngine;

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    auto_lock_minutes: u32,
    tick: Duration,
    sqlite: bool,
    seed: Vec<(StoreKey, String)>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            auto_lock_minutes: 15,
            tick: Duration::from_secs(1),
            sqlite: false,
            seed: Vec::new(),
        }
    }

    pub fn with_auto_lock_minutes(mut self, minutes: u32) -> Self {
        self.auto_lock_minutes = minutes;
        self
    }

    pub fn with_tick(mut self, tick: Duration) -> Self {
        self.tick = tick;
        self
    }

    /// Back the session with a SQLite file in a temp directory.
    pub fn with_sqlite(mut self) -> Self {
        self.sqlite = true;
        self
    }

    /// Pre-populate the store before the session opens.
    pub fn with_stored(mut self, key: StoreKey, value: impl Into<String>) -> Self {
        self.seed.push((key, value.into()));
        self
    }

    pub async fn build(self) -> Result<TestHarness, PassVaultError> {
        let mut temp_dir = None;
        let inner: Arc<dyn PersistentStore> = if self.sqlite {
            let dir = tempfile::TempDir::new().map_err(PassVaultError::storage)?;
            let path = dir.path().join("vault.db");
            let store = SqliteStore::open(&path.to_string_lossy()).await?;
            for (key, value) in &self.seed {
                store.put(*key, value).await?;
            }
            temp_dir = Some(dir);
            Arc::new(store)
        } else {
            Arc::new(MemoryStore::with_values(self.seed))
        };

        let store = Arc::new(FlakyStore::new(inner));
        let engine = Arc::new(MockCryptoEngine::new());
        let config = VaultConfig {
            auto_lock_minutes: self.auto_lock_minutes,
            ..VaultConfig::default()
        };
        let session = Arc::new(VaultSession::open(store.clone(), engine.clone(), &config).await?);
        let clock = ActivityClock::new();
        let monitor = AutoLockMonitor::spawn(session.clone(), clock.clone(), self.tick);

        Ok(TestHarness {
            session,
            store,
            engine,
            clock,
            monitor: Some(monitor),
            _temp_dir: temp_dir,
        })
    }
}

/// A running session with handles on every collaborator.
pub struct TestHarness {
    pub session: Arc<VaultSession>,
    pub store: Arc<FlakyStore>,
    pub engine: Arc<MockCryptoEngine>,
    pub clock: ActivityClock,
    monitor: Option<AutoLockMonitor>,
    _temp_dir: Option<tempfile::TempDir>,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// A harness with defaults: in-memory store, 15 minute auto-lock.
    pub async fn new() -> Result<Self, PassVaultError> {
        Self::builder().build().await
    }

    /// Run setup with a master password and optional panic password.
    pub async fn setup(&self, master: &str, panic: Option<&str>) -> Result<(), PassVaultError> {
        self.session
            .setup(secret(master), panic.map(secret))
            .await
    }

    pub async fn unlock(&self, password: &str) -> Result<(), PassVaultError> {
        self.session.unlock(secret(password)).await
    }

    /// The raw persisted vault blob, if any.
    pub async fn persisted_blob(&self) -> Option<String> {
        self.store.get(StoreKey::Vault).await.ok().flatten()
    }

    /// Whether no key of the namespace holds a value.
    pub async fn store_is_empty(&self) -> bool {
        for key in StoreKey::ALL {
            if matches!(self.store.get(key).await, Ok(Some(_))) {
                return false;
            }
        }
        true
    }

    /// Stop the auto-lock monitor and wait for it.
    pub async fn stop_monitor(&mut self) {
        if let Some(monitor) = self.monitor.take() {
            monitor.shutdown().await;
        }
    }
}

/// Wrap a test string as a secret.
pub fn secret(value: &str) -> SecretString {
    SecretString::from(value.to_string())
}
