// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the [`PersistentStore`] trait.

use async_trait::async_trait;
use rusqlite::params;
use tracing::debug;

use passvault_core::{PassVaultError, PersistentStore, StoreKey};

use crate::database::{map_tr_err, map_tr_write_err, Database};

/// SQLite-backed key/value store.
///
/// Every `put` is a single UPSERT statement, so readers see either the old or
/// the new value.
pub struct SqliteStore {
    db: Database,
}

impl SqliteStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Open the database at `path` and wrap it.
    pub async fn open(path: &str) -> Result<Self, PassVaultError> {
        Ok(Self::new(Database::open(path).await?))
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Checkpoint and close the underlying database.
    pub async fn close(self) -> Result<(), PassVaultError> {
        self.db.close().await
    }
}

#[async_trait]
impl PersistentStore for SqliteStore {
    async fn get(&self, key: StoreKey) -> Result<Option<String>, PassVaultError> {
        let key = key.as_str();
        self.db
            .connection()
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT value FROM kv_store WHERE key = ?1")?;
                let result = stmt.query_row(params![key], |row| row.get::<_, String>(0));
                match result {
                    Ok(value) => Ok(Some(value)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e),
                }
            })
            .await
            .map_err(map_tr_err)
    }

    async fn put(&self, key: StoreKey, value: &str) -> Result<(), PassVaultError> {
        let raw_key = key.as_str();
        let value = value.to_string();
        let len = value.len();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO kv_store (key, value, updated_at)
                     VALUES (?1, ?2, strftime('%Y-%m-%dT%H:%M:%fZ', 'now'))
                     ON CONFLICT(key) DO UPDATE SET
                        value = excluded.value,
                        updated_at = excluded.updated_at",
                    params![raw_key, value],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_write_err)?;
        debug!(key = raw_key, bytes = len, "store value written");
        Ok(())
    }

    async fn remove(&self, key: StoreKey) -> Result<(), PassVaultError> {
        let raw_key = key.as_str();
        self.db
            .connection()
            .call(move |conn| {
                conn.execute("DELETE FROM kv_store WHERE key = ?1", params![raw_key])?;
                Ok(())
            })
            .await
            .map_err(map_tr_write_err)
    }

    async fn clear(&self) -> Result<(), PassVaultError> {
        let removed = self
            .db
            .connection()
            .call(|conn| -> Result<usize, rusqlite::Error> {
                let tx = conn.transaction()?;
                let mut removed = 0;
                for key in StoreKey::ALL {
                    removed +=
                        tx.execute("DELETE FROM kv_store WHERE key = ?1", params![key.as_str()])?;
                }
                tx.commit()?;
                Ok(removed)
            })
            .await
            .map_err(map_tr_write_err)?;
        debug!(removed, "store namespace cleared");
        Ok(())
    }
}
