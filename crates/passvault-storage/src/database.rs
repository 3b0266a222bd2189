// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The SQLite handle behind [`SqliteStore`](crate::SqliteStore).
//!
//! One `tokio_rusqlite` connection per database; its background thread is the
//! only writer. Migrations run on open.

use std::path::Path;

use passvault_config::model::StorageConfig;
use passvault_core::PassVaultError;
use tracing::debug;

/// Convert a tokio-rusqlite error into a store read failure.
pub(crate) fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> PassVaultError {
    PassVaultError::storage(e)
}

/// Convert a tokio-rusqlite error into a store write failure.
pub(crate) fn map_tr_write_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> PassVaultError {
    PassVaultError::write(e)
}

/// Handle to the vault database.
pub struct Database {
    conn: tokio_rusqlite::Connection,
}

impl Database {
    /// Open (or create) the database at `path` in WAL mode and run migrations.
    pub async fn open(path: &str) -> Result<Self, PassVaultError> {
        Self::open_with(path, true).await
    }

    /// Open the database described by a storage config section.
    pub async fn open_with_config(config: &StorageConfig) -> Result<Self, PassVaultError> {
        Self::open_with(&config.database_path, config.wal_mode).await
    }

    async fn open_with(path: &str, wal_mode: bool) -> Result<Self, PassVaultError> {
        if let Some(parent) = Path::new(path).parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(PassVaultError::storage)?;
        }

        let conn = tokio_rusqlite::Connection::open(path)
            .await
            .map_err(|e| PassVaultError::Storage {
                source: e.to_string().into(),
            })?;
        let db = Self { conn };
        db.prepare(wal_mode).await?;
        debug!(path, wal_mode, "vault database opened");
        Ok(db)
    }

    /// Open a private in-memory database with the full schema.
    pub async fn open_in_memory() -> Result<Self, PassVaultError> {
        let conn = tokio_rusqlite::Connection::open_in_memory()
            .await
            .map_err(|e| PassVaultError::Storage {
                source: e.to_string().into(),
            })?;
        let db = Self { conn };
        db.prepare(false).await?;
        Ok(db)
    }

    async fn prepare(&self, wal_mode: bool) -> Result<(), PassVaultError> {
        self.conn
            .call(move |conn| -> Result<(), rusqlite::Error> {
                if wal_mode {
                    conn.execute_batch("PRAGMA journal_mode=WAL;")?;
                }
                conn.execute_batch("PRAGMA synchronous=NORMAL;")?;
                conn.busy_timeout(std::time::Duration::from_secs(5))?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;

        let applied = self
            .conn
            .call(|conn| crate::migrations::run_migrations(conn))
            .await
            .map_err(|e| PassVaultError::Storage {
                source: e.to_string().into(),
            })?;
        if applied > 0 {
            debug!(applied, "database migrations applied");
        }
        Ok(())
    }

    /// The single writer connection.
    pub fn connection(&self) -> &tokio_rusqlite::Connection {
        &self.conn
    }

    /// Checkpoint the WAL and close the connection.
    pub async fn close(self) -> Result<(), PassVaultError> {
        self.conn
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("PRAGMA wal_checkpoint(TRUNCATE);")?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        self.conn.close().await.map_err(|e| PassVaultError::Storage {
            source: e.to_string().into(),
        })?;
        debug!("vault database closed");
        Ok(())
    }
}
