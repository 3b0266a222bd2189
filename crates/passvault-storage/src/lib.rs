// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persistent key/value stores for the PassVault credential vault.
//!
//! [`SqliteStore`] keeps the namespace in a single WAL-mode SQLite table with
//! embedded migrations and a single-writer connection via `tokio-rusqlite`.
//! [`MemoryStore`] is a volatile map used for tests and throwaway sessions.

pub mod database;
pub mod memory;
pub mod migrations;
pub mod sqlite;

pub use database::Database;
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
