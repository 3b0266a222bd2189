// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The PassVault credential vault.
//!
//! Items are encrypted field by field under a key derived from the master
//! password via Argon2id, with AES-256-GCM for every sealed value. The
//! [`VaultSession`] owns the lifecycle (setup, unlock, logout, reset), all
//! item mutations, and backup import/export; the [`AutoLockMonitor`] locks it
//! after a period without interaction.

pub mod autolock;
pub mod backup;
pub mod cookies;
pub mod crypto;
pub mod engine;
pub mod generator;
pub mod health;
pub mod kdf;
pub mod prompt;
pub mod session;

pub use autolock::{ActivityClock, AutoLockMonitor, Interaction};
pub use backup::BackupArtifact;
pub use cookies::ImportReport;
pub use engine::FieldCipherEngine;
pub use generator::GeneratorOptions;
pub use health::HealthReport;
pub use prompt::get_master_password;
pub use session::{SessionMode, VaultSession};
