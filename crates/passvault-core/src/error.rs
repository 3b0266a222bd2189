// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the PassVault credential vault.

use thiserror::Error;

use crate::types::SessionState;

/// The primary error type used across the store and crypto seams and every
/// session operation.
#[derive(Debug, Error)]
pub enum PassVaultError {
    /// Passphrase or input rules violated (setup, item drafts, settings).
    #[error("validation error: {0}")]
    Validation(String),

    /// Wrong password or corrupted ciphertext. Deliberately carries no detail.
    #[error("access denied")]
    DecryptionFailure,

    /// A write to the persistent store failed. In-memory state was not advanced.
    #[error("storage write failed: {source}")]
    StorageWrite {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A read or clear against the persistent store failed.
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A backup artifact is not a valid vault encoding.
    #[error("invalid backup artifact: {0}")]
    ImportFormat(String),

    /// A destructive action was attempted without an affirmative confirmation.
    #[error("{action} requires explicit confirmation")]
    ConfirmationRequired { action: &'static str },

    /// The operation is not valid in the current lifecycle state.
    #[error("cannot {operation} while vault is {state}")]
    InvalidState {
        operation: &'static str,
        state: SessionState,
    },

    /// Export was refused (nothing persisted, or session cannot export).
    #[error("nothing to export")]
    ExportRefused,

    /// Bulk import parsed zero usable records.
    #[error("no valid records found")]
    NoValidRecords,

    /// Crypto engine failure unrelated to authentication (RNG, KDF params, encoding).
    #[error("crypto error: {0}")]
    Crypto(String),

    /// Configuration errors.
    #[error("configuration error: {0}")]
    Config(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PassVaultError {
    /// Wrap any error as a store write failure.
    pub fn write<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::StorageWrite {
            source: Box::new(err),
        }
    }

    /// Wrap any error as a store read failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
