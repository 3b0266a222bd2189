// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the PassVault credential vault.
//!
//! This crate provides the error taxonomy, the item data model and its wire
//! encodings, the persistent store key namespace, and the two seam traits
//! ([`PersistentStore`], [`CryptoEngine`]) the session manager is built on.

pub mod error;
pub mod item;
pub mod traits;
pub mod types;
pub mod wire;

// Re-export key items at crate root for ergonomic imports.
pub use error::PassVaultError;
pub use item::{
    CardFields, Category, CookieFields, FlatItem, HistoryAction, HistoryEntry, ItemDraft, ItemId,
    ItemPayload, LoginFields, NoteFields, VaultItem,
};
pub use traits::{CryptoEngine, DecryptedVault, PersistentStore};
pub use types::{
    Confirmation, SessionState, Settings, StateChange, StoreKey, ThemeConfig, UserProfile,
};
pub use wire::{EncryptedItem, EncryptedVault, KdfParams, VaultBody};

/// Current time as epoch milliseconds.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_variants_render_without_detail_leaks() {
        assert_eq!(PassVaultError::DecryptionFailure.to_string(), "access denied");
        let err = PassVaultError::InvalidState {
            operation: "unlock",
            state: SessionState::Unlocked,
        };
        assert_eq!(err.to_string(), "cannot unlock while vault is Unlocked");
        let err = PassVaultError::ConfirmationRequired { action: "reset" };
        assert_eq!(err.to_string(), "reset requires explicit confirmation");
    }

    #[test]
    fn write_helper_wraps_source() {
        let err = PassVaultError::write(std::io::Error::other("disk full"));
        assert!(matches!(err, PassVaultError::StorageWrite { .. }));
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn now_millis_is_monotonic_enough() {
        let a = now_millis();
        let b = now_millis();
        assert!(b >= a);
        assert!(a > 1_600_000_000_000);
    }

    #[test]
    fn all_seams_are_object_safe() {
        fn _store(_: &dyn PersistentStore) {}
        fn _engine(_: &dyn CryptoEngine) {}
    }
}
