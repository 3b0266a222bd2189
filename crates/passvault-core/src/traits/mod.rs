// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Seam traits between the session manager and its collaborators.
//!
//! Both traits use `#[async_trait]` for dynamic dispatch so the session
//! manager can hold `Arc<dyn ...>` and tests can substitute fakes.

pub mod crypto;
pub mod store;

pub use crypto::{CryptoEngine, DecryptedVault};
pub use store::PersistentStore;
