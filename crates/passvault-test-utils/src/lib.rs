// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for PassVault integration tests.
//!
//! Provides fakes for the two session seams and a harness that wires them
//! into a running session, so tests are fast and deterministic.
//!
//! # Components
//!
//! - [`MockCryptoEngine`] - Reversible engine with failure injection and call tracking
//! - [`FlakyStore`] - Store wrapper that fails writes on demand
//! - [`TestHarness`] - Session, store, engine, and auto-lock monitor in one place

pub mod flaky_store;
pub mod harness;
pub mod mock_crypto;

pub use flaky_store::FlakyStore;
pub use harness::TestHarness;
pub use mock_crypto::MockCryptoEngine;
