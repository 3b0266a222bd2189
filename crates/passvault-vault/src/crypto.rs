// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Low-level AES-256-GCM seal/open operations and the base64 envelope used on disk.
//!
//! Every call to [`seal`] generates a fresh random 96-bit nonce via the system
//! CSPRNG. Nonce reuse would be catastrophic for GCM security.

use base64::engine::general_purpose::STANDARD as B64;
use base64::Engine as _;
use passvault_core::PassVaultError;
use ring::aead::{Aad, LessSafeKey, Nonce, UnboundKey, AES_256_GCM};
use ring::rand::{SecureRandom, SystemRandom};

/// Length of a GCM nonce in bytes.
pub const NONCE_LEN: usize = 12;

/// Length of the GCM authentication tag appended to every ciphertext.
pub const TAG_LEN: usize = 16;

fn aead_key(key: &[u8; 32]) -> Result<LessSafeKey, PassVaultError> {
    let unbound = UnboundKey::new(&AES_256_GCM, key)
        .map_err(|_| PassVaultError::Crypto("failed to create AES-256-GCM key".to_string()))?;
    Ok(LessSafeKey::new(unbound))
}

/// Encrypt plaintext with AES-256-GCM using a random 96-bit nonce.
///
/// Returns `(ciphertext_with_tag, nonce_bytes)`.
pub fn seal(key: &[u8; 32], plaintext: &[u8]) -> Result<(Vec<u8>, [u8; NONCE_LEN]), PassVaultError> {
    let less_safe = aead_key(key)?;

    let rng = SystemRandom::new();
    let mut nonce_bytes = [0u8; NONCE_LEN];
    rng.fill(&mut nonce_bytes)
        .map_err(|_| PassVaultError::Crypto("failed to generate random nonce".to_string()))?;

    let nonce = Nonce::assume_unique_for_key(nonce_bytes);

    // Seal in place: plaintext buffer is extended with the authentication tag.
    let mut in_out = plaintext.to_vec();
    less_safe
        .seal_in_place_append_tag(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| PassVaultError::Crypto("AES-256-GCM encryption failed".to_string()))?;

    Ok((in_out, nonce_bytes))
}

/// Decrypt ciphertext with AES-256-GCM.
///
/// A wrong key and tampered data are indistinguishable and both yield
/// [`PassVaultError::DecryptionFailure`].
pub fn open(
    key: &[u8; 32],
    nonce_bytes: &[u8; NONCE_LEN],
    ciphertext: &[u8],
) -> Result<Vec<u8>, PassVaultError> {
    let less_safe = aead_key(key)?;
    let nonce = Nonce::assume_unique_for_key(*nonce_bytes);

    let mut in_out = ciphertext.to_vec();
    let plaintext = less_safe
        .open_in_place(nonce, Aad::empty(), &mut in_out)
        .map_err(|_| PassVaultError::DecryptionFailure)?;

    Ok(plaintext.to_vec())
}

/// Seal `plaintext` and encode it as `base64(nonce || ciphertext || tag)`.
pub fn seal_text(key: &[u8; 32], plaintext: &str) -> Result<String, PassVaultError> {
    let (ciphertext, nonce) = seal(key, plaintext.as_bytes())?;
    let mut packed = Vec::with_capacity(NONCE_LEN + ciphertext.len());
    packed.extend_from_slice(&nonce);
    packed.extend_from_slice(&ciphertext);
    Ok(B64.encode(packed))
}

/// Reverse of [`seal_text`].
pub fn open_text(key: &[u8; 32], sealed: &str) -> Result<String, PassVaultError> {
    let packed = B64
        .decode(sealed)
        .map_err(|_| PassVaultError::DecryptionFailure)?;
    if packed.len() < NONCE_LEN + TAG_LEN {
        return Err(PassVaultError::DecryptionFailure);
    }
    let (nonce, ciphertext) = packed.split_at(NONCE_LEN);
    let nonce: [u8; NONCE_LEN] = nonce
        .try_into()
        .map_err(|_| PassVaultError::DecryptionFailure)?;
    let plaintext = open(key, &nonce, ciphertext)?;
    String::from_utf8(plaintext).map_err(|_| PassVaultError::DecryptionFailure)
}

/// Generate `N` random bytes from the system CSPRNG.
pub fn random_bytes<const N: usize>() -> Result<[u8; N], PassVaultError> {
    let rng = SystemRandom::new();
    let mut out = [0u8; N];
    rng.fill(&mut out)
        .map_err(|_| PassVaultError::Crypto("system random source unavailable".to_string()))?;
    Ok(out)
}
