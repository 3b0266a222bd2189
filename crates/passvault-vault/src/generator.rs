// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Random password generation.

use std::ops::RangeInclusive;

use passvault_core::PassVaultError;
use rand::rngs::OsRng;
use rand::Rng;
use secrecy::SecretString;

pub const UPPERCASE: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";
pub const LOWERCASE: &str = "abcdefghijklmnopqrstuvwxyz";
pub const NUMBERS: &str = "0123456789";
pub const SYMBOLS: &str = "!@#$%^&*()_+~`|}{[]:;?><,./-=";

pub const LENGTH_RANGE: RangeInclusive<usize> = 4..=128;
pub const DEFAULT_LENGTH: usize = 16;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GeneratorOptions {
    pub length: usize,
    pub uppercase: bool,
    pub lowercase: bool,
    pub numbers: bool,
    pub symbols: bool,
}

impl Default for GeneratorOptions {
    fn default() -> Self {
        Self {
            length: DEFAULT_LENGTH,
            uppercase: true,
            lowercase: true,
            numbers: true,
            symbols: true,
        }
    }
}

impl GeneratorOptions {
    fn charset(&self) -> Vec<char> {
        [
            (self.uppercase, UPPERCASE),
            (self.lowercase, LOWERCASE),
            (self.numbers, NUMBERS),
            (self.symbols, SYMBOLS),
        ]
        .into_iter()
        .filter(|(enabled, _)| *enabled)
        .flat_map(|(_, chars)| chars.chars())
        .collect()
    }
}

/// Generate a password drawing each character uniformly from the enabled sets.
pub fn generate(options: &GeneratorOptions) -> Result<SecretString, PassVaultError> {
    generate_with(options, &mut OsRng)
}

fn generate_with<R: Rng + ?Sized>(
    options: &GeneratorOptions,
    rng: &mut R,
) -> Result<SecretString, PassVaultError> {
    if !LENGTH_RANGE.contains(&options.length) {
        return Err(PassVaultError::Validation(format!(
            "password length must be between {} and {}, got {}",
            LENGTH_RANGE.start(),
            LENGTH_RANGE.end(),
            options.length
        )));
    }
    let charset = options.charset();
    if charset.is_empty() {
        return Err(PassVaultError::Validation(
            "select at least one character set".to_string(),
        ));
    }

    let password: String = (0..options.length)
        .map(|_| charset[rng.gen_range(0..charset.len())])
        .collect();
    Ok(SecretString::from(password))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use secrecy::ExposeSecret;

    #[test]
    fn default_options_produce_sixteen_chars() {
        let password = generate(&GeneratorOptions::default()).unwrap();
        assert_eq!(password.expose_secret().chars().count(), DEFAULT_LENGTH);
    }

    #[test]
    fn no_character_set_is_rejected() {
        let options = GeneratorOptions {
            uppercase: false,
            lowercase: false,
            numbers: false,
            symbols: false,
            ..GeneratorOptions::default()
        };
        assert!(matches!(
            generate(&options),
            Err(PassVaultError::Validation(_))
        ));
    }

    #[test]
    fn out_of_range_lengths_are_rejected() {
        for length in [0, 3, 129] {
            let options = GeneratorOptions {
                length,
                ..GeneratorOptions::default()
            };
            assert!(generate(&options).is_err(), "length {length}");
        }
    }

    #[test]
    fn digits_only() {
        let options = GeneratorOptions {
            length: 64,
            uppercase: false,
            lowercase: false,
            numbers: true,
            symbols: false,
        };
        let mut rng = StdRng::seed_from_u64(7);
        let password = generate_with(&options, &mut rng).unwrap();
        assert!(password.expose_secret().chars().all(|c| c.is_ascii_digit()));
    }

    proptest! {
        #[test]
        fn output_respects_options(
            length in LENGTH_RANGE,
            upper: bool,
            lower: bool,
            numbers: bool,
            symbols in any::<bool>(),
            seed: u64,
        ) {
            prop_assume!(upper || lower || numbers || symbols);
            let options = GeneratorOptions { length, uppercase: upper, lowercase: lower, numbers, symbols };
            let allowed = options.charset();
            let mut rng = StdRng::seed_from_u64(seed);
            let password = generate_with(&options, &mut rng).unwrap();
            let password = password.expose_secret();
            prop_assert_eq!(password.chars().count(), length);
            prop_assert!(password.chars().all(|c| allowed.contains(&c)));
        }
    }
}
