// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Password strength scoring and the vault health summary.

use std::collections::HashMap;

use passvault_core::{Category, VaultItem};
use serde::Serialize;
use strum::Display;

/// Highest score [`strength`] can return.
pub const MAX_STRENGTH: u8 = 5;

/// Scores below this count as weak.
pub const WEAK_BELOW: u8 = 3;

/// Score a password from 0 to 5.
///
/// One point each for: more than 8 characters, more than 12 characters, an
/// uppercase letter, a digit, and a character that is not an ASCII letter or
/// digit.
pub fn strength(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let len = password.chars().count();
    [
        len > 8,
        len > 12,
        password.chars().any(|c| c.is_ascii_uppercase()),
        password.chars().any(|c| c.is_ascii_digit()),
        password.chars().any(|c| !c.is_ascii_alphanumeric()),
    ]
    .into_iter()
    .map(u8::from)
    .sum()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum StrengthLabel {
    Empty,
    Weak,
    Fair,
    Good,
    Strong,
    Excellent,
}

impl StrengthLabel {
    pub fn from_score(score: u8) -> Self {
        match score {
            0 => Self::Empty,
            1 => Self::Weak,
            2 => Self::Fair,
            3 => Self::Good,
            4 => Self::Strong,
            _ => Self::Excellent,
        }
    }

    pub fn of(password: &str) -> Self {
        Self::from_score(strength(password))
    }
}

/// Weak and reused secret counts across Login and Card items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthReport {
    pub total: usize,
    pub weak: usize,
    pub reused: usize,
    pub score_percent: u8,
}

/// Summarise the secrets of `items`.
pub fn report(items: &[VaultItem]) -> HealthReport {
    let secrets: Vec<&str> = items
        .iter()
        .filter(|item| matches!(item.category(), Category::Login | Category::Card))
        .map(|item| item.payload.secret())
        .collect();

    if secrets.is_empty() {
        return HealthReport {
            total: 0,
            weak: 0,
            reused: 0,
            score_percent: 100,
        };
    }

    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for secret in secrets.iter().filter(|s| !s.is_empty()) {
        *occurrences.entry(secret).or_default() += 1;
    }

    let scores: Vec<u8> = secrets.iter().map(|s| strength(s)).collect();
    let weak = scores.iter().filter(|&&s| s < WEAK_BELOW).count();
    let reused = secrets
        .iter()
        .filter(|s| occurrences.get(*s).is_some_and(|&n| n > 1))
        .count();
    let sum: u32 = scores.iter().map(|&s| u32::from(s)).sum();
    let max = secrets.len() as f64 * f64::from(MAX_STRENGTH);
    let score_percent = (f64::from(sum) / max * 100.0).round() as u8;

    HealthReport {
        total: secrets.len(),
        weak,
        reused,
        score_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passvault_core::{CardFields, ItemDraft, ItemPayload, LoginFields, NoteFields};
    use proptest::prelude::*;

    fn login(password: &str) -> VaultItem {
        ItemDraft::new(ItemPayload::Login(LoginFields {
            title: "site".into(),
            password: password.into(),
            ..Default::default()
        }))
        .into_item(1)
    }

    #[test]
    fn strength_examples() {
        assert_eq!(strength(""), 0);
        assert_eq!(strength("abc"), 0);
        assert_eq!(strength("abcdefghi"), 1);
        assert_eq!(strength("Abcdefghijklm"), 3);
        assert_eq!(strength("Abcdefghijkl1!"), 5);
        assert_eq!(StrengthLabel::of("Abcdefghijkl1!"), StrengthLabel::Excellent);
        assert_eq!(StrengthLabel::of(""), StrengthLabel::Empty);
    }

    #[test]
    fn empty_vault_scores_full() {
        let report = report(&[]);
        assert_eq!(report.total, 0);
        assert_eq!(report.score_percent, 100);
    }

    #[test]
    fn notes_and_cookies_are_ignored() {
        let note = ItemDraft::new(ItemPayload::Note(NoteFields {
            title: "n".into(),
            body: "x".into(),
        }))
        .into_item(1);
        assert_eq!(report(&[note]).total, 0);
    }

    #[test]
    fn reuse_counts_every_sharing_item() {
        let card = ItemDraft::new(ItemPayload::Card(CardFields {
            title: "Visa".into(),
            cvv: "123".into(),
            ..Default::default()
        }))
        .into_item(1);
        let items = vec![login("hunter2"), login("hunter2"), login("Unique-pass-99"), card];
        let report = report(&items);
        assert_eq!(report.total, 4);
        assert_eq!(report.reused, 2);
        assert_eq!(report.weak, 3);
        // scores: 1 + 1 + 5 + 1 = 8 of 20
        assert_eq!(report.score_percent, 40);
    }

    #[test]
    fn empty_secrets_are_weak_but_not_reused() {
        let report = report(&[login(""), login("")]);
        assert_eq!(report.weak, 2);
        assert_eq!(report.reused, 0);
        assert_eq!(report.score_percent, 0);
    }

    proptest! {
        #[test]
        fn strength_is_bounded(password in ".{0,64}") {
            prop_assert!(strength(&password) <= MAX_STRENGTH);
        }

        #[test]
        fn appending_never_lowers_strength(base in ".{0,32}", tail in ".{0,8}") {
            let longer = format!("{base}{tail}");
            prop_assert!(strength(&longer) >= strength(&base));
        }

        #[test]
        fn report_counts_stay_within_total(passwords in proptest::collection::vec("[a-zA-Z0-9!]{0,16}", 0..12)) {
            let items: Vec<VaultItem> = passwords.iter().map(|p| login(p)).collect();
            let report = report(&items);
            prop_assert_eq!(report.total, items.len());
            prop_assert!(report.weak <= report.total);
            prop_assert!(report.reused <= report.total);
            prop_assert!(report.score_percent <= 100);
        }
    }
}
