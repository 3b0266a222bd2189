// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the store, the crypto engine, and the session manager.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString, IntoStaticStr};

/// Lifecycle state of a vault session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum SessionState {
    /// No vault exists in the store.
    Uninitialized,
    /// Ciphertext exists; no key material in memory.
    Locked,
    /// Key material and plaintext items are resident in memory.
    Unlocked,
}

/// A state transition published by the session manager.
///
/// `epoch` increments every time the session enters `Unlocked`, so observers
/// can tell two unlocked periods apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StateChange {
    pub state: SessionState,
    pub epoch: u64,
}

/// Keys of the persistent store namespace. Each value is independent JSON text.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, IntoStaticStr,
)]
pub enum StoreKey {
    #[strum(serialize = "passvault_data")]
    Vault,
    #[strum(serialize = "passvault_settings")]
    Settings,
    #[strum(serialize = "passvault_profile")]
    Profile,
    #[strum(serialize = "passvault_folders")]
    Folders,
    #[strum(serialize = "pv_sys_recovery_v1")]
    RecoveryHash,
}

impl StoreKey {
    /// Every key in the namespace, in wipe order.
    pub const ALL: [StoreKey; 5] = [
        StoreKey::Vault,
        StoreKey::Settings,
        StoreKey::Profile,
        StoreKey::Folders,
        StoreKey::RecoveryHash,
    ];

    /// The raw storage key string.
    pub fn as_str(self) -> &'static str {
        self.into()
    }
}

/// An explicit answer to a destructive-action prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    Affirmed,
    Declined,
}

impl Confirmation {
    pub fn from_bool(confirmed: bool) -> Self {
        if confirmed {
            Self::Affirmed
        } else {
            Self::Declined
        }
    }

    pub fn is_affirmed(self) -> bool {
        self == Self::Affirmed
    }
}

/// Default auto-lock threshold in minutes.
pub const DEFAULT_AUTO_LOCK_MINUTES: u32 = 15;

/// Inclusive bounds for the auto-lock threshold.
pub const AUTO_LOCK_MINUTES_RANGE: std::ops::RangeInclusive<u32> = 1..=60;

/// Folders offered on a fresh install.
pub const DEFAULT_FOLDERS: [&str; 6] = ["Personal", "Work", "Finance", "Social", "Dev", "Other"];

/// Application settings persisted under [`StoreKey::Settings`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub auto_lock_minutes: u32,
    pub custom_background: Option<String>,
    pub theme_config: ThemeConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            auto_lock_minutes: DEFAULT_AUTO_LOCK_MINUTES,
            custom_background: None,
            theme_config: ThemeConfig::default(),
        }
    }
}

/// Display theme knobs. Stored, never interpreted by the core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ThemeConfig {
    pub card_color: String,
    pub chat_color: String,
    pub bg_opacity: f64,
    pub glow_intensity: f64,
    pub blur_amount: f64,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            card_color: "#1e293b".to_string(),
            chat_color: "#6366f1".to_string(),
            bg_opacity: 0.9,
            glow_intensity: 10.0,
            blur_amount: 5.0,
        }
    }
}

/// User profile persisted under [`StoreKey::Profile`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub display_name: String,
    pub avatar_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_avatar: Option<String>,
}

impl Default for UserProfile {
    fn default() -> Self {
        Self {
            display_name: "Ghost".to_string(),
            avatar_id: "1".to_string(),
            custom_avatar: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn store_keys_match_persisted_names() {
        assert_eq!(StoreKey::Vault.as_str(), "passvault_data");
        assert_eq!(StoreKey::Settings.as_str(), "passvault_settings");
        assert_eq!(StoreKey::Profile.as_str(), "passvault_profile");
        assert_eq!(StoreKey::Folders.as_str(), "passvault_folders");
        assert_eq!(StoreKey::RecoveryHash.as_str(), "pv_sys_recovery_v1");
        assert_eq!(
            StoreKey::from_str("pv_sys_recovery_v1").unwrap(),
            StoreKey::RecoveryHash
        );
    }

    #[test]
    fn partial_settings_fill_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"autoLockMinutes": 5}"#).unwrap();
        assert_eq!(settings.auto_lock_minutes, 5);
        assert_eq!(settings.theme_config, ThemeConfig::default());
        assert!(settings.custom_background.is_none());
    }

    #[test]
    fn settings_use_camel_case_on_the_wire() {
        let json = serde_json::to_value(Settings::default()).unwrap();
        assert_eq!(json["autoLockMinutes"], 15);
        assert_eq!(json["themeConfig"]["cardColor"], "#1e293b");
    }

    #[test]
    fn confirmation_from_bool() {
        assert!(Confirmation::from_bool(true).is_affirmed());
        assert!(!Confirmation::from_bool(false).is_affirmed());
    }
}
