// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault items: a common envelope plus a category-specific payload.
//!
//! The in-memory model is a tagged union. [`FlatItem`] is the flattened,
//! overloaded-slot record used only at the storage boundary, where the
//! generic `username`/`password`/`website`/`notes` slots mean different
//! things per category.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

use crate::error::PassVaultError;

/// Opaque unique identifier of a vault item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub String);

impl ItemId {
    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The item type. Fixed at creation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum Category {
    Login,
    Card,
    Note,
    Cookie,
}

/// A change record. Reserved by the format; no operation appends to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub timestamp: i64,
    pub action: HistoryAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HistoryAction {
    Created,
    Updated,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoginFields {
    pub title: String,
    pub username: String,
    pub password: String,
    pub website: String,
    pub notes: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardFields {
    pub title: String,
    pub number: String,
    pub cvv: String,
    pub expiry: String,
    pub pin: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NoteFields {
    pub title: String,
    pub body: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieFields {
    pub domain: String,
    pub key: String,
    pub value: String,
    pub notes: String,
}

/// Category-specific contents of an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ItemPayload {
    Login(LoginFields),
    Card(CardFields),
    Note(NoteFields),
    Cookie(CookieFields),
}

impl ItemPayload {
    pub fn category(&self) -> Category {
        match self {
            Self::Login(_) => Category::Login,
            Self::Card(_) => Category::Card,
            Self::Note(_) => Category::Note,
            Self::Cookie(_) => Category::Cookie,
        }
    }

    /// The display label: title, or the cookie domain.
    pub fn label(&self) -> &str {
        match self {
            Self::Login(f) => &f.title,
            Self::Card(f) => &f.title,
            Self::Note(f) => &f.title,
            Self::Cookie(f) => &f.domain,
        }
    }

    /// The primary identifier shown next to the label (username, card number,
    /// cookie key). Notes have none.
    pub fn identifier(&self) -> &str {
        match self {
            Self::Login(f) => &f.username,
            Self::Card(f) => &f.number,
            Self::Note(_) => "",
            Self::Cookie(f) => &f.key,
        }
    }

    /// The main secret (password, CVV, cookie value). Notes have none.
    pub fn secret(&self) -> &str {
        match self {
            Self::Login(f) => &f.password,
            Self::Card(f) => &f.cvv,
            Self::Note(_) => "",
            Self::Cookie(f) => &f.value,
        }
    }
}

/// One secret record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VaultItem {
    pub id: ItemId,
    pub folder: String,
    pub color: Option<String>,
    /// Epoch milliseconds. Immutable after first write.
    pub created_at: i64,
    /// Epoch milliseconds. Refreshed on every create/edit.
    pub updated_at: i64,
    pub history: Vec<HistoryEntry>,
    pub payload: ItemPayload,
}

impl VaultItem {
    pub fn category(&self) -> Category {
        self.payload.category()
    }

    pub fn label(&self) -> &str {
        self.payload.label()
    }
}

/// Folder assigned when a draft does not name one.
pub const DEFAULT_FOLDER: &str = "Personal";

/// Label given to cookie drafts entered without a domain.
pub const UNNAMED_COOKIE_LABEL: &str = "Imported Cookie";

/// User input for creating or replacing an item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDraft {
    pub payload: ItemPayload,
    pub folder: Option<String>,
    pub color: Option<String>,
}

impl ItemDraft {
    pub fn new(payload: ItemPayload) -> Self {
        Self {
            payload,
            folder: None,
            color: None,
        }
    }

    pub fn in_folder(mut self, folder: impl Into<String>) -> Self {
        self.folder = Some(folder.into());
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    /// Check the draft and apply label defaults.
    ///
    /// Cookies without a domain get a placeholder label; every other category
    /// needs a non-empty title.
    pub fn normalized(mut self) -> Result<Self, PassVaultError> {
        match &mut self.payload {
            ItemPayload::Cookie(f) => {
                if f.domain.trim().is_empty() {
                    f.domain = UNNAMED_COOKIE_LABEL.to_string();
                }
            }
            other => {
                if other.label().trim().is_empty() {
                    return Err(PassVaultError::Validation(
                        "item name must not be empty".to_string(),
                    ));
                }
            }
        }
        Ok(self)
    }

    /// Build a brand-new item stamped at `now`.
    pub fn into_item(self, now: i64) -> VaultItem {
        VaultItem {
            id: ItemId::generate(),
            folder: self.folder.unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            color: self.color,
            created_at: now,
            updated_at: now,
            history: Vec::new(),
            payload: self.payload,
        }
    }

    /// Full-record replace of `existing`, keeping its id, creation time, and history.
    pub fn replace(self, existing: &VaultItem, now: i64) -> VaultItem {
        VaultItem {
            id: existing.id.clone(),
            folder: self.folder.unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            color: self.color,
            created_at: existing.created_at,
            updated_at: now,
            history: existing.history.clone(),
            payload: self.payload,
        }
    }
}

/// Wire-compatible flattened item record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FlatItem {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub website: String,
    #[serde(default)]
    pub notes: String,
    pub category: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub folder: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
}

impl From<&VaultItem> for FlatItem {
    fn from(item: &VaultItem) -> Self {
        let (name, username, password, website, notes) = match &item.payload {
            ItemPayload::Login(f) => (
                f.title.clone(),
                f.username.clone(),
                f.password.clone(),
                f.website.clone(),
                f.notes.clone(),
            ),
            ItemPayload::Card(f) => (
                f.title.clone(),
                f.number.clone(),
                f.cvv.clone(),
                f.expiry.clone(),
                f.pin.clone(),
            ),
            ItemPayload::Note(f) => (
                f.title.clone(),
                String::new(),
                String::new(),
                String::new(),
                f.body.clone(),
            ),
            ItemPayload::Cookie(f) => (
                f.domain.clone(),
                f.key.clone(),
                f.value.clone(),
                String::new(),
                f.notes.clone(),
            ),
        };
        Self {
            id: item.id.0.clone(),
            name,
            username,
            password,
            website,
            notes,
            category: item.category().to_string(),
            folder: Some(item.folder.clone()),
            color: item.color.clone(),
            created_at: item.created_at,
            updated_at: item.updated_at,
            history: item.history.clone(),
        }
    }
}

impl TryFrom<FlatItem> for VaultItem {
    type Error = PassVaultError;

    fn try_from(flat: FlatItem) -> Result<Self, Self::Error> {
        let category: Category = flat.category.parse().map_err(|_| {
            PassVaultError::Crypto(format!("unknown item category `{}`", flat.category))
        })?;
        let payload = match category {
            Category::Login => ItemPayload::Login(LoginFields {
                title: flat.name,
                username: flat.username,
                password: flat.password,
                website: flat.website,
                notes: flat.notes,
            }),
            Category::Card => ItemPayload::Card(CardFields {
                title: flat.name,
                number: flat.username,
                cvv: flat.password,
                expiry: flat.website,
                pin: flat.notes,
            }),
            Category::Note => ItemPayload::Note(NoteFields {
                title: flat.name,
                body: flat.notes,
            }),
            Category::Cookie => ItemPayload::Cookie(CookieFields {
                domain: flat.name,
                key: flat.username,
                value: flat.password,
                notes: flat.notes,
            }),
        };
        Ok(Self {
            id: ItemId(flat.id),
            folder: flat.folder.unwrap_or_else(|| DEFAULT_FOLDER.to_string()),
            color: flat.color,
            created_at: flat.created_at,
            updated_at: flat.updated_at,
            history: flat.history,
            payload,
        })
    }
}
