// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Vault session lifecycle: setup, unlock, logout, reset, and every mutation
//! of the unlocked item collection.
//!
//! The session is the only holder of decrypted secrets. All operations take
//! one async mutex for their full duration, so at most one encrypt, decrypt or
//! hash call is in flight and no reader ever observes a half-applied change.
//! State transitions are published on a `watch` channel together with an
//! unlock epoch, which the auto-lock monitor uses to avoid acting on a session
//! that was re-unlocked after it scheduled a check.

use std::collections::HashSet;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ring::constant_time;
use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::sync::{watch, Mutex};
use tracing::{debug, info, warn};

use passvault_config::model::VaultConfig;
use passvault_core::types::{AUTO_LOCK_MINUTES_RANGE, DEFAULT_FOLDERS};
use passvault_core::{
    now_millis, Category, Confirmation, CryptoEngine, EncryptedVault, ItemDraft, ItemId,
    PassVaultError, PersistentStore, SessionState, Settings, StateChange, StoreKey, UserProfile,
    VaultItem,
};

use crate::backup::{self, BackupArtifact};
use crate::cookies::{self, ImportReport};
use crate::health::{self, HealthReport};

/// Shortest accepted master password, in characters.
pub const MIN_MASTER_PASSWORD_LEN: usize = 8;

/// Whether writes reach the persistent store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Normal,
    /// Entered through the recovery password. Nothing is ever persisted.
    Decoy,
}

struct UnlockedVault {
    master_password: SecretString,
    api_key: SecretString,
    items: Vec<VaultItem>,
    /// `None` only in decoy mode, where nothing has been encrypted.
    salt: Option<String>,
    mode: SessionMode,
}

enum Phase {
    Uninitialized,
    Locked,
    Unlocked(UnlockedVault),
}

struct SessionInner {
    phase: Phase,
    epoch: u64,
    settings: Settings,
    profile: UserProfile,
    folders: Vec<String>,
}

impl SessionInner {
    fn state(&self) -> SessionState {
        match self.phase {
            Phase::Uninitialized => SessionState::Uninitialized,
            Phase::Locked => SessionState::Locked,
            Phase::Unlocked(_) => SessionState::Unlocked,
        }
    }

    fn expect(&self, operation: &'static str, expected: SessionState) -> Result<(), PassVaultError> {
        let state = self.state();
        if state == expected {
            Ok(())
        } else {
            Err(PassVaultError::InvalidState { operation, state })
        }
    }

    fn unlocked(&self, operation: &'static str) -> Result<&UnlockedVault, PassVaultError> {
        match &self.phase {
            Phase::Unlocked(vault) => Ok(vault),
            _ => Err(PassVaultError::InvalidState {
                operation,
                state: self.state(),
            }),
        }
    }

    fn unlocked_mut(
        &mut self,
        operation: &'static str,
    ) -> Result<&mut UnlockedVault, PassVaultError> {
        let state = self.state();
        match &mut self.phase {
            Phase::Unlocked(vault) => Ok(vault),
            _ => Err(PassVaultError::InvalidState { operation, state }),
        }
    }

    fn is_decoy(&self) -> bool {
        matches!(&self.phase, Phase::Unlocked(v) if v.mode == SessionMode::Decoy)
    }
}

/// The vault session manager.
pub struct VaultSession {
    store: Arc<dyn PersistentStore>,
    engine: Arc<dyn CryptoEngine>,
    inner: Mutex<SessionInner>,
    state_tx: watch::Sender<StateChange>,
    auto_lock_minutes: AtomicU32,
    default_auto_lock_minutes: u32,
}

impl std::fmt::Debug for VaultSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSession")
            .field("state", &self.state())
            .field("auto_lock_minutes", &self.auto_lock_minutes())
            .field("secrets", &"[REDACTED]")
            .finish()
    }
}

impl VaultSession {
    /// Open a session over `store`.
    ///
    /// Starts `Locked` when a vault blob is persisted, otherwise `Uninitialized`.
    /// Persisted settings take precedence over `config.auto_lock_minutes`.
    pub async fn open(
        store: Arc<dyn PersistentStore>,
        engine: Arc<dyn CryptoEngine>,
        config: &VaultConfig,
    ) -> Result<Self, PassVaultError> {
        let phase = if store.contains(StoreKey::Vault).await? {
            Phase::Locked
        } else {
            Phase::Uninitialized
        };

        let default_minutes = clamp_minutes(config.auto_lock_minutes);
        let settings = load_json::<Settings>(store.as_ref(), StoreKey::Settings)
            .await?
            .unwrap_or_else(|| default_settings(default_minutes));
        let profile = load_json::<UserProfile>(store.as_ref(), StoreKey::Profile)
            .await?
            .unwrap_or_default();
        let folders = load_json::<Vec<String>>(store.as_ref(), StoreKey::Folders)
            .await?
            .unwrap_or_else(default_folders);

        let inner = SessionInner {
            phase,
            epoch: 0,
            settings,
            profile,
            folders,
        };
        let (state_tx, _) = watch::channel(StateChange {
            state: inner.state(),
            epoch: 0,
        });
        let minutes = clamp_minutes(inner.settings.auto_lock_minutes);
        debug!(state = %inner.state(), auto_lock_minutes = minutes, "vault session opened");

        Ok(Self {
            store,
            engine,
            inner: Mutex::new(inner),
            state_tx,
            auto_lock_minutes: AtomicU32::new(minutes),
            default_auto_lock_minutes: default_minutes,
        })
    }

    /// Current lifecycle state.
    pub fn state(&self) -> SessionState {
        self.state_tx.borrow().state
    }

    /// Observe state transitions.
    pub fn subscribe(&self) -> watch::Receiver<StateChange> {
        self.state_tx.subscribe()
    }

    pub async fn is_decoy(&self) -> bool {
        self.inner.lock().await.is_decoy()
    }

    pub fn auto_lock_minutes(&self) -> u32 {
        self.auto_lock_minutes.load(Ordering::Acquire)
    }

    /// Inactivity threshold after which the monitor locks the session.
    pub fn auto_lock_threshold(&self) -> Duration {
        Duration::from_secs(u64::from(self.auto_lock_minutes()) * 60)
    }

    fn publish(&self, inner: &SessionInner) {
        self.state_tx.send_replace(StateChange {
            state: inner.state(),
            epoch: inner.epoch,
        });
    }

    fn enter_unlocked(&self, inner: &mut SessionInner, vault: UnlockedVault) {
        inner.phase = Phase::Unlocked(vault);
        inner.epoch += 1;
        self.publish(inner);
    }

    fn reset_preferences(&self, inner: &mut SessionInner) {
        inner.settings = default_settings(self.default_auto_lock_minutes);
        inner.profile = UserProfile::default();
        inner.folders = default_folders();
        self.auto_lock_minutes
            .store(self.default_auto_lock_minutes, Ordering::Release);
    }

    // --- Lifecycle ---

    /// Create a new vault under `master_password` and unlock it.
    ///
    /// An empty panic password counts as none.
    pub async fn setup(
        &self,
        master_password: SecretString,
        panic_password: Option<SecretString>,
    ) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        inner.expect("set up the vault", SessionState::Uninitialized)?;

        check_master_length(&master_password)?;
        let panic_password = panic_password.filter(|p| !p.expose_secret().is_empty());
        if let Some(panic) = &panic_password
            && panic.expose_secret() == master_password.expose_secret()
        {
            return Err(PassVaultError::Validation(
                "panic password must differ from the master password".to_string(),
            ));
        }

        let recovery_hash = match &panic_password {
            Some(panic) => Some(self.engine.hash(panic).await?),
            None => None,
        };
        let api_key = SecretString::from(String::new());
        let vault = self
            .engine
            .encrypt(&[], &api_key, &master_password, None)
            .await
            .map_err(as_write_failure)?;
        let blob = encode_vault(&vault)?;

        match &recovery_hash {
            Some(hash) => self.put_json(StoreKey::RecoveryHash, hash).await?,
            None => self.store.remove(StoreKey::RecoveryHash).await?,
        }
        if let Err(e) = self.store.put(StoreKey::Vault, &blob).await {
            if recovery_hash.is_some()
                && let Err(cleanup) = self.store.remove(StoreKey::RecoveryHash).await
            {
                warn!(error = %cleanup, "failed to roll back recovery hash");
            }
            return Err(as_write_failure(e));
        }

        self.enter_unlocked(
            &mut inner,
            UnlockedVault {
                master_password,
                api_key,
                items: Vec::new(),
                salt: Some(vault.salt),
                mode: SessionMode::Normal,
            },
        );
        info!(panic_configured = recovery_hash.is_some(), "vault created");
        Ok(())
    }

    /// Unlock with `password`.
    ///
    /// The recovery password is checked first; a match wipes every persisted
    /// key and opens an empty decoy session. Either way the caller sees `Ok`.
    /// A wrong password and a corrupted vault both yield
    /// [`PassVaultError::DecryptionFailure`].
    pub async fn unlock(&self, password: SecretString) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        inner.expect("unlock", SessionState::Locked)?;

        if let Some(stored) = load_json::<String>(self.store.as_ref(), StoreKey::RecoveryHash).await? {
            let candidate = self.engine.hash(&password).await?;
            if constant_time::verify_slices_are_equal(candidate.as_bytes(), stored.as_bytes())
                .is_ok()
            {
                // A failed wipe must look like any other rejected password.
                if let Err(e) = self.store.clear().await {
                    warn!(error = %e, "recovery wipe failed");
                    return Err(PassVaultError::DecryptionFailure);
                }
                self.reset_preferences(&mut inner);
                self.enter_unlocked(
                    &mut inner,
                    UnlockedVault {
                        master_password: password,
                        api_key: SecretString::from(String::new()),
                        items: Vec::new(),
                        salt: None,
                        mode: SessionMode::Decoy,
                    },
                );
                warn!("recovery password entered, persisted vault wiped");
                return Ok(());
            }
        }

        let Some(blob) = self.store.get(StoreKey::Vault).await? else {
            inner.phase = Phase::Uninitialized;
            self.publish(&inner);
            return Err(PassVaultError::InvalidState {
                operation: "unlock",
                state: SessionState::Uninitialized,
            });
        };
        let vault: EncryptedVault = serde_json::from_str(&blob).map_err(|_| {
            debug!("persisted vault is not a recognised encoding");
            PassVaultError::DecryptionFailure
        })?;
        let decrypted = self
            .engine
            .decrypt(&vault, &password)
            .await
            .map_err(|_| PassVaultError::DecryptionFailure)?;

        let count = decrypted.items.len();
        let legacy = vault.is_legacy();
        self.enter_unlocked(
            &mut inner,
            UnlockedVault {
                master_password: password,
                api_key: decrypted.api_key,
                items: decrypted.items,
                salt: Some(vault.salt),
                mode: SessionMode::Normal,
            },
        );
        info!(items = count, legacy, "vault unlocked");
        Ok(())
    }

    /// Discard all in-memory secrets.
    ///
    /// A decoy session returns to `Uninitialized` because its wipe removed
    /// the vault blob; a normal session returns to `Locked`.
    pub async fn logout(&self) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        self.logout_locked(&mut inner)
    }

    fn logout_locked(&self, inner: &mut SessionInner) -> Result<(), PassVaultError> {
        let decoy = inner.is_decoy();
        inner.unlocked("log out")?;
        inner.phase = if decoy {
            Phase::Uninitialized
        } else {
            Phase::Locked
        };
        self.publish(inner);
        info!(decoy, "vault locked");
        Ok(())
    }

    /// Lock the session if it is still unlocked under `epoch`.
    ///
    /// Returns whether a logout happened.
    pub async fn expire(&self, epoch: u64) -> bool {
        let mut inner = self.inner.lock().await;
        if inner.epoch != epoch || inner.state() != SessionState::Unlocked {
            return false;
        }
        self.logout_locked(&mut inner).is_ok()
    }

    /// Wipe every persisted key and return to `Uninitialized`.
    pub async fn reset(&self, confirmation: Confirmation) -> Result<(), PassVaultError> {
        if !confirmation.is_affirmed() {
            return Err(PassVaultError::ConfirmationRequired { action: "reset" });
        }
        let mut inner = self.inner.lock().await;
        self.store.clear().await?;
        inner.phase = Phase::Uninitialized;
        self.reset_preferences(&mut inner);
        self.publish(&inner);
        warn!("vault reset, all persisted state cleared");
        Ok(())
    }

    // --- Items ---

    /// Replace the whole item collection.
    ///
    /// Re-encrypts under the existing salt and overwrites the persisted blob.
    /// On any failure the error is [`PassVaultError::StorageWrite`] and neither
    /// memory nor the store has changed. In decoy mode only memory changes.
    pub async fn save_items(&self, items: Vec<VaultItem>) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        let vault = inner.unlocked_mut("save items")?;
        check_collection(&vault.items, &items)?;
        self.persist(vault, Change::items(items)).await
    }

    /// Add a new item built from `draft`.
    pub async fn add_item(&self, draft: ItemDraft) -> Result<ItemId, PassVaultError> {
        let draft = draft.normalized()?;
        let mut inner = self.inner.lock().await;
        let vault = inner.unlocked_mut("add an item")?;

        let item = draft.into_item(now_millis());
        let id = item.id.clone();
        let mut items = vault.items.clone();
        items.push(item);
        self.persist(vault, Change::items(items)).await?;
        debug!(%id, "item added");
        Ok(id)
    }

    /// Replace the item `id` with `draft`, keeping its id and creation time.
    pub async fn edit_item(&self, id: &ItemId, draft: ItemDraft) -> Result<(), PassVaultError> {
        let draft = draft.normalized()?;
        let mut inner = self.inner.lock().await;
        let vault = inner.unlocked_mut("edit an item")?;

        let Some(index) = vault.items.iter().position(|item| &item.id == id) else {
            return Err(PassVaultError::Validation(format!("no item with id `{id}`")));
        };
        let existing = &vault.items[index];
        if existing.category() != draft.payload.category() {
            return Err(PassVaultError::Validation(format!(
                "item category cannot change from {} to {}",
                existing.category(),
                draft.payload.category()
            )));
        }

        let mut items = vault.items.clone();
        items[index] = draft.replace(existing, now_millis());
        self.persist(vault, Change::items(items)).await?;
        debug!(%id, "item updated");
        Ok(())
    }

    /// Remove the item `id`.
    pub async fn delete_item(&self, id: &ItemId) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        let vault = inner.unlocked_mut("delete an item")?;

        if !vault.items.iter().any(|item| &item.id == id) {
            return Err(PassVaultError::Validation(format!("no item with id `{id}`")));
        }
        let items = vault
            .items
            .iter()
            .filter(|item| &item.id != id)
            .cloned()
            .collect();
        self.persist(vault, Change::items(items)).await?;
        debug!(%id, "item deleted");
        Ok(())
    }

    /// Parse pasted cookie text and append every usable record.
    pub async fn import_cookies(&self, text: &str) -> Result<ImportReport, PassVaultError> {
        let mut inner = self.inner.lock().await;
        let vault = inner.unlocked_mut("import cookies")?;

        let parsed = cookies::parse_cookies(text);
        let now = now_millis();
        let mut items = vault.items.clone();
        for draft in parsed.drafts {
            match draft.normalized() {
                Ok(draft) => items.push(draft.into_item(now)),
                Err(e) => debug!(error = %e, "skipping cookie record"),
            }
        }
        let imported = items.len() - vault.items.len();
        if imported == 0 {
            return Err(PassVaultError::NoValidRecords);
        }
        self.persist(vault, Change::items(items)).await?;
        info!(imported, format = ?parsed.format, "cookies imported");
        Ok(ImportReport { imported })
    }

    /// Snapshot of the unlocked collection.
    pub async fn items(&self) -> Result<Vec<VaultItem>, PassVaultError> {
        let inner = self.inner.lock().await;
        Ok(inner.unlocked("read items")?.items.clone())
    }

    pub async fn item(&self, id: &ItemId) -> Result<Option<VaultItem>, PassVaultError> {
        let inner = self.inner.lock().await;
        let vault = inner.unlocked("read items")?;
        Ok(vault.items.iter().find(|item| &item.id == id).cloned())
    }

    /// Case-insensitive search over labels and primary identifiers.
    pub async fn find_items(
        &self,
        query: &str,
        category: Option<Category>,
        folder: Option<&str>,
    ) -> Result<Vec<VaultItem>, PassVaultError> {
        let inner = self.inner.lock().await;
        let vault = inner.unlocked("search items")?;
        let query = query.trim().to_lowercase();

        Ok(vault
            .items
            .iter()
            .filter(|item| {
                query.is_empty()
                    || item.label().to_lowercase().contains(&query)
                    || item.payload.identifier().to_lowercase().contains(&query)
            })
            .filter(|item| category.is_none_or(|c| item.category() == c))
            .filter(|item| folder.is_none_or(|f| item.folder == f))
            .cloned()
            .collect())
    }

    /// Weak and reused secret summary for the unlocked collection.
    pub async fn health(&self) -> Result<HealthReport, PassVaultError> {
        let inner = self.inner.lock().await;
        Ok(health::report(&inner.unlocked("check vault health")?.items))
    }

    // --- Secrets ---

    pub async fn api_key(&self) -> Result<SecretString, PassVaultError> {
        let inner = self.inner.lock().await;
        let vault = inner.unlocked("read the API key")?;
        Ok(SecretString::from(vault.api_key.expose_secret().to_owned()))
    }

    /// Store a new API key alongside the items.
    pub async fn set_api_key(&self, api_key: SecretString) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        let vault = inner.unlocked_mut("set the API key")?;
        let items = vault.items.clone();
        self.persist(
            vault,
            Change {
                items,
                api_key: Some(api_key),
                master_password: None,
            },
        )
        .await
    }

    /// Re-encrypt the vault under a new master password, keeping the salt.
    pub async fn change_master_password(
        &self,
        current: SecretString,
        new: SecretString,
    ) -> Result<(), PassVaultError> {
        let mut inner = self.inner.lock().await;
        let decoy = inner.is_decoy();
        let vault = inner.unlocked("change the master password")?;
        if current.expose_secret() != vault.master_password.expose_secret() {
            return Err(PassVaultError::DecryptionFailure);
        }
        check_master_length(&new)?;

        if !decoy
            && let Some(stored) =
                load_json::<String>(self.store.as_ref(), StoreKey::RecoveryHash).await?
            && self.engine.hash(&new).await? == stored
        {
            return Err(PassVaultError::Validation(
                "master password must differ from the panic password".to_string(),
            ));
        }

        let vault = inner.unlocked_mut("change the master password")?;
        let items = vault.items.clone();
        self.persist(
            vault,
            Change {
                items,
                api_key: None,
                master_password: Some(new),
            },
        )
        .await?;
        info!("master password changed");
        Ok(())
    }

    async fn persist(&self, vault: &mut UnlockedVault, change: Change) -> Result<(), PassVaultError> {
        if vault.mode == SessionMode::Normal {
            let api_key = change.api_key.as_ref().unwrap_or(&vault.api_key);
            let password = change
                .master_password
                .as_ref()
                .unwrap_or(&vault.master_password);
            let encrypted = self
                .engine
                .encrypt(&change.items, api_key, password, vault.salt.as_deref())
                .await
                .map_err(as_write_failure)?;
            let blob = encode_vault(&encrypted)?;
            self.store
                .put(StoreKey::Vault, &blob)
                .await
                .map_err(as_write_failure)?;
            vault.salt = Some(encrypted.salt);
            debug!(items = change.items.len(), "vault persisted");
        } else {
            debug!(items = change.items.len(), "decoy session, change kept in memory");
        }

        vault.items = change.items;
        if let Some(api_key) = change.api_key {
            vault.api_key = api_key;
        }
        if let Some(password) = change.master_password {
            vault.master_password = password;
        }
        Ok(())
    }

    // --- Preferences ---

    pub async fn settings(&self) -> Settings {
        self.inner.lock().await.settings.clone()
    }

    /// Change the auto-lock threshold (1 to 60 minutes).
    pub async fn set_auto_lock_minutes(&self, minutes: u32) -> Result<(), PassVaultError> {
        if !AUTO_LOCK_MINUTES_RANGE.contains(&minutes) {
            return Err(PassVaultError::Validation(format!(
                "auto-lock must be between {} and {} minutes, got {minutes}",
                AUTO_LOCK_MINUTES_RANGE.start(),
                AUTO_LOCK_MINUTES_RANGE.end()
            )));
        }
        let mut inner = self.inner.lock().await;
        inner.unlocked("change settings")?;

        let settings = Settings {
            auto_lock_minutes: minutes,
            ..inner.settings.clone()
        };
        if !inner.is_decoy() {
            self.put_json(StoreKey::Settings, &settings).await?;
        }
        inner.settings = settings;
        self.auto_lock_minutes.store(minutes, Ordering::Release);
        info!(minutes, "auto-lock threshold changed");
        Ok(())
    }

    pub async fn profile(&self) -> UserProfile {
        self.inner.lock().await.profile.clone()
    }

    pub async fn update_profile(&self, profile: UserProfile) -> Result<(), PassVaultError> {
        if profile.display_name.trim().is_empty() {
            return Err(PassVaultError::Validation(
                "display name must not be empty".to_string(),
            ));
        }
        let mut inner = self.inner.lock().await;
        inner.unlocked("update the profile")?;
        if !inner.is_decoy() {
            self.put_json(StoreKey::Profile, &profile).await?;
        }
        inner.profile = profile;
        Ok(())
    }

    pub async fn folders(&self) -> Vec<String> {
        self.inner.lock().await.folders.clone()
    }

    /// Append a folder name. Returns the trimmed name.
    pub async fn add_folder(&self, name: &str) -> Result<String, PassVaultError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(PassVaultError::Validation(
                "folder name must not be empty".to_string(),
            ));
        }
        let mut inner = self.inner.lock().await;
        inner.unlocked("add a folder")?;
        if inner.folders.iter().any(|f| f == name) {
            return Err(PassVaultError::Validation(format!(
                "folder `{name}` already exists"
            )));
        }

        let mut folders = inner.folders.clone();
        folders.push(name.to_string());
        if !inner.is_decoy() {
            self.put_json(StoreKey::Folders, &folders).await?;
        }
        inner.folders = folders;
        Ok(name.to_string())
    }

    // --- Backup ---

    /// The persisted vault blob, verbatim.
    ///
    /// Refused with [`PassVaultError::ExportRefused`] in a decoy session and
    /// when nothing is persisted; the two cases look the same from outside.
    pub async fn export(&self) -> Result<BackupArtifact, PassVaultError> {
        let inner = self.inner.lock().await;
        if inner.is_decoy() {
            debug!("export refused in decoy session");
            return Err(PassVaultError::ExportRefused);
        }
        let Some(blob) = self.store.get(StoreKey::Vault).await? else {
            return Err(PassVaultError::ExportRefused);
        };
        backup::parse_artifact(blob.as_bytes())
    }

    /// Overwrite the persisted vault with `artifact` and lock.
    ///
    /// Any unlocked session is discarded; the backup's own master password is
    /// needed to unlock again.
    pub async fn import(
        &self,
        artifact: BackupArtifact,
        confirmation: Confirmation,
    ) -> Result<(), PassVaultError> {
        if !confirmation.is_affirmed() {
            return Err(PassVaultError::ConfirmationRequired { action: "import" });
        }
        let mut inner = self.inner.lock().await;
        self.store.put(StoreKey::Vault, artifact.contents()).await?;
        inner.phase = Phase::Locked;
        self.publish(&inner);
        info!(
            legacy = artifact.vault().is_legacy(),
            "backup imported, vault locked"
        );
        Ok(())
    }

    async fn put_json<T: Serialize>(&self, key: StoreKey, value: &T) -> Result<(), PassVaultError> {
        let json = serde_json::to_string(value).map_err(PassVaultError::write)?;
        self.store.put(key, &json).await
    }
}

/// The next collection plus any secrets replaced with it.
struct Change {
    items: Vec<VaultItem>,
    api_key: Option<SecretString>,
    master_password: Option<SecretString>,
}

impl Change {
    fn items(items: Vec<VaultItem>) -> Self {
        Self {
            items,
            api_key: None,
            master_password: None,
        }
    }
}

fn check_master_length(password: &SecretString) -> Result<(), PassVaultError> {
    if password.expose_secret().chars().count() < MIN_MASTER_PASSWORD_LEN {
        return Err(PassVaultError::Validation(format!(
            "master password must be at least {MIN_MASTER_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}

/// Ids stay unique and existing items keep their category.
fn check_collection(current: &[VaultItem], next: &[VaultItem]) -> Result<(), PassVaultError> {
    let mut seen = HashSet::with_capacity(next.len());
    for item in next {
        if !seen.insert(&item.id) {
            return Err(PassVaultError::Validation(format!(
                "duplicate item id `{}`",
                item.id
            )));
        }
        if let Some(existing) = current.iter().find(|c| c.id == item.id)
            && existing.category() != item.category()
        {
            return Err(PassVaultError::Validation(format!(
                "item `{}` cannot change category",
                item.id
            )));
        }
    }
    Ok(())
}

fn as_write_failure(err: PassVaultError) -> PassVaultError {
    match err {
        err @ PassVaultError::StorageWrite { .. } => err,
        other => PassVaultError::write(other),
    }
}

fn encode_vault(vault: &EncryptedVault) -> Result<String, PassVaultError> {
    serde_json::to_string(vault).map_err(PassVaultError::write)
}

fn clamp_minutes(minutes: u32) -> u32 {
    minutes.clamp(*AUTO_LOCK_MINUTES_RANGE.start(), *AUTO_LOCK_MINUTES_RANGE.end())
}

fn default_settings(auto_lock_minutes: u32) -> Settings {
    Settings {
        auto_lock_minutes,
        ..Settings::default()
    }
}

fn default_folders() -> Vec<String> {
    DEFAULT_FOLDERS.iter().map(|f| f.to_string()).collect()
}

/// Read and decode a JSON value. Undecodable values are treated as absent.
async fn load_json<T: DeserializeOwned>(
    store: &dyn PersistentStore,
    key: StoreKey,
) -> Result<Option<T>, PassVaultError> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };
    match serde_json::from_str(&raw) {
        Ok(value) => Ok(Some(value)),
        Err(e) => {
            warn!(key = %key, error = %e, "ignoring undecodable stored value");
            Ok(None)
        }
    }
}
