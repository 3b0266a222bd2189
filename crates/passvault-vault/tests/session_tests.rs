// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session-level integration tests against the mock engine and fault-injecting store.

use std::time::Duration;

use passvault_core::{
    Category, Confirmation, CookieFields, ItemDraft, ItemPayload, LoginFields, PassVaultError,
    PersistentStore, SessionState, StoreKey, VaultItem,
};
use passvault_test_utils::harness::secret;
use passvault_test_utils::{MockCryptoEngine, TestHarness};
use passvault_vault::backup::parse_artifact;
use passvault_vault::Interaction;
use proptest::prelude::*;
use secrecy::ExposeSecret;

fn github() -> VaultItem {
    ItemDraft::new(ItemPayload::Login(LoginFields {
        title: "GitHub".into(),
        username: "me".into(),
        password: "x".into(),
        ..Default::default()
    }))
    .into_item(1_700_000_000_000)
}

fn note_draft(title: &str) -> ItemDraft {
    ItemDraft::new(ItemPayload::Note(passvault_core::NoteFields {
        title: title.into(),
        body: "body".into(),
    }))
}

fn login_draft(title: &str) -> ItemDraft {
    ItemDraft::new(ItemPayload::Login(LoginFields {
        title: title.into(),
        username: format!("{title}@example.com"),
        password: "pw".into(),
        ..Default::default()
    }))
}

#[derive(Debug, Clone)]
enum Edit {
    AddNote(String),
    AddLogin(String),
    Rename(usize, String),
    Delete(usize),
}

fn edit_strategy() -> impl Strategy<Value = Edit> {
    prop_oneof![
        "[a-z]{1,8}".prop_map(Edit::AddNote),
        "[a-z]{1,8}".prop_map(Edit::AddLogin),
        (any::<usize>(), "[a-z]{1,8}").prop_map(|(i, t)| Edit::Rename(i, t)),
        any::<usize>().prop_map(Edit::Delete),
    ]
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn any_edit_sequence_survives_logout_and_unlock(
        edits in proptest::collection::vec(edit_strategy(), 0..16),
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let h = TestHarness::new().await.unwrap();
            h.setup("longpassword1", None).await.unwrap();

            for edit in edits {
                let items = h.session.items().await.unwrap();
                match edit {
                    Edit::AddNote(title) => {
                        h.session.add_item(note_draft(&title)).await.unwrap();
                    }
                    Edit::AddLogin(title) => {
                        h.session.add_item(login_draft(&title)).await.unwrap();
                    }
                    Edit::Rename(i, title) if !items.is_empty() => {
                        let target = &items[i % items.len()];
                        let draft = match target.category() {
                            Category::Login => login_draft(&title),
                            _ => note_draft(&title),
                        };
                        h.session.edit_item(&target.id, draft).await.unwrap();
                    }
                    Edit::Delete(i) if !items.is_empty() => {
                        let id = items[i % items.len()].id.clone();
                        h.session.delete_item(&id).await.unwrap();
                    }
                    _ => {}
                }
            }

            let before = h.session.items().await.unwrap();
            h.session.logout().await.unwrap();
            h.unlock("longpassword1").await.unwrap();
            assert_eq!(h.session.items().await.unwrap(), before);
        });
    }
}

#[tokio::test]
async fn scenario_a_save_logout_unlock() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", Some("")).await.unwrap();
    assert!(h.persisted_blob().await.is_some());
    assert!(h.session.items().await.unwrap().is_empty());

    let saved = github();
    h.session.save_items(vec![saved.clone()]).await.unwrap();
    h.session.logout().await.unwrap();
    h.unlock("longpassword1").await.unwrap();

    let items = h.session.items().await.unwrap();
    assert_eq!(items, vec![saved]);
    let ItemPayload::Login(fields) = &items[0].payload else {
        panic!("expected a login");
    };
    assert_eq!(fields.title, "GitHub");
    assert_eq!(fields.username, "me");
    assert_eq!(fields.password, "x");
}

#[tokio::test]
async fn scenario_b_wrong_password_keeps_lock_and_blob() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    h.session.save_items(vec![github()]).await.unwrap();
    h.session.logout().await.unwrap();
    let blob = h.persisted_blob().await;

    let err = h.unlock("wrongpass").await.unwrap_err();
    assert!(matches!(err, PassVaultError::DecryptionFailure));
    assert_eq!(h.session.state(), SessionState::Locked);
    assert_eq!(h.persisted_blob().await, blob);
}

#[tokio::test]
async fn scenario_c_structured_cookie_import() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();

    let report = h
        .session
        .import_cookies(r#"[{"domain":"example.com","name":"sid","value":"abc123"}]"#)
        .await
        .unwrap();
    assert_eq!(report.imported, 1);

    let items = h.session.items().await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].category(), Category::Cookie);
    assert_eq!(items[0].folder, "Other");
    let ItemPayload::Cookie(CookieFields {
        domain, key, value, ..
    }) = &items[0].payload
    else {
        panic!("expected a cookie");
    };
    assert_eq!((domain.as_str(), key.as_str(), value.as_str()), ("example.com", "sid", "abc123"));
}

#[tokio::test]
async fn cookie_import_with_nothing_usable_changes_nothing() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let puts = h.store.puts();

    let err = h.session.import_cookies("just some text").await.unwrap_err();
    assert!(matches!(err, PassVaultError::NoValidRecords));
    assert_eq!(h.store.puts(), puts);
}

#[tokio::test]
async fn cookie_import_needs_an_unlocked_session() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    h.session.logout().await.unwrap();

    for text in ["just some text", r#"[{"domain":"a.com","name":"k","value":"v"}]"#] {
        let err = h.session.import_cookies(text).await.unwrap_err();
        assert!(matches!(err, PassVaultError::InvalidState { .. }), "{err:?}");
    }
}

#[tokio::test]
async fn cookie_import_skips_malformed_records() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();

    let report = h
        .session
        .import_cookies(
            r#"[{"domain":"a.com","name":"sid","value":"1"},
                {"domain":"b.com","name":"","value":"2"},
                {"name":"orphan"},
                {"domain":"c.com","name":"tok","value":"3"}]"#,
        )
        .await
        .unwrap();
    assert_eq!(report.imported, 2);
    let labels: Vec<String> = h
        .session
        .items()
        .await
        .unwrap()
        .iter()
        .map(|item| item.label().to_string())
        .collect();
    assert_eq!(labels, ["a.com", "c.com"]);
}

#[tokio::test]
async fn write_failure_leaves_memory_and_store_unchanged() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    h.session.add_item(note_draft("first")).await.unwrap();
    let items = h.session.items().await.unwrap();
    let blob = h.persisted_blob().await;

    h.store.fail_next_put();
    let err = h.session.add_item(note_draft("second")).await.unwrap_err();
    assert!(matches!(err, PassVaultError::StorageWrite { .. }));
    assert_eq!(h.session.items().await.unwrap(), items);
    assert_eq!(h.persisted_blob().await, blob);

    h.session.add_item(note_draft("second")).await.unwrap();
    assert_eq!(h.session.items().await.unwrap().len(), 2);
}

#[tokio::test]
async fn encrypt_failure_is_reported_as_write_failure() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let blob = h.persisted_blob().await;

    h.engine.fail_next_encrypt();
    let err = h.session.save_items(vec![github()]).await.unwrap_err();
    assert!(matches!(err, PassVaultError::StorageWrite { .. }));
    assert!(h.session.items().await.unwrap().is_empty());
    assert_eq!(h.persisted_blob().await, blob);
}

#[tokio::test]
async fn setup_write_failure_leaves_no_state() {
    let h = TestHarness::new().await.unwrap();
    h.store.fail_puts(true);
    let err = h.setup("longpassword1", Some("duress")).await.unwrap_err();
    assert!(matches!(err, PassVaultError::StorageWrite { .. }));
    assert_eq!(h.session.state(), SessionState::Uninitialized);
    assert!(h.store_is_empty().await);
}

#[tokio::test]
async fn salt_is_generated_once_and_reused() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    h.session.add_item(note_draft("a")).await.unwrap();
    h.session.add_item(note_draft("b")).await.unwrap();
    h.session.logout().await.unwrap();
    h.unlock("longpassword1").await.unwrap();
    h.session.add_item(note_draft("c")).await.unwrap();

    let salts = h.engine.existing_salts().await;
    assert_eq!(salts.len(), 4);
    assert_eq!(salts[0], None);
    assert!(salts[1..].iter().all(|s| s.as_deref() == Some("mock-salt-0")));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_operations_never_overlap_in_the_engine() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();

    let mut handles = Vec::new();
    for i in 0..16 {
        let session = h.session.clone();
        handles.push(tokio::spawn(async move {
            session.add_item(note_draft(&format!("note {i}"))).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(h.session.items().await.unwrap().len(), 16);
    assert_eq!(h.engine.max_in_flight(), 1);
}

#[tokio::test]
async fn panic_password_wipes_store_and_never_persists() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", Some("duress")).await.unwrap();
    h.session.save_items(vec![github()]).await.unwrap();
    h.session.logout().await.unwrap();
    let decrypts = h.engine.decrypt_calls();

    h.unlock("duress").await.unwrap();
    assert_eq!(h.session.state(), SessionState::Unlocked);
    assert!(h.session.is_decoy().await);
    assert!(h.store_is_empty().await);
    assert_eq!(h.engine.decrypt_calls(), decrypts);

    let puts = h.store.puts();
    h.session.save_items(vec![github()]).await.unwrap();
    h.session.set_auto_lock_minutes(3).await.unwrap();
    assert_eq!(h.store.puts(), puts);
    assert!(h.store_is_empty().await);
    assert!(matches!(
        h.session.export().await,
        Err(PassVaultError::ExportRefused)
    ));
}

#[tokio::test]
async fn failed_wipe_reads_as_a_wrong_password() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", Some("duress")).await.unwrap();
    h.session.logout().await.unwrap();
    h.store.fail_clears(true);

    assert!(matches!(
        h.unlock("duress").await,
        Err(PassVaultError::DecryptionFailure)
    ));
    assert_eq!(h.session.state(), SessionState::Locked);
    assert!(!h.session.is_decoy().await);

    h.store.fail_clears(false);
    h.unlock("duress").await.unwrap();
    assert!(h.session.is_decoy().await);
    assert!(h.store_is_empty().await);
}

#[tokio::test]
async fn panic_hash_is_stored_under_its_own_key() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", Some("duress")).await.unwrap();
    let stored = h.store.get(StoreKey::RecoveryHash).await.unwrap().unwrap();
    let digest: String = serde_json::from_str(&stored).unwrap();
    assert_eq!(digest, MockCryptoEngine::digest_of("duress"));
}

#[tokio::test]
async fn export_then_import_reproduces_the_blob() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let saved = github();
    h.session.save_items(vec![saved.clone()]).await.unwrap();
    let before = h.persisted_blob().await.unwrap();

    let artifact = h.session.export().await.unwrap();
    assert_eq!(artifact.contents(), before);
    let reparsed = parse_artifact(artifact.as_bytes()).unwrap();

    h.session
        .import(reparsed, Confirmation::Affirmed)
        .await
        .unwrap();
    assert_eq!(h.session.state(), SessionState::Locked);
    assert_eq!(h.persisted_blob().await.unwrap(), before);

    h.unlock("longpassword1").await.unwrap();
    assert_eq!(h.session.items().await.unwrap(), vec![saved]);
}

#[tokio::test]
async fn invalid_artifacts_are_rejected_before_any_change() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let before = h.persisted_blob().await;

    for bad in [
        r#"{"salt":"c2FsdA=="}"#,
        r#"{"iv":"a","data":"b"}"#,
        r#"{"salt":"c2FsdA==","items":[]}"#,
        "not json",
    ] {
        assert!(
            matches!(parse_artifact(bad.as_bytes()), Err(PassVaultError::ImportFormat(_))),
            "{bad}"
        );
    }
    assert_eq!(h.session.state(), SessionState::Unlocked);
    assert_eq!(h.persisted_blob().await, before);
}

#[tokio::test]
async fn declined_import_changes_nothing() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let before = h.persisted_blob().await;
    let artifact =
        parse_artifact(br#"{"salt":"other","iv":"legacy-pw","data":"[]"}"#).unwrap();

    let err = h
        .session
        .import(artifact, Confirmation::Declined)
        .await
        .unwrap_err();
    assert!(matches!(err, PassVaultError::ConfirmationRequired { .. }));
    assert_eq!(h.session.state(), SessionState::Unlocked);
    assert_eq!(h.persisted_blob().await, before);
}

#[tokio::test]
async fn legacy_backup_upgrades_on_next_save() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();

    let saved = github();
    let data = serde_json::to_string(&vec![passvault_core::FlatItem::from(&saved)]).unwrap();
    let legacy = serde_json::json!({ "salt": "legacy-salt", "iv": "legacy-pw", "data": data });
    let artifact = parse_artifact(legacy.to_string().as_bytes()).unwrap();
    assert!(artifact.vault().is_legacy());
    h.session
        .import(artifact, Confirmation::Affirmed)
        .await
        .unwrap();

    assert!(h.unlock("longpassword1").await.is_err());
    h.unlock("legacy-pw").await.unwrap();
    assert_eq!(h.session.items().await.unwrap(), vec![saved]);

    h.session.add_item(note_draft("new")).await.unwrap();
    let blob = h.persisted_blob().await.unwrap();
    let vault: passvault_core::EncryptedVault = serde_json::from_str(&blob).unwrap();
    assert!(!vault.is_legacy());
    assert_eq!(vault.salt, "legacy-salt");
}

#[tokio::test]
async fn corrupted_blob_looks_like_a_wrong_password() {
    let h = TestHarness::builder()
        .with_stored(StoreKey::Vault, "{ this is not a vault")
        .build()
        .await
        .unwrap();
    assert_eq!(h.session.state(), SessionState::Locked);

    let err = h.unlock("longpassword1").await.unwrap_err();
    assert!(matches!(err, PassVaultError::DecryptionFailure));
    assert_eq!(err.to_string(), "access denied");
    assert_eq!(h.session.state(), SessionState::Locked);
}

#[tokio::test]
async fn vanished_blob_returns_to_uninitialized() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    h.session.logout().await.unwrap();
    h.store.remove(StoreKey::Vault).await.unwrap();

    let err = h.unlock("longpassword1").await.unwrap_err();
    assert!(matches!(err, PassVaultError::InvalidState { .. }));
    assert_eq!(h.session.state(), SessionState::Uninitialized);
}

#[tokio::test]
async fn reset_from_locked_clears_everything() {
    let h = TestHarness::new().await.unwrap();
    h.setup("longpassword1", Some("duress")).await.unwrap();
    h.session.add_folder("Travel").await.unwrap();
    h.session.logout().await.unwrap();

    h.session.reset(Confirmation::Affirmed).await.unwrap();
    assert_eq!(h.session.state(), SessionState::Uninitialized);
    assert!(h.store_is_empty().await);
    h.setup("anotherpassword", None).await.unwrap();
}

#[tokio::test]
async fn sqlite_backed_session_round_trips() {
    let h = TestHarness::builder().with_sqlite().build().await.unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let saved = github();
    h.session.save_items(vec![saved.clone()]).await.unwrap();
    h.session
        .set_api_key(secret("sk-live"))
        .await
        .unwrap();
    h.session.logout().await.unwrap();

    h.unlock("longpassword1").await.unwrap();
    assert_eq!(h.session.items().await.unwrap(), vec![saved]);
    assert_eq!(h.session.api_key().await.unwrap().expose_secret(), "sk-live");
}

#[tokio::test(start_paused = true)]
async fn monitor_locks_idle_harness_session() {
    let h = TestHarness::builder()
        .with_auto_lock_minutes(2)
        .build()
        .await
        .unwrap();
    h.setup("longpassword1", None).await.unwrap();
    let mut changes = h.session.subscribe();

    tokio::time::sleep(Duration::from_secs(90)).await;
    h.clock.record(Interaction::Scroll);
    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(h.session.state(), SessionState::Unlocked);

    tokio::time::timeout(
        Duration::from_secs(32),
        changes.wait_for(|c| c.state == SessionState::Locked),
    )
    .await
    .expect("idle session should lock")
    .unwrap();
    assert!(h.session.items().await.is_err());
}

#[tokio::test(start_paused = true)]
async fn manual_logout_then_quick_unlock_is_not_locked_by_stale_check() {
    let mut h = TestHarness::builder()
        .with_auto_lock_minutes(1)
        .build()
        .await
        .unwrap();
    h.setup("longpassword1", None).await.unwrap();

    tokio::time::sleep(Duration::from_secs(55)).await;
    h.session.logout().await.unwrap();
    h.unlock("longpassword1").await.unwrap();
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(h.session.state(), SessionState::Unlocked);

    h.stop_monitor().await;
}

#[tokio::test(start_paused = true)]
async fn reset_stops_the_idle_countdown() {
    let mut h = TestHarness::builder()
        .with_auto_lock_minutes(1)
        .build()
        .await
        .unwrap();
    h.setup("longpassword1", None).await.unwrap();
    tokio::time::sleep(Duration::from_secs(50)).await;

    h.session.reset(Confirmation::Affirmed).await.unwrap();
    let mut changes = h.session.subscribe();
    changes.borrow_and_update();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(!changes.has_changed().unwrap());
    assert_eq!(h.session.state(), SessionState::Uninitialized);

    // A fresh vault gets a full idle window of its own.
    h.setup("anotherpassword", None).await.unwrap();
    tokio::time::sleep(Duration::from_secs(50)).await;
    assert_eq!(h.session.state(), SessionState::Unlocked);
    tokio::time::timeout(
        Duration::from_secs(15),
        changes.wait_for(|c| c.state == SessionState::Locked),
    )
    .await
    .expect("new vault should lock once idle")
    .unwrap();

    h.stop_monitor().await;
}

#[tokio::test(start_paused = true)]
async fn import_stops_the_idle_countdown() {
    let mut h = TestHarness::builder()
        .with_auto_lock_minutes(1)
        .build()
        .await
        .unwrap();
    h.setup("longpassword1", None).await.unwrap();
    h.session.add_item(note_draft("kept")).await.unwrap();
    let artifact = h.session.export().await.unwrap();
    tokio::time::sleep(Duration::from_secs(50)).await;

    h.session
        .import(artifact, Confirmation::Affirmed)
        .await
        .unwrap();
    assert_eq!(h.session.state(), SessionState::Locked);
    let mut changes = h.session.subscribe();
    changes.borrow_and_update();
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(!changes.has_changed().unwrap());

    h.unlock("longpassword1").await.unwrap();
    tokio::time::sleep(Duration::from_secs(50)).await;
    assert_eq!(h.session.state(), SessionState::Unlocked);
    tokio::time::timeout(
        Duration::from_secs(15),
        changes.wait_for(|c| c.state == SessionState::Locked),
    )
    .await
    .expect("imported vault should lock once idle")
    .unwrap();

    h.stop_monitor().await;
}
