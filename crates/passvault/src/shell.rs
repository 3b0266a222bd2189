// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `passvault shell` command implementation.
//!
//! Unlocks the vault and runs a readline REPL over the session. Every input
//! line counts as key activity for the auto-lock monitor; when the monitor
//! locks the session the shell asks for the master password again.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use secrecy::ExposeSecret;
use tracing::{debug, info};

use passvault_config::model::PassVaultConfig;
use passvault_core::{
    CardFields, Category, CookieFields, ItemDraft, ItemId, ItemPayload, LoginFields, NoteFields,
    PassVaultError, SessionState, VaultItem,
};
use passvault_vault::generator::{self, GeneratorOptions};
use passvault_vault::health::StrengthLabel;
use passvault_vault::prompt;
use passvault_vault::{ActivityClock, AutoLockMonitor, Interaction, VaultSession};

const UNLOCK_ATTEMPTS: usize = 3;

/// Runs the `passvault shell` interactive REPL.
pub async fn run_shell(config: &PassVaultConfig) -> Result<(), PassVaultError> {
    let vault = crate::open_session(config).await?;
    let result = repl(&vault.session, config).await;
    vault.finish(result).await
}

async fn repl(session: &Arc<VaultSession>, config: &PassVaultConfig) -> Result<(), PassVaultError> {
    match session.state() {
        SessionState::Uninitialized => {
            return Err(PassVaultError::Validation(
                "no vault found; create one with `passvault setup`".to_string(),
            ));
        }
        SessionState::Locked => unlock_interactive(session).await?,
        SessionState::Unlocked => {}
    }

    let clock = ActivityClock::new();
    let monitor = AutoLockMonitor::spawn(
        session.clone(),
        clock.clone(),
        Duration::from_millis(config.vault.monitor_tick_ms),
    );

    let mut rl = DefaultEditor::new()
        .map_err(|e| PassVaultError::Internal(format!("failed to initialize readline: {e}")))?;

    println!("{}", "passvault shell".bold().green());
    println!("Type {} for commands, {} to exit.\n", "help".yellow(), "quit".yellow());

    let prompt = format!("{}> ", "passvault".green());
    let result = loop {
        let line = match rl.readline(&prompt) {
            Ok(line) => line,
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break Ok(()),
            Err(e) => break Err(PassVaultError::Internal(format!("readline failed: {e}"))),
        };
        clock.record(Interaction::Key);

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        if let Err(e) = rl.add_history_entry(trimmed) {
            debug!(error = %e, "history entry not recorded");
        }
        if matches!(trimmed, "quit" | "exit") {
            break Ok(());
        }

        if session.state() != SessionState::Unlocked {
            println!("{}", "vault locked".yellow());
            if session.state() == SessionState::Uninitialized {
                break Ok(());
            }
            if let Err(e) = unlock_interactive(session).await {
                eprintln!("{}: {e}", "error".red());
                break Ok(());
            }
            clock.record(Interaction::Key);
            continue;
        }

        match handle_command(session, &mut rl, trimmed).await {
            Ok(Flow::Continue) => {}
            Ok(Flow::Quit) => break Ok(()),
            Err(e) => eprintln!("{}: {e}", "error".red()),
        }
    };

    monitor.shutdown().await;
    if session.state() == SessionState::Unlocked {
        session.logout().await?;
    }
    result
}

async fn unlock_interactive(session: &VaultSession) -> Result<(), PassVaultError> {
    for attempt in 1..=UNLOCK_ATTEMPTS {
        let password = prompt::get_master_password()?;
        match session.unlock(password).await {
            Ok(()) => return Ok(()),
            Err(PassVaultError::DecryptionFailure) if attempt < UNLOCK_ATTEMPTS => {
                eprintln!("{}", "access denied".red());
            }
            Err(e) => return Err(e),
        }
    }
    Err(PassVaultError::DecryptionFailure)
}

enum Flow {
    Continue,
    Quit,
}

async fn handle_command(
    session: &VaultSession,
    rl: &mut DefaultEditor,
    line: &str,
) -> Result<Flow, PassVaultError> {
    let (command, rest) = line
        .split_once(char::is_whitespace)
        .map(|(c, r)| (c, r.trim()))
        .unwrap_or((line, ""));
    debug!(command, "shell command");

    match command {
        "help" => print_help(),
        "list" => {
            let items = session.find_items(rest, None, None).await?;
            print_items(&items);
        }
        "show" => {
            let item = resolve(session, rest).await?;
            print_item(&item);
        }
        "add" => {
            let category: Category = capitalize(rest).parse().map_err(|_| {
                PassVaultError::Validation("usage: add login|card|note|cookie".to_string())
            })?;
            let draft = prompt_draft(rl, category, None)?;
            let id = session.add_item(draft).await?;
            println!("{} added {}", "✓".green(), short_id(&id));
        }
        "edit" => {
            let item = resolve(session, rest).await?;
            let draft = prompt_draft(rl, item.category(), Some(&item))?;
            session.edit_item(&item.id, draft).await?;
            println!("{} updated {}", "✓".green(), short_id(&item.id));
        }
        "delete" => {
            let item = resolve(session, rest).await?;
            let answer = read_field(rl, &format!("delete \"{}\"? [y/N]", item.label()), "")?;
            if matches!(answer.to_ascii_lowercase().as_str(), "y" | "yes") {
                session.delete_item(&item.id).await?;
                println!("{} deleted", "✓".green());
            }
        }
        "cookies" => {
            let text = std::fs::read_to_string(rest).map_err(|e| {
                PassVaultError::Validation(format!("cannot read `{rest}`: {e}"))
            })?;
            let report = session.import_cookies(&text).await?;
            println!("{} imported {} cookies", "✓".green(), report.imported);
        }
        "health" => {
            let report = session.health().await?;
            println!(
                "  score {}%  total {}  weak {}  reused {}",
                report.score_percent, report.total, report.weak, report.reused
            );
        }
        "generate" => {
            let length = if rest.is_empty() {
                generator::DEFAULT_LENGTH
            } else {
                rest.parse().map_err(|_| {
                    PassVaultError::Validation(format!("invalid length `{rest}`"))
                })?
            };
            let password = generator::generate(&GeneratorOptions {
                length,
                ..GeneratorOptions::default()
            })?;
            println!("{}", password.expose_secret());
        }
        "autolock" => {
            let minutes = rest.parse().map_err(|_| {
                PassVaultError::Validation("usage: autolock <minutes>".to_string())
            })?;
            session.set_auto_lock_minutes(minutes).await?;
            println!("{} auto-lock after {minutes} min", "✓".green());
        }
        "folders" => {
            for folder in session.folders().await {
                println!("  {folder}");
            }
        }
        "folder" => {
            let name = session.add_folder(rest).await?;
            println!("{} folder {name} added", "✓".green());
        }
        "passwd" => {
            let current = rpassword::prompt_password("Current master password: ")
                .map_err(|e| PassVaultError::Internal(format!("failed to read password: {e}")))?;
            let new = prompt::get_master_password_with_confirm()?;
            session
                .change_master_password(current.into(), new)
                .await?;
            println!("{} master password changed", "✓".green());
        }
        "export" => {
            if rest.is_empty() {
                return Err(PassVaultError::Validation("usage: export <path>".to_string()));
            }
            let size = crate::backup::export_to(session, Path::new(rest)).await?;
            println!("{} {size} bytes written to {rest}", "✓".green());
        }
        "lock" => {
            session.logout().await?;
            info!("locked from shell");
            return Ok(Flow::Quit);
        }
        other => {
            return Err(PassVaultError::Validation(format!(
                "unknown command `{other}`; type `help`"
            )));
        }
    }
    Ok(Flow::Continue)
}

fn print_help() {
    let commands = [
        ("list [query]", "list items, optionally filtered"),
        ("show <id>", "show one item with its secrets"),
        ("add <category>", "add a login, card, note, or cookie"),
        ("edit <id>", "edit an item"),
        ("delete <id>", "delete an item"),
        ("cookies <path>", "bulk import cookies from a file"),
        ("health", "weak and reused password report"),
        ("generate [length]", "print a random password"),
        ("autolock <minutes>", "set the auto-lock threshold"),
        ("folders", "list folders"),
        ("folder <name>", "add a folder"),
        ("passwd", "change the master password"),
        ("export <path>", "write a backup file"),
        ("lock", "lock the vault and exit"),
        ("quit", "exit"),
    ];
    for (usage, about) in commands {
        println!("  {:<20} {}", usage.cyan(), about);
    }
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn short_id(id: &ItemId) -> &str {
    id.as_str().get(..8).unwrap_or(id.as_str())
}

/// Find the single item whose id starts with `prefix`.
async fn resolve(session: &VaultSession, prefix: &str) -> Result<VaultItem, PassVaultError> {
    if prefix.is_empty() {
        return Err(PassVaultError::Validation("an item id is required".to_string()));
    }
    let mut matches: Vec<VaultItem> = session
        .items()
        .await?
        .into_iter()
        .filter(|item| item.id.as_str().starts_with(prefix))
        .collect();
    match matches.len() {
        1 => Ok(matches.remove(0)),
        0 => Err(PassVaultError::Validation(format!("no item matches `{prefix}`"))),
        n => Err(PassVaultError::Validation(format!(
            "`{prefix}` matches {n} items; use more of the id"
        ))),
    }
}

fn print_items(items: &[VaultItem]) {
    if items.is_empty() {
        println!("  (no items)");
        return;
    }
    for item in items {
        println!(
            "  {}  {:<7} {:<10} {}  {}",
            short_id(&item.id).dimmed(),
            item.category().to_string(),
            item.folder,
            item.label().bold(),
            item.payload.identifier().dimmed()
        );
    }
}

fn print_item(item: &VaultItem) {
    println!("  {} ({}, {})", item.label().bold(), item.category(), item.folder);
    println!("  id: {}", item.id.as_str().dimmed());
    let rows: Vec<(&str, &String)> = match &item.payload {
        ItemPayload::Login(f) => vec![
            ("username", &f.username),
            ("password", &f.password),
            ("website", &f.website),
            ("notes", &f.notes),
        ],
        ItemPayload::Card(f) => vec![
            ("number", &f.number),
            ("cvv", &f.cvv),
            ("expiry", &f.expiry),
            ("pin", &f.pin),
        ],
        ItemPayload::Note(f) => vec![("note", &f.body)],
        ItemPayload::Cookie(f) => vec![
            ("name", &f.key),
            ("value", &f.value),
            ("notes", &f.notes),
        ],
    };
    for (label, value) in rows.into_iter().filter(|(_, v)| !v.is_empty()) {
        println!("  {label:<9} {value}");
    }
    if let ItemPayload::Login(f) = &item.payload {
        println!("  strength  {}", StrengthLabel::of(&f.password));
    }
}

fn read_field(rl: &mut DefaultEditor, label: &str, initial: &str) -> Result<String, PassVaultError> {
    rl.readline_with_initial(&format!("  {label}: "), (initial, ""))
        .map(|s| s.trim().to_string())
        .map_err(|e| PassVaultError::Validation(format!("input cancelled: {e}")))
}

/// Prompt for every field of `category`, pre-filled from `existing`.
fn prompt_draft(
    rl: &mut DefaultEditor,
    category: Category,
    existing: Option<&VaultItem>,
) -> Result<ItemDraft, PassVaultError> {
    let current = existing.map(|item| &item.payload);
    let payload = match category {
        Category::Login => {
            let old = match current {
                Some(ItemPayload::Login(f)) => f.clone(),
                _ => LoginFields::default(),
            };
            let title = read_field(rl, "title", &old.title)?;
            let username = read_field(rl, "username", &old.username)?;
            let mut password = read_field(rl, "password (empty to generate)", &old.password)?;
            if password.is_empty() {
                password = generator::generate(&GeneratorOptions::default())?
                    .expose_secret()
                    .to_string();
                println!("  generated a {}-character password", password.len());
            }
            ItemPayload::Login(LoginFields {
                title,
                username,
                password,
                website: read_field(rl, "website", &old.website)?,
                notes: read_field(rl, "notes", &old.notes)?,
            })
        }
        Category::Card => {
            let old = match current {
                Some(ItemPayload::Card(f)) => f.clone(),
                _ => CardFields::default(),
            };
            ItemPayload::Card(CardFields {
                title: read_field(rl, "title", &old.title)?,
                number: read_field(rl, "number", &old.number)?,
                cvv: read_field(rl, "cvv", &old.cvv)?,
                expiry: read_field(rl, "expiry", &old.expiry)?,
                pin: read_field(rl, "pin", &old.pin)?,
            })
        }
        Category::Note => {
            let old = match current {
                Some(ItemPayload::Note(f)) => f.clone(),
                _ => NoteFields::default(),
            };
            ItemPayload::Note(NoteFields {
                title: read_field(rl, "title", &old.title)?,
                body: read_field(rl, "note", &old.body)?,
            })
        }
        Category::Cookie => {
            let old = match current {
                Some(ItemPayload::Cookie(f)) => f.clone(),
                _ => CookieFields::default(),
            };
            ItemPayload::Cookie(CookieFields {
                domain: read_field(rl, "domain", &old.domain)?,
                key: read_field(rl, "name", &old.key)?,
                value: read_field(rl, "value", &old.value)?,
                notes: read_field(rl, "notes", &old.notes)?,
            })
        }
    };

    let folder = read_field(
        rl,
        "folder",
        existing.map(|item| item.folder.as_str()).unwrap_or_default(),
    )?;
    let mut draft = ItemDraft::new(payload);
    if !folder.is_empty() {
        draft = draft.in_folder(folder);
    }
    if let Some(color) = existing.and_then(|item| item.color.clone()) {
        draft = draft.with_color(color);
    }
    Ok(draft)
}
