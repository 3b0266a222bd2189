// SPDX-FileCopyrightText: 2026 PassVault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! PassVault - a local, field-level encrypted credential vault.
//!
//! This is the binary entry point.

mod backup;
mod shell;
mod status;

use std::io::{BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use secrecy::ExposeSecret;
use tracing::{error, warn};

use passvault_config::model::PassVaultConfig;
use passvault_core::{Confirmation, PassVaultError, SessionState};
use passvault_storage::{Database, SqliteStore};
use passvault_vault::generator::{self, GeneratorOptions};
use passvault_vault::prompt;
use passvault_vault::{FieldCipherEngine, VaultSession};

/// PassVault - a local, field-level encrypted credential vault.
#[derive(Parser, Debug)]
#[command(name = "passvault", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Create a new vault protected by a master password.
    Setup {
        /// Skip the optional panic password prompt.
        #[arg(long)]
        no_panic: bool,
    },
    /// Show vault state without unlocking.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
    /// Unlock the vault and open an interactive shell.
    Shell,
    /// Write the persisted vault to a backup file.
    Export {
        /// Destination path (default: ./passvault_ghost_backup_<date>.pv).
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Replace the persisted vault with a backup file.
    Import {
        /// Backup file to read.
        path: PathBuf,
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Irreversibly delete the vault and all settings.
    Reset {
        /// Do not ask for confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Print a random password.
    Generate {
        #[arg(long, default_value_t = generator::DEFAULT_LENGTH)]
        length: usize,
        #[arg(long)]
        no_uppercase: bool,
        #[arg(long)]
        no_lowercase: bool,
        #[arg(long)]
        no_numbers: bool,
        #[arg(long)]
        no_symbols: bool,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match passvault_config::load_and_validate() {
        Ok(config) => config,
        Err(errors) => {
            passvault_config::render_errors(&errors);
            std::process::exit(1);
        }
    };
    init_tracing(&config.app.log_level);

    let result = match cli.command {
        Some(Commands::Setup { no_panic }) => run_setup(&config, no_panic).await,
        Some(Commands::Status { json, plain }) => status::run_status(&config, json, plain).await,
        Some(Commands::Shell) => shell::run_shell(&config).await,
        Some(Commands::Export { out }) => backup::run_export(&config, out).await,
        Some(Commands::Import { path, yes }) => backup::run_import(&config, &path, yes).await,
        Some(Commands::Reset { yes }) => run_reset(&config, yes).await,
        Some(Commands::Generate {
            length,
            no_uppercase,
            no_lowercase,
            no_numbers,
            no_symbols,
        }) => run_generate(&GeneratorOptions {
            length,
            uppercase: !no_uppercase,
            lowercase: !no_lowercase,
            numbers: !no_numbers,
            symbols: !no_symbols,
        }),
        None => {
            println!("passvault: use --help for available commands");
            Ok(())
        }
    };

    if let Err(e) = result {
        error!(error = %e, "command failed");
        eprintln!("{}: {e}", "error".red());
        std::process::exit(1);
    }
}

/// The configured database and the session over it.
pub(crate) struct OpenVault {
    pub session: Arc<VaultSession>,
    pub store: Arc<SqliteStore>,
}

impl OpenVault {
    /// Release the session, then checkpoint the WAL and close the database.
    ///
    /// A close failure only surfaces when `result` is otherwise `Ok`.
    pub async fn finish<T>(self, result: Result<T, PassVaultError>) -> Result<T, PassVaultError> {
        let Self { session, store } = self;
        drop(session);
        let closed = match Arc::try_unwrap(store) {
            Ok(store) => store.close().await,
            Err(_) => {
                warn!("vault database still in use, skipping checkpoint");
                Ok(())
            }
        };
        match (result, closed) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(close)) => {
                warn!(error = %close, "failed to close vault database");
                Err(e)
            }
        }
    }
}

/// Open the configured database and a session over it.
pub(crate) async fn open_session(config: &PassVaultConfig) -> Result<OpenVault, PassVaultError> {
    let db = Database::open_with_config(&config.storage).await?;
    let store = Arc::new(SqliteStore::new(db));
    let engine = Arc::new(FieldCipherEngine::from_config(&config.vault));
    let session = VaultSession::open(store.clone(), engine, &config.vault).await?;
    Ok(OpenVault {
        session: Arc::new(session),
        store,
    })
}

/// Resolve a destructive-action confirmation from `--yes` or a y/N prompt.
pub(crate) fn confirm(yes: bool, question: &str) -> Result<Confirmation, PassVaultError> {
    if yes {
        return Ok(Confirmation::Affirmed);
    }
    if !std::io::stdin().is_terminal() {
        return Ok(Confirmation::Declined);
    }
    eprint!("{question} [y/N] ");
    std::io::stderr()
        .flush()
        .map_err(|e| PassVaultError::Internal(e.to_string()))?;
    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .map_err(|e| PassVaultError::Internal(format!("failed to read answer: {e}")))?;
    Ok(Confirmation::from_bool(is_yes(&answer)))
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}

async fn run_setup(config: &PassVaultConfig, no_panic: bool) -> Result<(), PassVaultError> {
    let vault = open_session(config).await?;
    let result = setup_in(&vault.session, config, no_panic).await;
    vault.finish(result).await
}

async fn setup_in(
    session: &VaultSession,
    config: &PassVaultConfig,
    no_panic: bool,
) -> Result<(), PassVaultError> {
    if session.state() != SessionState::Uninitialized {
        return Err(PassVaultError::InvalidState {
            operation: "set up the vault",
            state: session.state(),
        });
    }

    let master = prompt::get_master_password_with_confirm()?;
    let panic = if no_panic {
        None
    } else {
        prompt::get_optional_secret("Panic password (optional, Enter to skip)")?
    };
    let has_panic = panic.is_some();
    session.setup(master, panic).await?;
    session.logout().await?;

    println!("{} vault created at {}", "✓".green(), config.storage.database_path);
    if has_panic {
        println!("  panic password configured");
    }
    Ok(())
}

async fn run_reset(config: &PassVaultConfig, yes: bool) -> Result<(), PassVaultError> {
    let vault = open_session(config).await?;
    let result = async {
        let confirmation = confirm(
            yes,
            "This permanently deletes the vault, settings, and profile. Continue?",
        )?;
        vault.session.reset(confirmation).await?;
        println!("{} vault reset", "✓".green());
        Ok::<_, PassVaultError>(())
    }
    .await;
    vault.finish(result).await
}

fn run_generate(options: &GeneratorOptions) -> Result<(), PassVaultError> {
    let password = generator::generate(options)?;
    println!("{}", password.expose_secret());
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("passvault={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_loads_config_defaults() {
        let config = passvault_config::load_and_validate_str("").expect("defaults are valid");
        assert_eq!(config.vault.auto_lock_minutes, 15);
    }

    #[test]
    fn yes_answers() {
        assert!(is_yes("y\n"));
        assert!(is_yes(" YES "));
        assert!(!is_yes(""));
        assert!(!is_yes("no"));
    }

    #[test]
    fn yes_flag_skips_the_prompt() {
        assert_eq!(confirm(true, "?").unwrap(), Confirmation::Affirmed);
    }

    #[test]
    fn cli_parses_generate_flags() {
        let cli = Cli::try_parse_from(["passvault", "generate", "--length", "24", "--no-symbols"])
            .unwrap();
        match cli.command {
            Some(Commands::Generate {
                length, no_symbols, ..
            }) => {
                assert_eq!(length, 24);
                assert!(no_symbols);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn cli_parses_import() {
        let cli = Cli::try_parse_from(["passvault", "import", "backup.pv", "--yes"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Import { yes: true, .. })));
    }
}
