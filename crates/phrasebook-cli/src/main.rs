// crates/phrasebook-cli/src/main.rs
// ============================================================================
// Module: Phrasebook CLI Entry Point
// Description: Command dispatcher for sync, editing, and locale file workflows.
// Purpose: Provide a safe, localized CLI over the translation store.
// Dependencies: clap, phrasebook-core, phrasebook-config, phrasebook-store-sqlite, serde_json
// ============================================================================

//! ## Overview
//! The Phrasebook CLI loads `phrasebook.toml`, opens the configured
//! translation store, and runs one command: syncing locale sources into the
//! store, managing locales, applying edits, querying translations, or moving
//! locale files in and out. Listing commands print JSON on stdout; diagnostics
//! go to stderr. All user-facing strings are routed through the i18n catalog.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::ArgAction;
use clap::Args;
use clap::CommandFactory;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use phrasebook_cli::i18n::Locale;
use phrasebook_cli::i18n::set_locale;
use phrasebook_cli::logging::init_tracing;
use phrasebook_cli::t;
use phrasebook_config::PhrasebookConfig;
use phrasebook_config::validate_locale_name;
use phrasebook_core::EditError;
use phrasebook_core::NoopCache;
use phrasebook_core::PhraseId;
use phrasebook_core::StoreError;
use phrasebook_core::SyncEngine;
use phrasebook_core::TranslationStore;
use phrasebook_core::YamlTranslationTable;
use phrasebook_core::apply_locale_updates;
use phrasebook_core::export_locale;
use phrasebook_core::import_locale;
use phrasebook_store_sqlite::SqliteTranslationStore;
use serde::Serialize;
use thiserror::Error;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of an edit proposal JSON input.
const MAX_EDIT_INPUT_BYTES: usize = 4 * 1024 * 1024;
/// Environment variable for CLI locale selection.
const LANG_ENV: &str = "PHRASEBOOK_LANG";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "phrasebook", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Preferred output language (overrides `PHRASEBOOK_LANG`).
    #[arg(long, value_enum, value_name = "LANG", global = true)]
    lang: Option<LangArg>,
    /// Config file path (defaults to `PHRASEBOOK_CONFIG` or ./phrasebook.toml).
    #[arg(long, value_name = "PATH", global = true)]
    config: Option<PathBuf>,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Sync primary locale sources into the translation store.
    Sync,
    /// Locale management utilities.
    Locale {
        /// Selected locale subcommand.
        #[command(subcommand)]
        command: LocaleCommand,
    },
    /// Apply proposed texts for one locale from a JSON file.
    Edit(EditCommand),
    /// Search translations by case-insensitive substring.
    Search(SearchCommand),
    /// Look up translations by key or key namespace.
    Lookup(LookupCommand),
    /// List translations flagged stale after a primary text change.
    Stale(StaleCommand),
    /// Write a locale's translations to `{dir}/{locale}.yml`.
    Export(TransferCommand),
    /// Read `{dir}/{locale}.yml` into a secondary locale.
    Import(TransferCommand),
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Locale subcommands.
#[derive(Subcommand, Debug)]
enum LocaleCommand {
    /// Create a secondary locale if it does not exist.
    Add(LocaleAddCommand),
    /// List all locales.
    List,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate the config file.
    Validate,
}

/// Supported CLI language selections.
#[derive(ValueEnum, Copy, Clone, Debug)]
enum LangArg {
    /// English.
    En,
    /// Catalan.
    Ca,
}

impl From<LangArg> for Locale {
    fn from(value: LangArg) -> Self {
        match value {
            LangArg::En => Self::En,
            LangArg::Ca => Self::Ca,
        }
    }
}

/// Arguments for locale creation.
#[derive(Args, Debug)]
struct LocaleAddCommand {
    /// Locale name (for example `fr` or `pt-BR`).
    #[arg(value_name = "NAME")]
    name: String,
}

/// Arguments for applying edits.
#[derive(Args, Debug)]
struct EditCommand {
    /// Locale receiving the edits.
    #[arg(long, value_name = "LOCALE")]
    locale: String,
    /// JSON object mapping phrase ids to proposed text.
    #[arg(long, value_name = "PATH")]
    input: PathBuf,
}

/// Arguments for translation search.
#[derive(Args, Debug)]
struct SearchCommand {
    /// Substring to search for.
    #[arg(value_name = "QUERY")]
    query: String,
}

/// Arguments for key lookup.
#[derive(Args, Debug)]
struct LookupCommand {
    /// Locale to look up.
    #[arg(long, value_name = "LOCALE")]
    locale: String,
    /// Keys or key namespaces to match.
    #[arg(value_name = "KEY", required = true)]
    keys: Vec<String>,
}

/// Arguments for stale listings.
#[derive(Args, Debug)]
struct StaleCommand {
    /// Locale whose stale translations are listed.
    #[arg(long, value_name = "LOCALE")]
    locale: String,
}

/// Arguments for locale export and import.
#[derive(Args, Debug)]
struct TransferCommand {
    /// Locale to transfer.
    #[arg(long, value_name = "LOCALE")]
    locale: String,
    /// Directory holding `{locale}.yml`.
    #[arg(long, value_name = "DIR")]
    dir: PathBuf,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for localized error messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`] from a localized message.
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

/// Wraps a store error in a localized message.
fn store_error(error: &StoreError) -> CliError {
    CliError::new(t!("store.failed", error = error))
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let env_lang = std::env::var(LANG_ENV).ok();
    let locale = resolve_locale(cli.lang, env_lang.as_deref())?;
    set_locale(locale);
    if locale != Locale::En {
        write_stderr_line(&t!("i18n.disclaimer.machine_translated"))
            .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    }

    if cli.show_version {
        let version = env!("CARGO_PKG_VERSION");
        write_stdout_line(&t!("main.version", version = version))
            .map_err(|err| CliError::new(output_error("stdout", &err)))?;
        return Ok(ExitCode::SUCCESS);
    }

    let Some(command) = cli.command else {
        show_help()?;
        return Ok(ExitCode::SUCCESS);
    };

    let config_path = cli.config.as_deref();
    if let Commands::Config {
        command: ConfigCommand::Validate,
    } = command
    {
        return command_config_validate(config_path);
    }

    let session = Session::open(config_path)?;
    match command {
        Commands::Sync => command_sync(&session),
        Commands::Locale {
            command,
        } => command_locale(&session, command),
        Commands::Edit(command) => command_edit(&session, &command),
        Commands::Search(command) => command_search(&session, &command),
        Commands::Lookup(command) => command_lookup(&session, &command),
        Commands::Stale(command) => command_stale(&session, &command),
        Commands::Export(command) => command_export(&session, &command),
        Commands::Import(command) => command_import(&session, &command),
        Commands::Config {
            ..
        } => Ok(ExitCode::SUCCESS),
    }
}

/// Emits the top-level help message for the CLI.
fn show_help() -> CliResult<()> {
    let mut command = Cli::command();
    command.print_help().map_err(|err| CliError::new(output_error("stdout", &err)))?;
    write_stdout_line("").map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(())
}

// ============================================================================
// SECTION: Session
// ============================================================================

/// Loaded configuration plus the opened store.
///
/// Each command runs in its own process, so only the durable `SQLite`
/// backend is accepted; an in-memory store would lose every write on exit.
struct Session {
    /// Validated configuration.
    config: PhrasebookConfig,
    /// Opened `SQLite` store.
    store: SqliteTranslationStore,
}

impl Session {
    /// Loads config, installs tracing, and opens the configured store.
    fn open(config_path: Option<&Path>) -> CliResult<Self> {
        let config = PhrasebookConfig::load(config_path)
            .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
        init_tracing(&config.logging.filter);
        let sqlite = config
            .sqlite_store_config()
            .ok_or_else(|| CliError::new(t!("store.sqlite_required")))?;
        let path = sqlite.path.display().to_string();
        let store = SqliteTranslationStore::new(sqlite)
            .map_err(|err| CliError::new(t!("store.open_failed", error = err)))?;
        tracing::debug!(path = %path, "opened sqlite translation store");
        Ok(Self {
            config,
            store,
        })
    }

    /// Returns the opened store.
    fn store(&self) -> &dyn TranslationStore {
        &self.store
    }
}

// ============================================================================
// SECTION: Sync Command
// ============================================================================

/// Executes the `sync` command and ensures configured secondary locales exist.
fn command_sync(session: &Session) -> CliResult<ExitCode> {
    let table = YamlTranslationTable::new(session.config.source.load_paths.clone());
    let engine =
        SyncEngine::new(session.store(), &NoopCache, &table, session.config.sync_options());
    let report = engine.sync().map_err(|err| CliError::new(t!("sync.failed", error = err)))?;
    for name in &session.config.locales.secondary {
        session.store().find_or_create_locale(name).map_err(|err| store_error(&err))?;
    }
    write_json(&report)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Locale Commands
// ============================================================================

/// Dispatches locale subcommands.
fn command_locale(session: &Session, command: LocaleCommand) -> CliResult<ExitCode> {
    match command {
        LocaleCommand::Add(command) => {
            validate_locale_name("locale", &command.name)
                .map_err(|err| CliError::new(t!("locale.invalid", error = err)))?;
            let locale = session
                .store()
                .find_or_create_locale(&command.name)
                .map_err(|err| store_error(&err))?;
            write_json(&locale)?;
        }
        LocaleCommand::List => {
            let locales = session.store().locales().map_err(|err| store_error(&err))?;
            write_json(&locales)?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Edit Command
// ============================================================================

/// Executes the `edit` command.
fn command_edit(session: &Session, command: &EditCommand) -> CliResult<ExitCode> {
    let updates = read_edit_proposals(&command.input)?;
    let outcome = apply_locale_updates(session.store(), &NoopCache, &command.locale, &updates)
        .map_err(|err| match err {
            EditError::UnknownLocale(locale) => CliError::new(t!("locale.unknown", locale = locale)),
            EditError::Store(error) => CliError::new(t!("edit.failed", error = error)),
        })?;
    write_json(&outcome)?;
    if outcome.is_clean() {
        return Ok(ExitCode::SUCCESS);
    }
    write_stderr_line(&t!("edit.rejected", count = outcome.rejected.len()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::FAILURE)
}

/// Reads a JSON object of `phrase id -> proposed text`.
fn read_edit_proposals(path: &Path) -> CliResult<BTreeMap<PhraseId, String>> {
    let kind = t!("input.kind.edits");
    let bytes = read_bytes_with_limit(path, MAX_EDIT_INPUT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(error) => CliError::new(t!(
            "input.read_failed",
            kind = kind,
            path = path.display(),
            error = error
        )),
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(t!(
            "input.read_too_large",
            kind = kind,
            path = path.display(),
            size = size,
            limit = limit
        )),
    })?;
    let raw: BTreeMap<String, String> = serde_json::from_slice(&bytes).map_err(|err| {
        CliError::new(t!("input.parse_failed", kind = kind, path = path.display(), error = err))
    })?;
    raw.into_iter()
        .map(|(key, text)| {
            let id = key.trim().parse::<i64>().map_err(|_| {
                CliError::new(t!("input.phrase_id_invalid", value = key, path = path.display()))
            })?;
            Ok((PhraseId::new(id), text))
        })
        .collect()
}

// ============================================================================
// SECTION: Query Commands
// ============================================================================

/// Executes the `search` command.
fn command_search(session: &Session, command: &SearchCommand) -> CliResult<ExitCode> {
    let entries =
        session.store().translations_containing(&command.query).map_err(|err| store_error(&err))?;
    write_json(&entries)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `lookup` command.
fn command_lookup(session: &Session, command: &LookupCommand) -> CliResult<ExitCode> {
    let entries =
        session.store().lookup(&command.locale, &command.keys).map_err(|err| store_error(&err))?;
    write_json(&entries)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `stale` command.
fn command_stale(session: &Session, command: &StaleCommand) -> CliResult<ExitCode> {
    let locale = session
        .store()
        .locale_by_name(&command.locale)
        .map_err(|err| store_error(&err))?
        .ok_or_else(|| CliError::new(t!("locale.unknown", locale = command.locale)))?;
    let entries = session.store().stale_translations(locale.id).map_err(|err| store_error(&err))?;
    write_json(&entries)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Transfer Commands
// ============================================================================

/// Executes the `export` command.
fn command_export(session: &Session, command: &TransferCommand) -> CliResult<ExitCode> {
    let path = export_locale(session.store(), &command.locale, &command.dir)
        .map_err(|err| CliError::new(t!("export.failed", error = err)))?;
    write_stdout_line(&t!("export.ok", locale = command.locale, path = path.display()))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `import` command.
fn command_import(session: &Session, command: &TransferCommand) -> CliResult<ExitCode> {
    let report = import_locale(session.store(), &NoopCache, &command.locale, &command.dir)
        .map_err(|err| CliError::new(t!("import.failed", error = err)))?;
    write_json(&report)?;
    if report.rejected.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    write_stderr_line(&t!("import.rejected", count = report.rejected.len()))
        .map_err(|err| CliError::new(output_error("stderr", &err)))?;
    Ok(ExitCode::FAILURE)
}

// ============================================================================
// SECTION: Config Commands
// ============================================================================

/// Executes the config validation command.
fn command_config_validate(config_path: Option<&Path>) -> CliResult<ExitCode> {
    let _config = PhrasebookConfig::load(config_path)
        .map_err(|err| CliError::new(t!("config.load_failed", error = err)))?;
    write_stdout_line(&t!("config.validate.ok"))
        .map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input Helpers
// ============================================================================

/// Errors returned by bounded file reads.
#[derive(Debug)]
enum ReadLimitError {
    /// File I/O failure.
    Io(std::io::Error),
    /// File size exceeds the configured limit.
    TooLarge {
        /// Actual size in bytes.
        size: u64,
        /// Allowed limit in bytes.
        limit: usize,
    },
}

/// Reads a file from disk while enforcing a hard size limit.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let metadata = file.metadata().map_err(ReadLimitError::Io)?;
    let size = metadata.len();
    let limit = u64::try_from(max_bytes).map_err(|_| ReadLimitError::TooLarge {
        size,
        limit: max_bytes,
    })?;
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }

    let read_limit = limit.saturating_add(1);
    let mut limited = file.take(read_limit);
    let mut bytes = Vec::new();
    limited.read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        let actual = u64::try_from(bytes.len()).unwrap_or(u64::MAX);
        return Err(ReadLimitError::TooLarge {
            size: actual,
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

/// Resolves the CLI locale from flags or the environment.
fn resolve_locale(lang: Option<LangArg>, env_lang: Option<&str>) -> CliResult<Locale> {
    if let Some(lang) = lang {
        return Ok(lang.into());
    }
    if let Some(value) = env_lang {
        return Locale::parse(value).ok_or_else(|| {
            CliError::new(t!("i18n.lang.invalid_env", env = LANG_ENV, value = value))
        });
    }
    Ok(Locale::En)
}

// ============================================================================
// SECTION: Output Helpers
// ============================================================================

/// Writes a single line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes raw bytes to stdout without adding a newline.
fn write_stdout_bytes(bytes: &[u8]) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    stdout.write_all(bytes)
}

/// Writes pretty-printed JSON to stdout.
fn write_json<T: Serialize>(value: &T) -> CliResult<()> {
    let mut bytes = serde_json::to_vec_pretty(value)
        .map_err(|err| CliError::new(t!("output.serialize_failed", error = err)))?;
    bytes.push(b'\n');
    write_stdout_bytes(&bytes).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a single line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Formats a localized output error message.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    let stream_label = match stream {
        "stdout" => t!("output.stream.stdout"),
        "stderr" => t!("output.stream.stderr"),
        _ => t!("output.stream.unknown"),
    };
    t!("output.write_failed", stream = stream_label, error = error)
}

/// Emits an error message to stderr and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
