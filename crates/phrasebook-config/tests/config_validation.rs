//! Config defaults and validation tests for phrasebook-config.
// crates/phrasebook-config/tests/config_validation.rs
// =============================================================================
// Module: Config Defaults and Validation Tests
// Description: Validate default behavior and config invariants.
// Purpose: Ensure minimal config is valid and invalid config fails closed.
// =============================================================================

use std::fs;
use std::path::PathBuf;

use phrasebook_config::ConfigError;
use phrasebook_config::PhrasebookConfig;
use phrasebook_config::StoreType;
use phrasebook_core::PrimaryTextPolicy;
use phrasebook_store_sqlite::SqliteStoreMode;
use phrasebook_store_sqlite::SqliteSyncMode;

type TestResult = Result<(), String>;

fn assert_invalid(result: Result<PhrasebookConfig, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}

#[test]
fn empty_config_uses_defaults() -> TestResult {
    let config = PhrasebookConfig::from_toml("").map_err(|err| err.to_string())?;
    if config.locales.primary != "en" {
        return Err(format!("unexpected primary locale {}", config.locales.primary));
    }
    if config.store.store_type != StoreType::Memory {
        return Err("store should default to memory".to_string());
    }
    if config.sync.primary_text != PrimaryTextPolicy::FillGaps {
        return Err("sync.primary_text should default to fill_gaps".to_string());
    }
    if config.source.reserved_prefixes != vec!["i18n".to_string()] {
        return Err("reserved prefixes should default to i18n".to_string());
    }
    if config.sqlite_store_config().is_some() {
        return Err("memory store must not produce sqlite config".to_string());
    }
    Ok(())
}

#[test]
fn full_config_parses_every_section() -> TestResult {
    let config = PhrasebookConfig::from_toml(
        r#"
[locales]
primary = "en"
secondary = ["fr", "de"]

[source]
locales_dir = "config/locales"
load_paths = ["config/locales", "vendor/locales"]
reserved_prefixes = ["i18n", "faker"]

[sync]
primary_text = "source_wins"

[store]
type = "sqlite"
path = "data/phrasebook.sqlite"
busy_timeout_ms = 2500
journal_mode = "delete"
sync_mode = "normal"

[logging]
filter = "phrasebook=debug"
"#,
    )
    .map_err(|err| err.to_string())?;

    let options = config.sync_options();
    if options.primary_locale != "en" || options.primary_text != PrimaryTextPolicy::SourceWins {
        return Err("sync options did not follow config".to_string());
    }
    if !options.is_reserved("faker.name") {
        return Err("configured reserved prefix was not applied".to_string());
    }
    if options.primary_locale_file() != PathBuf::from("config/locales/en.yml") {
        return Err("unexpected primary locale file".to_string());
    }
    let sqlite = config.sqlite_store_config().ok_or("sqlite config missing")?;
    if sqlite.path != PathBuf::from("data/phrasebook.sqlite")
        || sqlite.busy_timeout_ms != 2500
        || sqlite.journal_mode != SqliteStoreMode::Delete
        || sqlite.sync_mode != SqliteSyncMode::Normal
    {
        return Err("sqlite config did not follow store section".to_string());
    }
    if config.source.load_paths.len() != 2 || config.logging.filter != "phrasebook=debug" {
        return Err("source or logging section not applied".to_string());
    }
    Ok(())
}

#[test]
fn primary_listed_as_secondary_is_rejected() -> TestResult {
    assert_invalid(
        PhrasebookConfig::from_toml("[locales]\nprimary = \"en\"\nsecondary = [\"fr\", \"en\"]\n"),
        "must not include the primary locale",
    )
}

#[test]
fn duplicate_secondary_locale_is_rejected() -> TestResult {
    assert_invalid(
        PhrasebookConfig::from_toml("[locales]\nsecondary = [\"fr\", \"fr\"]\n"),
        "duplicate locale fr",
    )
}

#[test]
fn empty_primary_locale_is_rejected() -> TestResult {
    assert_invalid(
        PhrasebookConfig::from_toml("[locales]\nprimary = \"\"\n"),
        "locales.primary must be non-empty",
    )
}

#[test]
fn blank_reserved_prefix_is_rejected() -> TestResult {
    assert_invalid(
        PhrasebookConfig::from_toml("[source]\nreserved_prefixes = [\" \"]\n"),
        "reserved_prefixes entries must be non-empty",
    )
}

#[test]
fn sqlite_store_requires_path() -> TestResult {
    assert_invalid(
        PhrasebookConfig::from_toml("[store]\ntype = \"sqlite\"\n"),
        "sqlite store requires path",
    )
}

#[test]
fn memory_store_forbids_path() -> TestResult {
    assert_invalid(
        PhrasebookConfig::from_toml("[store]\ntype = \"memory\"\npath = \"x.sqlite\"\n"),
        "memory store must not set path",
    )
}

#[test]
fn unknown_policy_is_a_parse_error() -> TestResult {
    match PhrasebookConfig::from_toml("[sync]\nprimary_text = \"always\"\n") {
        Err(ConfigError::Parse(_)) => Ok(()),
        Err(other) => Err(format!("unexpected error {other}")),
        Ok(_) => Err("expected parse error".to_string()),
    }
}

#[test]
fn load_reads_explicit_path() -> TestResult {
    let temp = tempfile::TempDir::new().map_err(|err| err.to_string())?;
    let path = temp.path().join("phrasebook.toml");
    fs::write(&path, "[locales]\nprimary = \"de\"\n").map_err(|err| err.to_string())?;
    let config = PhrasebookConfig::load(Some(&path)).map_err(|err| err.to_string())?;
    if config.locales.primary != "de" {
        return Err("explicit config path was not loaded".to_string());
    }
    Ok(())
}

#[test]
fn load_rejects_oversized_and_non_utf8_files() -> TestResult {
    let temp = tempfile::TempDir::new().map_err(|err| err.to_string())?;
    let oversized = temp.path().join("big.toml");
    fs::write(&oversized, vec![b'#'; 1024 * 1024 + 1]).map_err(|err| err.to_string())?;
    assert_invalid(PhrasebookConfig::load(Some(&oversized)), "exceeds size limit")?;

    let binary = temp.path().join("binary.toml");
    fs::write(&binary, [0xff_u8, 0xfe, 0x00]).map_err(|err| err.to_string())?;
    assert_invalid(PhrasebookConfig::load(Some(&binary)), "must be utf-8")
}

#[test]
fn load_reports_missing_file_as_io_error() -> TestResult {
    let temp = tempfile::TempDir::new().map_err(|err| err.to_string())?;
    match PhrasebookConfig::load(Some(&temp.path().join("absent.toml"))) {
        Err(ConfigError::Io(_)) => Ok(()),
        Err(other) => Err(format!("unexpected error {other}")),
        Ok(_) => Err("expected io error".to_string()),
    }
}
