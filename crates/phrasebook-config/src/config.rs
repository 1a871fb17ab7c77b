// crates/phrasebook-config/src/config.rs
// ============================================================================
// Module: Phrasebook Configuration
// Description: Configuration loading and validation for Phrasebook.
// Purpose: Provide strict, fail-closed config parsing with hard limits.
// Dependencies: phrasebook-core, phrasebook-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! Configuration is loaded from a TOML file with strict size and path limits.
//! Every section is optional and falls back to defaults, but whatever is
//! present must validate; invalid configuration fails closed.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use phrasebook_core::PrimaryTextPolicy;
use phrasebook_core::SyncOptions;
use phrasebook_store_sqlite::SqliteStoreConfig;
use phrasebook_store_sqlite::SqliteStoreMode;
use phrasebook_store_sqlite::SqliteSyncMode;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default configuration filename when no path is specified.
const DEFAULT_CONFIG_NAME: &str = "phrasebook.toml";
/// Environment variable used to override the config path.
pub const CONFIG_ENV_VAR: &str = "PHRASEBOOK_CONFIG";
/// Maximum configuration file size in bytes.
pub(crate) const MAX_CONFIG_FILE_SIZE: usize = 1024 * 1024;
/// Maximum length of a single path component.
pub(crate) const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
pub(crate) const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum length of a locale name.
pub(crate) const MAX_LOCALE_NAME_LENGTH: usize = 64;
/// Maximum number of configured secondary locales.
pub(crate) const MAX_SECONDARY_LOCALES: usize = 256;
/// Maximum number of translation load paths.
pub(crate) const MAX_LOAD_PATHS: usize = 256;
/// Maximum number of reserved key prefixes.
pub(crate) const MAX_RESERVED_PREFIXES: usize = 64;
/// Default primary locale name.
const DEFAULT_PRIMARY_LOCALE: &str = "en";
/// Default locale files directory.
const DEFAULT_LOCALES_DIR: &str = "config/locales";
/// Default busy timeout for the `SQLite` store (ms).
const DEFAULT_STORE_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Default tracing filter directive.
const DEFAULT_LOG_FILTER: &str = "info";

// ============================================================================
// SECTION: Configuration Types
// ============================================================================

/// Phrasebook configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PhrasebookConfig {
    /// Locale configuration.
    #[serde(default)]
    pub locales: LocalesConfig,
    /// Translation source configuration.
    #[serde(default)]
    pub source: SourceConfig,
    /// Sync behavior configuration.
    #[serde(default)]
    pub sync: SyncConfig,
    /// Translation store configuration.
    #[serde(default)]
    pub store: StoreConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl PhrasebookConfig {
    /// Loads configuration from disk using the default resolution rules.
    ///
    /// Resolution order is the explicit `path`, then [`CONFIG_ENV_VAR`], then
    /// `./phrasebook.toml`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when loading or validation fails.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let resolved = resolve_path(path)?;
        validate_path(&resolved)?;
        let bytes = fs::read(&resolved).map_err(|err| ConfigError::Io(err.to_string()))?;
        if bytes.len() > MAX_CONFIG_FILE_SIZE {
            return Err(ConfigError::Invalid("config file exceeds size limit".to_string()));
        }
        let content = std::str::from_utf8(&bytes)
            .map_err(|_| ConfigError::Invalid("config file must be utf-8".to_string()))?;
        let config = Self::from_toml(content)?;
        Ok(config)
    }

    /// Parses and validates configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when parsing or validation fails.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for internal consistency.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] when configuration is invalid.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.locales.validate()?;
        self.source.validate()?;
        self.store.validate()?;
        self.logging.validate()?;
        Ok(())
    }

    /// Returns sync options derived from the locale, source, and sync sections.
    #[must_use]
    pub fn sync_options(&self) -> SyncOptions {
        let mut options =
            SyncOptions::new(self.locales.primary.clone(), self.source.locales_dir.clone())
                .with_primary_text(self.sync.primary_text);
        options.reserved_prefixes.clone_from(&self.source.reserved_prefixes);
        options
    }

    /// Returns the `SQLite` store configuration when the sqlite backend is selected.
    #[must_use]
    pub fn sqlite_store_config(&self) -> Option<SqliteStoreConfig> {
        match self.store.store_type {
            StoreType::Memory => None,
            StoreType::Sqlite => self.store.path.as_ref().map(|path| SqliteStoreConfig {
                path: path.clone(),
                busy_timeout_ms: self.store.busy_timeout_ms,
                journal_mode: self.store.journal_mode,
                sync_mode: self.store.sync_mode,
            }),
        }
    }
}

/// Locale configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LocalesConfig {
    /// Primary (source-of-truth) locale name.
    #[serde(default = "default_primary_locale")]
    pub primary: String,
    /// Secondary locales created on sync.
    #[serde(default)]
    pub secondary: Vec<String>,
}

impl Default for LocalesConfig {
    fn default() -> Self {
        Self {
            primary: default_primary_locale(),
            secondary: Vec::new(),
        }
    }
}

impl LocalesConfig {
    /// Validates locale names and their uniqueness.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_locale_name("locales.primary", &self.primary)?;
        if self.secondary.len() > MAX_SECONDARY_LOCALES {
            return Err(ConfigError::Invalid(format!(
                "locales.secondary exceeds max entries ({MAX_SECONDARY_LOCALES})"
            )));
        }
        let mut seen = BTreeSet::new();
        for name in &self.secondary {
            validate_locale_name("locales.secondary", name)?;
            if *name == self.primary {
                return Err(ConfigError::Invalid(format!(
                    "locales.secondary must not include the primary locale {name}"
                )));
            }
            if !seen.insert(name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "locales.secondary contains duplicate locale {name}"
                )));
            }
        }
        Ok(())
    }
}

/// Translation source configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    /// Directory holding one `{locale}.yml` file per locale.
    #[serde(default = "default_locales_dir")]
    pub locales_dir: PathBuf,
    /// Files or directories loaded into the runtime translation table.
    #[serde(default = "default_load_paths")]
    pub load_paths: Vec<PathBuf>,
    /// Top-level key prefixes excluded from sync.
    #[serde(default = "default_reserved_prefixes")]
    pub reserved_prefixes: Vec<String>,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            locales_dir: default_locales_dir(),
            load_paths: default_load_paths(),
            reserved_prefixes: default_reserved_prefixes(),
        }
    }
}

impl SourceConfig {
    /// Validates source paths and reserved prefixes.
    fn validate(&self) -> Result<(), ConfigError> {
        validate_path_string("source.locales_dir", &self.locales_dir.to_string_lossy())?;
        if self.load_paths.len() > MAX_LOAD_PATHS {
            return Err(ConfigError::Invalid(format!(
                "source.load_paths exceeds max entries ({MAX_LOAD_PATHS})"
            )));
        }
        for path in &self.load_paths {
            validate_path_string("source.load_paths", &path.to_string_lossy())?;
        }
        if self.reserved_prefixes.len() > MAX_RESERVED_PREFIXES {
            return Err(ConfigError::Invalid(format!(
                "source.reserved_prefixes exceeds max entries ({MAX_RESERVED_PREFIXES})"
            )));
        }
        for prefix in &self.reserved_prefixes {
            if prefix.trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "source.reserved_prefixes entries must be non-empty".to_string(),
                ));
            }
            if prefix.contains(phrasebook_core::KEY_SEPARATOR) {
                return Err(ConfigError::Invalid(format!(
                    "source.reserved_prefixes entry {prefix} must be a single key segment"
                )));
            }
        }
        Ok(())
    }
}

/// Sync behavior configuration.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SyncConfig {
    /// How sync treats primary translations that already have text.
    #[serde(default)]
    pub primary_text: PrimaryTextPolicy,
}

/// Translation store configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StoreConfig {
    /// Store backend type.
    #[serde(rename = "type", default)]
    pub store_type: StoreType,
    /// `SQLite` database path when using the sqlite backend.
    #[serde(default)]
    pub path: Option<PathBuf>,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_store_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` synchronous mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            store_type: StoreType::default(),
            path: None,
            busy_timeout_ms: default_store_busy_timeout_ms(),
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

impl StoreConfig {
    /// Validates store configuration.
    fn validate(&self) -> Result<(), ConfigError> {
        match self.store_type {
            StoreType::Memory => {
                if self.path.is_some() {
                    return Err(ConfigError::Invalid("memory store must not set path".to_string()));
                }
                Ok(())
            }
            StoreType::Sqlite => {
                let path = self.path.as_ref().ok_or_else(|| {
                    ConfigError::Invalid("sqlite store requires path".to_string())
                })?;
                validate_path_string("store.path", &path.to_string_lossy())?;
                if self.busy_timeout_ms == 0 {
                    return Err(ConfigError::Invalid(
                        "store.busy_timeout_ms must be greater than zero".to_string(),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// Translation store backend type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StoreType {
    /// Use the in-memory store.
    #[default]
    Memory,
    /// Use `SQLite`-backed durable store.
    Sqlite,
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Tracing filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_log_filter")]
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: default_log_filter(),
        }
    }
}

impl LoggingConfig {
    /// Validates the logging filter.
    fn validate(&self) -> Result<(), ConfigError> {
        if self.filter.trim().is_empty() {
            return Err(ConfigError::Invalid("logging.filter must be non-empty".to_string()));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure while reading configuration.
    #[error("config io error: {0}")]
    Io(String),
    /// TOML parsing error.
    #[error("config parse error: {0}")]
    Parse(String),
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns the default primary locale.
fn default_primary_locale() -> String {
    DEFAULT_PRIMARY_LOCALE.to_string()
}

/// Returns the default locale files directory.
fn default_locales_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOCALES_DIR)
}

/// Returns the default translation load paths.
fn default_load_paths() -> Vec<PathBuf> {
    vec![default_locales_dir()]
}

/// Returns the default reserved key prefixes.
fn default_reserved_prefixes() -> Vec<String> {
    vec![phrasebook_core::runtime::DEFAULT_RESERVED_PREFIX.to_string()]
}

/// Returns the default store busy timeout.
const fn default_store_busy_timeout_ms() -> u64 {
    DEFAULT_STORE_BUSY_TIMEOUT_MS
}

/// Returns the default tracing filter.
fn default_log_filter() -> String {
    DEFAULT_LOG_FILTER.to_string()
}

/// Resolves the config path from CLI or environment defaults.
fn resolve_path(path: Option<&Path>) -> Result<PathBuf, ConfigError> {
    if let Some(path) = path {
        return Ok(path.to_path_buf());
    }
    if let Ok(env_path) = env::var(CONFIG_ENV_VAR) {
        if env_path.len() > MAX_TOTAL_PATH_LENGTH {
            return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
        }
        return Ok(PathBuf::from(env_path));
    }
    Ok(PathBuf::from(DEFAULT_CONFIG_NAME))
}

/// Validates path length limits for the config file.
fn validate_path(path: &Path) -> Result<(), ConfigError> {
    let text = path.to_string_lossy();
    if text.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid("config path exceeds max length".to_string()));
    }
    for component in path.components() {
        let value = component.as_os_str().to_string_lossy();
        if value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid("config path component too long".to_string()));
        }
    }
    Ok(())
}

/// Validates a path string against length constraints.
fn validate_path_string(field: &str, value: &str) -> Result<(), ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if trimmed.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} exceeds max length")));
    }
    let path = Path::new(trimmed);
    for component in path.components() {
        let component_value = component.as_os_str().to_string_lossy();
        if component_value.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(ConfigError::Invalid(format!("{field} path component too long")));
        }
    }
    Ok(())
}

/// Validates a locale name.
///
/// Locale names become file names (`{locale}.yml`), so they are restricted to
/// ASCII alphanumerics, `-`, and `_`.
///
/// # Errors
///
/// Returns [`ConfigError::Invalid`] when the name is empty, too long, or
/// contains characters outside the allowed set.
pub fn validate_locale_name(field: &str, name: &str) -> Result<(), ConfigError> {
    if name.is_empty() {
        return Err(ConfigError::Invalid(format!("{field} must be non-empty")));
    }
    if name.len() > MAX_LOCALE_NAME_LENGTH {
        return Err(ConfigError::Invalid(format!("{field} entry {name} exceeds max length")));
    }
    if !name.chars().all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_')) {
        return Err(ConfigError::Invalid(format!(
            "{field} entry {name} contains invalid characters"
        )));
    }
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    #![allow(
        clippy::panic,
        clippy::unwrap_used,
        clippy::expect_used,
        reason = "Test-only assertions and helpers are permitted."
    )]

    use super::*;

    #[test]
    fn validate_path_string_rejects_empty_string() {
        let result = validate_path_string("test_path", "");
        assert!(result.unwrap_err().to_string().contains("non-empty"));
    }

    #[test]
    fn validate_path_string_rejects_component_too_long() {
        let long_component = "a".repeat(MAX_PATH_COMPONENT_LENGTH + 1);
        let result = validate_path_string("test_path", &format!("./{long_component}"));
        assert!(result.unwrap_err().to_string().contains("component too long"));
    }

    #[test]
    fn validate_path_string_error_includes_field_name() {
        let result = validate_path_string("my_custom_path", "  ");
        assert!(result.unwrap_err().to_string().contains("my_custom_path"));
    }

    #[test]
    fn locale_names_reject_path_characters() {
        assert!(validate_locale_name("locales.primary", "en-GB").is_ok());
        assert!(validate_locale_name("locales.primary", "pt_BR").is_ok());
        assert!(validate_locale_name("locales.primary", "../en").is_err());
        assert!(validate_locale_name("locales.primary", "e n").is_err());
    }
}
