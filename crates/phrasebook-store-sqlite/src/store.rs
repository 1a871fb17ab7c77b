// crates/phrasebook-store-sqlite/src/store.rs
// ============================================================================
// Module: SQLite Translation Store
// Description: Durable TranslationStore backed by SQLite.
// Purpose: Persist locales, phrases, and translations with storage-level uniqueness.
// Dependencies: phrasebook-core, rusqlite, serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! This module implements a durable [`TranslationStore`] using `SQLite`.
//! Uniqueness of locale names, phrase keys, and `(phrase_id, locale_id)` is
//! enforced by the schema, and a partial unique index allows at most one
//! primary locale. Constraint violations surface as
//! [`StoreError::Conflict`] so racing writers can retry. Translation text is
//! stored as JSON alongside a lowercased search column. Phrase keys carry a
//! lowercased copy folded in Rust, since `SQLite` `lower()` only folds ASCII.
//! Security posture: database contents are untrusted; decoding failures fail
//! closed as corruption.

// ============================================================================//
// SECTION: Imports
// ============================================================================//

use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::Mutex;

use phrasebook_core::LeafValue;
use phrasebook_core::Locale;
use phrasebook_core::LocaleId;
use phrasebook_core::NewTranslation;
use phrasebook_core::Phrase;
use phrasebook_core::PhraseId;
use phrasebook_core::StoreError;
use phrasebook_core::Translation;
use phrasebook_core::TranslationEntry;
use phrasebook_core::TranslationId;
use phrasebook_core::TranslationStore;
use rusqlite::Connection;
use rusqlite::OpenFlags;
use rusqlite::OptionalExtension;
use rusqlite::Row;
use rusqlite::params;
use rusqlite::params_from_iter;
use serde::Deserialize;
use thiserror::Error;

// ============================================================================//
// SECTION: Constants
// ============================================================================//

/// `SQLite` schema version for the store.
const SCHEMA_VERSION: i64 = 2;
/// Default busy timeout (ms).
const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;
/// Maximum length of a single path component.
const MAX_PATH_COMPONENT_LENGTH: usize = 255;
/// Maximum total path length.
const MAX_TOTAL_PATH_LENGTH: usize = 4096;
/// Maximum encoded text size accepted by the store.
pub const MAX_TEXT_BYTES: usize = 1024 * 1024;

/// Translation columns selected for every translation read.
const TRANSLATION_COLUMNS: &str =
    "t.id, t.phrase_id, t.locale_id, t.text, t.previous_text, t.primary_updated, t.explicit_nil";

/// Join used for every entry read; appends phrase key and locale columns.
const ENTRY_FROM: &str = "FROM translations t JOIN phrases p ON p.id = t.phrase_id JOIN locales \
                          l ON l.id = t.locale_id";

// ============================================================================//
// SECTION: Config
// ============================================================================//

/// `SQLite` journal mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteStoreMode {
    /// WAL journal mode (recommended).
    #[default]
    Wal,
    /// Delete journal mode (legacy).
    Delete,
}

impl SqliteStoreMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Wal => "wal",
            Self::Delete => "delete",
        }
    }
}

/// `SQLite` sync mode configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SqliteSyncMode {
    /// Full synchronous mode (safest).
    #[default]
    Full,
    /// Normal synchronous mode (balanced).
    Normal,
}

impl SqliteSyncMode {
    /// Returns the `SQLite` pragma value.
    #[must_use]
    pub const fn pragma_value(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Normal => "normal",
        }
    }
}

/// Configuration for the `SQLite` translation store.
#[derive(Debug, Clone, Deserialize)]
pub struct SqliteStoreConfig {
    /// Path to the `SQLite` database file.
    pub path: PathBuf,
    /// Busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
    /// `SQLite` journal mode.
    #[serde(default)]
    pub journal_mode: SqliteStoreMode,
    /// `SQLite` sync mode.
    #[serde(default)]
    pub sync_mode: SqliteSyncMode,
}

impl SqliteStoreConfig {
    /// Creates a configuration with default pragmas for `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
            journal_mode: SqliteStoreMode::default(),
            sync_mode: SqliteSyncMode::default(),
        }
    }
}

/// Returns the default busy timeout for `SQLite` connections.
const fn default_busy_timeout_ms() -> u64 {
    DEFAULT_BUSY_TIMEOUT_MS
}

// ============================================================================//
// SECTION: Errors
// ============================================================================//

/// `SQLite` store errors.
#[derive(Debug, Error)]
pub enum SqliteStoreError {
    /// Store I/O error.
    #[error("sqlite store io error: {0}")]
    Io(String),
    /// `SQLite` engine error.
    #[error("sqlite store db error: {0}")]
    Db(String),
    /// Stored data failed decoding.
    #[error("sqlite store corruption: {0}")]
    Corrupt(String),
    /// Store schema version mismatch.
    #[error("sqlite store version mismatch: {0}")]
    VersionMismatch(String),
    /// Invalid store data.
    #[error("sqlite store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint rejected the write.
    #[error("sqlite store conflict: {0}")]
    Conflict(String),
    /// A referenced row does not exist.
    #[error("sqlite store missing record: {0}")]
    NotFound(String),
    /// Encoded text exceeded the size limit.
    #[error("sqlite store payload too large: {actual_bytes} bytes (max {max_bytes})")]
    TooLarge {
        /// Maximum allowed bytes.
        max_bytes: usize,
        /// Actual payload size in bytes.
        actual_bytes: usize,
    },
}

impl From<SqliteStoreError> for StoreError {
    fn from(error: SqliteStoreError) -> Self {
        match error {
            SqliteStoreError::Io(message) => Self::Io(message),
            SqliteStoreError::Db(message) => Self::Store(message),
            SqliteStoreError::Corrupt(message) => Self::Corrupt(message),
            SqliteStoreError::VersionMismatch(message) => Self::VersionMismatch(message),
            SqliteStoreError::Invalid(message) => Self::Invalid(message),
            SqliteStoreError::Conflict(message) => Self::Conflict(message),
            SqliteStoreError::NotFound(message) => Self::NotFound(message),
            SqliteStoreError::TooLarge {
                max_bytes,
                actual_bytes,
            } => Self::Invalid(format!(
                "translation text exceeds size limit: {actual_bytes} bytes (max {max_bytes})"
            )),
        }
    }
}

/// Maps a `rusqlite` error, classifying constraint violations.
fn db_error(err: &rusqlite::Error) -> SqliteStoreError {
    if let rusqlite::Error::SqliteFailure(failure, _) = err {
        match failure.extended_code {
            rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE | rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY => {
                return SqliteStoreError::Conflict(err.to_string());
            }
            rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY => {
                return SqliteStoreError::NotFound(err.to_string());
            }
            _ => {}
        }
    }
    SqliteStoreError::Db(err.to_string())
}

// ============================================================================//
// SECTION: Row Decoding
// ============================================================================//

/// Translation row before JSON decoding.
struct RawTranslation {
    /// Row identifier.
    id: i64,
    /// Owning phrase.
    phrase_id: i64,
    /// Owning locale.
    locale_id: i64,
    /// JSON-encoded text.
    text: Option<String>,
    /// JSON-encoded previous text.
    previous_text: Option<String>,
    /// Staleness marker.
    primary_updated: bool,
    /// Explicit-null marker.
    explicit_nil: bool,
}

impl RawTranslation {
    /// Reads the translation columns starting at index 0.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            phrase_id: row.get(1)?,
            locale_id: row.get(2)?,
            text: row.get(3)?,
            previous_text: row.get(4)?,
            primary_updated: row.get(5)?,
            explicit_nil: row.get(6)?,
        })
    }

    /// Decodes JSON columns into a translation.
    fn decode(self) -> Result<Translation, SqliteStoreError> {
        Ok(Translation {
            id: TranslationId::new(self.id),
            phrase_id: PhraseId::new(self.phrase_id),
            locale_id: LocaleId::new(self.locale_id),
            text: decode_text(self.text.as_deref())?,
            previous_text: decode_text(self.previous_text.as_deref())?,
            primary_updated: self.primary_updated,
            explicit_nil: self.explicit_nil,
        })
    }
}

/// Entry row before JSON decoding.
struct RawEntry {
    /// Translation columns.
    translation: RawTranslation,
    /// Phrase key.
    key: String,
    /// Locale name.
    locale_name: String,
    /// Primary locale flag.
    is_primary: bool,
}

impl RawEntry {
    /// Reads translation columns followed by key, locale name, and primary flag.
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            translation: RawTranslation::from_row(row)?,
            key: row.get(7)?,
            locale_name: row.get(8)?,
            is_primary: row.get(9)?,
        })
    }

    /// Decodes into a joined entry.
    fn decode(self) -> Result<TranslationEntry, SqliteStoreError> {
        let translation = self.translation.decode()?;
        Ok(TranslationEntry {
            phrase: Phrase {
                id: translation.phrase_id,
                key: self.key,
            },
            locale: Locale {
                id: translation.locale_id,
                name: self.locale_name,
                is_primary: self.is_primary,
            },
            translation,
        })
    }
}

/// Reads a locale row `(id, name, is_primary)`.
fn locale_from_row(row: &Row<'_>) -> rusqlite::Result<Locale> {
    Ok(Locale {
        id: LocaleId::new(row.get(0)?),
        name: row.get(1)?,
        is_primary: row.get(2)?,
    })
}

/// Reads a phrase row `(id, key)`.
fn phrase_from_row(row: &Row<'_>) -> rusqlite::Result<Phrase> {
    Ok(Phrase {
        id: PhraseId::new(row.get(0)?),
        key: row.get(1)?,
    })
}

/// Decodes a JSON text column.
fn decode_text(column: Option<&str>) -> Result<Option<LeafValue>, SqliteStoreError> {
    column
        .map(|json| {
            serde_json::from_str(json).map_err(|err| SqliteStoreError::Corrupt(err.to_string()))
        })
        .transpose()
}

/// Encodes a text value as JSON, enforcing the size limit.
fn encode_text(text: Option<&LeafValue>) -> Result<Option<String>, SqliteStoreError> {
    let Some(text) = text else {
        return Ok(None);
    };
    let json =
        serde_json::to_string(text).map_err(|err| SqliteStoreError::Invalid(err.to_string()))?;
    if json.len() > MAX_TEXT_BYTES {
        return Err(SqliteStoreError::TooLarge {
            max_bytes: MAX_TEXT_BYTES,
            actual_bytes: json.len(),
        });
    }
    Ok(Some(json))
}

/// Returns the lowercased search column for `text`.
fn search_column(text: Option<&LeafValue>) -> String {
    text.map(LeafValue::search_text).unwrap_or_default()
}

/// Escapes `LIKE` wildcards with a backslash.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

// ============================================================================//
// SECTION: Store
// ============================================================================//

/// `SQLite`-backed translation store.
#[derive(Clone)]
pub struct SqliteTranslationStore {
    /// Store configuration.
    config: SqliteStoreConfig,
    /// Shared `SQLite` connection guarded by a mutex.
    connection: Arc<Mutex<Connection>>,
}

impl SqliteTranslationStore {
    /// Opens an `SQLite`-backed translation store.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteStoreError`] when the database cannot be opened or
    /// initialized.
    pub fn new(config: SqliteStoreConfig) -> Result<Self, SqliteStoreError> {
        validate_store_path(&config.path)?;
        ensure_parent_dir(&config.path)?;
        let mut connection = open_connection(&config)?;
        initialize_schema(&mut connection)?;
        Ok(Self {
            config,
            connection: Arc::new(Mutex::new(connection)),
        })
    }

    /// Returns the database path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.config.path
    }

    /// Runs `operation` with exclusive access to the connection.
    fn with_connection<T>(
        &self,
        operation: impl FnOnce(&mut Connection) -> Result<T, SqliteStoreError>,
    ) -> Result<T, StoreError> {
        let mut guard = self
            .connection
            .lock()
            .map_err(|_| SqliteStoreError::Db("mutex poisoned".to_string()))?;
        let result = operation(&mut guard);
        drop(guard);
        result.map_err(StoreError::from)
    }

    /// Runs an entry query and decodes every row.
    fn query_entries(
        &self,
        sql: &str,
        values: Vec<rusqlite::types::Value>,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        self.with_connection(|connection| {
            let mut statement = connection.prepare(sql).map_err(|err| db_error(&err))?;
            let rows = statement
                .query_map(params_from_iter(values), RawEntry::from_row)
                .map_err(|err| db_error(&err))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| db_error(&err))?;
            rows.into_iter().map(RawEntry::decode).collect()
        })
    }
}

impl TranslationStore for SqliteTranslationStore {
    fn locales(&self) -> Result<Vec<Locale>, StoreError> {
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare("SELECT id, name, is_primary FROM locales ORDER BY name")
                .map_err(|err| db_error(&err))?;
            statement
                .query_map(params![], locale_from_row)
                .map_err(|err| db_error(&err))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| db_error(&err))
        })
    }

    fn locale(&self, id: LocaleId) -> Result<Option<Locale>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT id, name, is_primary FROM locales WHERE id = ?1",
                    params![id.get()],
                    locale_from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))
        })
    }

    fn locale_by_name(&self, name: &str) -> Result<Option<Locale>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT id, name, is_primary FROM locales WHERE name = ?1",
                    params![name],
                    locale_from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))
        })
    }

    fn ensure_primary_locale(&self, name: &str) -> Result<Locale, StoreError> {
        self.with_connection(|connection| {
            let tx = connection.transaction().map_err(|err| db_error(&err))?;
            let primary = tx
                .query_row(
                    "SELECT id, name, is_primary FROM locales WHERE is_primary = 1",
                    params![],
                    locale_from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))?;
            if let Some(primary) = primary {
                if primary.name == name {
                    return Ok(primary);
                }
                return Err(SqliteStoreError::Conflict(format!(
                    "primary locale is already {}",
                    primary.name
                )));
            }
            tx.execute("INSERT INTO locales (name, is_primary) VALUES (?1, 1)", params![name])
                .map_err(|err| match db_error(&err) {
                    SqliteStoreError::Conflict(_) => SqliteStoreError::Conflict(format!(
                        "locale {name} exists as a secondary locale"
                    )),
                    other => other,
                })?;
            let locale = Locale {
                id: LocaleId::new(tx.last_insert_rowid()),
                name: name.to_string(),
                is_primary: true,
            };
            tx.commit().map_err(|err| db_error(&err))?;
            Ok(locale)
        })
    }

    fn find_or_create_locale(&self, name: &str) -> Result<Locale, StoreError> {
        self.with_connection(|connection| {
            let tx = connection.transaction().map_err(|err| db_error(&err))?;
            tx.execute(
                "INSERT INTO locales (name, is_primary) VALUES (?1, 0) ON CONFLICT(name) DO \
                 NOTHING",
                params![name],
            )
            .map_err(|err| db_error(&err))?;
            let locale = tx
                .query_row(
                    "SELECT id, name, is_primary FROM locales WHERE name = ?1",
                    params![name],
                    locale_from_row,
                )
                .map_err(|err| db_error(&err))?;
            tx.commit().map_err(|err| db_error(&err))?;
            if locale.is_primary {
                return Err(SqliteStoreError::Conflict(format!(
                    "locale {name} is the primary locale"
                )));
            }
            Ok(locale)
        })
    }

    fn find_or_create_phrase(&self, key: &str) -> Result<Phrase, StoreError> {
        self.with_connection(|connection| {
            let tx = connection.transaction().map_err(|err| db_error(&err))?;
            tx.execute(
                "INSERT INTO phrases (key, key_folded) VALUES (?1, ?2) ON CONFLICT(key) DO \
                 NOTHING",
                params![key, key.to_lowercase()],
            )
            .map_err(|err| db_error(&err))?;
            let phrase = tx
                .query_row(
                    "SELECT id, key FROM phrases WHERE key = ?1",
                    params![key],
                    phrase_from_row,
                )
                .map_err(|err| db_error(&err))?;
            tx.commit().map_err(|err| db_error(&err))?;
            Ok(phrase)
        })
    }

    fn phrase(&self, id: PhraseId) -> Result<Option<Phrase>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT id, key FROM phrases WHERE id = ?1",
                    params![id.get()],
                    phrase_from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))
        })
    }

    fn phrase_by_key(&self, key: &str) -> Result<Option<Phrase>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    "SELECT id, key FROM phrases WHERE key = ?1",
                    params![key],
                    phrase_from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))
        })
    }

    fn translation(&self, id: TranslationId) -> Result<Option<Translation>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    &format!("SELECT {TRANSLATION_COLUMNS} FROM translations t WHERE t.id = ?1"),
                    params![id.get()],
                    RawTranslation::from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))?
                .map(RawTranslation::decode)
                .transpose()
        })
    }

    fn translation_for(
        &self,
        phrase_id: PhraseId,
        locale_id: LocaleId,
    ) -> Result<Option<Translation>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    &format!(
                        "SELECT {TRANSLATION_COLUMNS} FROM translations t WHERE t.phrase_id = ?1 \
                         AND t.locale_id = ?2"
                    ),
                    params![phrase_id.get(), locale_id.get()],
                    RawTranslation::from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))?
                .map(RawTranslation::decode)
                .transpose()
        })
    }

    fn primary_translation(&self, phrase_id: PhraseId) -> Result<Option<Translation>, StoreError> {
        self.with_connection(|connection| {
            connection
                .query_row(
                    &format!(
                        "SELECT {TRANSLATION_COLUMNS} FROM translations t JOIN locales l ON l.id \
                         = t.locale_id WHERE t.phrase_id = ?1 AND l.is_primary = 1"
                    ),
                    params![phrase_id.get()],
                    RawTranslation::from_row,
                )
                .optional()
                .map_err(|err| db_error(&err))?
                .map(RawTranslation::decode)
                .transpose()
        })
    }

    fn secondary_translations(&self, phrase_id: PhraseId) -> Result<Vec<Translation>, StoreError> {
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare(&format!(
                    "SELECT {TRANSLATION_COLUMNS} FROM translations t JOIN locales l ON l.id = \
                     t.locale_id WHERE t.phrase_id = ?1 AND l.is_primary = 0 ORDER BY t.id"
                ))
                .map_err(|err| db_error(&err))?;
            let rows = statement
                .query_map(params![phrase_id.get()], RawTranslation::from_row)
                .map_err(|err| db_error(&err))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| db_error(&err))?;
            rows.into_iter().map(RawTranslation::decode).collect()
        })
    }

    fn translations_containing(&self, query: &str) -> Result<Vec<TranslationEntry>, StoreError> {
        let sql = format!(
            "SELECT {TRANSLATION_COLUMNS}, p.key, l.name, l.is_primary {ENTRY_FROM} WHERE t.text \
             IS NOT NULL AND instr(t.search_text, ?1) > 0 ORDER BY p.key, l.name"
        );
        self.query_entries(&sql, vec![rusqlite::types::Value::Text(query.to_lowercase())])
    }

    fn lookup(&self, locale: &str, keys: &[String]) -> Result<Vec<TranslationEntry>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let mut clauses = Vec::with_capacity(keys.len());
        let mut values = vec![rusqlite::types::Value::Text(locale.to_string())];
        for key in keys {
            clauses.push("p.key = ? OR p.key_folded LIKE ? ESCAPE '\\'");
            values.push(rusqlite::types::Value::Text(key.clone()));
            values.push(rusqlite::types::Value::Text(format!(
                "{}.%",
                escape_like(&key.to_lowercase())
            )));
        }
        let sql = format!(
            "SELECT {TRANSLATION_COLUMNS}, p.key, l.name, l.is_primary {ENTRY_FROM} WHERE l.name \
             = ? AND ({}) ORDER BY p.key, l.name",
            clauses.join(" OR ")
        );
        self.query_entries(&sql, values)
    }

    fn stale_translations(
        &self,
        locale_id: LocaleId,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        let sql = format!(
            "SELECT {TRANSLATION_COLUMNS}, p.key, l.name, l.is_primary {ENTRY_FROM} WHERE \
             t.locale_id = ?1 AND t.primary_updated = 1 ORDER BY p.key, l.name"
        );
        self.query_entries(&sql, vec![rusqlite::types::Value::Integer(locale_id.get())])
    }

    fn translations_for_locale(
        &self,
        locale_id: LocaleId,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        let sql = format!(
            "SELECT {TRANSLATION_COLUMNS}, p.key, l.name, l.is_primary {ENTRY_FROM} WHERE \
             t.locale_id = ?1 ORDER BY p.key, l.name"
        );
        self.query_entries(&sql, vec![rusqlite::types::Value::Integer(locale_id.get())])
    }

    fn phrases_without_translation(&self, locale_id: LocaleId) -> Result<Vec<Phrase>, StoreError> {
        self.with_connection(|connection| {
            let mut statement = connection
                .prepare(
                    "SELECT p.id, p.key FROM phrases p WHERE NOT EXISTS (SELECT 1 FROM \
                     translations t WHERE t.phrase_id = p.id AND t.locale_id = ?1) ORDER BY p.key",
                )
                .map_err(|err| db_error(&err))?;
            statement
                .query_map(params![locale_id.get()], phrase_from_row)
                .map_err(|err| db_error(&err))?
                .collect::<Result<Vec<_>, _>>()
                .map_err(|err| db_error(&err))
        })
    }

    fn insert_translation(&self, translation: &NewTranslation) -> Result<Translation, StoreError> {
        let text = encode_text(translation.text.as_ref())?;
        let previous_text = encode_text(translation.previous_text.as_ref())?;
        let search_text = search_column(translation.text.as_ref());
        self.with_connection(|connection| {
            connection
                .execute(
                    "INSERT INTO translations (phrase_id, locale_id, text, previous_text, \
                     search_text, primary_updated, explicit_nil) VALUES (?1, ?2, ?3, ?4, ?5, ?6, \
                     ?7)",
                    params![
                        translation.phrase_id.get(),
                        translation.locale_id.get(),
                        text,
                        previous_text,
                        search_text,
                        translation.primary_updated,
                        translation.explicit_nil
                    ],
                )
                .map_err(|err| db_error(&err))?;
            let id = TranslationId::new(connection.last_insert_rowid());
            Ok(translation.clone().into_translation(id))
        })
    }

    fn update_translation(&self, translation: &Translation) -> Result<(), StoreError> {
        let text = encode_text(translation.text.as_ref())?;
        let previous_text = encode_text(translation.previous_text.as_ref())?;
        let search_text = search_column(translation.text.as_ref());
        self.with_connection(|connection| {
            let updated = connection
                .execute(
                    "UPDATE translations SET text = ?1, previous_text = ?2, search_text = ?3, \
                     primary_updated = ?4, explicit_nil = ?5 WHERE id = ?6 AND phrase_id = ?7 AND \
                     locale_id = ?8",
                    params![
                        text,
                        previous_text,
                        search_text,
                        translation.primary_updated,
                        translation.explicit_nil,
                        translation.id.get(),
                        translation.phrase_id.get(),
                        translation.locale_id.get()
                    ],
                )
                .map_err(|err| db_error(&err))?;
            if updated == 1 {
                return Ok(());
            }
            let exists: Option<i64> = connection
                .query_row(
                    "SELECT id FROM translations WHERE id = ?1",
                    params![translation.id.get()],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|err| db_error(&err))?;
            match exists {
                Some(_) => Err(SqliteStoreError::Invalid(
                    "translation phrase and locale are immutable".to_string(),
                )),
                None => Err(SqliteStoreError::NotFound(format!("translation {}", translation.id))),
            }
        })
    }
}

// ============================================================================//
// SECTION: Helpers
// ============================================================================//

/// Ensures the parent directory for the store exists.
fn ensure_parent_dir(path: &Path) -> Result<(), SqliteStoreError> {
    let Some(parent) = path.parent() else {
        return Err(SqliteStoreError::Io("store path missing parent directory".to_string()));
    };
    if parent.as_os_str().is_empty() {
        return Ok(());
    }
    std::fs::create_dir_all(parent).map_err(|err| SqliteStoreError::Io(err.to_string()))
}

/// Validates store paths for safety limits.
fn validate_store_path(path: &Path) -> Result<(), SqliteStoreError> {
    let path_string = path.display().to_string();
    if path_string.len() > MAX_TOTAL_PATH_LENGTH {
        return Err(SqliteStoreError::Invalid("store path exceeds length limit".to_string()));
    }
    for component in path.components() {
        let name = component.as_os_str().to_string_lossy();
        if name.len() > MAX_PATH_COMPONENT_LENGTH {
            return Err(SqliteStoreError::Invalid(
                "store path contains an overlong component".to_string(),
            ));
        }
    }
    if path.exists() && path.is_dir() {
        return Err(SqliteStoreError::Invalid(
            "store path must be a file, not a directory".to_string(),
        ));
    }
    Ok(())
}

/// Opens an `SQLite` connection with secure defaults.
fn open_connection(config: &SqliteStoreConfig) -> Result<Connection, SqliteStoreError> {
    let flags = OpenFlags::SQLITE_OPEN_READ_WRITE
        | OpenFlags::SQLITE_OPEN_CREATE
        | OpenFlags::SQLITE_OPEN_FULL_MUTEX;
    let connection = Connection::open_with_flags(&config.path, flags)
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    apply_pragmas(&connection, config)?;
    Ok(connection)
}

/// Applies `SQLite` pragmas required for durability and integrity.
fn apply_pragmas(
    connection: &Connection,
    config: &SqliteStoreConfig,
) -> Result<(), SqliteStoreError> {
    connection
        .execute_batch("PRAGMA foreign_keys = ON;")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA journal_mode = {};", config.journal_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .execute_batch(&format!("PRAGMA synchronous = {};", config.sync_mode.pragma_value()))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    connection
        .busy_timeout(std::time::Duration::from_millis(config.busy_timeout_ms))
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

/// Initializes the `SQLite` schema or validates the existing version.
fn initialize_schema(connection: &mut Connection) -> Result<(), SqliteStoreError> {
    let tx = connection.transaction().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    tx.execute_batch("CREATE TABLE IF NOT EXISTS store_meta (version INTEGER NOT NULL);")
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    let version: Option<i64> = tx
        .query_row("SELECT version FROM store_meta LIMIT 1", params![], |row| row.get(0))
        .optional()
        .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    match version {
        None => {
            tx.execute("INSERT INTO store_meta (version) VALUES (?1)", params![SCHEMA_VERSION])
                .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
            tx.execute_batch(
                "CREATE TABLE IF NOT EXISTS locales (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    name TEXT NOT NULL UNIQUE,
                    is_primary INTEGER NOT NULL DEFAULT 0
                );
                CREATE UNIQUE INDEX IF NOT EXISTS idx_locales_single_primary
                    ON locales (is_primary) WHERE is_primary = 1;
                CREATE TABLE IF NOT EXISTS phrases (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    key TEXT NOT NULL UNIQUE,
                    key_folded TEXT NOT NULL
                );
                CREATE TABLE IF NOT EXISTS translations (
                    id INTEGER PRIMARY KEY AUTOINCREMENT,
                    phrase_id INTEGER NOT NULL REFERENCES phrases(id),
                    locale_id INTEGER NOT NULL REFERENCES locales(id),
                    text TEXT,
                    previous_text TEXT,
                    search_text TEXT NOT NULL DEFAULT '',
                    primary_updated INTEGER NOT NULL DEFAULT 0,
                    explicit_nil INTEGER NOT NULL DEFAULT 0,
                    UNIQUE (phrase_id, locale_id)
                );
                CREATE INDEX IF NOT EXISTS idx_translations_locale_id
                    ON translations (locale_id);",
            )
            .map_err(|err| SqliteStoreError::Db(err.to_string()))?;
        }
        Some(value) if value == SCHEMA_VERSION => {}
        Some(value) => {
            return Err(SqliteStoreError::VersionMismatch(format!(
                "unsupported schema version: {value}"
            )));
        }
    }
    tx.commit().map_err(|err| SqliteStoreError::Db(err.to_string()))?;
    Ok(())
}

// ============================================================================
// SECTION: Tests
// ============================================================================
