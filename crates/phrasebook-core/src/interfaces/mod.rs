// crates/phrasebook-core/src/interfaces/mod.rs
// ============================================================================
// Module: Phrasebook Interfaces
// Description: Backend-agnostic interfaces for storage, caching, and sources.
// Purpose: Define the contract surfaces used by the Phrasebook runtime.
// Dependencies: crate::core, thiserror
// ============================================================================

//! ## Overview
//! Interfaces define how Phrasebook integrates with external systems without
//! embedding backend-specific details. The store owns identity and the
//! uniqueness constraints; the cache is a fire-and-forget invalidation
//! target; the translation table is the runtime's already-loaded locale data.

// ============================================================================
// SECTION: Imports
// ============================================================================

use thiserror::Error;

use crate::core::Locale;
use crate::core::LocaleId;
use crate::core::NewTranslation;
use crate::core::Phrase;
use crate::core::PhraseId;
use crate::core::SourceTree;
use crate::core::Translation;
use crate::core::TranslationEntry;
use crate::core::TranslationId;

// ============================================================================
// SECTION: Translation Store
// ============================================================================

/// Translation store errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Store I/O error.
    #[error("translation store io error: {0}")]
    Io(String),
    /// Store data is corrupted or fails decoding.
    #[error("translation store corruption: {0}")]
    Corrupt(String),
    /// Store schema version is incompatible.
    #[error("translation store version mismatch: {0}")]
    VersionMismatch(String),
    /// Request or stored data is invalid.
    #[error("translation store invalid data: {0}")]
    Invalid(String),
    /// A uniqueness constraint rejected the write; the caller may retry.
    #[error("translation store conflict: {0}")]
    Conflict(String),
    /// A referenced row does not exist.
    #[error("translation store missing record: {0}")]
    NotFound(String),
    /// Store reported an error.
    #[error("translation store error: {0}")]
    Store(String),
}

impl StoreError {
    /// Returns true when the failure is a race that a retry can resolve.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// Relational store for locales, phrases, and translations.
///
/// # Invariants
/// - `locales.name`, `phrases.key`, and `(phrase_id, locale_id)` are unique at
///   the storage layer, not only in application code.
/// - At most one locale is primary.
/// - Translations are never deleted.
pub trait TranslationStore {
    /// Lists all locales ordered by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn locales(&self) -> Result<Vec<Locale>, StoreError>;

    /// Loads a locale by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn locale(&self, id: LocaleId) -> Result<Option<Locale>, StoreError>;

    /// Loads a locale by name.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn locale_by_name(&self, name: &str) -> Result<Option<Locale>, StoreError>;

    /// Returns the primary locale named `name`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when another locale is already primary
    /// or `name` exists as a secondary locale.
    fn ensure_primary_locale(&self, name: &str) -> Result<Locale, StoreError>;

    /// Returns the secondary locale named `name`, creating it when absent.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when `name` is the primary locale.
    fn find_or_create_locale(&self, name: &str) -> Result<Locale, StoreError>;

    /// Returns the phrase for `key`, creating it when absent.
    ///
    /// Concurrent callers for the same key observe a single phrase.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the upsert fails.
    fn find_or_create_phrase(&self, key: &str) -> Result<Phrase, StoreError>;

    /// Loads a phrase by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn phrase(&self, id: PhraseId) -> Result<Option<Phrase>, StoreError>;

    /// Loads a phrase by exact key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn phrase_by_key(&self, key: &str) -> Result<Option<Phrase>, StoreError>;

    /// Loads a translation by identifier.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn translation(&self, id: TranslationId) -> Result<Option<Translation>, StoreError>;

    /// Loads the translation of `phrase_id` in `locale_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn translation_for(
        &self,
        phrase_id: PhraseId,
        locale_id: LocaleId,
    ) -> Result<Option<Translation>, StoreError>;

    /// Loads the phrase's translation in the primary locale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn primary_translation(&self, phrase_id: PhraseId) -> Result<Option<Translation>, StoreError>;

    /// Loads the phrase's translations in every non-primary locale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn secondary_translations(&self, phrase_id: PhraseId) -> Result<Vec<Translation>, StoreError>;

    /// Finds translations whose text contains `query`, case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn translations_containing(&self, query: &str) -> Result<Vec<TranslationEntry>, StoreError>;

    /// Finds translations in `locale` whose phrase key equals one of `keys`
    /// or sits beneath one of them (`key.` prefix, case-insensitive).
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn lookup(&self, locale: &str, keys: &[String]) -> Result<Vec<TranslationEntry>, StoreError>;

    /// Lists translations of `locale_id` flagged as stale.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn stale_translations(&self, locale_id: LocaleId)
    -> Result<Vec<TranslationEntry>, StoreError>;

    /// Lists every translation of `locale_id` ordered by phrase key.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn translations_for_locale(
        &self,
        locale_id: LocaleId,
    ) -> Result<Vec<TranslationEntry>, StoreError>;

    /// Lists phrases with no translation row in `locale_id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the query fails.
    fn phrases_without_translation(&self, locale_id: LocaleId) -> Result<Vec<Phrase>, StoreError>;

    /// Inserts a translation.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] when a translation already exists for
    /// the same phrase and locale.
    fn insert_translation(&self, translation: &NewTranslation) -> Result<Translation, StoreError>;

    /// Overwrites an existing translation row.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::NotFound`] when the row does not exist.
    fn update_translation(&self, translation: &Translation) -> Result<(), StoreError>;
}

// ============================================================================
// SECTION: Cache
// ============================================================================

/// Cache backend errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Backend reported an error.
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// External cache that holds rendered translations keyed by locale + phrase.
pub trait CacheInvalidator {
    /// Deletes the cached entry for `key`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError`] when the backend fails; callers log and continue.
    fn delete(&self, key: &str) -> Result<(), CacheError>;
}

// ============================================================================
// SECTION: Translation Sources
// ============================================================================

/// Locale source errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SourceError {
    /// Source file I/O error.
    #[error("locale source io error: {0}")]
    Io(String),
    /// Source file could not be parsed.
    #[error("locale source parse error: {0}")]
    Parse(String),
    /// Source content is structurally invalid.
    #[error("locale source invalid: {0}")]
    Invalid(String),
}

/// The runtime's in-memory translation table.
///
/// Implementations load lazily; callers must initialize before reading.
pub trait TranslationTable {
    /// Returns true once the table has been loaded.
    fn is_initialized(&self) -> bool;

    /// Loads the table; repeated calls are no-ops.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] when a source cannot be read or parsed.
    fn initialize(&self) -> Result<(), SourceError>;

    /// Returns the fully merged tree for `locale`, if any source defines it.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError::Invalid`] when the table is not initialized.
    fn translations(&self, locale: &str) -> Result<Option<SourceTree>, SourceError>;
}
