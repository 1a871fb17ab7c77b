// crates/phrasebook-core/src/runtime/sync.rs
// ============================================================================
// Module: Phrasebook Sync Engine
// Description: Reconciles primary-locale sources with the translation store.
// Purpose: Create phrases and primary translations and flag stale secondaries.
// Dependencies: serde, thiserror, tracing, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! A sync run loads the primary locale from the runtime translation table and
//! from the primary locale file, merges the two (table values win), drops
//! reserved keys, and walks the result in key order. Each key gets a phrase
//! and a primary translation; when an existing primary translation's text
//! changes, every secondary translation of that phrase is flagged stale.
//!
//! ## Invariants
//! - Runs are idempotent: unchanged input creates nothing and flags nothing.
//! - Phrases and translations absent from the source are never deleted.
//! - Any failure aborts the run; re-running after fixing the cause recovers.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::path::PathBuf;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use crate::core::FlatTranslations;
use crate::core::flatten;
use crate::core::merge_preferring;
use crate::interfaces::CacheInvalidator;
use crate::interfaces::SourceError;
use crate::interfaces::StoreError;
use crate::interfaces::TranslationStore;
use crate::interfaces::TranslationTable;
use crate::runtime::pipeline::SaveError;
use crate::runtime::pipeline::SavePipeline;
use crate::runtime::pipeline::TranslationDraft;
use crate::runtime::pipeline::normalize_text;
use crate::runtime::source::read_locale_file;

// ============================================================================
// SECTION: Options
// ============================================================================

/// Key prefix reserved for the runtime's own translations.
pub const DEFAULT_RESERVED_PREFIX: &str = "i18n";

/// How sync treats a primary translation that already has text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryTextPolicy {
    /// Only fill primary translations whose text is blank.
    #[default]
    FillGaps,
    /// Overwrite the primary text whenever the source differs.
    SourceWins,
}

/// Sync run configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncOptions {
    /// Primary locale name.
    pub primary_locale: String,
    /// Directory holding `{locale}.yml` files.
    pub locales_dir: PathBuf,
    /// Keys starting with any of these prefixes are ignored.
    pub reserved_prefixes: Vec<String>,
    /// Primary text overwrite policy.
    pub primary_text: PrimaryTextPolicy,
}

impl SyncOptions {
    /// Creates options with the default reserved prefix and policy.
    #[must_use]
    pub fn new(primary_locale: impl Into<String>, locales_dir: impl Into<PathBuf>) -> Self {
        Self {
            primary_locale: primary_locale.into(),
            locales_dir: locales_dir.into(),
            reserved_prefixes: vec![DEFAULT_RESERVED_PREFIX.to_string()],
            primary_text: PrimaryTextPolicy::default(),
        }
    }

    /// Sets the primary text policy.
    #[must_use]
    pub const fn with_primary_text(mut self, policy: PrimaryTextPolicy) -> Self {
        self.primary_text = policy;
        self
    }

    /// Returns the path of the primary locale file.
    #[must_use]
    pub fn primary_locale_file(&self) -> PathBuf {
        self.locales_dir.join(format!("{}.yml", self.primary_locale))
    }

    /// Returns true when `key` falls under a reserved prefix.
    #[must_use]
    pub fn is_reserved(&self, key: &str) -> bool {
        self.reserved_prefixes.iter().any(|prefix| key.starts_with(prefix.as_str()))
    }
}

// ============================================================================
// SECTION: Report and Errors
// ============================================================================

/// Counters describing one sync run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SyncReport {
    /// Keys remaining after reserved-prefix filtering.
    pub keys_seen: usize,
    /// Keys skipped because their value is deferred.
    pub deferred_skipped: usize,
    /// Keys dropped by reserved-prefix filtering.
    pub reserved_filtered: usize,
    /// Phrases created.
    pub phrases_created: usize,
    /// Primary translations created.
    pub primary_created: usize,
    /// Existing primary translations whose text changed.
    pub primary_updated: usize,
    /// Secondary translations flagged stale.
    pub marked_stale: usize,
}

/// Errors that abort a sync run.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// A locale source could not be loaded.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// A translation save failed.
    #[error("sync failed saving {key}: {source}")]
    Save {
        /// Phrase key being synced.
        key: String,
        /// Underlying save failure.
        source: SaveError,
    },
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Reconciles the primary locale sources with the store.
pub struct SyncEngine<'a> {
    /// Translation store.
    store: &'a dyn TranslationStore,
    /// Runtime translation table.
    table: &'a dyn TranslationTable,
    /// Save pipeline used for every write.
    pipeline: SavePipeline<'a>,
    /// Run configuration.
    options: SyncOptions,
}

/// Flattened source with filtering counters.
struct LoadedSource {
    /// Merged, filtered translations.
    translations: FlatTranslations,
    /// Number of reserved keys dropped.
    reserved_filtered: usize,
}

impl<'a> SyncEngine<'a> {
    /// Creates a sync engine.
    #[must_use]
    pub fn new(
        store: &'a dyn TranslationStore,
        cache: &'a dyn CacheInvalidator,
        table: &'a dyn TranslationTable,
        options: SyncOptions,
    ) -> Self {
        Self {
            store,
            table,
            pipeline: SavePipeline::new(store, cache),
            options,
        }
    }

    /// Returns the run configuration.
    #[must_use]
    pub const fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Loads, merges, and filters the primary locale translations.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::Source`] when a source cannot be read.
    pub fn load_translations(&self) -> Result<FlatTranslations, SyncError> {
        Ok(self.load()?.translations)
    }

    /// Runs one sync pass.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError`] on the first source, store, or save failure.
    pub fn sync(&self) -> Result<SyncReport, SyncError> {
        tracing::info!(locale = %self.options.primary_locale, "sync started");
        let primary_locale = self.store.ensure_primary_locale(&self.options.primary_locale)?;
        let loaded = self.load()?;
        let mut report = SyncReport {
            keys_seen: loaded.translations.len(),
            reserved_filtered: loaded.reserved_filtered,
            ..SyncReport::default()
        };

        for (key, value) in loaded.translations {
            if value.is_deferred() {
                report.deferred_skipped += 1;
                continue;
            }
            if self.store.phrase_by_key(&key)?.is_none() {
                report.phrases_created += 1;
            }
            let phrase = self.store.find_or_create_phrase(&key)?;
            let mut draft = match self.store.translation_for(phrase.id, primary_locale.id)? {
                Some(existing) => TranslationDraft::from_translation(existing),
                None => TranslationDraft::new(phrase.id, primary_locale.id),
            };
            draft.mark_from_source();
            let incoming = value.as_leaf().cloned();
            let assign = match self.options.primary_text {
                PrimaryTextPolicy::FillGaps => draft.is_blank(),
                PrimaryTextPolicy::SourceWins => draft.text() != incoming.as_ref(),
            };
            if assign {
                draft.set_text(incoming);
                normalize_text(&mut draft);
            }

            if draft.text_changed() && !draft.is_new_record() {
                report.primary_updated += 1;
                for secondary in self.store.secondary_translations(phrase.id)? {
                    let mut stale = TranslationDraft::from_translation(secondary);
                    self.pipeline.save(&mut stale, true).map_err(|source| SyncError::Save {
                        key: key.clone(),
                        source,
                    })?;
                    tracing::debug!(key = %key, locale_id = %stale.locale_id(), "marked stale");
                    report.marked_stale += 1;
                }
            }

            let is_new = draft.is_new_record();
            self.pipeline.save(&mut draft, false).map_err(|source| SyncError::Save {
                key: key.clone(),
                source,
            })?;
            if is_new {
                report.primary_created += 1;
            }
        }

        tracing::info!(
            keys = report.keys_seen,
            deferred = report.deferred_skipped,
            reserved = report.reserved_filtered,
            phrases_created = report.phrases_created,
            primary_created = report.primary_created,
            primary_updated = report.primary_updated,
            marked_stale = report.marked_stale,
            "sync finished"
        );
        Ok(report)
    }

    /// Loads both sources, merges them, and drops reserved keys.
    fn load(&self) -> Result<LoadedSource, SyncError> {
        if !self.table.is_initialized() {
            self.table.initialize()?;
        }
        let from_table = self
            .table
            .translations(&self.options.primary_locale)?
            .map(|tree| flatten(&tree))
            .unwrap_or_default();
        let file_tree =
            read_locale_file(&self.options.primary_locale_file(), &self.options.primary_locale)?;
        let merged = merge_preferring(from_table, flatten(&file_tree));

        let before = merged.len();
        let translations: FlatTranslations =
            merged.into_iter().filter(|(key, _)| !self.options.is_reserved(key)).collect();
        Ok(LoadedSource {
            reserved_filtered: before - translations.len(),
            translations,
        })
    }
}
