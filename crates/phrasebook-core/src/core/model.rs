// crates/phrasebook-core/src/core/model.rs
// ============================================================================
// Module: Phrasebook Relational Model
// Description: Locale, phrase, and translation records.
// Purpose: Define the records every store backend persists and returns.
// Dependencies: serde, crate::core::{identifiers, value, variables}
// ============================================================================

//! ## Overview
//! A [`Phrase`] is a dotted translation key. Each phrase owns at most one
//! [`Translation`] per [`Locale`]. Exactly one locale is primary; translations
//! of other locales carry a `primary_updated` staleness marker that is raised
//! when the primary text changes and cleared when an editor saves them.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;

use serde::Deserialize;
use serde::Serialize;

use crate::core::identifiers::LocaleId;
use crate::core::identifiers::PhraseId;
use crate::core::identifiers::TranslationId;
use crate::core::value::LeafValue;
use crate::core::variables::detect_variables;

// ============================================================================
// SECTION: Records
// ============================================================================

/// A locale known to the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Locale {
    /// Row identifier.
    pub id: LocaleId,
    /// Unique locale name (for example `en` or `pt-BR`).
    pub name: String,
    /// True for the single primary locale.
    pub is_primary: bool,
}

/// A translation key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phrase {
    /// Row identifier.
    pub id: PhraseId,
    /// Unique dotted key (for example `home.title`).
    pub key: String,
}

/// A persisted translation of one phrase into one locale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Translation {
    /// Row identifier.
    pub id: TranslationId,
    /// Owning phrase.
    pub phrase_id: PhraseId,
    /// Owning locale.
    pub locale_id: LocaleId,
    /// Translated value; absent while untranslated or when explicitly null.
    pub text: Option<LeafValue>,
    /// Text as it was before the most recent change.
    pub previous_text: Option<LeafValue>,
    /// Staleness marker: the primary text changed since this row was last touched.
    pub primary_updated: bool,
    /// The text was deliberately set to null.
    pub explicit_nil: bool,
}

impl Translation {
    /// Returns true when the primary text changed since the last edit.
    #[must_use]
    pub const fn is_out_of_date(&self) -> bool {
        self.primary_updated
    }

    /// Returns true when the translation is not stale.
    #[must_use]
    pub const fn is_up_to_date(&self) -> bool {
        !self.is_out_of_date()
    }

    /// Returns the interpolation variables referenced by the text.
    #[must_use]
    pub fn variables(&self) -> BTreeSet<String> {
        detect_variables(self.text.as_ref())
    }

    /// Returns true when the text is absent or blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.as_ref().is_none_or(LeafValue::is_blank)
    }

    /// Reads digits-only text back as an integer.
    #[must_use]
    pub fn numeric_value(&self) -> Option<i64> {
        self.text.as_ref().and_then(LeafValue::as_integer)
    }
}

/// Field values for a translation that has not been inserted yet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTranslation {
    /// Owning phrase.
    pub phrase_id: PhraseId,
    /// Owning locale.
    pub locale_id: LocaleId,
    /// Translated value.
    pub text: Option<LeafValue>,
    /// Text before the most recent change.
    pub previous_text: Option<LeafValue>,
    /// Staleness marker.
    pub primary_updated: bool,
    /// Explicit-null marker.
    pub explicit_nil: bool,
}

impl NewTranslation {
    /// Attaches a store-assigned identifier.
    #[must_use]
    pub fn into_translation(self, id: TranslationId) -> Translation {
        Translation {
            id,
            phrase_id: self.phrase_id,
            locale_id: self.locale_id,
            text: self.text,
            previous_text: self.previous_text,
            primary_updated: self.primary_updated,
            explicit_nil: self.explicit_nil,
        }
    }
}

/// A translation joined with its phrase and locale, as returned by queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationEntry {
    /// Owning phrase.
    pub phrase: Phrase,
    /// Owning locale.
    pub locale: Locale,
    /// The translation row.
    pub translation: Translation,
}

// ============================================================================
// SECTION: Cache Keys
// ============================================================================

/// Builds the external cache key for a locale + phrase key.
///
/// Format: `i18n-{locale}.{key}` with every whitespace character replaced by `_`.
#[must_use]
pub fn cache_key(locale: &str, key: &str) -> String {
    format!("i18n-{locale}.{key}")
        .chars()
        .map(|ch| if ch.is_whitespace() { '_' } else { ch })
        .collect()
}
