// crates/phrasebook-core/src/core/identifiers.rs
// ============================================================================
// Module: Phrasebook Identifiers
// Description: Store-assigned identifiers for locales, phrases, and translations.
// Purpose: Provide strongly typed, serializable row IDs with stable integer forms.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Identifiers are opaque integers assigned by the store backend on insert.
//! They serialize as plain integers so CLI payloads (for example the edit
//! input keyed by phrase id) stay readable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Identifier Types
// ============================================================================

/// Locale row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LocaleId(i64);

impl LocaleId {
    /// Creates a locale identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for LocaleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for LocaleId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

/// Phrase row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PhraseId(i64);

impl PhraseId {
    /// Creates a phrase identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for PhraseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for PhraseId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}

/// Translation row identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TranslationId(i64);

impl TranslationId {
    /// Creates a translation identifier from its raw row id.
    #[must_use]
    pub const fn new(id: i64) -> Self {
        Self(id)
    }

    /// Returns the raw row id.
    #[must_use]
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for TranslationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<i64> for TranslationId {
    fn from(value: i64) -> Self {
        Self::new(value)
    }
}
