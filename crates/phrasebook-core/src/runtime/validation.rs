// crates/phrasebook-core/src/runtime/validation.rs
// ============================================================================
// Module: Phrasebook Translation Validation
// Description: Per-field validation of translations before persistence.
// Purpose: Enforce presence, variable parity, and per-locale uniqueness.
// Dependencies: serde, crate::core
// ============================================================================

//! ## Overview
//! Validation is a pure function over a [`TranslationDraft`] and the records
//! it depends on. The save pipeline gathers those records from the store and
//! refuses the save when any rule fails. All failures are collected so
//! callers can report every problem at once.
//!
//! ## Rules
//! - On the primary locale, `text` is required unless the draft is an
//!   explicit null or was written by sync.
//! - On a secondary locale, `text` is required unless the primary translation
//!   is absent or blank, or the draft is an explicit null.
//! - When the primary translation has text, the draft must reference the same
//!   substitution variables. An explicit null references none.
//! - At most one translation exists per phrase and locale.
//! - The owning locale and phrase must exist.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::core::Locale;
use crate::core::Phrase;
use crate::core::Translation;
use crate::core::detect_variables;
use crate::runtime::pipeline::TranslationDraft;

// ============================================================================
// SECTION: Messages
// ============================================================================

/// Presence failure message.
pub const BLANK_MESSAGE: &str = "can't be blank";

/// Missing association message.
pub const MISSING_MESSAGE: &str = "must exist";

/// Uniqueness failure message.
pub const TAKEN_MESSAGE: &str = "has already been taken";

/// Parity failure message when the primary has no substitutions.
pub const NO_SUBSTITUTIONS_MESSAGE: &str =
    "The primary translation does not contain substitutions, so this should neither.";

// ============================================================================
// SECTION: Error Types
// ============================================================================

/// Translation field a validation error is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranslationField {
    /// Translation text.
    Text,
    /// Substitution variables of the text.
    Variables,
    /// Owning phrase.
    PhraseId,
    /// Owning locale.
    LocaleId,
}

impl TranslationField {
    /// Returns the stable field label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Variables => "variables",
            Self::PhraseId => "phrase_id",
            Self::LocaleId => "locale_id",
        }
    }
}

impl fmt::Display for TranslationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single validation failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Field that failed.
    pub field: TranslationField,
    /// Human-readable message.
    pub message: String,
}

/// Collected validation failures for one translation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ValidationErrors {
    /// Failures in the order they were detected.
    errors: Vec<FieldError>,
}

impl ValidationErrors {
    /// Creates an empty error list.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
        }
    }

    /// Records a failure on `field`.
    pub fn add(&mut self, field: TranslationField, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    /// Returns true when no rule failed.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// Returns the number of failures.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.errors.len()
    }

    /// Returns every failure.
    #[must_use]
    pub fn errors(&self) -> &[FieldError] {
        &self.errors
    }

    /// Returns the messages recorded against `field`.
    #[must_use]
    pub fn on(&self, field: TranslationField) -> Vec<&str> {
        self.errors
            .iter()
            .filter(|error| error.field == field)
            .map(|error| error.message.as_str())
            .collect()
    }

    /// Returns `field: message` strings for display.
    #[must_use]
    pub fn full_messages(&self) -> Vec<String> {
        self.errors.iter().map(|error| format!("{}: {}", error.field, error.message)).collect()
    }
}

impl fmt::Display for ValidationErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_messages().join("; "))
    }
}

// ============================================================================
// SECTION: Validation
// ============================================================================

/// Records a draft is validated against.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidationContext<'a> {
    /// Owning locale, when it exists.
    pub locale: Option<&'a Locale>,
    /// Owning phrase, when it exists.
    pub phrase: Option<&'a Phrase>,
    /// Primary translation of the phrase; `None` for primary-locale drafts.
    pub primary: Option<&'a Translation>,
    /// Another translation already exists for the same phrase and locale.
    pub duplicate: bool,
}

/// Validates `draft` against `context`, collecting every failure.
#[must_use]
pub fn validate(draft: &TranslationDraft, context: &ValidationContext<'_>) -> ValidationErrors {
    let mut errors = ValidationErrors::new();
    let text_required = !draft.explicit_nil()
        && if context.locale.is_some_and(|locale| locale.is_primary) {
            !draft.from_source()
        } else {
            context.primary.is_some_and(|primary| !primary.is_blank())
        };
    if text_required && draft.text().is_none_or(|text| text.is_blank()) {
        errors.add(TranslationField::Text, BLANK_MESSAGE);
    }
    if let Some(primary) = context.primary
        && primary.text.is_some()
    {
        check_variables(&primary.variables(), &detect_variables(draft.text()), &mut errors);
    }
    if context.duplicate {
        errors.add(TranslationField::PhraseId, TAKEN_MESSAGE);
    }
    if context.locale.is_none() {
        errors.add(TranslationField::LocaleId, MISSING_MESSAGE);
    }
    if context.phrase.is_none() {
        errors.add(TranslationField::PhraseId, MISSING_MESSAGE);
    }
    errors
}

/// Records a parity failure when the variable sets differ.
fn check_variables(
    expected: &BTreeSet<String>,
    found: &BTreeSet<String>,
    errors: &mut ValidationErrors,
) {
    if expected == found {
        return;
    }
    if expected.is_empty() {
        errors.add(TranslationField::Variables, NO_SUBSTITUTIONS_MESSAGE);
        return;
    }
    errors.add(
        TranslationField::Variables,
        format!(
            "The translation should contain the substitutions of the primary translation: ({}), \
             found ({}).",
            join(expected),
            join(found)
        ),
    );
}

/// Joins variable names with `, `.
fn join(variables: &BTreeSet<String>) -> String {
    variables.iter().map(String::as_str).collect::<Vec<_>>().join(", ")
}
