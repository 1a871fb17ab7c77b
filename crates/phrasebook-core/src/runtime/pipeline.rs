// crates/phrasebook-core/src/runtime/pipeline.rs
// ============================================================================
// Module: Phrasebook Save Pipeline
// Description: Ordered normalize/validate/snapshot/persist/invalidate chain.
// Purpose: Provide the single write path for translations.
// Dependencies: serde_yaml, thiserror, tracing, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Every translation write goes through [`SavePipeline::save`], which runs a
//! fixed sequence of steps:
//!
//! 1. normalize the text (`~` sentinel, `---` YAML strings)
//! 2. validate against the locale, phrase, and primary translation
//! 3. snapshot the previously persisted text when the text changed
//! 4. set the staleness flag from the caller's force flag
//! 5. insert or update the row
//! 6. invalidate the cached rendering
//!
//! A failing step stops the chain, except cache invalidation, whose failures
//! are logged and never undo the save.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde_yaml::Value;
use thiserror::Error;

use crate::core::LeafValue;
use crate::core::LocaleId;
use crate::core::NewTranslation;
use crate::core::PhraseId;
use crate::core::Translation;
use crate::core::TranslationId;
use crate::core::cache_key;
use crate::core::is_plural_category;
use crate::interfaces::CacheInvalidator;
use crate::interfaces::StoreError;
use crate::interfaces::TranslationStore;
use crate::runtime::validation::ValidationContext;
use crate::runtime::validation::ValidationErrors;
use crate::runtime::validation::validate;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Text sentinel marking a deliberate null.
pub const EXPLICIT_NIL_SENTINEL: &str = "~";

/// Prefix identifying a serialized YAML document stored as text.
const YAML_DOCUMENT_PREFIX: &str = "---";

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Errors raised while saving a translation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SaveError {
    /// One or more validation rules failed.
    #[error("translation invalid: {0}")]
    Validation(ValidationErrors),
    /// The store rejected the write.
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl SaveError {
    /// Returns the validation failures, when that is why the save failed.
    #[must_use]
    pub const fn validation_errors(&self) -> Option<&ValidationErrors> {
        match self {
            Self::Validation(errors) => Some(errors),
            Self::Store(_) => None,
        }
    }
}

/// A `---` string that does not describe a usable leaf value.
#[derive(Debug, Error)]
#[error("malformed source value: {0}")]
struct MalformedSourceValue(String);

// ============================================================================
// SECTION: Draft
// ============================================================================

/// A translation being edited, with its persisted state for change tracking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationDraft {
    /// Row identifier once persisted.
    id: Option<TranslationId>,
    /// Owning phrase.
    phrase_id: PhraseId,
    /// Owning locale.
    locale_id: LocaleId,
    /// Current text.
    text: Option<LeafValue>,
    /// Text before the most recent change.
    previous_text: Option<LeafValue>,
    /// Staleness marker.
    primary_updated: bool,
    /// Explicit-null marker.
    explicit_nil: bool,
    /// Text as last persisted.
    persisted_text: Option<LeafValue>,
    /// Primary row written by sync; may stay blank until the source fills it.
    from_source: bool,
}

impl TranslationDraft {
    /// Builds an unsaved draft with no text.
    #[must_use]
    pub const fn new(phrase_id: PhraseId, locale_id: LocaleId) -> Self {
        Self {
            id: None,
            phrase_id,
            locale_id,
            text: None,
            previous_text: None,
            primary_updated: false,
            explicit_nil: false,
            persisted_text: None,
            from_source: false,
        }
    }

    /// Builds a draft from a persisted translation.
    #[must_use]
    pub fn from_translation(translation: Translation) -> Self {
        Self {
            id: Some(translation.id),
            phrase_id: translation.phrase_id,
            locale_id: translation.locale_id,
            persisted_text: translation.text.clone(),
            text: translation.text,
            previous_text: translation.previous_text,
            primary_updated: translation.primary_updated,
            explicit_nil: translation.explicit_nil,
            from_source: false,
        }
    }

    /// Returns the row identifier once persisted.
    #[must_use]
    pub const fn id(&self) -> Option<TranslationId> {
        self.id
    }

    /// Returns the owning phrase.
    #[must_use]
    pub const fn phrase_id(&self) -> PhraseId {
        self.phrase_id
    }

    /// Returns the owning locale.
    #[must_use]
    pub const fn locale_id(&self) -> LocaleId {
        self.locale_id
    }

    /// Returns the current text.
    #[must_use]
    pub const fn text(&self) -> Option<&LeafValue> {
        self.text.as_ref()
    }

    /// Replaces the text.
    pub fn set_text(&mut self, text: Option<LeafValue>) {
        self.text = text;
    }

    /// Returns the previous-text snapshot.
    #[must_use]
    pub const fn previous_text(&self) -> Option<&LeafValue> {
        self.previous_text.as_ref()
    }

    /// Returns the staleness marker.
    #[must_use]
    pub const fn primary_updated(&self) -> bool {
        self.primary_updated
    }

    /// Returns the explicit-null marker.
    #[must_use]
    pub const fn explicit_nil(&self) -> bool {
        self.explicit_nil
    }

    /// Sets the explicit-null marker.
    pub const fn set_explicit_nil(&mut self, explicit_nil: bool) {
        self.explicit_nil = explicit_nil;
    }

    /// Marks the draft as the primary row written by sync.
    ///
    /// Only such drafts may be saved on the primary locale without text.
    pub const fn mark_from_source(&mut self) {
        self.from_source = true;
    }

    /// Returns true when the draft was marked by [`Self::mark_from_source`].
    #[must_use]
    pub const fn from_source(&self) -> bool {
        self.from_source
    }

    /// Returns true when the draft has never been persisted.
    #[must_use]
    pub const fn is_new_record(&self) -> bool {
        self.id.is_none()
    }

    /// Returns true when the text differs from the persisted text.
    #[must_use]
    pub fn text_changed(&self) -> bool {
        self.text != self.persisted_text
    }

    /// Returns true when the text is absent or blank.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.text.as_ref().is_none_or(LeafValue::is_blank)
    }

    /// Field values for an insert.
    fn to_new_translation(&self) -> NewTranslation {
        NewTranslation {
            phrase_id: self.phrase_id,
            locale_id: self.locale_id,
            text: self.text.clone(),
            previous_text: self.previous_text.clone(),
            primary_updated: self.primary_updated,
            explicit_nil: self.explicit_nil,
        }
    }

    /// Full row for an update.
    fn to_translation(&self, id: TranslationId) -> Translation {
        self.to_new_translation().into_translation(id)
    }

    /// Records that `saved` is now the persisted state.
    fn mark_persisted(&mut self, saved: &Translation) {
        self.id = Some(saved.id);
        self.persisted_text = saved.text.clone();
    }
}

// ============================================================================
// SECTION: Normalization
// ============================================================================

/// Normalizes the draft text in place.
///
/// A string starting with `---` is parsed as YAML into a leaf value, keeping
/// the raw string when it does not parse or is not a usable leaf. The `~`
/// sentinel then becomes absent text with the explicit-null marker set. Any
/// remaining text clears the marker.
pub fn normalize_text(draft: &mut TranslationDraft) {
    if let Some(LeafValue::Text(raw)) = &draft.text
        && raw.starts_with(YAML_DOCUMENT_PREFIX)
    {
        match parse_yaml_leaf(raw) {
            Ok(parsed) => draft.text = parsed,
            Err(err) => {
                tracing::debug!(error = %err, "keeping raw translation text");
            }
        }
    }
    if draft.text.as_ref().and_then(LeafValue::as_text) == Some(EXPLICIT_NIL_SENTINEL) {
        draft.text = None;
        draft.explicit_nil = true;
    } else if draft.text.is_some() {
        draft.explicit_nil = false;
    }
}

/// Parses a serialized YAML document into a leaf value.
fn parse_yaml_leaf(raw: &str) -> Result<Option<LeafValue>, MalformedSourceValue> {
    let value: Value =
        serde_yaml::from_str(raw.trim()).map_err(|err| MalformedSourceValue(err.to_string()))?;
    match value {
        Value::Null => Ok(None),
        other => yaml_leaf(other).map(Some),
    }
}

/// Converts a YAML value into a leaf.
fn yaml_leaf(value: Value) -> Result<LeafValue, MalformedSourceValue> {
    match value {
        Value::Null => Ok(LeafValue::Text(String::new())),
        Value::Bool(_) | Value::Number(_) | Value::String(_) => {
            scalar_text(value).map(LeafValue::Text)
        }
        Value::Sequence(items) => {
            items.into_iter().map(yaml_leaf).collect::<Result<Vec<_>, _>>().map(LeafValue::List)
        }
        Value::Mapping(mapping) => {
            let mut forms = BTreeMap::new();
            for (key, form) in mapping {
                let category = scalar_text(key)?;
                if !is_plural_category(&category) {
                    return Err(MalformedSourceValue(format!(
                        "{category} is not a plural category"
                    )));
                }
                let form = match form {
                    Value::Null => String::new(),
                    other => scalar_text(other)?,
                };
                forms.insert(category, form);
            }
            if forms.is_empty() {
                return Err(MalformedSourceValue("empty mapping".to_string()));
            }
            Ok(LeafValue::Plural(forms))
        }
        Value::Tagged(_) => Err(MalformedSourceValue("tagged value".to_string())),
    }
}

/// Renders a YAML scalar as a string.
fn scalar_text(value: Value) -> Result<String, MalformedSourceValue> {
    match value {
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        Value::String(text) => Ok(text),
        _ => Err(MalformedSourceValue("expected a scalar".to_string())),
    }
}

// ============================================================================
// SECTION: Pipeline
// ============================================================================

/// Save pipeline bound to a store and a cache.
pub struct SavePipeline<'a> {
    /// Translation store.
    store: &'a dyn TranslationStore,
    /// Cache collaborator.
    cache: &'a dyn CacheInvalidator,
}

impl<'a> SavePipeline<'a> {
    /// Creates a pipeline over `store` and `cache`.
    #[must_use]
    pub fn new(store: &'a dyn TranslationStore, cache: &'a dyn CacheInvalidator) -> Self {
        Self {
            store,
            cache,
        }
    }

    /// Returns the underlying store.
    #[must_use]
    pub fn store(&self) -> &'a dyn TranslationStore {
        self.store
    }

    /// Normalizes, validates, and persists `draft`.
    ///
    /// `force_primary_update` becomes the stored staleness marker: sync passes
    /// `true` when the primary text changed, editors pass `false`.
    ///
    /// # Errors
    ///
    /// Returns [`SaveError::Validation`] when a rule fails and
    /// [`SaveError::Store`] when the store rejects the read or write.
    pub fn save(
        &self,
        draft: &mut TranslationDraft,
        force_primary_update: bool,
    ) -> Result<Translation, SaveError> {
        normalize_text(draft);

        let locale = self.store.locale(draft.locale_id)?;
        let phrase = self.store.phrase(draft.phrase_id)?;
        let primary = match &locale {
            Some(locale) if !locale.is_primary => {
                self.store.primary_translation(draft.phrase_id)?
            }
            _ => None,
        };
        let duplicate = self
            .store
            .translation_for(draft.phrase_id, draft.locale_id)?
            .is_some_and(|existing| Some(existing.id) != draft.id);
        let context = ValidationContext {
            locale: locale.as_ref(),
            phrase: phrase.as_ref(),
            primary: primary.as_ref(),
            duplicate,
        };
        let errors = validate(draft, &context);
        if !errors.is_empty() {
            return Err(SaveError::Validation(errors));
        }

        if draft.text_changed() {
            draft.previous_text = draft.persisted_text.clone();
        }
        draft.primary_updated = force_primary_update;

        let saved = match draft.id {
            Some(id) => {
                let row = draft.to_translation(id);
                self.store.update_translation(&row)?;
                row
            }
            None => self.store.insert_translation(&draft.to_new_translation())?,
        };
        draft.mark_persisted(&saved);

        if let (Some(locale), Some(phrase)) = (&locale, &phrase) {
            let key = cache_key(&locale.name, &phrase.key);
            match self.cache.delete(&key) {
                Ok(()) => tracing::debug!(cache_key = %key, "translation cache invalidated"),
                Err(err) => {
                    tracing::warn!(cache_key = %key, error = %err, "cache invalidation failed");
                }
            }
        }
        Ok(saved)
    }
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

    fn draft_with(text: &str) -> TranslationDraft {
        let mut draft = TranslationDraft::new(PhraseId::new(1), LocaleId::new(1));
        draft.set_text(Some(LeafValue::text(text)));
        draft
    }

    #[test]
    fn yaml_list_document_becomes_list() {
        let mut draft = draft_with("---\n- Mon\n- Tue\n");
        normalize_text(&mut draft);
        assert_eq!(
            draft.text(),
            Some(&LeafValue::List(vec![LeafValue::text("Mon"), LeafValue::text("Tue")]))
        );
    }

    #[test]
    fn yaml_plural_document_becomes_plural() {
        let mut draft = draft_with("---\none: a day\nother: \"%{count} days\"\n");
        normalize_text(&mut draft);
        assert!(draft.text().is_some_and(LeafValue::is_plural));
    }

    #[test]
    fn namespaced_yaml_document_keeps_raw_text() {
        let raw = "---\ntitle: Home\n";
        let mut draft = draft_with(raw);
        normalize_text(&mut draft);
        assert_eq!(draft.text(), Some(&LeafValue::text(raw)));
    }

    #[test]
    fn unparsable_yaml_document_keeps_raw_text() {
        let raw = "--- [unclosed";
        let mut draft = draft_with(raw);
        normalize_text(&mut draft);
        assert_eq!(draft.text(), Some(&LeafValue::text(raw)));
    }

    #[test]
    fn tilde_becomes_explicit_nil() {
        let mut draft = draft_with("~");
        normalize_text(&mut draft);
        assert_eq!(draft.text(), None);
        assert!(draft.explicit_nil());
    }

    #[test]
    fn text_clears_explicit_nil() {
        let mut draft = draft_with("Hello");
        draft.set_explicit_nil(true);
        normalize_text(&mut draft);
        assert!(!draft.explicit_nil());
    }
}
