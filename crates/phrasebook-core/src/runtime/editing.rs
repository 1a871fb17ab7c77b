// crates/phrasebook-core/src/runtime/editing.rs
// ============================================================================
// Module: Phrasebook Editing
// Description: Applies editor-proposed texts to one locale.
// Purpose: Provide the library entry point behind the translation editor.
// Dependencies: serde, thiserror, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! An editor submits proposed texts keyed by phrase id for one locale. Blank
//! proposals are ignored. Every other proposal updates the existing
//! translation or creates one, and is saved independently through the save
//! pipeline with the staleness flag cleared. A failing proposal does not stop
//! the others.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Serialize;
use thiserror::Error;

use crate::core::LeafValue;
use crate::core::PhraseId;
use crate::core::Translation;
use crate::interfaces::CacheInvalidator;
use crate::interfaces::StoreError;
use crate::interfaces::TranslationStore;
use crate::runtime::pipeline::SaveError;
use crate::runtime::pipeline::SavePipeline;
use crate::runtime::pipeline::TranslationDraft;
use crate::runtime::validation::ValidationErrors;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors that prevent an edit batch from starting or continuing.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EditError {
    /// The target locale does not exist.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of an edit batch.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EditOutcome {
    /// Translations saved, in phrase id order.
    pub saved: Vec<Translation>,
    /// Validation failures keyed by phrase id.
    pub rejected: BTreeMap<PhraseId, ValidationErrors>,
    /// Number of blank proposals ignored.
    pub skipped: usize,
}

impl EditOutcome {
    /// Returns true when every non-blank proposal was saved.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.rejected.is_empty()
    }
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// Applies `updates` (phrase id to proposed text) to `locale_name`.
///
/// # Errors
///
/// Returns [`EditError::UnknownLocale`] when the locale does not exist and
/// [`EditError::Store`] when the store fails. Validation failures are
/// reported per phrase in [`EditOutcome::rejected`].
pub fn apply_locale_updates(
    store: &dyn TranslationStore,
    cache: &dyn CacheInvalidator,
    locale_name: &str,
    updates: &BTreeMap<PhraseId, String>,
) -> Result<EditOutcome, EditError> {
    let locale = store
        .locale_by_name(locale_name)?
        .ok_or_else(|| EditError::UnknownLocale(locale_name.to_string()))?;
    let pipeline = SavePipeline::new(store, cache);
    let mut outcome = EditOutcome::default();

    for (phrase_id, proposal) in updates {
        if proposal.trim().is_empty() {
            outcome.skipped += 1;
            continue;
        }
        let mut draft = match store.translation_for(*phrase_id, locale.id)? {
            Some(existing) => TranslationDraft::from_translation(existing),
            None => TranslationDraft::new(*phrase_id, locale.id),
        };
        draft.set_text(Some(LeafValue::text(proposal.as_str())));
        match pipeline.save(&mut draft, false) {
            Ok(saved) => outcome.saved.push(saved),
            Err(SaveError::Validation(errors)) => {
                outcome.rejected.insert(*phrase_id, errors);
            }
            Err(SaveError::Store(err)) => return Err(EditError::Store(err)),
        }
    }

    tracing::info!(
        locale = %locale.name,
        saved = outcome.saved.len(),
        rejected = outcome.rejected.len(),
        skipped = outcome.skipped,
        "locale updates applied"
    );
    Ok(outcome)
}
