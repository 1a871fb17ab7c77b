// crates/phrasebook-core/tests/editing.rs
// ============================================================================
// Module: Editing Entry Point Tests
// Description: Batch updates of one locale's translations.
// Purpose: Validate blank skipping, independent saves, and staleness clearing.
// Dependencies: phrasebook-core
// ============================================================================

//! ## Overview
//! Exercises [`apply_locale_updates`] against a store seeded through the save
//! pipeline.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only assertions and helpers are permitted."
)]

use std::collections::BTreeMap;

use phrasebook_core::EditError;
use phrasebook_core::InMemoryTranslationStore;
use phrasebook_core::LeafValue;
use phrasebook_core::NoopCache;
use phrasebook_core::Phrase;
use phrasebook_core::SavePipeline;
use phrasebook_core::TranslationDraft;
use phrasebook_core::TranslationField;
use phrasebook_core::TranslationStore;
use phrasebook_core::apply_locale_updates;

fn seed(store: &InMemoryTranslationStore, key: &str, text: &str) -> Phrase {
    let en = store.ensure_primary_locale("en").unwrap();
    let phrase = store.find_or_create_phrase(key).unwrap();
    let mut draft = TranslationDraft::new(phrase.id, en.id);
    draft.set_text(Some(LeafValue::text(text)));
    SavePipeline::new(store, &NoopCache).save(&mut draft, false).unwrap();
    phrase
}

#[test]
fn saves_valid_proposals_and_reports_invalid_ones() {
    let store = InMemoryTranslationStore::new();
    let hello = seed(&store, "hello", "Hello {{name}}");
    let bye = seed(&store, "bye", "Bye");
    let title = seed(&store, "title", "Title");
    let fr = store.find_or_create_locale("fr").unwrap();

    let updates = BTreeMap::from([
        (hello.id, "Bonjour".to_string()),
        (bye.id, "Au revoir".to_string()),
        (title.id, "   ".to_string()),
    ]);
    let outcome = apply_locale_updates(&store, &NoopCache, "fr", &updates).unwrap();

    assert_eq!(outcome.saved.len(), 1);
    assert_eq!(outcome.skipped, 1);
    assert!(!outcome.is_clean());
    let errors = &outcome.rejected[&hello.id];
    assert_eq!(errors.on(TranslationField::Variables).len(), 1);
    assert!(store.translation_for(bye.id, fr.id).unwrap().is_some());
    assert!(store.translation_for(hello.id, fr.id).unwrap().is_none());
    assert!(store.translation_for(title.id, fr.id).unwrap().is_none());
}

#[test]
fn blank_structured_proposal_on_primary_is_rejected() {
    let store = InMemoryTranslationStore::new();
    let home = seed(&store, "home", "Home");
    let updates = BTreeMap::from([(home.id, "--- ''".to_string())]);
    let outcome = apply_locale_updates(&store, &NoopCache, "en", &updates).unwrap();

    assert!(outcome.saved.is_empty());
    assert_eq!(outcome.rejected[&home.id].on(TranslationField::Text), vec!["can't be blank"]);
    let primary = store.primary_translation(home.id).unwrap().unwrap();
    assert_eq!(primary.text, Some(LeafValue::text("Home")));
}

#[test]
fn editing_clears_staleness() {
    let store = InMemoryTranslationStore::new();
    let hello = seed(&store, "hello", "Hello");
    let fr = store.find_or_create_locale("fr").unwrap();
    let mut stale = TranslationDraft::new(hello.id, fr.id);
    stale.set_text(Some(LeafValue::text("Bonjour")));
    let saved = SavePipeline::new(&store, &NoopCache).save(&mut stale, true).unwrap();
    assert!(saved.is_out_of_date());

    let updates = BTreeMap::from([(hello.id, "Salut".to_string())]);
    let outcome = apply_locale_updates(&store, &NoopCache, "fr", &updates).unwrap();
    assert!(outcome.is_clean());
    let reloaded = store.translation(saved.id).unwrap().unwrap();
    assert!(reloaded.is_up_to_date());
    assert_eq!(reloaded.previous_text, Some(LeafValue::text("Bonjour")));
}

#[test]
fn tilde_proposal_stores_explicit_nil() {
    let store = InMemoryTranslationStore::new();
    let hello = seed(&store, "hello", "Hello");
    let fr = store.find_or_create_locale("fr").unwrap();
    let updates = BTreeMap::from([(hello.id, "~".to_string())]);
    apply_locale_updates(&store, &NoopCache, "fr", &updates).unwrap();
    let stored = store.translation_for(hello.id, fr.id).unwrap().unwrap();
    assert!(stored.explicit_nil);
    assert_eq!(stored.text, None);
}

#[test]
fn unknown_locale_is_rejected() {
    let store = InMemoryTranslationStore::new();
    let err = apply_locale_updates(&store, &NoopCache, "xx", &BTreeMap::new()).unwrap_err();
    assert_eq!(err, EditError::UnknownLocale("xx".to_string()));
}
