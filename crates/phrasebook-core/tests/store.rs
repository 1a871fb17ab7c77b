// crates/phrasebook-core/tests/store.rs
// ============================================================================
// Module: In-Memory Store Tests
// Description: Tests for the in-memory translation store.
// Purpose: Validate uniqueness, primary-locale rules, and query semantics.
// Dependencies: phrasebook-core
// ============================================================================

//! ## Overview
//! Ensures the in-memory store enforces the same uniqueness rules as the
//! durable backend and answers search, lookup, and staleness queries.

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

use phrasebook_core::InMemoryTranslationStore;
use phrasebook_core::LeafValue;
use phrasebook_core::LocaleId;
use phrasebook_core::NewTranslation;
use phrasebook_core::PhraseId;
use phrasebook_core::StoreError;
use phrasebook_core::TranslationStore;

fn new_translation(phrase_id: PhraseId, locale_id: LocaleId, text: &str) -> NewTranslation {
    NewTranslation {
        phrase_id,
        locale_id,
        text: Some(LeafValue::text(text)),
        previous_text: None,
        primary_updated: false,
        explicit_nil: false,
    }
}

#[test]
fn find_or_create_phrase_is_idempotent() {
    let store = InMemoryTranslationStore::new();
    let first = store.find_or_create_phrase("home.title").unwrap();
    let second = store.find_or_create_phrase("home.title").unwrap();
    assert_eq!(first, second);
    assert_eq!(store.phrase_by_key("home.title").unwrap(), Some(first));
}

#[test]
fn only_one_primary_locale_is_allowed() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    assert!(en.is_primary);
    assert_eq!(store.ensure_primary_locale("en").unwrap(), en);
    let err = store.ensure_primary_locale("de").unwrap_err();
    assert!(err.is_retryable());
    let err = store.find_or_create_locale("en").unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn secondary_name_cannot_become_primary() {
    let store = InMemoryTranslationStore::new();
    store.find_or_create_locale("fr").unwrap();
    let err = store.ensure_primary_locale("fr").unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn duplicate_translation_is_a_conflict() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    let phrase = store.find_or_create_phrase("hello").unwrap();
    store.insert_translation(&new_translation(phrase.id, en.id, "Hello")).unwrap();
    let err = store.insert_translation(&new_translation(phrase.id, en.id, "Hi")).unwrap_err();
    assert!(matches!(err, StoreError::Conflict(_)));
}

#[test]
fn update_of_missing_row_is_not_found() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    let phrase = store.find_or_create_phrase("hello").unwrap();
    let saved = store.insert_translation(&new_translation(phrase.id, en.id, "Hello")).unwrap();
    let mut missing = saved;
    missing.id = phrasebook_core::TranslationId::new(9_999);
    let err = store.update_translation(&missing).unwrap_err();
    assert!(matches!(err, StoreError::NotFound(_)));
}

#[test]
fn primary_and_secondary_translations_are_separated() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    let fr = store.find_or_create_locale("fr").unwrap();
    let de = store.find_or_create_locale("de").unwrap();
    let phrase = store.find_or_create_phrase("hello").unwrap();
    store.insert_translation(&new_translation(phrase.id, en.id, "Hello")).unwrap();
    store.insert_translation(&new_translation(phrase.id, fr.id, "Bonjour")).unwrap();
    store.insert_translation(&new_translation(phrase.id, de.id, "Hallo")).unwrap();

    let primary = store.primary_translation(phrase.id).unwrap().unwrap();
    assert_eq!(primary.locale_id, en.id);
    let secondaries = store.secondary_translations(phrase.id).unwrap();
    assert_eq!(secondaries.len(), 2);
    assert!(secondaries.iter().all(|translation| translation.locale_id != en.id));
}

#[test]
fn search_is_case_insensitive_substring() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    let hello = store.find_or_create_phrase("hello").unwrap();
    let bye = store.find_or_create_phrase("bye").unwrap();
    store.insert_translation(&new_translation(hello.id, en.id, "Hello World")).unwrap();
    store.insert_translation(&new_translation(bye.id, en.id, "Goodbye")).unwrap();

    let found = store.translations_containing("WORLD").unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].phrase.key, "hello");
}

#[test]
fn lookup_matches_exact_keys_and_namespaced_descendants() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    for key in ["home", "home.title", "Home.Intro", "homepage.title", "about"] {
        let phrase = store.find_or_create_phrase(key).unwrap();
        store.insert_translation(&new_translation(phrase.id, en.id, key)).unwrap();
    }
    let found = store.lookup("en", &["home".to_string()]).unwrap();
    let keys: Vec<&str> = found.iter().map(|entry| entry.phrase.key.as_str()).collect();
    assert_eq!(keys, vec!["Home.Intro", "home", "home.title"]);
    assert!(store.lookup("en", &[]).unwrap().is_empty());
    assert!(store.lookup("fr", &["home".to_string()]).unwrap().is_empty());
}

#[test]
fn stale_and_missing_queries() {
    let store = InMemoryTranslationStore::new();
    let en = store.ensure_primary_locale("en").unwrap();
    let fr = store.find_or_create_locale("fr").unwrap();
    let hello = store.find_or_create_phrase("hello").unwrap();
    let bye = store.find_or_create_phrase("bye").unwrap();
    store.insert_translation(&new_translation(hello.id, en.id, "Hello")).unwrap();
    store.insert_translation(&new_translation(bye.id, en.id, "Bye")).unwrap();
    let mut stale = new_translation(hello.id, fr.id, "Bonjour");
    stale.primary_updated = true;
    store.insert_translation(&stale).unwrap();

    let stale_entries = store.stale_translations(fr.id).unwrap();
    assert_eq!(stale_entries.len(), 1);
    assert_eq!(stale_entries[0].phrase.key, "hello");
    assert!(stale_entries[0].translation.is_out_of_date());

    let missing = store.phrases_without_translation(fr.id).unwrap();
    assert_eq!(missing.iter().map(|phrase| phrase.key.as_str()).collect::<Vec<_>>(), vec!["bye"]);
}
