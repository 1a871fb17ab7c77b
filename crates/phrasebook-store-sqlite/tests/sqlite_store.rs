// crates/phrasebook-store-sqlite/tests/sqlite_store.rs
// ============================================================================
// Module: SQLite Store Tests
// Description: Validate SQLite TranslationStore behavior.
// Purpose: Ensure durable persistence, uniqueness, and integrity checks.
// Dependencies: phrasebook-store-sqlite, phrasebook-core, rusqlite, tempfile, proptest
// ============================================================================

//! ## Overview
//! Conformance tests for the SQLite-backed translation store. Exercises
//! persistence across instances, storage-level uniqueness, corrupted rows,
//! and parity with the in-memory store for key lookups.

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

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::path::Path;

use phrasebook_core::InMemoryTranslationStore;
use phrasebook_core::LeafValue;
use phrasebook_core::NewTranslation;
use phrasebook_core::NoopCache;
use phrasebook_core::SavePipeline;
use phrasebook_core::StoreError;
use phrasebook_core::TranslationDraft;
use phrasebook_core::TranslationStore;
use phrasebook_store_sqlite::MAX_TEXT_BYTES;
use phrasebook_store_sqlite::SqliteStoreConfig;
use phrasebook_store_sqlite::SqliteStoreError;
use phrasebook_store_sqlite::SqliteStoreMode;
use phrasebook_store_sqlite::SqliteSyncMode;
use phrasebook_store_sqlite::SqliteTranslationStore;
use proptest::prelude::*;
use tempfile::TempDir;

// ============================================================================
// SECTION: Helpers
// ============================================================================

fn store_for(path: &Path) -> SqliteTranslationStore {
    let config = SqliteStoreConfig {
        path: path.to_path_buf(),
        busy_timeout_ms: 1_000,
        journal_mode: SqliteStoreMode::Wal,
        sync_mode: SqliteSyncMode::Full,
    };
    SqliteTranslationStore::new(config).unwrap()
}

fn new_translation(
    store: &impl TranslationStore,
    key: &str,
    locale: &str,
    text: Option<LeafValue>,
) -> NewTranslation {
    let phrase = store.find_or_create_phrase(key).unwrap();
    let locale = store.locale_by_name(locale).unwrap().unwrap();
    NewTranslation {
        phrase_id: phrase.id,
        locale_id: locale.id,
        text,
        previous_text: None,
        primary_updated: false,
        explicit_nil: false,
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[test]
fn sqlite_store_persists_across_instances() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("phrasebook.sqlite");
    {
        let store = store_for(&path);
        store.ensure_primary_locale("en").unwrap();
        let draft = new_translation(&store, "home.title", "en", Some(LeafValue::text("Home")));
        store.insert_translation(&draft).unwrap();
    }
    let store = store_for(&path);
    let phrase = store.phrase_by_key("home.title").unwrap().unwrap();
    let primary = store.primary_translation(phrase.id).unwrap().unwrap();
    assert_eq!(primary.text, Some(LeafValue::text("Home")));
    assert!(store.locale_by_name("en").unwrap().unwrap().is_primary);
}

#[test]
fn sqlite_store_keeps_structured_text() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    store.ensure_primary_locale("en").unwrap();
    let plural = LeafValue::Plural(BTreeMap::from([
        ("one".to_string(), "%{count} item".to_string()),
        ("other".to_string(), "%{count} items".to_string()),
    ]));
    let draft = new_translation(&store, "items", "en", Some(plural.clone()));
    let saved = store.insert_translation(&draft).unwrap();
    assert_eq!(store.translation(saved.id).unwrap().unwrap().text, Some(plural));
}

#[test]
fn sqlite_store_allows_a_single_primary_locale() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let en = store.ensure_primary_locale("en").unwrap();
    assert_eq!(store.ensure_primary_locale("en").unwrap(), en);
    assert!(matches!(store.ensure_primary_locale("de"), Err(StoreError::Conflict(_))));
    store.find_or_create_locale("fr").unwrap();
    assert!(matches!(store.find_or_create_locale("en"), Err(StoreError::Conflict(_))));
    let names: Vec<String> = store.locales().unwrap().into_iter().map(|l| l.name).collect();
    assert_eq!(names, vec!["en", "fr"]);
}

#[test]
fn sqlite_store_rejects_secondary_promoted_to_primary() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    store.find_or_create_locale("fr").unwrap();
    assert!(matches!(store.ensure_primary_locale("fr"), Err(StoreError::Conflict(_))));
}

#[test]
fn sqlite_store_find_or_create_phrase_is_stable() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let first = store.find_or_create_phrase("hello").unwrap();
    let second = store.find_or_create_phrase("hello").unwrap();
    assert_eq!(first, second);
}

#[test]
fn sqlite_store_enforces_one_translation_per_pair() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    store.ensure_primary_locale("en").unwrap();
    let draft = new_translation(&store, "hello", "en", Some(LeafValue::text("Hello")));
    store.insert_translation(&draft).unwrap();
    assert!(matches!(store.insert_translation(&draft), Err(StoreError::Conflict(_))));
}

#[test]
fn sqlite_store_reports_missing_references() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let draft = NewTranslation {
        phrase_id: phrasebook_core::PhraseId::new(7),
        locale_id: phrasebook_core::LocaleId::new(9),
        text: None,
        previous_text: None,
        primary_updated: false,
        explicit_nil: false,
    };
    assert!(matches!(store.insert_translation(&draft), Err(StoreError::NotFound(_))));
}

#[test]
fn sqlite_store_update_keeps_phrase_and_locale_immutable() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    store.ensure_primary_locale("en").unwrap();
    let fr = store.find_or_create_locale("fr").unwrap();
    let draft = new_translation(&store, "hello", "en", Some(LeafValue::text("Hello")));
    let mut saved = store.insert_translation(&draft).unwrap();

    saved.text = Some(LeafValue::text("Hi"));
    saved.previous_text = Some(LeafValue::text("Hello"));
    store.update_translation(&saved).unwrap();
    let reloaded = store.translation(saved.id).unwrap().unwrap();
    assert_eq!(reloaded, saved);

    let mut moved = saved.clone();
    moved.locale_id = fr.id;
    assert!(matches!(store.update_translation(&moved), Err(StoreError::Invalid(_))));

    let mut missing = saved;
    missing.id = phrasebook_core::TranslationId::new(999);
    assert!(matches!(store.update_translation(&missing), Err(StoreError::NotFound(_))));
}

#[test]
fn sqlite_store_search_is_case_insensitive() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    store.ensure_primary_locale("en").unwrap();
    for (key, text) in [("a", "Hello World"), ("b", "Goodbye"), ("c", "say HELLO")] {
        let draft = new_translation(&store, key, "en", Some(LeafValue::text(text)));
        store.insert_translation(&draft).unwrap();
    }
    let empty = new_translation(&store, "d", "en", None);
    store.insert_translation(&empty).unwrap();
    let keys: Vec<String> = store
        .translations_containing("hello")
        .unwrap()
        .into_iter()
        .map(|entry| entry.phrase.key)
        .collect();
    assert_eq!(keys, vec!["a", "c"]);
}

#[test]
fn sqlite_store_lists_stale_and_untranslated_phrases() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let en = store.ensure_primary_locale("en").unwrap();
    let fr = store.find_or_create_locale("fr").unwrap();
    for key in ["one", "two", "three"] {
        let phrase = store.find_or_create_phrase(key).unwrap();
        let mut draft = TranslationDraft::new(phrase.id, en.id);
        draft.set_text(Some(LeafValue::text(key)));
        SavePipeline::new(&store, &NoopCache).save(&mut draft, false).unwrap();
    }
    let one = store.phrase_by_key("one").unwrap().unwrap();
    let mut stale = TranslationDraft::new(one.id, fr.id);
    stale.set_text(Some(LeafValue::text("un")));
    SavePipeline::new(&store, &NoopCache).save(&mut stale, true).unwrap();

    let stale_keys: Vec<String> = store
        .stale_translations(fr.id)
        .unwrap()
        .into_iter()
        .map(|entry| entry.phrase.key)
        .collect();
    assert_eq!(stale_keys, vec!["one"]);
    let missing: Vec<String> = store
        .phrases_without_translation(fr.id)
        .unwrap()
        .into_iter()
        .map(|phrase| phrase.key)
        .collect();
    assert_eq!(missing, vec!["three", "two"]);
    assert_eq!(store.secondary_translations(one.id).unwrap().len(), 1);
    assert_eq!(store.translations_for_locale(en.id).unwrap().len(), 3);
}

#[test]
fn sqlite_store_rejects_version_mismatch() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    let _store = store_for(&path);

    let connection = rusqlite::Connection::open(&path).unwrap();
    connection.execute("UPDATE store_meta SET version = 999", rusqlite::params![]).unwrap();

    let result = SqliteTranslationStore::new(SqliteStoreConfig::new(path));
    assert!(matches!(result, Err(SqliteStoreError::VersionMismatch(_))));
}

#[test]
fn sqlite_store_detects_corrupt_text() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.sqlite");
    let store = store_for(&path);
    store.ensure_primary_locale("en").unwrap();
    let draft = new_translation(&store, "hello", "en", Some(LeafValue::text("Hello")));
    let saved = store.insert_translation(&draft).unwrap();

    let connection = rusqlite::Connection::open(&path).unwrap();
    connection
        .execute(
            "UPDATE translations SET text = '{not json' WHERE id = ?1",
            rusqlite::params![saved.id.get()],
        )
        .unwrap();

    assert!(matches!(store.translation(saved.id), Err(StoreError::Corrupt(_))));
}

#[test]
fn sqlite_store_rejects_oversized_text() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    store.ensure_primary_locale("en").unwrap();
    let huge = "x".repeat(MAX_TEXT_BYTES + 1);
    let draft = new_translation(&store, "huge", "en", Some(LeafValue::text(huge)));
    assert!(matches!(store.insert_translation(&draft), Err(StoreError::Invalid(_))));
}

#[test]
fn sqlite_store_rejects_directory_path() {
    let temp = TempDir::new().unwrap();
    let result = SqliteTranslationStore::new(SqliteStoreConfig::new(temp.path()));
    assert!(matches!(result, Err(SqliteStoreError::Invalid(_))));
}

// ============================================================================
// SECTION: Lookup Parity
// ============================================================================

fn seed_keys(store: &impl TranslationStore, keys: &[String]) {
    store.ensure_primary_locale("en").unwrap();
    for key in keys {
        let draft = new_translation(store, key, "en", Some(LeafValue::text(key.clone())));
        store.insert_translation(&draft).unwrap();
    }
}

fn looked_up(store: &impl TranslationStore, queries: &[String]) -> Vec<String> {
    store.lookup("en", queries).unwrap().into_iter().map(|entry| entry.phrase.key).collect()
}

#[test]
fn sqlite_store_lookup_treats_like_wildcards_literally() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let keys = ["a_b.title", "axb.title", "a%.x"].map(str::to_string);
    seed_keys(&store, &keys);
    assert_eq!(looked_up(&store, &["a_b".to_string()]), vec!["a_b.title"]);
    assert_eq!(looked_up(&store, &["A%".to_string()]), vec!["a%.x"]);
    assert!(looked_up(&store, &[]).is_empty());
}

#[test]
fn sqlite_store_lookup_folds_non_ascii_namespaces() {
    let temp = TempDir::new().unwrap();
    let store = store_for(&temp.path().join("store.sqlite"));
    let memory = InMemoryTranslationStore::new();
    let keys = ["Ärger.title", "ärger.body", "Öl.x"].map(str::to_string);
    seed_keys(&store, &keys);
    seed_keys(&memory, &keys);
    let queries = ["ärger".to_string()];
    assert_eq!(looked_up(&store, &queries), vec!["Ärger.title", "ärger.body"]);
    assert_eq!(looked_up(&store, &queries), looked_up(&memory, &queries));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    #[test]
    fn sqlite_lookup_matches_in_memory_lookup(
        keys in proptest::collection::btree_set("[a-cA-CäÄéÉ_%]{1,2}(\\.[a-cä_]{1,2}){0,2}", 1 .. 8),
        queries in proptest::collection::vec("[a-cA-CäÄéÉ_%]{1,2}(\\.[a-cä_]{1,2})?", 1 .. 4),
    ) {
        let keys: Vec<String> = keys.into_iter().collect();
        let temp = TempDir::new().unwrap();
        let sqlite = store_for(&temp.path().join("store.sqlite"));
        let memory = InMemoryTranslationStore::new();
        seed_keys(&sqlite, &keys);
        seed_keys(&memory, &keys);
        prop_assert_eq!(looked_up(&sqlite, &queries), looked_up(&memory, &queries));
    }
}
