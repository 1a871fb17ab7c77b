// crates/phrasebook-core/src/runtime/store.rs
// ============================================================================
// Module: Phrasebook In-Memory Store
// Description: Simple in-memory translation store for tests and examples.
// Purpose: Provide a deterministic store implementation without external deps.
// Dependencies: crate::core, crate::interfaces
// ============================================================================

//! ## Overview
//! This module provides a mutex-guarded, in-memory implementation of
//! [`TranslationStore`] for tests and local demos. Uniqueness checks happen
//! under the same lock as the write, so concurrent callers see the same
//! conflicts a relational backend would report.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::MutexGuard;

use crate::core::Locale;
use crate::core::LocaleId;
use crate::core::NewTranslation;
use crate::core::Phrase;
use crate::core::PhraseId;
use crate::core::Translation;
use crate::core::TranslationEntry;
use crate::core::TranslationId;
use crate::interfaces::StoreError;
use crate::interfaces::TranslationStore;

// ============================================================================
// SECTION: In-Memory Store
// ============================================================================

/// Tables and indexes held by the in-memory store.
#[derive(Debug, Default)]
struct MemoryTables {
    /// Locales by id.
    locales: BTreeMap<LocaleId, Locale>,
    /// Phrases by id.
    phrases: BTreeMap<PhraseId, Phrase>,
    /// Unique index on phrase key.
    phrase_keys: BTreeMap<String, PhraseId>,
    /// Translations by id.
    translations: BTreeMap<TranslationId, Translation>,
    /// Unique index on `(phrase_id, locale_id)`.
    translation_index: BTreeMap<(PhraseId, LocaleId), TranslationId>,
    /// Last assigned row id (shared sequence across tables).
    last_id: i64,
}

impl MemoryTables {
    /// Allocates the next row id.
    const fn next_id(&mut self) -> i64 {
        self.last_id += 1;
        self.last_id
    }

    /// Returns the primary locale, if any.
    fn primary_locale(&self) -> Option<&Locale> {
        self.locales.values().find(|locale| locale.is_primary)
    }

    /// Finds a locale by name.
    fn locale_named(&self, name: &str) -> Option<&Locale> {
        self.locales.values().find(|locale| locale.name == name)
    }

    /// Joins a translation with its phrase and locale.
    fn entry(&self, translation: &Translation) -> Option<TranslationEntry> {
        let phrase = self.phrases.get(&translation.phrase_id)?;
        let locale = self.locales.get(&translation.locale_id)?;
        Some(TranslationEntry {
            phrase: phrase.clone(),
            locale: locale.clone(),
            translation: translation.clone(),
        })
    }

    /// Joins and key-sorts every translation accepted by `filter`.
    fn entries_where(&self, filter: impl Fn(&Translation) -> bool) -> Vec<TranslationEntry> {
        let mut entries: Vec<TranslationEntry> = self
            .translations
            .values()
            .filter(|translation| filter(translation))
            .filter_map(|translation| self.entry(translation))
            .collect();
        entries.sort_by(|a, b| {
            a.phrase.key.cmp(&b.phrase.key).then_with(|| a.locale.name.cmp(&b.locale.name))
        });
        entries
    }
}

/// In-memory translation store for tests and examples.
#[derive(Debug, Default, Clone)]
pub struct InMemoryTranslationStore {
    /// Tables protected by a mutex.
    tables: Arc<Mutex<MemoryTables>>,
}

impl InMemoryTranslationStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the tables.
    fn lock(&self) -> Result<MutexGuard<'_, MemoryTables>, StoreError> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Store("translation store mutex poisoned".to_string()))
    }
}

impl TranslationStore for InMemoryTranslationStore {
    fn locales(&self) -> Result<Vec<Locale>, StoreError> {
        let guard = self.lock()?;
        let mut locales: Vec<Locale> = guard.locales.values().cloned().collect();
        drop(guard);
        locales.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(locales)
    }

    fn locale(&self, id: LocaleId) -> Result<Option<Locale>, StoreError> {
        Ok(self.lock()?.locales.get(&id).cloned())
    }

    fn locale_by_name(&self, name: &str) -> Result<Option<Locale>, StoreError> {
        Ok(self.lock()?.locale_named(name).cloned())
    }

    fn ensure_primary_locale(&self, name: &str) -> Result<Locale, StoreError> {
        let mut guard = self.lock()?;
        if let Some(primary) = guard.primary_locale() {
            if primary.name == name {
                return Ok(primary.clone());
            }
            return Err(StoreError::Conflict(format!(
                "primary locale is already {}",
                primary.name
            )));
        }
        if guard.locale_named(name).is_some() {
            return Err(StoreError::Conflict(format!("locale {name} exists as a secondary locale")));
        }
        let locale = Locale {
            id: LocaleId::new(guard.next_id()),
            name: name.to_string(),
            is_primary: true,
        };
        guard.locales.insert(locale.id, locale.clone());
        drop(guard);
        Ok(locale)
    }

    fn find_or_create_locale(&self, name: &str) -> Result<Locale, StoreError> {
        let mut guard = self.lock()?;
        if let Some(locale) = guard.locale_named(name) {
            if locale.is_primary {
                return Err(StoreError::Conflict(format!("locale {name} is the primary locale")));
            }
            return Ok(locale.clone());
        }
        let locale = Locale {
            id: LocaleId::new(guard.next_id()),
            name: name.to_string(),
            is_primary: false,
        };
        guard.locales.insert(locale.id, locale.clone());
        drop(guard);
        Ok(locale)
    }

    fn find_or_create_phrase(&self, key: &str) -> Result<Phrase, StoreError> {
        let mut guard = self.lock()?;
        if let Some(phrase) = guard.phrase_keys.get(key).and_then(|id| guard.phrases.get(id)) {
            return Ok(phrase.clone());
        }
        let phrase = Phrase {
            id: PhraseId::new(guard.next_id()),
            key: key.to_string(),
        };
        guard.phrase_keys.insert(phrase.key.clone(), phrase.id);
        guard.phrases.insert(phrase.id, phrase.clone());
        drop(guard);
        Ok(phrase)
    }

    fn phrase(&self, id: PhraseId) -> Result<Option<Phrase>, StoreError> {
        Ok(self.lock()?.phrases.get(&id).cloned())
    }

    fn phrase_by_key(&self, key: &str) -> Result<Option<Phrase>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.phrase_keys.get(key).and_then(|id| guard.phrases.get(id)).cloned())
    }

    fn translation(&self, id: TranslationId) -> Result<Option<Translation>, StoreError> {
        Ok(self.lock()?.translations.get(&id).cloned())
    }

    fn translation_for(
        &self,
        phrase_id: PhraseId,
        locale_id: LocaleId,
    ) -> Result<Option<Translation>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .translation_index
            .get(&(phrase_id, locale_id))
            .and_then(|id| guard.translations.get(id))
            .cloned())
    }

    fn primary_translation(&self, phrase_id: PhraseId) -> Result<Option<Translation>, StoreError> {
        let guard = self.lock()?;
        let Some(primary) = guard.primary_locale() else {
            return Ok(None);
        };
        Ok(guard
            .translation_index
            .get(&(phrase_id, primary.id))
            .and_then(|id| guard.translations.get(id))
            .cloned())
    }

    fn secondary_translations(&self, phrase_id: PhraseId) -> Result<Vec<Translation>, StoreError> {
        let guard = self.lock()?;
        Ok(guard
            .translations
            .values()
            .filter(|translation| translation.phrase_id == phrase_id)
            .filter(|translation| {
                guard.locales.get(&translation.locale_id).is_some_and(|locale| !locale.is_primary)
            })
            .cloned()
            .collect())
    }

    fn translations_containing(&self, query: &str) -> Result<Vec<TranslationEntry>, StoreError> {
        let needle = query.to_lowercase();
        let guard = self.lock()?;
        Ok(guard.entries_where(|translation| {
            translation.text.as_ref().is_some_and(|text| text.search_text().contains(&needle))
        }))
    }

    fn lookup(&self, locale: &str, keys: &[String]) -> Result<Vec<TranslationEntry>, StoreError> {
        if keys.is_empty() {
            return Ok(Vec::new());
        }
        let namespaces: Vec<String> =
            keys.iter().map(|key| format!("{}.", key.to_lowercase())).collect();
        let guard = self.lock()?;
        let Some(locale_id) = guard.locale_named(locale).map(|locale| locale.id) else {
            return Ok(Vec::new());
        };
        Ok(guard.entries_where(|translation| {
            if translation.locale_id != locale_id {
                return false;
            }
            guard.phrases.get(&translation.phrase_id).is_some_and(|phrase| {
                let folded = phrase.key.to_lowercase();
                keys.iter().any(|key| *key == phrase.key)
                    || namespaces.iter().any(|namespace| folded.starts_with(namespace.as_str()))
            })
        }))
    }

    fn stale_translations(
        &self,
        locale_id: LocaleId,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.entries_where(|translation| {
            translation.locale_id == locale_id && translation.primary_updated
        }))
    }

    fn translations_for_locale(
        &self,
        locale_id: LocaleId,
    ) -> Result<Vec<TranslationEntry>, StoreError> {
        let guard = self.lock()?;
        Ok(guard.entries_where(|translation| translation.locale_id == locale_id))
    }

    fn phrases_without_translation(&self, locale_id: LocaleId) -> Result<Vec<Phrase>, StoreError> {
        let guard = self.lock()?;
        let mut phrases: Vec<Phrase> = guard
            .phrases
            .values()
            .filter(|phrase| !guard.translation_index.contains_key(&(phrase.id, locale_id)))
            .cloned()
            .collect();
        drop(guard);
        phrases.sort_by(|a, b| a.key.cmp(&b.key));
        Ok(phrases)
    }

    fn insert_translation(&self, translation: &NewTranslation) -> Result<Translation, StoreError> {
        let mut guard = self.lock()?;
        if !guard.phrases.contains_key(&translation.phrase_id) {
            return Err(StoreError::NotFound(format!("phrase {}", translation.phrase_id)));
        }
        if !guard.locales.contains_key(&translation.locale_id) {
            return Err(StoreError::NotFound(format!("locale {}", translation.locale_id)));
        }
        let index_key = (translation.phrase_id, translation.locale_id);
        if guard.translation_index.contains_key(&index_key) {
            return Err(StoreError::Conflict(format!(
                "translation already exists for phrase {} in locale {}",
                translation.phrase_id, translation.locale_id
            )));
        }
        let stored = translation.clone().into_translation(TranslationId::new(guard.next_id()));
        guard.translation_index.insert(index_key, stored.id);
        guard.translations.insert(stored.id, stored.clone());
        drop(guard);
        Ok(stored)
    }

    fn update_translation(&self, translation: &Translation) -> Result<(), StoreError> {
        let mut guard = self.lock()?;
        let Some(existing) = guard.translations.get(&translation.id) else {
            return Err(StoreError::NotFound(format!("translation {}", translation.id)));
        };
        if existing.phrase_id != translation.phrase_id
            || existing.locale_id != translation.locale_id
        {
            return Err(StoreError::Invalid(
                "translation phrase and locale are immutable".to_string(),
            ));
        }
        guard.translations.insert(translation.id, translation.clone());
        drop(guard);
        Ok(())
    }
}
