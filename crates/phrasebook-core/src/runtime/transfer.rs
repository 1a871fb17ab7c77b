// crates/phrasebook-core/src/runtime/transfer.rs
// ============================================================================
// Module: Phrasebook Locale Transfer
// Description: Export and import of one locale as a YAML locale file.
// Purpose: Move translations between the store and `{dir}/{locale}.yml` files.
// Dependencies: serde, serde_yaml, thiserror, tracing, crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Export writes every translation of a locale into a YAML document rooted at
//! the locale name, expanding dotted keys back into nested mappings. Absent
//! text is written as YAML null.
//!
//! Import reads the same layout for a secondary locale and saves each known
//! key through the save pipeline. Keys with no phrase are counted and
//! skipped; a YAML null becomes an explicit null.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;

use serde::Serialize;
use serde_yaml::Mapping;
use serde_yaml::Value;
use thiserror::Error;

use crate::core::KEY_SEPARATOR;
use crate::core::SourceValue;
use crate::core::TranslationEntry;
use crate::core::flatten;
use crate::interfaces::CacheInvalidator;
use crate::interfaces::SourceError;
use crate::interfaces::StoreError;
use crate::interfaces::TranslationStore;
use crate::runtime::pipeline::SaveError;
use crate::runtime::pipeline::SavePipeline;
use crate::runtime::pipeline::TranslationDraft;
use crate::runtime::pipeline::normalize_text;
use crate::runtime::source::read_locale_file;
use crate::runtime::validation::ValidationErrors;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Errors raised by locale import and export.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TransferError {
    /// The locale does not exist.
    #[error("unknown locale: {0}")]
    UnknownLocale(String),
    /// Import targets the primary locale, which sync owns.
    #[error("cannot import into primary locale: {0}")]
    PrimaryLocale(String),
    /// The locale file is missing.
    #[error("locale file not found: {0}")]
    MissingFile(String),
    /// One key is both a leaf and a namespace of other keys.
    #[error("key collides with a namespace: {0}")]
    KeyCollision(String),
    /// Writing the locale file failed.
    #[error("locale file io error: {0}")]
    Io(String),
    /// Serializing the locale document failed.
    #[error("locale file serialization error: {0}")]
    Serialize(String),
    /// Reading the locale file failed.
    #[error(transparent)]
    Source(#[from] SourceError),
    /// The store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Counters describing one import.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Translations created or changed.
    pub imported: usize,
    /// Keys whose stored translation already matched.
    pub unchanged: usize,
    /// Keys with no matching phrase.
    pub unknown_keys: usize,
    /// Keys skipped because their value is deferred.
    pub deferred_skipped: usize,
    /// Validation failures keyed by phrase key.
    pub rejected: BTreeMap<String, ValidationErrors>,
}

/// Returns `{dir}/{locale}.yml`.
#[must_use]
pub fn locale_file_path(dir: &Path, locale: &str) -> PathBuf {
    dir.join(format!("{locale}.yml"))
}

// ============================================================================
// SECTION: Export
// ============================================================================

/// Nested export tree.
enum ExportNode {
    /// Terminal value.
    Leaf(Value),
    /// Namespace.
    Branch(BTreeMap<String, ExportNode>),
}

/// Writes every translation of `locale_name` to `{dir}/{locale_name}.yml`.
///
/// # Errors
///
/// Returns [`TransferError`] when the locale is unknown, keys collide, or the
/// file cannot be written.
pub fn export_locale(
    store: &dyn TranslationStore,
    locale_name: &str,
    dir: &Path,
) -> Result<PathBuf, TransferError> {
    let locale = store
        .locale_by_name(locale_name)?
        .ok_or_else(|| TransferError::UnknownLocale(locale_name.to_string()))?;
    let entries = store.translations_for_locale(locale.id)?;
    let count = entries.len();
    let tree = unflatten(entries)?;

    let mut document = Mapping::new();
    document.insert(Value::String(locale.name.clone()), into_value(tree));
    let rendered = serde_yaml::to_string(&Value::Mapping(document))
        .map_err(|err| TransferError::Serialize(err.to_string()))?;

    fs::create_dir_all(dir).map_err(|err| TransferError::Io(format!("{}: {err}", dir.display())))?;
    let path = locale_file_path(dir, &locale.name);
    fs::write(&path, rendered)
        .map_err(|err| TransferError::Io(format!("{}: {err}", path.display())))?;
    tracing::info!(locale = %locale.name, translations = count, path = %path.display(), "locale exported");
    Ok(path)
}

/// Expands dotted keys into a nested tree.
fn unflatten(entries: Vec<TranslationEntry>) -> Result<BTreeMap<String, ExportNode>, TransferError> {
    let mut root = BTreeMap::new();
    for entry in entries {
        let leaf = match &entry.translation.text {
            Some(text) => {
                serde_yaml::to_value(text).map_err(|err| TransferError::Serialize(err.to_string()))?
            }
            None => Value::Null,
        };
        insert_path(&mut root, &entry.phrase.key, leaf)?;
    }
    Ok(root)
}

/// Inserts `leaf` at the dotted `key` below `root`.
fn insert_path(
    root: &mut BTreeMap<String, ExportNode>,
    key: &str,
    leaf: Value,
) -> Result<(), TransferError> {
    let segments: Vec<&str> = key.split(KEY_SEPARATOR).collect();
    let Some((last, parents)) = segments.split_last() else {
        return Err(TransferError::KeyCollision(key.to_string()));
    };
    let mut level = root;
    for segment in parents {
        let node = level
            .entry((*segment).to_string())
            .or_insert_with(|| ExportNode::Branch(BTreeMap::new()));
        level = match node {
            ExportNode::Branch(children) => children,
            ExportNode::Leaf(_) => return Err(TransferError::KeyCollision(key.to_string())),
        };
    }
    if level.contains_key(*last) {
        return Err(TransferError::KeyCollision(key.to_string()));
    }
    level.insert((*last).to_string(), ExportNode::Leaf(leaf));
    Ok(())
}

/// Converts the export tree into a YAML mapping.
fn into_value(tree: BTreeMap<String, ExportNode>) -> Value {
    let mut mapping = Mapping::new();
    for (key, node) in tree {
        let value = match node {
            ExportNode::Leaf(value) => value,
            ExportNode::Branch(children) => into_value(children),
        };
        mapping.insert(Value::String(key), value);
    }
    Value::Mapping(mapping)
}

// ============================================================================
// SECTION: Import
// ============================================================================

/// Imports `{dir}/{locale_name}.yml` into a secondary locale.
///
/// # Errors
///
/// Returns [`TransferError`] when the locale is unknown or primary, the file
/// is missing or malformed, or the store fails. Validation failures are
/// reported per key in [`ImportReport::rejected`].
pub fn import_locale(
    store: &dyn TranslationStore,
    cache: &dyn CacheInvalidator,
    locale_name: &str,
    dir: &Path,
) -> Result<ImportReport, TransferError> {
    let locale = store
        .locale_by_name(locale_name)?
        .ok_or_else(|| TransferError::UnknownLocale(locale_name.to_string()))?;
    if locale.is_primary {
        return Err(TransferError::PrimaryLocale(locale.name));
    }
    let path = locale_file_path(dir, &locale.name);
    if !path.is_file() {
        return Err(TransferError::MissingFile(path.display().to_string()));
    }
    let translations = flatten(&read_locale_file(&path, &locale.name)?);
    let pipeline = SavePipeline::new(store, cache);
    let mut report = ImportReport::default();

    for (key, value) in translations {
        if value.is_deferred() {
            report.deferred_skipped += 1;
            continue;
        }
        let Some(phrase) = store.phrase_by_key(&key)? else {
            tracing::debug!(key = %key, "import skipped unknown key");
            report.unknown_keys += 1;
            continue;
        };
        let mut draft = match store.translation_for(phrase.id, locale.id)? {
            Some(existing) => TranslationDraft::from_translation(existing),
            None => TranslationDraft::new(phrase.id, locale.id),
        };
        let was_explicit_nil = draft.explicit_nil();
        match value {
            SourceValue::Leaf(leaf) => draft.set_text(Some(leaf)),
            SourceValue::Null => {
                draft.set_text(None);
                draft.set_explicit_nil(true);
            }
            SourceValue::Deferred => continue,
        }
        normalize_text(&mut draft);
        if !draft.is_new_record()
            && !draft.text_changed()
            && draft.explicit_nil() == was_explicit_nil
        {
            report.unchanged += 1;
            continue;
        }
        match pipeline.save(&mut draft, false) {
            Ok(_) => report.imported += 1,
            Err(SaveError::Validation(errors)) => {
                report.rejected.insert(key, errors);
            }
            Err(SaveError::Store(err)) => return Err(TransferError::Store(err)),
        }
    }

    tracing::info!(
        locale = %locale.name,
        imported = report.imported,
        unchanged = report.unchanged,
        unknown = report.unknown_keys,
        rejected = report.rejected.len(),
        "locale imported"
    );
    Ok(report)
}
