// crates/phrasebook-core/src/runtime/source.rs
// ============================================================================
// Module: Phrasebook Locale Sources
// Description: YAML locale file parsing and translation table backends.
// Purpose: Turn on-disk locale files into source trees for sync and import.
// Dependencies: serde_yaml, tracing, crate::{core, interfaces}
// ============================================================================

//! ## Overview
//! Locale files are YAML documents rooted at the locale name. Scalars that are
//! not strings are kept in their string form, tagged values (for example
//! `!lazy`) become [`SourceNode::Deferred`], and mappings nested inside lists
//! are only accepted when they are pluralization maps.
//!
//! [`YamlTranslationTable`] loads every locale file below its load paths in
//! sorted order and deep-merges later files over earlier ones.
//! [`StaticTranslationTable`] serves prebuilt trees.
//!
//! Security posture: locale files are untrusted input; size is capped at
//! [`MAX_LOCALE_FILE_BYTES`] and content must be UTF-8.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::OnceLock;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;

use serde_yaml::Value;

use crate::core::SourceNode;
use crate::core::SourceTree;
use crate::core::is_plural_branch;
use crate::interfaces::SourceError;
use crate::interfaces::TranslationTable;

// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a single locale file in bytes.
pub const MAX_LOCALE_FILE_BYTES: u64 = 16 * 1024 * 1024;

/// File extensions recognized as locale files.
const LOCALE_EXTENSIONS: [&str; 2] = ["yml", "yaml"];

// ============================================================================
// SECTION: Parsing
// ============================================================================

/// Parses a locale YAML document into a tree keyed by locale name.
///
/// An empty document yields an empty tree.
///
/// # Errors
///
/// Returns [`SourceError::Parse`] for malformed YAML and
/// [`SourceError::Invalid`] when the document is not a mapping or contains a
/// namespaced mapping inside a list.
pub fn parse_locale_document(text: &str, origin: &str) -> Result<SourceTree, SourceError> {
    let value: Value = serde_yaml::from_str(text)
        .map_err(|err| SourceError::Parse(format!("{origin}: {err}")))?;
    match value {
        Value::Null => Ok(SourceTree::new()),
        Value::Mapping(_) => match convert_node(value, origin, "")? {
            SourceNode::Branch(tree) => Ok(tree),
            _ => Err(SourceError::Invalid(format!("{origin}: document root must be a mapping"))),
        },
        _ => Err(SourceError::Invalid(format!("{origin}: document root must be a mapping"))),
    }
}

/// Reads `path` and returns the subtree rooted at `locale`.
///
/// A missing file or a missing root key yields an empty tree.
///
/// # Errors
///
/// Returns [`SourceError`] when the file cannot be read or parsed, or when the
/// locale root is not a mapping.
pub fn read_locale_file(path: &Path, locale: &str) -> Result<SourceTree, SourceError> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "locale file missing; treating as empty");
        return Ok(SourceTree::new());
    }
    let mut document = read_document(path)?;
    match document.remove(locale) {
        None | Some(SourceNode::Null) => Ok(SourceTree::new()),
        Some(SourceNode::Branch(tree)) => Ok(tree),
        Some(_) => Err(SourceError::Invalid(format!(
            "{}: locale root {locale} must be a mapping",
            path.display()
        ))),
    }
}

/// Reads and parses a whole locale document.
fn read_document(path: &Path) -> Result<SourceTree, SourceError> {
    let origin = path.display().to_string();
    let metadata = fs::metadata(path).map_err(|err| SourceError::Io(format!("{origin}: {err}")))?;
    if metadata.len() > MAX_LOCALE_FILE_BYTES {
        return Err(SourceError::Invalid(format!("{origin}: locale file exceeds size limit")));
    }
    let bytes = fs::read(path).map_err(|err| SourceError::Io(format!("{origin}: {err}")))?;
    let text = String::from_utf8(bytes)
        .map_err(|_| SourceError::Invalid(format!("{origin}: locale file must be utf-8")))?;
    parse_locale_document(&text, &origin)
}

/// Converts a YAML value into a source node.
fn convert_node(value: Value, origin: &str, path: &str) -> Result<SourceNode, SourceError> {
    match value {
        Value::Null => Ok(SourceNode::Null),
        Value::Bool(flag) => Ok(SourceNode::Text(flag.to_string())),
        Value::Number(number) => Ok(SourceNode::Text(number.to_string())),
        Value::String(text) => Ok(SourceNode::Text(text)),
        Value::Tagged(_) => Ok(SourceNode::Deferred),
        Value::Sequence(items) => {
            let mut nodes = Vec::with_capacity(items.len());
            for item in items {
                let node = convert_node(item, origin, path)?;
                if let SourceNode::Branch(branch) = &node
                    && !is_plural_branch(branch)
                {
                    return Err(SourceError::Invalid(format!(
                        "{origin}: {path} contains a namespaced mapping inside a list"
                    )));
                }
                nodes.push(node);
            }
            Ok(SourceNode::List(nodes))
        }
        Value::Mapping(mapping) => {
            let mut tree = SourceTree::new();
            for (key, child) in mapping {
                let key = mapping_key(key, origin, path)?;
                let child_path = if path.is_empty() { key.clone() } else { format!("{path}.{key}") };
                let node = convert_node(child, origin, &child_path)?;
                tree.insert(key, node);
            }
            Ok(SourceNode::Branch(tree))
        }
    }
}

/// Normalizes a mapping key to a plain string.
fn mapping_key(key: Value, origin: &str, path: &str) -> Result<String, SourceError> {
    match key {
        Value::String(text) => Ok(text),
        Value::Bool(flag) => Ok(flag.to_string()),
        Value::Number(number) => Ok(number.to_string()),
        _ => Err(SourceError::Invalid(format!("{origin}: {path} has a non-scalar mapping key"))),
    }
}

/// Deep-merges `overlay` into `base`; overlay values win except where both
/// sides are branches.
fn deep_merge(base: &mut SourceTree, overlay: SourceTree) {
    for (key, node) in overlay {
        match (base.get_mut(&key), node) {
            (Some(SourceNode::Branch(existing)), SourceNode::Branch(incoming)) => {
                deep_merge(existing, incoming);
            }
            (_, node) => {
                base.insert(key, node);
            }
        }
    }
}

// ============================================================================
// SECTION: YAML Translation Table
// ============================================================================

/// Translation table loaded from YAML files on disk.
#[derive(Debug, Default)]
pub struct YamlTranslationTable {
    /// Files or directories to load, in precedence order.
    load_paths: Vec<PathBuf>,
    /// Loaded trees keyed by locale name.
    loaded: OnceLock<BTreeMap<String, SourceTree>>,
}

impl YamlTranslationTable {
    /// Creates a table over the given load paths.
    #[must_use]
    pub fn new(load_paths: Vec<PathBuf>) -> Self {
        Self {
            load_paths,
            loaded: OnceLock::new(),
        }
    }

    /// Returns the configured load paths.
    #[must_use]
    pub fn load_paths(&self) -> &[PathBuf] {
        &self.load_paths
    }

    /// Loads every locale file and merges them by locale.
    fn load(&self) -> Result<BTreeMap<String, SourceTree>, SourceError> {
        let mut files = Vec::new();
        for load_path in &self.load_paths {
            collect_locale_files(load_path, &mut files)?;
        }
        let mut locales: BTreeMap<String, SourceTree> = BTreeMap::new();
        for file in &files {
            let document = read_document(file)?;
            for (locale, node) in document {
                let tree = match node {
                    SourceNode::Branch(tree) => tree,
                    SourceNode::Null => SourceTree::new(),
                    _ => {
                        return Err(SourceError::Invalid(format!(
                            "{}: locale root {locale} must be a mapping",
                            file.display()
                        )));
                    }
                };
                deep_merge(locales.entry(locale).or_default(), tree);
            }
        }
        tracing::debug!(files = files.len(), locales = locales.len(), "translation table loaded");
        Ok(locales)
    }
}

impl TranslationTable for YamlTranslationTable {
    fn is_initialized(&self) -> bool {
        self.loaded.get().is_some()
    }

    fn initialize(&self) -> Result<(), SourceError> {
        if self.is_initialized() {
            return Ok(());
        }
        let locales = self.load()?;
        // A concurrent initializer may have won; both loaded the same files.
        let _ = self.loaded.set(locales);
        Ok(())
    }

    fn translations(&self, locale: &str) -> Result<Option<SourceTree>, SourceError> {
        let loaded = self
            .loaded
            .get()
            .ok_or_else(|| SourceError::Invalid("translation table not initialized".to_string()))?;
        Ok(loaded.get(locale).cloned())
    }
}

/// Appends locale files under `path` to `out`, walking directories in sorted order.
fn collect_locale_files(path: &Path, out: &mut Vec<PathBuf>) -> Result<(), SourceError> {
    let metadata =
        fs::metadata(path).map_err(|err| SourceError::Io(format!("{}: {err}", path.display())))?;
    if metadata.is_file() {
        out.push(path.to_path_buf());
        return Ok(());
    }
    let mut entries = Vec::new();
    let reader =
        fs::read_dir(path).map_err(|err| SourceError::Io(format!("{}: {err}", path.display())))?;
    for entry in reader {
        let entry = entry.map_err(|err| SourceError::Io(format!("{}: {err}", path.display())))?;
        entries.push(entry.path());
    }
    entries.sort();
    for entry in entries {
        if entry.is_dir() {
            collect_locale_files(&entry, out)?;
        } else if has_locale_extension(&entry) {
            out.push(entry);
        }
    }
    Ok(())
}

/// Returns true for `.yml` / `.yaml` files.
fn has_locale_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| LOCALE_EXTENSIONS.contains(&ext))
}

// ============================================================================
// SECTION: Static Translation Table
// ============================================================================

/// Translation table backed by prebuilt trees.
#[derive(Debug, Default)]
pub struct StaticTranslationTable {
    /// Trees keyed by locale name.
    trees: BTreeMap<String, SourceTree>,
    /// Set once [`TranslationTable::initialize`] ran.
    initialized: AtomicBool,
}

impl StaticTranslationTable {
    /// Creates an uninitialized table with no locales.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or replaces) the tree for `locale`.
    #[must_use]
    pub fn with_locale(mut self, locale: impl Into<String>, tree: SourceTree) -> Self {
        self.trees.insert(locale.into(), tree);
        self
    }
}

impl TranslationTable for StaticTranslationTable {
    fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    fn initialize(&self) -> Result<(), SourceError> {
        self.initialized.store(true, Ordering::Release);
        Ok(())
    }

    fn translations(&self, locale: &str) -> Result<Option<SourceTree>, SourceError> {
        if !self.is_initialized() {
            return Err(SourceError::Invalid("translation table not initialized".to_string()));
        }
        Ok(self.trees.get(locale).cloned())
    }
}

// ============================================================================
// SECTION: Tests
// ============================================================================
