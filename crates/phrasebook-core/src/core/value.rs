// crates/phrasebook-core/src/core/value.rs
// ============================================================================
// Module: Phrasebook Leaf Values
// Description: Translation text shapes (string, list, pluralization map).
// Purpose: Model translation text as a closed sum type instead of runtime type checks.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A translation's text is one of three shapes: a plain string, a list of
//! leaves, or a pluralization map from plural category to string. Every
//! consumer (flattener, variable detector, stores, exporters) matches on
//! [`LeafValue`] exhaustively.
//!
//! ## Invariants
//! - Pluralization maps only carry string values.
//! - Serialized form is untagged so stored JSON mirrors the source YAML shape.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Plural category names recognized as pluralization keys.
pub const PLURAL_CATEGORIES: [&str; 7] = ["zero", "one", "two", "few", "many", "other", "none"];

/// Interpolation variable supplied by the pluralization mechanism itself.
pub const PLURAL_COUNTER: &str = "count";

/// Returns true when `key` is a plural category name.
///
/// Explicit numeric categories (`"0"`, `"1"`, ...) count as plural keys.
#[must_use]
pub fn is_plural_category(key: &str) -> bool {
    PLURAL_CATEGORIES.contains(&key) || (!key.is_empty() && key.bytes().all(|b| b.is_ascii_digit()))
}

// ============================================================================
// SECTION: Leaf Value
// ============================================================================

/// Translation text value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafValue {
    /// Plain string.
    Text(String),
    /// Ordered list of leaves (for example abbreviated day names).
    List(Vec<LeafValue>),
    /// Pluralization map keyed by plural category.
    Plural(BTreeMap<String, String>),
}

impl LeafValue {
    /// Creates a plain string leaf.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true when the value carries no visible content.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Text(text) => text.trim().is_empty(),
            Self::List(items) => items.is_empty(),
            Self::Plural(forms) => forms.is_empty(),
        }
    }

    /// Returns true when the value is a pluralization map.
    #[must_use]
    pub const fn is_plural(&self) -> bool {
        matches!(self, Self::Plural(_))
    }

    /// Returns the string content when the value is plain text.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::List(_) | Self::Plural(_) => None,
        }
    }

    /// Reads a digits-only string back as an integer.
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        let text = self.as_text()?;
        if text.is_empty() || !text.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        text.parse().ok()
    }

    /// Returns every string carried by the value, in traversal order.
    #[must_use]
    pub fn strings(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_strings(&mut out);
        out
    }

    /// Returns a lowercased, newline-joined rendering used for substring search.
    #[must_use]
    pub fn search_text(&self) -> String {
        self.strings().join("\n").to_lowercase()
    }

    /// Pushes every string of the value onto `out`.
    fn collect_strings<'a>(&'a self, out: &mut Vec<&'a str>) {
        match self {
            Self::Text(text) => out.push(text),
            Self::List(items) => {
                for item in items {
                    item.collect_strings(out);
                }
            }
            Self::Plural(forms) => out.extend(forms.values().map(String::as_str)),
        }
    }
}

impl From<&str> for LeafValue {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for LeafValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}
