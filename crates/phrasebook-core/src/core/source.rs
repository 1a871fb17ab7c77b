// crates/phrasebook-core/src/core/source.rs
// ============================================================================
// Module: Phrasebook Source Trees
// Description: Hierarchical locale source nodes and flattened source values.
// Purpose: Represent locale files before and after flattening.
// Dependencies: crate::core::value
// ============================================================================

//! ## Overview
//! Locale sources are trees of named branches. After flattening, each dotted
//! key maps to a [`SourceValue`]: a concrete leaf, an explicit null, or a
//! deferred placeholder that only the runtime can resolve. Deferred values
//! are a dedicated variant so the sync engine can skip them without
//! inspecting types.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::value::LeafValue;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A nested locale tree keyed by segment name.
pub type SourceTree = BTreeMap<String, SourceNode>;

/// Flattened source keyed by dotted path.
pub type FlatTranslations = BTreeMap<String, SourceValue>;

/// Node of a hierarchical locale source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceNode {
    /// Nested mapping (namespace or pluralization map).
    Branch(SourceTree),
    /// String scalar.
    Text(String),
    /// Sequence of nodes.
    List(Vec<SourceNode>),
    /// Explicit null.
    Null,
    /// Value resolved lazily by the runtime; never a concrete translation.
    Deferred,
}

impl SourceNode {
    /// Creates a text node.
    #[must_use]
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Creates a branch node from `(segment, node)` pairs.
    #[must_use]
    pub fn branch<K: Into<String>>(entries: impl IntoIterator<Item = (K, Self)>) -> Self {
        Self::Branch(entries.into_iter().map(|(key, node)| (key.into(), node)).collect())
    }
}

/// Flattened value for a single dotted key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceValue {
    /// Concrete translation text.
    Leaf(LeafValue),
    /// Explicit null in the source.
    Null,
    /// Deferred placeholder; skipped by sync.
    Deferred,
}

impl SourceValue {
    /// Returns the concrete leaf when present.
    #[must_use]
    pub const fn as_leaf(&self) -> Option<&LeafValue> {
        match self {
            Self::Leaf(leaf) => Some(leaf),
            Self::Null | Self::Deferred => None,
        }
    }

    /// Returns true for deferred placeholders.
    #[must_use]
    pub const fn is_deferred(&self) -> bool {
        matches!(self, Self::Deferred)
    }
}

impl From<LeafValue> for SourceValue {
    fn from(value: LeafValue) -> Self {
        Self::Leaf(value)
    }
}
