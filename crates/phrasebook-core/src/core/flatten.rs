// crates/phrasebook-core/src/core/flatten.rs
// ============================================================================
// Module: Phrasebook Flattener
// Description: Converts nested locale trees into dotted-key maps.
// Purpose: Bridge hierarchical source files and the flat phrase key space.
// Dependencies: crate::core::{source, value}
// ============================================================================

//! ## Overview
//! Flattening walks a [`SourceTree`] and joins segment names with `.`.
//! Pluralization maps are terminal leaves: a branch whose keys are all plural
//! categories (and whose values are scalars) becomes a single
//! [`LeafValue::Plural`] entry instead of being descended into.
//!
//! ## Invariants
//! - Already-flat input flattens to itself.
//! - Empty branches contribute no entries.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use crate::core::source::FlatTranslations;
use crate::core::source::SourceNode;
use crate::core::source::SourceTree;
use crate::core::source::SourceValue;
use crate::core::value::LeafValue;
use crate::core::value::is_plural_category;

/// Separator joining key segments.
pub const KEY_SEPARATOR: char = '.';

// ============================================================================
// SECTION: Flattening
// ============================================================================

/// Flattens a nested locale tree into dotted keys.
#[must_use]
pub fn flatten(tree: &SourceTree) -> FlatTranslations {
    let mut result = FlatTranslations::new();
    flatten_into(tree, None, &mut result);
    result
}

/// Returns true when a branch should be treated as a pluralization leaf.
#[must_use]
pub fn is_plural_branch(branch: &SourceTree) -> bool {
    !branch.is_empty()
        && branch.iter().all(|(key, node)| {
            is_plural_category(key) && matches!(node, SourceNode::Text(_) | SourceNode::Null)
        })
}

/// Merges `fallback` under `preferred`: keys only in `fallback` are added,
/// collisions keep the `preferred` value.
#[must_use]
pub fn merge_preferring(
    mut preferred: FlatTranslations,
    fallback: FlatTranslations,
) -> FlatTranslations {
    for (key, value) in fallback {
        preferred.entry(key).or_insert(value);
    }
    preferred
}

/// Recursive worker for [`flatten`].
fn flatten_into(tree: &SourceTree, prefix: Option<&str>, result: &mut FlatTranslations) {
    for (key, node) in tree {
        let path = match prefix {
            Some(prefix) => format!("{prefix}{KEY_SEPARATOR}{key}"),
            None => key.clone(),
        };
        match node {
            SourceNode::Branch(children) if !is_plural_branch(children) => {
                flatten_into(children, Some(&path), result);
            }
            _ => {
                result.insert(path, source_value(node));
            }
        }
    }
}

/// Converts a terminal node into its flattened value.
fn source_value(node: &SourceNode) -> SourceValue {
    match node {
        SourceNode::Text(text) => SourceValue::Leaf(LeafValue::Text(text.clone())),
        SourceNode::Null => SourceValue::Null,
        SourceNode::Deferred => SourceValue::Deferred,
        SourceNode::Branch(forms) => SourceValue::Leaf(LeafValue::Plural(plural_forms(forms))),
        SourceNode::List(items) => {
            let mut leaves = Vec::with_capacity(items.len());
            for item in items {
                match list_item(item) {
                    ListItem::Leaf(leaf) => leaves.push(leaf),
                    ListItem::Deferred => return SourceValue::Deferred,
                    ListItem::Unsupported => {}
                }
            }
            SourceValue::Leaf(LeafValue::List(leaves))
        }
    }
}

/// Outcome of converting a single list element.
enum ListItem {
    /// Concrete leaf.
    Leaf(LeafValue),
    /// Deferred element; the whole list is deferred.
    Deferred,
    /// Namespaced mapping inside a list; dropped (loaders reject these).
    Unsupported,
}

/// Converts one list element.
fn list_item(node: &SourceNode) -> ListItem {
    match node {
        SourceNode::Text(text) => ListItem::Leaf(LeafValue::Text(text.clone())),
        SourceNode::Null => ListItem::Leaf(LeafValue::Text(String::new())),
        SourceNode::Deferred => ListItem::Deferred,
        SourceNode::Branch(forms) if is_plural_branch(forms) => {
            ListItem::Leaf(LeafValue::Plural(plural_forms(forms)))
        }
        SourceNode::Branch(_) => ListItem::Unsupported,
        SourceNode::List(_) => match source_value(node) {
            SourceValue::Leaf(leaf) => ListItem::Leaf(leaf),
            SourceValue::Null => ListItem::Leaf(LeafValue::Text(String::new())),
            SourceValue::Deferred => ListItem::Deferred,
        },
    }
}

/// Extracts category → string pairs from a pluralization branch.
fn plural_forms(branch: &SourceTree) -> BTreeMap<String, String> {
    branch
        .iter()
        .filter_map(|(category, node)| match node {
            SourceNode::Text(text) => Some((category.clone(), text.clone())),
            SourceNode::Null => Some((category.clone(), String::new())),
            SourceNode::Branch(_) | SourceNode::List(_) | SourceNode::Deferred => None,
        })
        .collect()
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

    #[test]
    fn list_with_deferred_element_is_deferred() {
        let node = SourceNode::List(vec![SourceNode::text("a"), SourceNode::Deferred]);
        assert_eq!(source_value(&node), SourceValue::Deferred);
    }

    #[test]
    fn null_list_elements_become_empty_strings() {
        let node = SourceNode::List(vec![SourceNode::Null, SourceNode::text("Mon")]);
        assert_eq!(
            source_value(&node),
            SourceValue::Leaf(LeafValue::List(vec![LeafValue::text(""), LeafValue::text("Mon")]))
        );
    }

    #[test]
    fn plural_branch_requires_scalar_values() {
        let nested = SourceTree::from([(
            "one".to_string(),
            SourceNode::branch([("title", SourceNode::text("x"))]),
        )]);
        assert!(!is_plural_branch(&nested));
        assert!(!is_plural_branch(&SourceTree::new()));
    }
}
