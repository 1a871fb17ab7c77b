// crates/phrasebook-core/tests/flatten.rs
// ============================================================================
// Module: Flattener Tests
// Description: Nested locale trees to dotted-key maps.
// Purpose: Validate key joining, pluralization leaves, and merge precedence.
// Dependencies: phrasebook-core, proptest
// ============================================================================

//! ## Overview
//! Covers dotted-key flattening, pluralization maps as atomic leaves, empty
//! branches, and merge precedence, plus property tests for identity and
//! prefixing.

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

use phrasebook_core::FlatTranslations;
use phrasebook_core::LeafValue;
use phrasebook_core::SourceNode;
use phrasebook_core::SourceTree;
use phrasebook_core::SourceValue;
use phrasebook_core::flatten;
use phrasebook_core::merge_preferring;
use proptest::prelude::*;

fn text(value: &str) -> SourceValue {
    SourceValue::Leaf(LeafValue::text(value))
}

#[test]
fn nested_branches_join_with_dots() {
    let tree = SourceTree::from([(
        "a".to_string(),
        SourceNode::branch([("b", SourceNode::branch([("c", SourceNode::text("x"))]))]),
    )]);
    let flat = flatten(&tree);
    assert_eq!(flat, FlatTranslations::from([("a.b.c".to_string(), text("x"))]));
}

#[test]
fn pluralization_map_is_a_single_leaf() {
    let tree = SourceTree::from([(
        "a".to_string(),
        SourceNode::branch([
            ("one", SourceNode::text("1 thing")),
            ("other", SourceNode::text("%{count} things")),
        ]),
    )]);
    let flat = flatten(&tree);
    assert_eq!(flat.len(), 1);
    let forms = BTreeMap::from([
        ("one".to_string(), "1 thing".to_string()),
        ("other".to_string(), "%{count} things".to_string()),
    ]);
    assert_eq!(flat["a"], SourceValue::Leaf(LeafValue::Plural(forms)));
}

#[test]
fn numeric_categories_are_plural_keys() {
    let tree = SourceTree::from([(
        "apples".to_string(),
        SourceNode::branch([("0", SourceNode::text("none")), ("1", SourceNode::text("one"))]),
    )]);
    let flat = flatten(&tree);
    assert!(flat["apples"].as_leaf().is_some_and(LeafValue::is_plural));
}

#[test]
fn mixed_category_and_namespace_keys_descend() {
    let tree = SourceTree::from([(
        "a".to_string(),
        SourceNode::branch([("one", SourceNode::text("1")), ("title", SourceNode::text("T"))]),
    )]);
    let flat = flatten(&tree);
    assert_eq!(flat.keys().collect::<Vec<_>>(), vec!["a.one", "a.title"]);
}

#[test]
fn empty_input_and_empty_branches_produce_nothing() {
    assert!(flatten(&SourceTree::new()).is_empty());
    let tree = SourceTree::from([("a".to_string(), SourceNode::Branch(SourceTree::new()))]);
    assert!(flatten(&tree).is_empty());
}

#[test]
fn lists_nulls_and_deferred_values_are_leaves() {
    let tree = SourceTree::from([
        (
            "days".to_string(),
            SourceNode::List(vec![SourceNode::text("Mon"), SourceNode::text("Tue")]),
        ),
        ("gone".to_string(), SourceNode::Null),
        ("later".to_string(), SourceNode::Deferred),
    ]);
    let flat = flatten(&tree);
    assert_eq!(
        flat["days"],
        SourceValue::Leaf(LeafValue::List(vec![LeafValue::text("Mon"), LeafValue::text("Tue")]))
    );
    assert_eq!(flat["gone"], SourceValue::Null);
    assert!(flat["later"].is_deferred());
}

#[test]
fn merge_keeps_preferred_value_on_collision() {
    let preferred = FlatTranslations::from([("a".to_string(), text("memory"))]);
    let fallback = FlatTranslations::from([
        ("a".to_string(), text("file")),
        ("b".to_string(), text("file only")),
    ]);
    let merged = merge_preferring(preferred, fallback);
    assert_eq!(merged["a"], text("memory"));
    assert_eq!(merged["b"], text("file only"));
}

fn flat_tree_strategy() -> impl Strategy<Value = BTreeMap<String, String>> {
    prop::collection::btree_map("k[a-z]{1,6}", ".{0,12}", 0 .. 8)
}

proptest! {
    #[test]
    fn flattening_flat_input_is_identity(entries in flat_tree_strategy()) {
        let tree: SourceTree =
            entries.iter().map(|(key, value)| (key.clone(), SourceNode::text(value.clone()))).collect();
        let expected: FlatTranslations =
            entries.iter().map(|(key, value)| (key.clone(), text(value))).collect();
        prop_assert_eq!(flatten(&tree), expected);
    }

    #[test]
    fn nesting_prefixes_every_key(entries in flat_tree_strategy()) {
        let inner: SourceTree =
            entries.iter().map(|(key, value)| (key.clone(), SourceNode::text(value.clone()))).collect();
        let tree = SourceTree::from([("ns".to_string(), SourceNode::Branch(inner))]);
        let expected: FlatTranslations =
            entries.iter().map(|(key, value)| (format!("ns.{key}"), text(value))).collect();
        prop_assert_eq!(flatten(&tree), expected);
    }
}
