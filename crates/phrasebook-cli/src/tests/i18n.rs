// crates/phrasebook-cli/src/tests/i18n.rs
// ============================================================================
// Module: CLI i18n Tests
// Description: Unit tests for catalog parity and locale parsing.
// Purpose: Ensure CLI localization remains consistent across supported locales.
// Dependencies: phrasebook-cli i18n module
// ============================================================================

//! ## Overview
//! Verifies the CLI message catalogs stay in sync, locale parsing is tolerant,
//! and locale templates preserve placeholder parity with English.

use std::collections::BTreeSet;

use crate::i18n::Locale;
use crate::i18n::SUPPORTED_LOCALES;
use crate::i18n::catalog_entries_for;
use crate::i18n::catalog_for;
use crate::i18n::translate;

fn placeholder_names(template: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    let mut rest = template;
    while let Some(start) = rest.find('{') {
        let after = &rest[start + 1 ..];
        let Some(end) = after.find('}') else {
            panic!("unclosed placeholder in {template}");
        };
        names.insert(after[.. end].to_string());
        rest = &after[end + 1 ..];
    }
    names
}

#[test]
fn catalogs_have_identical_keys() {
    let english: BTreeSet<&str> = catalog_entries_for(Locale::En).iter().map(|(k, _)| *k).collect();
    for locale in SUPPORTED_LOCALES {
        let keys: BTreeSet<&str> = catalog_entries_for(*locale).iter().map(|(k, _)| *k).collect();
        assert_eq!(keys, english, "catalog keys diverge for {}", locale.as_str());
        assert_eq!(
            keys.len(),
            catalog_entries_for(*locale).len(),
            "duplicate keys in {}",
            locale.as_str()
        );
    }
}

#[test]
fn catalogs_preserve_placeholders() {
    let english = catalog_for(Locale::En);
    for (key, template) in catalog_entries_for(Locale::Ca) {
        let expected = placeholder_names(english[key]);
        assert_eq!(placeholder_names(template), expected, "placeholder mismatch for {key}");
    }
}

#[test]
fn locale_parse_accepts_region_tags() {
    assert_eq!(Locale::parse("en_US"), Some(Locale::En));
    assert_eq!(Locale::parse("CA-es"), Some(Locale::Ca));
    assert_eq!(Locale::parse(" "), None);
    assert_eq!(Locale::parse("fr"), None);
}

#[test]
fn missing_keys_fall_back_to_the_key() {
    assert_eq!(translate("nonexistent.key", Vec::new()), "nonexistent.key");
}
