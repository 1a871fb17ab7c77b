// crates/phrasebook-core/src/core/variables.rs
// ============================================================================
// Module: Phrasebook Variable Detector
// Description: Extracts interpolation variable names from translation text.
// Purpose: Feed the variable-parity check between primary and secondary text.
// Dependencies: regex, crate::core::value
// ============================================================================

//! ## Overview
//! Two placeholder syntaxes are recognized: `{{name}}` and `%{name}`, where the
//! name is one or more word characters. Pluralization maps drop the reserved
//! [`PLURAL_COUNTER`] because the pluralization mechanism always supplies it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeSet;
use std::sync::OnceLock;

use regex::Regex;

use crate::core::value::LeafValue;
use crate::core::value::PLURAL_COUNTER;

/// Placeholder pattern covering both supported syntaxes.
const PLACEHOLDER_PATTERN: &str = r"\{\{(\w+)\}\}|%\{(\w+)\}";

// ============================================================================
// SECTION: Detection
// ============================================================================

/// Returns the variable names referenced by `text`.
///
/// Absent text references no variables.
#[must_use]
pub fn detect_variables(text: Option<&LeafValue>) -> BTreeSet<String> {
    let mut variables = BTreeSet::new();
    if let Some(value) = text {
        collect(value, &mut variables);
        if value.is_plural() {
            variables.remove(PLURAL_COUNTER);
        }
    }
    variables
}

/// Adds every placeholder name found in `value`.
fn collect(value: &LeafValue, out: &mut BTreeSet<String>) {
    match value {
        LeafValue::Text(text) => scan(text, out),
        LeafValue::List(items) => {
            for item in items {
                collect(item, out);
            }
        }
        LeafValue::Plural(forms) => {
            for form in forms.values() {
                scan(form, out);
            }
        }
    }
}

/// Scans a single string for placeholders.
fn scan(text: &str, out: &mut BTreeSet<String>) {
    let Some(pattern) = placeholder_pattern() else {
        return;
    };
    for captures in pattern.captures_iter(text) {
        if let Some(name) = captures.get(1).or_else(|| captures.get(2)) {
            out.insert(name.as_str().to_string());
        }
    }
}

/// Returns the compiled placeholder pattern.
fn placeholder_pattern() -> Option<&'static Regex> {
    static PATTERN: OnceLock<Option<Regex>> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(PLACEHOLDER_PATTERN).ok()).as_ref()
}

// ============================================================================
// SECTION: Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_pattern_compiles() {
        assert!(placeholder_pattern().is_some());
    }

    #[test]
    fn nested_plural_inside_list_drops_counter_only_at_top_level() {
        let forms = [("one".to_string(), "%{count} day".to_string())].into_iter().collect();
        let value = LeafValue::List(vec![LeafValue::Plural(forms)]);
        let variables = detect_variables(Some(&value));
        assert!(variables.contains("count"));
    }
}
