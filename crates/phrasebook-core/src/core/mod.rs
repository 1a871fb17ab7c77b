// crates/phrasebook-core/src/core/mod.rs
// ============================================================================
// Module: Phrasebook Core Types
// Description: Canonical value, source, and relational model types.
// Purpose: Provide stable, serializable types shared by every backend.
// Dependencies: regex, serde
// ============================================================================

//! ## Overview
//! Core types define translation leaf values, the hierarchical source tree,
//! the flattened key space, and the locale/phrase/translation records. These
//! types are the canonical source of truth for every store backend and for
//! the CLI output.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod flatten;
pub mod identifiers;
pub mod model;
pub mod source;
pub mod value;
pub mod variables;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use flatten::KEY_SEPARATOR;
pub use flatten::flatten;
pub use flatten::is_plural_branch;
pub use flatten::merge_preferring;
pub use identifiers::LocaleId;
pub use identifiers::PhraseId;
pub use identifiers::TranslationId;
pub use model::Locale;
pub use model::NewTranslation;
pub use model::Phrase;
pub use model::Translation;
pub use model::TranslationEntry;
pub use model::cache_key;
pub use source::FlatTranslations;
pub use source::SourceNode;
pub use source::SourceTree;
pub use source::SourceValue;
pub use value::LeafValue;
pub use value::PLURAL_CATEGORIES;
pub use value::PLURAL_COUNTER;
pub use value::is_plural_category;
pub use variables::detect_variables;
