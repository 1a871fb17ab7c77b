// crates/phrasebook-core/src/lib.rs
// ============================================================================
// Module: Phrasebook Core Library
// Description: Public API surface for the Phrasebook core.
// Purpose: Expose value types, interfaces, and the sync/validation runtime.
// Dependencies: crate::{core, interfaces, runtime}
// ============================================================================

//! ## Overview
//! Phrasebook core reconciles hierarchical locale source files with a flat
//! relational store of phrases and translations. It tracks which secondary
//! translations went stale when the primary text changed and refuses saves
//! that break substitution-variable parity. Storage, caching, and source
//! loading are reached through explicit interfaces so backends stay
//! swappable.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod interfaces;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use interfaces::CacheError;
pub use interfaces::CacheInvalidator;
pub use interfaces::SourceError;
pub use interfaces::StoreError;
pub use interfaces::TranslationStore;
pub use interfaces::TranslationTable;
pub use runtime::EditError;
pub use runtime::EditOutcome;
pub use runtime::FieldError;
pub use runtime::ImportReport;
pub use runtime::InMemoryCache;
pub use runtime::InMemoryTranslationStore;
pub use runtime::NoopCache;
pub use runtime::PrimaryTextPolicy;
pub use runtime::SaveError;
pub use runtime::SavePipeline;
pub use runtime::StaticTranslationTable;
pub use runtime::SyncEngine;
pub use runtime::SyncError;
pub use runtime::SyncOptions;
pub use runtime::SyncReport;
pub use runtime::TransferError;
pub use runtime::TranslationDraft;
pub use runtime::TranslationField;
pub use runtime::ValidationErrors;
pub use runtime::YamlTranslationTable;
pub use runtime::apply_locale_updates;
pub use runtime::export_locale;
pub use runtime::import_locale;
