// crates/phrasebook-core/src/runtime/mod.rs
// ============================================================================
// Module: Phrasebook Runtime
// Description: Sync engine, save pipeline, editing, and locale transfer.
// Purpose: Reconcile locale sources with the store and guard every save.
// Dependencies: crate::{core, interfaces}, serde_yaml, tracing
// ============================================================================

//! ## Overview
//! Runtime modules implement the sync engine, the validation/save pipeline,
//! the editing entry point, and locale import/export. Every write to a
//! translation goes through [`SavePipeline`] so normalization, validation,
//! staleness bookkeeping, and cache invalidation happen in one place.

// ============================================================================
// SECTION: Submodules
// ============================================================================

pub mod cache;
pub mod editing;
pub mod pipeline;
pub mod source;
pub mod store;
pub mod sync;
pub mod transfer;
pub mod validation;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use cache::InMemoryCache;
pub use cache::NoopCache;
pub use editing::EditError;
pub use editing::EditOutcome;
pub use editing::apply_locale_updates;
pub use pipeline::SaveError;
pub use pipeline::SavePipeline;
pub use pipeline::TranslationDraft;
pub use pipeline::normalize_text;
pub use source::StaticTranslationTable;
pub use source::YamlTranslationTable;
pub use source::parse_locale_document;
pub use source::read_locale_file;
pub use store::InMemoryTranslationStore;
pub use sync::DEFAULT_RESERVED_PREFIX;
pub use sync::PrimaryTextPolicy;
pub use sync::SyncEngine;
pub use sync::SyncError;
pub use sync::SyncOptions;
pub use sync::SyncReport;
pub use transfer::ImportReport;
pub use transfer::TransferError;
pub use transfer::export_locale;
pub use transfer::import_locale;
pub use validation::FieldError;
pub use validation::TranslationField;
pub use validation::ValidationContext;
pub use validation::ValidationErrors;
pub use validation::validate;
