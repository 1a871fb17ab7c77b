// crates/phrasebook-store-sqlite/src/lib.rs
// ============================================================================
// Module: SQLite Translation Store
// Description: Durable TranslationStore backend using SQLite WAL.
// Purpose: Provide persistent storage for locales, phrases, and translations.
// Dependencies: phrasebook-core, rusqlite
// ============================================================================

//! ## Overview
//! This crate provides a SQLite-backed [`phrasebook_core::TranslationStore`]
//! implementation. Locale names, phrase keys, and one translation per
//! `(phrase, locale)` pair are unique at the schema level, so concurrent
//! writers racing past application-level checks receive a conflict instead
//! of silently duplicating rows. Security posture: storage inputs are
//! untrusted and decoding failures are reported as corruption.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use store::MAX_TEXT_BYTES;
pub use store::SqliteStoreConfig;
pub use store::SqliteStoreError;
pub use store::SqliteStoreMode;
pub use store::SqliteSyncMode;
pub use store::SqliteTranslationStore;
