// crates/phrasebook-config/src/lib.rs
// ============================================================================
// Module: Phrasebook Config Library
// Description: Canonical config model and validation.
// Purpose: Single source of truth for phrasebook.toml semantics.
// Dependencies: phrasebook-core, phrasebook-store-sqlite, serde, toml
// ============================================================================

//! ## Overview
//! `phrasebook-config` defines the configuration model for Phrasebook: the
//! primary and secondary locales, where locale sources live, how sync treats
//! existing primary text, which store backend to open, and the default log
//! filter. Validation is strict and fail-closed.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
