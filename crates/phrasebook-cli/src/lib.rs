// crates/phrasebook-cli/src/lib.rs
// ============================================================================
// Module: Phrasebook CLI Library
// Description: Shared helpers for the Phrasebook command-line interface.
// Purpose: Provide reusable components (i18n, logging) for the CLI binary and tests.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! This library module houses shared CLI utilities: the internationalized
//! message catalog and the tracing subscriber setup. The binary entry point
//! (`src/main.rs`) imports these helpers to keep all user-facing output
//! consistent.

// ============================================================================
// SECTION: Modules
// ============================================================================

/// Internationalization helpers and message catalog.
pub mod i18n;
/// Tracing subscriber setup.
pub mod logging;

#[cfg(test)]
mod tests;
