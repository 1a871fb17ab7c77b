// crates/phrasebook-cli/src/logging.rs
// ============================================================================
// Module: CLI Logging Setup
// Description: Installs the tracing subscriber used by CLI commands.
// Purpose: Route structured diagnostics to stderr so stdout stays machine-readable.
// Dependencies: tracing-subscriber
// ============================================================================

//! ## Overview
//! Library crates emit diagnostics through `tracing`. The CLI installs a
//! registry with an [`EnvFilter`] taken from `RUST_LOG` when set, falling back
//! to the configured filter and finally to `info`. Output is written to stderr.

// ============================================================================
// SECTION: Imports
// ============================================================================

use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt;
use tracing_subscriber::prelude::*;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Filter used when neither `RUST_LOG` nor the configured filter parses.
const FALLBACK_FILTER: &str = "info";

// ============================================================================
// SECTION: Setup
// ============================================================================

/// Builds the effective filter from `RUST_LOG` or `configured`.
#[must_use]
pub fn resolve_filter(configured: &str) -> EnvFilter {
    EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(configured))
        .unwrap_or_else(|_| EnvFilter::new(FALLBACK_FILTER))
}

/// Installs the global tracing subscriber. Later calls are ignored.
pub fn init_tracing(configured: &str) {
    let fmt_layer = fmt::layer().with_target(true).with_writer(std::io::stderr);
    let _ = tracing_subscriber::registry().with(resolve_filter(configured)).with(fmt_layer).try_init();
}
