// crates/phase-readiness-cli/tests/i18n.rs
// ============================================================================
// Module: CLI Message Catalog Tests
// Description: Exercises the message catalog and placeholder substitution.
// Purpose: Ensure CLI user-facing strings route through stable helpers.
// Dependencies: phase-readiness-cli message catalog and the `t!` macro.
// ============================================================================

//! ## Overview
//! Validates catalog lookups, key fallback, and [`t!`](phase_readiness_cli::t)
//! placeholder formatting.

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
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use phase_readiness_cli::i18n::MessageArg;
use phase_readiness_cli::i18n::translate;
use phase_readiness_cli::t;

// ============================================================================
// SECTION: Tests
// ============================================================================

/// Confirms catalog entries resolve and replace placeholders.
#[test]
fn translate_substitutes_placeholders() {
    let args = vec![MessageArg::new("path", "/tmp/phase.toml")];
    assert_eq!(translate("config.check.ok", args), "Config OK: /tmp/phase.toml");
}

/// Confirms missing keys fall back to the key string.
#[test]
fn translate_falls_back_to_key() {
    assert_eq!(translate("missing.key", Vec::new()), "missing.key");
}

/// Confirms the t! macro formats several named arguments.
#[test]
fn t_macro_formats_message() {
    let rendered = t!("input.line_rejected", line = 7, error = "bad json");
    assert_eq!(rendered, "Line 7: bad json; evaluated as invalid sample");
}

/// Confirms unmatched placeholders are left intact.
#[test]
fn unknown_placeholder_is_left_untouched() {
    let rendered = t!("main.version", build = "x");
    assert_eq!(rendered, "phase-readiness {version}");
}
