// crates/phase-readiness-cli/src/i18n.rs
// ============================================================================
// Module: CLI Message Catalog
// Description: Message catalog and placeholder substitution for the CLI.
// Purpose: Centralize user-facing strings so output stays consistent.
// Dependencies: Standard library collections.
// ============================================================================

//! ## Overview
//! User-facing strings live in a static catalog and are rendered through the
//! [`t!`](crate::t) macro.
//!
//! ## Invariants
//! - The catalog is initialized once and read-only thereafter.
//! - Missing keys fall back to the key itself.
//! - Placeholder substitutions preserve argument order.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::HashMap;
use std::sync::OnceLock;

// ============================================================================
// SECTION: Types
// ============================================================================

/// A formatted message argument captured by the [`macro@crate::t`] macro.
///
/// # Invariants
/// - `key` matches a placeholder name without braces (for example, `path`).
#[derive(Clone)]
pub struct MessageArg {
    /// The placeholder name used in message templates.
    pub key: &'static str,
    /// The formatted string value to substitute for this placeholder.
    pub value: String,
}

impl MessageArg {
    /// Constructs a new [`MessageArg`] from a key and displayable value.
    pub fn new(key: &'static str, value: impl Into<String>) -> Self {
        Self {
            key,
            value: value.into(),
        }
    }
}

// ============================================================================
// SECTION: Catalog
// ============================================================================

/// Static catalog entries.
const CATALOG: &[(&str, &str)] = &[
    ("main.version", "phase-readiness {version}"),
    ("config.load_failed", "Failed to load config: {error}"),
    ("config.check.ok", "Config OK: {path}"),
    ("config.check.ok_default", "Config OK (defaults and environment)"),
    ("audit.open_failed", "Failed to open audit sink: {error}"),
    ("input.open_failed", "Failed to open input {path}: {error}"),
    ("input.read_failed", "Failed to read input: {error}"),
    ("input.line_rejected", "Line {line}: {error}; evaluated as invalid sample"),
    ("serve.listening", "Serving phase readiness on http://{addr}"),
    ("serve.start_failed", "Failed to start API server: {error}"),
    ("serve.eof", "Input exhausted after {count} samples; still serving"),
    ("serve.eof_exit", "Input exhausted after {count} samples; shutting down"),
    ("serve.store_failed", "Failed to publish snapshot: {error}"),
    ("replay.encode_failed", "Failed to encode verdict: {error}"),
    ("probe.client_failed", "Failed to build HTTP client: {error}"),
    ("probe.request_failed", "Request to {url} failed: {error}"),
    ("probe.status", "GET {path} -> {status}"),
    ("output.stream.stdout", "stdout"),
    ("output.stream.stderr", "stderr"),
    ("output.stream.unknown", "output"),
    ("output.write_failed", "Failed to write to {stream}: {error}"),
];

/// Lazily built catalog map.
static CATALOG_MAP: OnceLock<HashMap<&'static str, &'static str>> = OnceLock::new();

/// Returns the catalog map.
fn catalog() -> &'static HashMap<&'static str, &'static str> {
    CATALOG_MAP.get_or_init(|| CATALOG.iter().copied().collect())
}

// ============================================================================
// SECTION: Translation
// ============================================================================

/// Renders `key` while substituting `args`.
#[must_use]
pub fn translate(key: &str, args: Vec<MessageArg>) -> String {
    let template = catalog().get(key).copied().unwrap_or(key);
    if args.is_empty() {
        return template.to_string();
    }

    let mut result = template.to_string();
    for arg in args {
        let placeholder = format!("{{{}}}", arg.key);
        result = result.replace(&placeholder, &arg.value);
    }
    result
}

// ============================================================================
// SECTION: Macro
// ============================================================================

/// Formats a catalog message from a key and named arguments.
///
/// # Arguments
///
/// - `$key` must match a catalog entry.
/// - Named arguments are substituted into `{placeholder}` positions.
#[macro_export]
macro_rules! t {
    ($key:literal $(, $name:ident = $value:expr )* $(,)?) => {{
        let args = ::std::vec![
            $(
                $crate::i18n::MessageArg::new(stringify!($name), $value.to_string()),
            )*
        ];
        $crate::i18n::translate($key, args)
    }};
}
