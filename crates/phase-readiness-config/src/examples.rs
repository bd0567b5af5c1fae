// crates/phase-readiness-config/src/examples.rs
// ============================================================================
// Module: Config Examples
// Description: Canonical example configuration payloads.
// Purpose: Deterministic examples for docs and tooling.
// Dependencies: std
// ============================================================================

//! ## Overview
//! Canonical example for Phase Readiness configuration. The output is
//! deterministic and spells out every default so operators can see the full
//! policy surface in one place.

/// Returns a canonical example `phase-readiness.toml` configuration.
#[must_use]
pub fn config_toml_example() -> String {
    String::from(
        r#"[engine]
temp_min_c = -20.0
temp_max_c = 60.0
max_abs_dtdt_c_per_s = 0.25
max_abs_temp_jump_c = 5.0
ewma_alpha = 0.2
persistence_s = 3.0
hysteresis_block_threshold = 0.85
coherence_allow_threshold = 0.35
max_dt_s = 1.0
# "long_intervals" checks jumps only when dt >= max_dt_s / 2; "always" checks every sample.
glitch_guard = "long_intervals"
# "reseed" adopts the sample after an oversized gap; "hold" stays stale until reset.
stale_gap = "reseed"

[server]
bind_address = "127.0.0.1"
port = 8080
listen_backlog = 10
socket_timeout_ms = 5000
accept_poll_ms = 100

[history]
max_entries = 100

[audit]
enabled = true
# path = "phase-readiness-audit.jsonl"
"#,
    )
}
