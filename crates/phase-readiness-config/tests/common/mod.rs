// crates/phase-readiness-config/tests/common/mod.rs
// =============================================================================
// Module: Config Test Helpers
// Description: Shared helpers for config validation tests.
// Purpose: Reduce duplication across integration tests for phase-readiness-config.
// =============================================================================

#![allow(dead_code, reason = "Test helpers are selectively used across suites.")]

use phase_readiness_config::ConfigError;
use phase_readiness_config::PhaseReadinessConfig;

/// Result type for tests that report failures as strings.
pub type TestResult = Result<(), String>;

/// Parses a TOML string into a `PhaseReadinessConfig` without validating it.
pub fn config_from_toml(toml_str: &str) -> Result<PhaseReadinessConfig, toml::de::Error> {
    toml::from_str(toml_str)
}

/// Returns a minimal config with all defaults applied.
pub fn minimal_config() -> Result<PhaseReadinessConfig, String> {
    config_from_toml("").map_err(|err| err.to_string())
}

/// Asserts that a validation result is an error containing `needle`.
pub fn assert_invalid<T>(result: Result<T, ConfigError>, needle: &str) -> TestResult {
    match result {
        Err(error) => {
            let message = error.to_string();
            if message.contains(needle) {
                Ok(())
            } else {
                Err(format!("error {message} did not contain {needle}"))
            }
        }
        Ok(_) => Err("expected invalid config".to_string()),
    }
}
