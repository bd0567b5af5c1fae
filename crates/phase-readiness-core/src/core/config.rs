// crates/phase-readiness-core/src/core/config.rs
// ============================================================================
// Module: Phase Readiness Engine Policy
// Description: Deployment policy parameters for the decision engine.
// Purpose: Keep every threshold explicit, auditable, and immutable.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`EngineConfig`] holds policy decisions set per deployment, not learned
//! behavior. The engine treats it as immutable for its lifetime; only engine
//! memory is cleared by a reset. Validation lives in `phase-readiness-config`;
//! the engine still clamps the smoothing factor defensively.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Policy Enums
// ============================================================================

/// When the implausible-jump guard applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GlitchGuardMode {
    /// Check every sample interval.
    Always,
    /// Check only intervals of at least half the staleness bound.
    #[default]
    LongIntervals,
}

/// Memory handling when the sample gap exceeds the staleness bound.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StaleGapPolicy {
    /// Adopt the new sample as previous and clear trend state.
    #[default]
    Reseed,
    /// Keep the old previous sample; the engine stays stale until reset.
    Hold,
}

// ============================================================================
// SECTION: Engine Config
// ============================================================================

/// Decision engine policy parameters.
///
/// # Invariants
/// - Thresholds are finite once validated by the config loader.
/// - `ewma_alpha` is clamped into `[0, 1]` by the engine regardless of validation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Lower bound of the operating temperature band.
    pub temp_min_c: f64,
    /// Upper bound of the operating temperature band.
    pub temp_max_c: f64,
    /// Maximum allowed absolute derivative (degrees per second).
    pub max_abs_dtdt_c_per_s: f64,
    /// Maximum plausible temperature change between consecutive samples.
    pub max_abs_temp_jump_c: f64,
    /// Smoothing factor for the trend estimate.
    pub ewma_alpha: f64,
    /// Duration a trend must persist before it raises a flag (seconds).
    pub persistence_s: f64,
    /// Hysteresis index at or above which the gate blocks.
    pub hysteresis_block_threshold: f64,
    /// Coherence index below which readiness is penalized.
    pub coherence_allow_threshold: f64,
    /// Maximum accepted gap between samples (seconds).
    pub max_dt_s: f64,
    /// Applicability of the implausible-jump guard.
    pub glitch_guard: GlitchGuardMode,
    /// Memory handling after an oversized sample gap.
    pub stale_gap: StaleGapPolicy,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            temp_min_c: -20.0,
            temp_max_c: 60.0,
            max_abs_dtdt_c_per_s: 0.25,
            max_abs_temp_jump_c: 5.0,
            ewma_alpha: 0.2,
            persistence_s: 3.0,
            hysteresis_block_threshold: 0.85,
            coherence_allow_threshold: 0.35,
            max_dt_s: 1.0,
            glitch_guard: GlitchGuardMode::LongIntervals,
            stale_gap: StaleGapPolicy::Reseed,
        }
    }
}

impl EngineConfig {
    /// Returns the smoothing factor clamped into `[0, 1]`.
    ///
    /// A NaN factor clamps to zero, which freezes the trend instead of poisoning it.
    #[must_use]
    pub fn clamped_alpha(&self) -> f64 {
        if self.ewma_alpha.is_nan() { 0.0 } else { self.ewma_alpha.clamp(0.0, 1.0) }
    }

    /// Returns the minimum interval at which the glitch guard applies.
    #[must_use]
    pub fn glitch_interval_s(&self) -> f64 {
        match self.glitch_guard {
            GlitchGuardMode::Always => 0.0,
            GlitchGuardMode::LongIntervals => self.max_dt_s * 0.5,
        }
    }

    /// Returns the named floating-point parameters for validation and docs.
    #[must_use]
    pub const fn numeric_fields(&self) -> [(&'static str, f64); 9] {
        [
            ("temp_min_c", self.temp_min_c),
            ("temp_max_c", self.temp_max_c),
            ("max_abs_dtdt_c_per_s", self.max_abs_dtdt_c_per_s),
            ("max_abs_temp_jump_c", self.max_abs_temp_jump_c),
            ("ewma_alpha", self.ewma_alpha),
            ("persistence_s", self.persistence_s),
            ("hysteresis_block_threshold", self.hysteresis_block_threshold),
            ("coherence_allow_threshold", self.coherence_allow_threshold),
            ("max_dt_s", self.max_dt_s),
        ]
    }
}
