// crates/phase-readiness-core/src/core/sample.rs
// ============================================================================
// Module: Phase Readiness Samples
// Description: Timestamped physical-state inputs for the decision engine.
// Purpose: Provide an inspectable, loggable input snapshot.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Sample`] is one telemetry snapshot supplied by an external source. The
//! engine never validates or interprets the physical model behind it; it only
//! checks that the values are usable.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Sample
// ============================================================================

/// Telemetry input evaluated by the decision engine.
///
/// # Invariants
/// - `t_s` is a monotonic timestamp in seconds supplied by the producer.
/// - Optional indicators that are absent or non-finite never raise flags.
/// - `valid` defaults to `false` when omitted so missing quality data fails closed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// Monotonic timestamp in seconds.
    pub t_s: f64,
    /// Primary temperature (or thermal proxy) in degrees Celsius.
    pub temp_c: f64,
    /// Optional ambient reference temperature in degrees Celsius.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ambient_c: Option<f64>,
    /// Optional hysteresis index in `[0, 1]` (higher means more hysteresis).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hysteresis_index: Option<f64>,
    /// Optional coherence index in `[0, 1]` (higher means more coherent).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub coherence_index: Option<f64>,
    /// Upstream telemetry validity flag.
    #[serde(default)]
    pub valid: bool,
}

impl Sample {
    /// Creates a valid sample with no optional indicators.
    #[must_use]
    pub const fn new(t_s: f64, temp_c: f64) -> Self {
        Self {
            t_s,
            temp_c,
            ambient_c: None,
            hysteresis_index: None,
            coherence_index: None,
            valid: true,
        }
    }

    /// Creates a sample flagged invalid by the upstream source.
    #[must_use]
    pub const fn invalid(t_s: f64, temp_c: f64) -> Self {
        Self {
            valid: false,
            ..Self::new(t_s, temp_c)
        }
    }

    /// Returns the sample with an ambient temperature attached.
    #[must_use]
    pub const fn with_ambient(mut self, ambient_c: f64) -> Self {
        self.ambient_c = Some(ambient_c);
        self
    }

    /// Returns the sample with a hysteresis index attached.
    #[must_use]
    pub const fn with_hysteresis(mut self, index: f64) -> Self {
        self.hysteresis_index = Some(index);
        self
    }

    /// Returns the sample with a coherence index attached.
    #[must_use]
    pub const fn with_coherence(mut self, index: f64) -> Self {
        self.coherence_index = Some(index);
        self
    }

    /// Returns the ambient temperature when present and finite.
    #[must_use]
    pub fn ambient(&self) -> Option<f64> {
        finite(self.ambient_c)
    }

    /// Returns the hysteresis index when present and finite.
    #[must_use]
    pub fn hysteresis(&self) -> Option<f64> {
        finite(self.hysteresis_index)
    }

    /// Returns the coherence index when present and finite.
    #[must_use]
    pub fn coherence(&self) -> Option<f64> {
        finite(self.coherence_index)
    }
}

/// Drops non-finite optional readings.
fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|value| value.is_finite())
}
