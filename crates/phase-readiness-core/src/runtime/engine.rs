// crates/phase-readiness-core/src/runtime/engine.rs
// ============================================================================
// Module: Phase Readiness Decision Engine
// Description: Deterministic sample-to-verdict evaluation with short memory.
// Purpose: Classify eligibility and explain it, failing closed on bad input.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! [`ReadinessEngine::evaluate`] is total: every sample yields a verdict, and
//! undefined, stale, or implausible input yields the fail-safe `BLOCK`
//! verdict rather than an error. Memory is limited to the previous sample, a
//! smoothed derivative, and a trend persistence timer. Identical config,
//! memory, and sample always produce a bit-identical verdict.
//!
//! The engine is not thread-safe by contract: exactly one producer drives it.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::core::EngineConfig;
use crate::core::Gate;
use crate::core::ReasonFlag;
use crate::core::ReasonFlags;
use crate::core::Sample;
use crate::core::StaleGapPolicy;
use crate::core::Verdict;

// ============================================================================
// SECTION: Scoring Policy
// ============================================================================

/// Readiness at or above which the gate allows actuation.
pub const ALLOW_THRESHOLD: f64 = 0.80;
/// Readiness at or above which the gate reports caution.
pub const CAUTION_THRESHOLD: f64 = 0.40;

/// Readiness penalty applied per active flag.
const fn penalty(flag: ReasonFlag) -> f64 {
    match flag {
        ReasonFlag::HysteresisHigh => 0.70,
        ReasonFlag::TempOutOfRange | ReasonFlag::GradientTooHigh => 0.60,
        ReasonFlag::CoherenceLow => 0.30,
        ReasonFlag::PersistentHeating => 0.20,
        ReasonFlag::PersistentCooling => 0.10,
        ReasonFlag::InputInvalid
        | ReasonFlag::StaleOrNonmonotonic
        | ReasonFlag::FailsafeDefault => 0.0,
    }
}

/// Maps a readiness score to its discrete gate.
#[must_use]
pub fn gate_from_readiness(readiness: f64) -> Gate {
    if readiness >= ALLOW_THRESHOLD {
        Gate::Allow
    } else if readiness >= CAUTION_THRESHOLD {
        Gate::Caution
    } else {
        Gate::Block
    }
}

// ============================================================================
// SECTION: Engine Memory
// ============================================================================

/// Short-horizon memory owned by a single engine.
///
/// # Invariants
/// - `previous` is `None` until the first valid sample.
/// - `persistence_s` is never negative.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct EngineMemory {
    /// Previous accepted sample as `(t_s, temp_c)`.
    previous: Option<(f64, f64)>,
    /// Smoothed derivative estimate.
    trend_c_per_s: f64,
    /// Duration the current trend sign has persisted.
    persistence_s: f64,
}

impl EngineMemory {
    /// Returns the previous accepted sample as `(t_s, temp_c)`.
    #[must_use]
    pub const fn previous(&self) -> Option<(f64, f64)> {
        self.previous
    }

    /// Returns the smoothed derivative estimate.
    #[must_use]
    pub const fn trend_c_per_s(&self) -> f64 {
        self.trend_c_per_s
    }

    /// Returns how long the current trend sign has persisted.
    #[must_use]
    pub const fn persistence_s(&self) -> f64 {
        self.persistence_s
    }

    /// Adopts a sample as the new derivative baseline with no trend history.
    const fn reseed(&mut self, t_s: f64, temp_c: f64) {
        self.previous = Some((t_s, temp_c));
        self.trend_c_per_s = 0.0;
        self.persistence_s = 0.0;
    }
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Deterministic phase readiness engine.
#[derive(Debug, Clone)]
pub struct ReadinessEngine {
    /// Immutable deployment policy.
    config: EngineConfig,
    /// Mutable short-horizon memory.
    memory: EngineMemory,
}

impl ReadinessEngine {
    /// Creates an engine with empty memory.
    #[must_use]
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            memory: EngineMemory::default(),
        }
    }

    /// Returns the engine policy.
    #[must_use]
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Returns a read-only view of the engine memory.
    #[must_use]
    pub const fn memory(&self) -> &EngineMemory {
        &self.memory
    }

    /// Clears memory back to its construction-time state.
    pub fn reset(&mut self) {
        self.memory = EngineMemory::default();
    }

    /// Evaluates one sample into a verdict.
    pub fn evaluate(&mut self, sample: &Sample) -> Verdict {
        let mut flags = ReasonFlags::empty();

        if !sample.valid || !sample.t_s.is_finite() || !sample.temp_c.is_finite() {
            return Verdict::fail_safe(flags, ReasonFlag::InputInvalid);
        }

        let Some((prev_t, prev_temp)) = self.memory.previous else {
            self.memory.previous = Some((sample.t_s, sample.temp_c));
            return Verdict::fail_safe(flags, ReasonFlag::StaleOrNonmonotonic);
        };

        let dt = sample.t_s - prev_t;
        if dt <= 0.0 {
            return Verdict::fail_safe(flags, ReasonFlag::StaleOrNonmonotonic);
        }
        if dt > self.config.max_dt_s {
            if self.config.stale_gap == StaleGapPolicy::Reseed {
                self.memory.reseed(sample.t_s, sample.temp_c);
            }
            return Verdict::fail_safe(flags, ReasonFlag::StaleOrNonmonotonic);
        }

        if sample.temp_c < self.config.temp_min_c || sample.temp_c > self.config.temp_max_c {
            flags.insert(ReasonFlag::TempOutOfRange);
        }

        let delta = sample.temp_c - prev_temp;
        if dt >= self.config.glitch_interval_s() && delta.abs() > self.config.max_abs_temp_jump_c {
            return Verdict::fail_safe(flags, ReasonFlag::InputInvalid);
        }

        let dtdt = delta / dt;
        let alpha = self.config.clamped_alpha();
        let trend = alpha.mul_add(dtdt, (1.0 - alpha) * self.memory.trend_c_per_s);
        if !dtdt.is_finite() || !trend.is_finite() {
            return Verdict::fail_safe(flags, ReasonFlag::InputInvalid);
        }
        let sign_consistent = (trend >= 0.0) == (dtdt >= 0.0);
        self.memory.persistence_s = if sign_consistent { self.memory.persistence_s + dt } else { 0.0 };
        self.memory.trend_c_per_s = trend;
        self.memory.previous = Some((sample.t_s, sample.temp_c));

        if dtdt.abs() > self.config.max_abs_dtdt_c_per_s {
            flags.insert(ReasonFlag::GradientTooHigh);
        }
        if self.memory.persistence_s >= self.config.persistence_s {
            if trend > 0.0 {
                flags.insert(ReasonFlag::PersistentHeating);
            } else if trend < 0.0 {
                flags.insert(ReasonFlag::PersistentCooling);
            }
        }
        if sample.hysteresis().is_some_and(|index| index >= self.config.hysteresis_block_threshold)
        {
            flags.insert(ReasonFlag::HysteresisHigh);
        }
        if sample.coherence().is_some_and(|index| index < self.config.coherence_allow_threshold) {
            flags.insert(ReasonFlag::CoherenceLow);
        }

        let readiness = flags.iter().fold(1.0, |score, flag| score - penalty(flag)).clamp(0.0, 1.0);
        let mut verdict = Verdict {
            readiness,
            gate: gate_from_readiness(readiness),
            flags,
            dtdt_c_per_s: dtdt,
            trend_c_per_s: trend,
            stability_score: readiness,
        };
        if flags.has_critical() {
            verdict.readiness = 0.0;
            verdict.stability_score = 0.0;
            verdict.gate = Gate::Block;
        }
        verdict
    }
}
