// crates/phase-readiness-core/src/core/verdict.rs
// ============================================================================
// Module: Phase Readiness Verdicts
// Description: Gate states, reason flags, and engine verdicts.
// Purpose: Make every eligibility decision explicit and inspectable.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! A [`Verdict`] carries the readiness score, the discrete [`Gate`] consumed by
//! downstream control, and the [`ReasonFlags`] explaining the decision. Reason
//! flags form a closed set so renderers can match on them exhaustively.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Deserialize;
use serde::Serialize;

// ============================================================================
// SECTION: Gate
// ============================================================================

/// Discrete actuation gate.
///
/// # Invariants
/// - Variants and labels are stable; downstream control depends on them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gate {
    /// Energy delivery prohibited.
    Block,
    /// Transitional or marginal state.
    Caution,
    /// Energy delivery permitted.
    Allow,
}

impl Gate {
    /// Returns the stable wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Block => "BLOCK",
            Self::Caution => "CAUTION",
            Self::Allow => "ALLOW",
        }
    }
}

impl fmt::Display for Gate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// SECTION: Reason Flags
// ============================================================================

/// Reason a verdict was degraded or blocked.
///
/// # Invariants
/// - Bit positions are part of the diagnostics wire contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReasonFlag {
    /// Input data quality failure or implausible jump.
    InputInvalid,
    /// No derivative context, time went backwards, or the sample gap is too large.
    StaleOrNonmonotonic,
    /// Temperature outside the operating band.
    TempOutOfRange,
    /// Absolute derivative above the configured limit.
    GradientTooHigh,
    /// Sustained positive trend.
    PersistentHeating,
    /// Sustained negative trend.
    PersistentCooling,
    /// Hysteresis index at or above its block threshold.
    HysteresisHigh,
    /// Coherence index below its allow threshold.
    CoherenceLow,
    /// Fail-safe fallback triggered.
    FailsafeDefault,
}

impl ReasonFlag {
    /// Every flag in bit order.
    pub const ALL: [Self; 9] = [
        Self::InputInvalid,
        Self::StaleOrNonmonotonic,
        Self::TempOutOfRange,
        Self::GradientTooHigh,
        Self::PersistentHeating,
        Self::PersistentCooling,
        Self::HysteresisHigh,
        Self::CoherenceLow,
        Self::FailsafeDefault,
    ];

    /// Returns the bit assigned to this flag.
    #[must_use]
    pub const fn bit(self) -> u32 {
        match self {
            Self::InputInvalid => 1 << 0,
            Self::StaleOrNonmonotonic => 1 << 1,
            Self::TempOutOfRange => 1 << 2,
            Self::GradientTooHigh => 1 << 3,
            Self::PersistentHeating => 1 << 4,
            Self::PersistentCooling => 1 << 5,
            Self::HysteresisHigh => 1 << 6,
            Self::CoherenceLow => 1 << 7,
            Self::FailsafeDefault => 1 << 31,
        }
    }

    /// Returns the stable snake_case label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::InputInvalid => "input_invalid",
            Self::StaleOrNonmonotonic => "stale_or_nonmonotonic",
            Self::TempOutOfRange => "temp_out_of_range",
            Self::GradientTooHigh => "gradient_too_high",
            Self::PersistentHeating => "persistent_heating",
            Self::PersistentCooling => "persistent_cooling",
            Self::HysteresisHigh => "hysteresis_high",
            Self::CoherenceLow => "coherence_low",
            Self::FailsafeDefault => "failsafe_default",
        }
    }

    /// Returns true when the flag forces a `BLOCK` gate after scoring.
    #[must_use]
    pub const fn is_critical(self) -> bool {
        matches!(self, Self::TempOutOfRange | Self::GradientTooHigh | Self::HysteresisHigh)
    }
}

impl fmt::Display for ReasonFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Set of active reason flags.
///
/// # Invariants
/// - Only bits assigned to a [`ReasonFlag`] are ever set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ReasonFlags {
    /// Raw bitmask of active flags.
    bits: u32,
}

impl ReasonFlags {
    /// Empty flag set.
    pub const NONE: Self = Self {
        bits: 0,
    };

    /// Returns an empty flag set.
    #[must_use]
    pub const fn empty() -> Self {
        Self::NONE
    }

    /// Builds a set from raw bits, discarding unassigned bits.
    #[must_use]
    pub fn from_bits_truncate(bits: u32) -> Self {
        let known = ReasonFlag::ALL.iter().fold(0, |mask, flag| mask | flag.bit());
        Self {
            bits: bits & known,
        }
    }

    /// Returns the raw bitmask.
    #[must_use]
    pub const fn bits(self) -> u32 {
        self.bits
    }

    /// Adds a flag to the set.
    pub const fn insert(&mut self, flag: ReasonFlag) {
        self.bits |= flag.bit();
    }

    /// Returns the set with `flag` added.
    #[must_use]
    pub const fn with(mut self, flag: ReasonFlag) -> Self {
        self.insert(flag);
        self
    }

    /// Returns true when `flag` is active.
    #[must_use]
    pub const fn contains(self, flag: ReasonFlag) -> bool {
        self.bits & flag.bit() != 0
    }

    /// Returns true when no flag is active.
    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.bits == 0
    }

    /// Returns true when any critical flag is active.
    #[must_use]
    pub fn has_critical(self) -> bool {
        self.iter().any(ReasonFlag::is_critical)
    }

    /// Iterates over active flags in bit order.
    pub fn iter(self) -> impl Iterator<Item = ReasonFlag> {
        ReasonFlag::ALL.into_iter().filter(move |flag| self.contains(*flag))
    }
}

impl FromIterator<ReasonFlag> for ReasonFlags {
    fn from_iter<I: IntoIterator<Item = ReasonFlag>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

impl Serialize for ReasonFlags {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.iter())
    }
}

impl<'de> Deserialize<'de> for ReasonFlags {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let flags = Vec::<ReasonFlag>::deserialize(deserializer)?;
        Ok(flags.into_iter().collect())
    }
}

// ============================================================================
// SECTION: Verdict
// ============================================================================

/// Deterministic engine output for a single sample.
///
/// # Invariants
/// - `readiness` and `stability_score` are within `[0, 1]`.
/// - Fail-safe verdicts carry [`ReasonFlag::FailsafeDefault`] plus a cause flag.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    /// Normalized eligibility score.
    pub readiness: f64,
    /// Discrete actuation gate.
    pub gate: Gate,
    /// Reasons behind the decision.
    pub flags: ReasonFlags,
    /// Instantaneous temperature derivative (degrees per second).
    pub dtdt_c_per_s: f64,
    /// Smoothed temperature derivative (degrees per second).
    pub trend_c_per_s: f64,
    /// Stability metric; currently equal to `readiness`.
    pub stability_score: f64,
}

impl Verdict {
    /// Returns the fail-safe verdict for the given cause.
    #[must_use]
    pub const fn fail_safe(flags: ReasonFlags, cause: ReasonFlag) -> Self {
        Self {
            readiness: 0.0,
            gate: Gate::Block,
            flags: flags.with(cause).with(ReasonFlag::FailsafeDefault),
            dtdt_c_per_s: 0.0,
            trend_c_per_s: 0.0,
            stability_score: 0.0,
        }
    }

    /// Returns true when the verdict came from the fail-safe path.
    #[must_use]
    pub const fn is_fail_safe(&self) -> bool {
        self.flags.contains(ReasonFlag::FailsafeDefault)
    }
}
