// crates/phase-readiness-cli/src/producer.rs
// ============================================================================
// Module: Sample Producer
// Description: Drives the engine and publishes verdicts to the store.
// Purpose: Own the single-writer side of the snapshot store.
// Dependencies: phase-readiness-core, phase-readiness-api, serde
// ============================================================================

//! ## Overview
//! [`Producer`] owns the [`ReadinessEngine`] and is the only writer of the
//! shared [`SnapshotStore`]. Each step evaluates one sample, publishes the
//! snapshot, and emits a `gate_transition` audit record whenever the gate
//! changes. [`ReplayRecord`] is the per-line output of offline replay.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use phase_readiness_api::AuditSink;
use phase_readiness_api::audit::GateTransitionAuditEvent;
use phase_readiness_core::Gate;
use phase_readiness_core::ReadinessEngine;
use phase_readiness_core::ReasonFlags;
use phase_readiness_core::Sample;
use phase_readiness_core::Snapshot;
use phase_readiness_core::SnapshotStore;
use phase_readiness_core::StoreError;
use phase_readiness_core::Verdict;
use serde::Serialize;

// ============================================================================
// SECTION: Producer
// ============================================================================

/// Single writer feeding the snapshot store.
///
/// # Invariants
/// - Exactly one `evaluate` per published snapshot.
pub struct Producer {
    /// Decision engine owned by the producer.
    engine: ReadinessEngine,
    /// Shared snapshot store.
    store: Arc<SnapshotStore>,
    /// Audit sink for gate transitions.
    audit: Arc<dyn AuditSink>,
    /// Gate of the last published verdict.
    last_gate: Option<Gate>,
    /// Timestamp of the last decoded sample.
    last_t_s: Option<f64>,
}

impl Producer {
    /// Creates a producer for the given engine, store, and audit sink.
    #[must_use]
    pub fn new(engine: ReadinessEngine, store: Arc<SnapshotStore>, audit: Arc<dyn AuditSink>) -> Self {
        Self {
            engine,
            store,
            audit,
            last_gate: None,
            last_t_s: None,
        }
    }

    /// Evaluates one sample and publishes the resulting snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn step(&mut self, sample: &Sample) -> Result<Snapshot, StoreError> {
        if sample.t_s.is_finite() {
            self.last_t_s = Some(sample.t_s);
        }
        let verdict = self.engine.evaluate(sample);
        let snapshot = self.store.update(sample, verdict)?;
        self.note_gate(sample.t_s, &verdict);
        Ok(snapshot)
    }

    /// Publishes a fail-safe verdict for input that could not be decoded.
    ///
    /// The snapshot carries the last known timestamp so consumers keep a
    /// meaningful time axis.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] when the store lock is poisoned.
    pub fn step_rejected(&mut self) -> Result<Snapshot, StoreError> {
        let sample = Sample::invalid(self.last_t_s.unwrap_or(0.0), f64::NAN);
        let verdict = self.engine.evaluate(&sample);
        let snapshot = self.store.update(&sample, verdict)?;
        self.note_gate(sample.t_s, &verdict);
        Ok(snapshot)
    }

    /// Returns the gate of the last published verdict.
    #[must_use]
    pub const fn last_gate(&self) -> Option<Gate> {
        self.last_gate
    }

    /// Emits a transition record when the gate changed.
    fn note_gate(&mut self, t_s: f64, verdict: &Verdict) {
        if self.last_gate == Some(verdict.gate) {
            return;
        }
        self.audit.record_gate_transition(&GateTransitionAuditEvent::new(
            t_s,
            self.last_gate,
            verdict.gate,
            verdict.readiness,
            verdict.flags,
        ));
        self.last_gate = Some(verdict.gate);
    }
}

// ============================================================================
// SECTION: Replay Output
// ============================================================================

/// One line of `replay` output.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReplayRecord {
    /// 1-based input line number.
    pub line: usize,
    /// Sample timestamp, absent when the line could not be decoded.
    pub t_s: Option<f64>,
    /// Readiness score.
    pub readiness: f64,
    /// Gate label.
    pub gate: Gate,
    /// Raw reason flag mask.
    pub flags: u32,
    /// Reason flag labels.
    pub reasons: ReasonFlags,
    /// Instantaneous derivative.
    #[serde(rename = "dtdt_C_per_s")]
    pub dtdt_c_per_s: f64,
    /// Smoothed derivative.
    #[serde(rename = "trend_C_per_s")]
    pub trend_c_per_s: f64,
    /// Stability score.
    pub stability_score: f64,
}

impl ReplayRecord {
    /// Builds a record from a verdict.
    #[must_use]
    pub const fn new(line: usize, t_s: Option<f64>, verdict: &Verdict) -> Self {
        Self {
            line,
            t_s,
            readiness: verdict.readiness,
            gate: verdict.gate,
            flags: verdict.flags.bits(),
            reasons: verdict.flags,
            dtdt_c_per_s: verdict.dtdt_c_per_s,
            trend_c_per_s: verdict.trend_c_per_s,
            stability_score: verdict.stability_score,
        }
    }
}
