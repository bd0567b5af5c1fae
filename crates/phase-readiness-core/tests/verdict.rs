// crates/phase-readiness-core/tests/verdict.rs
// ============================================================================
// Module: Verdict Type Tests
// Description: Tests for gate labels, reason flag bits, and sample decoding.
// Purpose: Pin the wire-visible representation of core types.
// Dependencies: phase-readiness-core, serde_json
// ============================================================================
//! ## Overview
//! Flag bit positions and labels are consumed by diagnostics clients, so
//! these tests lock them down explicitly.

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

use phase_readiness_core::Gate;
use phase_readiness_core::ReasonFlag;
use phase_readiness_core::ReasonFlags;
use phase_readiness_core::Sample;
use phase_readiness_core::Verdict;
use serde_json::json;

#[test]
fn gate_labels_are_stable() {
    assert_eq!(Gate::Block.to_string(), "BLOCK");
    assert_eq!(Gate::Caution.to_string(), "CAUTION");
    assert_eq!(Gate::Allow.to_string(), "ALLOW");
    assert_eq!(serde_json::to_value(Gate::Caution).unwrap(), json!("CAUTION"));
}

#[test]
fn reason_flag_bits_are_stable() {
    let bits: Vec<u32> = ReasonFlag::ALL.iter().map(|flag| flag.bit()).collect();
    assert_eq!(bits, vec![1, 2, 4, 8, 16, 32, 64, 128, 1 << 31]);
}

#[test]
fn only_range_gradient_and_hysteresis_are_critical() {
    let critical: Vec<ReasonFlag> =
        ReasonFlag::ALL.into_iter().filter(|flag| flag.is_critical()).collect();
    assert_eq!(
        critical,
        vec![ReasonFlag::TempOutOfRange, ReasonFlag::GradientTooHigh, ReasonFlag::HysteresisHigh]
    );
}

#[test]
fn from_bits_discards_unassigned_bits() {
    let flags = ReasonFlags::from_bits_truncate(0xFFFF_FFFF);
    assert_eq!(flags.bits(), 0x8000_00FF);
    assert_eq!(flags.iter().count(), ReasonFlag::ALL.len());
}

#[test]
fn reason_flags_serialize_as_labels() {
    let flags: ReasonFlags =
        [ReasonFlag::CoherenceLow, ReasonFlag::InputInvalid].into_iter().collect();
    let value = serde_json::to_value(flags).unwrap();
    assert_eq!(value, json!(["input_invalid", "coherence_low"]));

    let decoded: ReasonFlags = serde_json::from_value(value).unwrap();
    assert_eq!(decoded, flags);
}

#[test]
fn fail_safe_verdict_keeps_accumulated_flags() {
    let verdict = Verdict::fail_safe(
        ReasonFlags::NONE.with(ReasonFlag::TempOutOfRange),
        ReasonFlag::InputInvalid,
    );
    assert!(verdict.is_fail_safe());
    assert_eq!(verdict.gate, Gate::Block);
    assert!(verdict.flags.contains(ReasonFlag::TempOutOfRange));
    assert!(verdict.flags.contains(ReasonFlag::InputInvalid));
}

#[test]
fn sample_without_validity_decodes_as_invalid() {
    let sample: Sample = serde_json::from_value(json!({"t_s": 1.5, "temp_c": 24.0})).unwrap();
    assert!(!sample.valid);
    assert_eq!(sample.hysteresis(), None);
    assert_eq!(sample.coherence(), None);
}

#[test]
fn sample_decodes_optional_indices() {
    let sample: Sample = serde_json::from_value(json!({
        "t_s": 2.0,
        "temp_c": 24.0,
        "ambient_c": 21.5,
        "coherence_index": 0.6,
        "valid": true
    }))
    .unwrap();
    assert!(sample.valid);
    assert_eq!(sample.ambient(), Some(21.5));
    assert_eq!(sample.coherence(), Some(0.6));
    assert_eq!(sample.hysteresis(), None);
}
