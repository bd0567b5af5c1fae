//! Decision engine property-based tests.
//!
//! ## Purpose
//! These tests drive the engine with randomized sample streams to prove the
//! verdict contract holds for arbitrary input, including non-finite values.
//!
//! ## What is covered
//! - Readiness and stability stay within `[0, 1]`.
//! - Critical flags and fail-safe verdicts always block.
//! - Evaluation is deterministic for identical memory and input.
//! - Non-monotonic timestamps never advance engine memory.
// crates/phase-readiness-core/tests/proptest_engine.rs
// ============================================================================
// Module: Decision Engine Property-Based Tests
// Description: Randomized checks for verdict invariants.
// Purpose: Ensure the engine fails closed and stays bounded for any input.
// ============================================================================

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
    clippy::float_cmp,
    reason = "Test-only assertions and helpers are permitted."
)]

use phase_readiness_core::EngineConfig;
use phase_readiness_core::Gate;
use phase_readiness_core::ReadinessEngine;
use phase_readiness_core::Sample;
use proptest::prelude::*;

fn reading() -> impl Strategy<Value = f64> {
    prop_oneof![
        8 => -100.0 .. 150.0f64,
        1 => Just(f64::NAN),
        1 => Just(f64::INFINITY),
    ]
}

fn index() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        2 => Just(None),
        6 => (0.0 .. 1.0f64).prop_map(Some),
        1 => Just(Some(f64::NAN)),
    ]
}

fn sample_stream() -> impl Strategy<Value = Vec<Sample>> {
    prop::collection::vec((0.0 .. 2.0f64, reading(), index(), index(), any::<bool>()), 1 .. 40)
        .prop_map(|steps| {
            let mut t_s = 0.0;
            steps
                .into_iter()
                .map(|(dt, temp_c, hysteresis_index, coherence_index, valid)| {
                    t_s += dt;
                    Sample {
                        t_s,
                        temp_c,
                        ambient_c: None,
                        hysteresis_index,
                        coherence_index,
                        valid,
                    }
                })
                .collect()
        })
}

proptest! {
    #[test]
    fn verdicts_stay_bounded_and_fail_closed(samples in sample_stream()) {
        let mut engine = ReadinessEngine::new(EngineConfig::default());
        for sample in &samples {
            let verdict = engine.evaluate(sample);
            prop_assert!((0.0 ..= 1.0).contains(&verdict.readiness));
            prop_assert!((0.0 ..= 1.0).contains(&verdict.stability_score));
            if verdict.flags.has_critical() || verdict.is_fail_safe() {
                prop_assert_eq!(verdict.gate, Gate::Block);
                prop_assert_eq!(verdict.readiness, 0.0);
            }
            if !sample.valid {
                prop_assert!(verdict.is_fail_safe());
            }
            prop_assert!(engine.memory().persistence_s() >= 0.0);
        }
    }

    #[test]
    fn evaluation_is_deterministic(samples in sample_stream()) {
        let mut first = ReadinessEngine::new(EngineConfig::default());
        let mut second = ReadinessEngine::new(EngineConfig::default());
        for sample in &samples {
            let left = first.evaluate(sample);
            let right = second.evaluate(sample);
            prop_assert_eq!(left.flags, right.flags);
            prop_assert_eq!(left.gate, right.gate);
            prop_assert_eq!(left.readiness.to_bits(), right.readiness.to_bits());
            prop_assert_eq!(left.trend_c_per_s.to_bits(), right.trend_c_per_s.to_bits());
        }
        prop_assert_eq!(first.memory(), second.memory());
    }

    #[test]
    fn backwards_time_never_advances_memory(start in 1.0 .. 100.0f64, back in 0.0 .. 1.0f64) {
        let mut engine = ReadinessEngine::new(EngineConfig::default());
        engine.evaluate(&Sample::new(start, 25.0));
        let before = *engine.memory();
        let verdict = engine.evaluate(&Sample::new(start - back, 25.0));
        prop_assert!(verdict.is_fail_safe());
        prop_assert_eq!(*engine.memory(), before);
    }
}
