// crates/phase-readiness-core/src/core/mod.rs
// ============================================================================
// Module: Phase Readiness Core Types
// Description: Value types shared by the engine, store, and API layers.
// Purpose: Group sample, verdict, and engine policy definitions.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! Core types are plain values: samples are immutable inputs, verdicts are
//! immutable outputs, and [`EngineConfig`] is immutable policy.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod sample;
pub mod verdict;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::EngineConfig;
pub use config::GlitchGuardMode;
pub use config::StaleGapPolicy;
pub use sample::Sample;
pub use verdict::Gate;
pub use verdict::ReasonFlag;
pub use verdict::ReasonFlags;
pub use verdict::Verdict;
