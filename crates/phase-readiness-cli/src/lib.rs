// crates/phase-readiness-cli/src/lib.rs
// ============================================================================
// Module: Phase Readiness CLI Library
// Description: Shared helpers for the phase-readiness binary.
// Purpose: Expose the message catalog, sample feed, and producer loop.
// Dependencies: phase-readiness-core, phase-readiness-api, serde
// ============================================================================

//! ## Overview
//! Library half of the `phase-readiness` binary. The message catalog keeps
//! user-facing strings in one place, [`feed`] turns JSON lines into samples,
//! and [`producer`] drives the engine and publishes verdicts to the store.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod feed;
pub mod i18n;
pub mod producer;
