// crates/phase-readiness-core/src/lib.rs
// ============================================================================
// Module: Phase Readiness Core Library
// Description: Public API surface for the Phase Readiness core.
// Purpose: Expose sample/verdict types, the decision engine, and the snapshot store.
// Dependencies: crate::{core, runtime}
// ============================================================================

//! ## Overview
//! Phase Readiness core provides a deterministic eligibility gate: each
//! timestamped sample is classified into a readiness score, a discrete gate
//! and an explicit set of reason flags. Undefined or unstable input always
//! resolves to `BLOCK`. The snapshot store is the only cross-thread boundary
//! between the producer driving the engine and any number of readers.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod core;
pub mod runtime;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use core::*;

pub use runtime::EngineMemory;
pub use runtime::ReadinessEngine;
pub use runtime::Snapshot;
pub use runtime::SnapshotStore;
pub use runtime::StoreError;
