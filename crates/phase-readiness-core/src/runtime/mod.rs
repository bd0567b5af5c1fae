// crates/phase-readiness-core/src/runtime/mod.rs
// ============================================================================
// Module: Phase Readiness Runtime
// Description: Decision engine and shared snapshot store.
// Purpose: Wire stateful evaluation and cross-thread observation.
// Dependencies: crate::core
// ============================================================================

//! ## Overview
//! The runtime holds the two stateful pieces: the single-writer
//! [`ReadinessEngine`] and the lock-guarded [`SnapshotStore`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod engine;
pub mod store;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use engine::ALLOW_THRESHOLD;
pub use engine::CAUTION_THRESHOLD;
pub use engine::EngineMemory;
pub use engine::ReadinessEngine;
pub use engine::gate_from_readiness;
pub use store::DEFAULT_MAX_HISTORY;
pub use store::Snapshot;
pub use store::SnapshotStore;
pub use store::StoreError;
