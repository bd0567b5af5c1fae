// crates/phase-readiness-config/src/lib.rs
// ============================================================================
// Module: Phase Readiness Config Library
// Description: Canonical config model, validation, and example generation.
// Purpose: Single source of truth for phase-readiness.toml semantics.
// Dependencies: phase-readiness-core, serde, toml
// ============================================================================

//! ## Overview
//! `phase-readiness-config` defines the deployment configuration for the
//! decision engine, the snapshot store, the observability dispatcher, and the
//! audit log. Validation is strict and fails closed: a config that loads is a
//! config every component can run with.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod config;
pub mod examples;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use config::*;
pub use examples::config_toml_example;
