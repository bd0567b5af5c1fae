// crates/phase-readiness-api/src/lib.rs
// ============================================================================
// Module: Phase Readiness API Library
// Description: Read-only HTTP observability surface for the snapshot store.
// Purpose: Expose current state, history, and diagnostics without control paths.
// Dependencies: phase-readiness-core, phase-readiness-config, serde_json, socket2
// ============================================================================

//! ## Overview
//! The dispatcher serves a fixed set of GET endpoints from a dedicated accept
//! thread. It only reads the [`phase_readiness_core::SnapshotStore`]; nothing
//! reachable over the network can mutate engine or store state. Requests are
//! audited as JSON lines and counted through the [`telemetry::ApiMetrics`]
//! hook.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod http;
pub mod routes;
pub mod server;
pub mod telemetry;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::AuditSink;
pub use audit::FileAuditSink;
pub use audit::NoopAuditSink;
pub use audit::StderrAuditSink;
pub use audit::audit_sink_from_config;
pub use routes::ApiRoute;
pub use server::ApiServer;
pub use server::ServerError;
pub use telemetry::ApiMetrics;
pub use telemetry::NoopMetrics;
