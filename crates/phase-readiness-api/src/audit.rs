// crates/phase-readiness-api/src/audit.rs
// ============================================================================
// Module: Phase Readiness Audit Logging
// Description: Structured audit events for requests, lifecycle, and gates.
// Purpose: Emit JSON-lines audit records without hard dependencies.
// Dependencies: phase-readiness-core, phase-readiness-config, serde
// ============================================================================

//! ## Overview
//! This module defines audit event payloads and sinks. Events are written as
//! one JSON object per line so deployments can route them to their preferred
//! logging pipeline. Sinks never fail the caller: a write error drops the
//! record.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::OpenOptions;
use std::io;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use phase_readiness_config::AuditConfig;
use phase_readiness_core::Gate;
use phase_readiness_core::ReasonFlags;
use serde::Serialize;

use crate::telemetry::ApiOutcome;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Per-connection request audit event.
#[derive(Debug, Clone, Serialize)]
pub struct ApiRequestAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Peer address when available.
    pub peer: Option<String>,
    /// Request method when the request line parsed.
    pub method: Option<String>,
    /// Request path when the request line parsed.
    pub path: Option<String>,
    /// Stable route label.
    pub route: &'static str,
    /// Response status code.
    pub status: u16,
    /// Outcome classification.
    pub outcome: ApiOutcome,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Handling latency in microseconds.
    pub latency_us: u128,
}

/// Inputs required to construct a request audit event.
pub struct ApiRequestAuditEventParams {
    /// Peer address when available.
    pub peer: Option<String>,
    /// Request method when the request line parsed.
    pub method: Option<String>,
    /// Request path when the request line parsed.
    pub path: Option<String>,
    /// Stable route label.
    pub route: &'static str,
    /// Response status code.
    pub status: u16,
    /// Response body size in bytes.
    pub response_bytes: usize,
    /// Handling latency in microseconds.
    pub latency_us: u128,
}

impl ApiRequestAuditEvent {
    /// Creates a new request audit event with a consistent timestamp.
    #[must_use]
    pub fn new(params: ApiRequestAuditEventParams) -> Self {
        Self {
            event: "api_request",
            timestamp_ms: now_ms(),
            peer: params.peer,
            method: params.method,
            path: params.path,
            route: params.route,
            status: params.status,
            outcome: ApiOutcome::from_status(params.status),
            response_bytes: params.response_bytes,
            latency_us: params.latency_us,
        }
    }
}

/// Dispatcher lifecycle transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleAction {
    /// Listener bound and accept thread running.
    Started,
    /// Accept thread joined and listener released.
    Stopped,
    /// Accepting a connection failed; the loop keeps running.
    AcceptFailed,
}

/// Dispatcher lifecycle audit event.
#[derive(Debug, Clone, Serialize)]
pub struct LifecycleAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Lifecycle transition.
    pub action: LifecycleAction,
    /// Bound listener address.
    pub bind_address: String,
    /// Failure detail for `accept_failed`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

impl LifecycleAuditEvent {
    /// Creates a new lifecycle audit event.
    #[must_use]
    pub fn new(action: LifecycleAction, bind_address: String, detail: Option<String>) -> Self {
        Self {
            event: "api_lifecycle",
            timestamp_ms: now_ms(),
            action,
            bind_address,
            detail,
        }
    }
}

/// Gate change observed by the producer.
#[derive(Debug, Clone, Serialize)]
pub struct GateTransitionAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Sample timestamp that produced the new gate.
    pub t_s: f64,
    /// Previous gate, absent for the first verdict.
    pub from: Option<Gate>,
    /// New gate.
    pub to: Gate,
    /// Readiness score of the new verdict.
    pub readiness: f64,
    /// Reason flags of the new verdict.
    pub flags: ReasonFlags,
}

impl GateTransitionAuditEvent {
    /// Creates a new gate transition audit event.
    #[must_use]
    pub fn new(t_s: f64, from: Option<Gate>, to: Gate, readiness: f64, flags: ReasonFlags) -> Self {
        Self {
            event: "gate_transition",
            timestamp_ms: now_ms(),
            t_s,
            from,
            to,
            readiness,
            flags,
        }
    }
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Audit sink for dispatcher and producer events.
pub trait AuditSink: Send + Sync {
    /// Record a request audit event.
    fn record_request(&self, event: &ApiRequestAuditEvent);

    /// Record a lifecycle audit event.
    fn record_lifecycle(&self, _event: &LifecycleAuditEvent) {}

    /// Record a gate transition audit event.
    fn record_gate_transition(&self, _event: &GateTransitionAuditEvent) {}
}

/// Audit sink that logs JSON lines to stderr.
pub struct StderrAuditSink;

impl AuditSink for StderrAuditSink {
    fn record_request(&self, event: &ApiRequestAuditEvent) {
        write_json_line(&mut io::stderr().lock(), event);
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        write_json_line(&mut io::stderr().lock(), event);
    }

    fn record_gate_transition(&self, event: &GateTransitionAuditEvent) {
        write_json_line(&mut io::stderr().lock(), event);
    }
}

/// Audit sink that logs JSON lines to a file.
pub struct FileAuditSink {
    /// File handle used for append-only logging.
    file: Mutex<std::fs::File>,
}

impl FileAuditSink {
    /// Opens the audit log file in append mode.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be opened.
    pub fn new(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }

    /// Appends one event under the file lock.
    fn append<T: Serialize>(&self, event: &T) {
        if let Ok(mut file) = self.file.lock() {
            write_json_line(&mut *file, event);
        }
    }
}

impl AuditSink for FileAuditSink {
    fn record_request(&self, event: &ApiRequestAuditEvent) {
        self.append(event);
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        self.append(event);
    }

    fn record_gate_transition(&self, event: &GateTransitionAuditEvent) {
        self.append(event);
    }
}

/// No-op audit sink.
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record_request(&self, _event: &ApiRequestAuditEvent) {}
}

/// Builds the sink selected by the audit configuration.
///
/// # Errors
///
/// Returns an error when the configured audit file cannot be opened.
pub fn audit_sink_from_config(config: &AuditConfig) -> io::Result<Arc<dyn AuditSink>> {
    if !config.enabled {
        return Ok(Arc::new(NoopAuditSink));
    }
    match &config.path {
        Some(path) => Ok(Arc::new(FileAuditSink::new(Path::new(path.trim()))?)),
        None => Ok(Arc::new(StderrAuditSink)),
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Writes one JSON line, dropping the record on any failure.
fn write_json_line<W: Write, T: Serialize>(writer: &mut W, event: &T) {
    if let Ok(payload) = serde_json::to_string(event) {
        let _ = writeln!(writer, "{payload}");
        let _ = writer.flush();
    }
}

/// Returns the current unix time in milliseconds.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
