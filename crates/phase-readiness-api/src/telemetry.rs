// crates/phase-readiness-api/src/telemetry.rs
// ============================================================================
// Module: API Telemetry
// Description: Observability hooks for the read-only dispatcher.
// Purpose: Provide metric events and outcome labels without hard deps.
// Dependencies: crate::routes
// ============================================================================

//! ## Overview
//! This module exposes a thin metrics interface for request counters and
//! latency histograms. Deployments can plug in their own exporter; the
//! default [`NoopMetrics`] discards everything.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use serde::Serialize;

use crate::routes::ApiRoute;

// ============================================================================
// SECTION: Metric Labels
// ============================================================================

/// Request outcome classification.
///
/// # Invariants
/// - Serialized labels (`ok`, `client_error`, `server_error`) are stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiOutcome {
    /// 2xx response.
    Ok,
    /// 4xx response.
    ClientError,
    /// 5xx response.
    ServerError,
}

impl ApiOutcome {
    /// Classifies an HTTP status code.
    #[must_use]
    pub const fn from_status(code: u16) -> Self {
        match code {
            500 ..= 599 => Self::ServerError,
            400 ..= 499 => Self::ClientError,
            _ => Self::Ok,
        }
    }
}

/// Returns the stable route label, `unmatched` for rejected requests.
#[must_use]
pub const fn route_label(route: Option<ApiRoute>) -> &'static str {
    match route {
        Some(route) => route.label(),
        None => "unmatched",
    }
}

/// Request metric event payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ApiMetricEvent {
    /// Matched route, `None` for 400/404/405 responses.
    pub route: Option<ApiRoute>,
    /// Response status code.
    pub status: u16,
    /// Outcome classification.
    pub outcome: ApiOutcome,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Metrics sink for dispatcher requests and latencies.
pub trait ApiMetrics: Send + Sync {
    /// Records a request counter event.
    fn record_request(&self, event: ApiMetricEvent);
    /// Records a latency observation for the request.
    fn record_latency(&self, event: ApiMetricEvent, latency: Duration);
}

/// No-op metrics sink.
///
/// # Invariants
/// - Metrics are intentionally discarded.
pub struct NoopMetrics;

impl ApiMetrics for NoopMetrics {
    fn record_request(&self, _event: ApiMetricEvent) {}

    fn record_latency(&self, _event: ApiMetricEvent, _latency: Duration) {}
}
