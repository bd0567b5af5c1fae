// crates/phase-readiness-api/src/routes.rs
// ============================================================================
// Module: API Routes
// Description: Endpoint table and JSON payload rendering.
// Purpose: Map read-only paths to snapshot store views.
// Dependencies: phase-readiness-core, serde
// ============================================================================

//! ## Overview
//! Each [`ApiRoute`] renders one view of the [`SnapshotStore`]. Optional
//! readings render as `null`, meaning unavailable rather than zero. Field
//! names are part of the wire contract and must not change.

// ============================================================================
// SECTION: Imports
// ============================================================================

use phase_readiness_core::Gate;
use phase_readiness_core::ReasonFlag;
use phase_readiness_core::ReasonFlags;
use phase_readiness_core::Snapshot;
use phase_readiness_core::SnapshotStore;
use phase_readiness_core::StoreError;
use serde::Serialize;
use serde::Serializer;
use thiserror::Error;

use crate::http::HttpResponse;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum history entries returned by `/api/history`.
pub const HISTORY_RESPONSE_LIMIT: usize = 100;
/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "Phase Readiness Gate";

// ============================================================================
// SECTION: Route Table
// ============================================================================

/// Read-only endpoints served by the dispatcher.
///
/// # Invariants
/// - Paths are matched exactly; there is no prefix or query handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ApiRoute {
    /// Liveness and service identity.
    Health,
    /// Current readiness and gate.
    Readiness,
    /// Current thermal readings and derivatives.
    Thermal,
    /// Recent snapshot history.
    History,
    /// Hysteresis and coherence context.
    PhaseContext,
    /// Decoded reason flags.
    Diagnostics,
}

impl ApiRoute {
    /// Every route in table order.
    pub const ALL: [Self; 6] = [
        Self::Health,
        Self::Readiness,
        Self::Thermal,
        Self::History,
        Self::PhaseContext,
        Self::Diagnostics,
    ];

    /// Resolves a request path to a route.
    #[must_use]
    pub fn from_path(path: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|route| route.path() == path)
    }

    /// Returns the request path served by the route.
    #[must_use]
    pub const fn path(self) -> &'static str {
        match self {
            Self::Health => "/health",
            Self::Readiness => "/api/readiness",
            Self::Thermal => "/api/thermal",
            Self::History => "/api/history",
            Self::PhaseContext => "/api/phase_context",
            Self::Diagnostics => "/api/diagnostics",
        }
    }

    /// Returns the stable telemetry label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Health => "health",
            Self::Readiness => "readiness",
            Self::Thermal => "thermal",
            Self::History => "history",
            Self::PhaseContext => "phase_context",
            Self::Diagnostics => "diagnostics",
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Failures while rendering a route.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Snapshot store could not be read.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// Payload could not be encoded.
    #[error("response encoding failed: {0}")]
    Encode(#[from] serde_json::Error),
}

// ============================================================================
// SECTION: Rendering
// ============================================================================

/// Renders a route against the current store contents.
///
/// # Errors
///
/// Returns [`RenderError`] when the store is poisoned or encoding fails.
pub fn render(route: ApiRoute, store: &SnapshotStore) -> Result<HttpResponse, RenderError> {
    let response = match route {
        ApiRoute::Health => HttpResponse::json(&HealthBody {
            status: "ok",
            service: SERVICE_NAME,
            version: env!("CARGO_PKG_VERSION"),
        })?,
        ApiRoute::Readiness => HttpResponse::json(&ReadinessBody::from(&store.current()?))?,
        ApiRoute::Thermal => HttpResponse::json(&ThermalBody::from(&store.current()?))?,
        ApiRoute::History => {
            let samples: Vec<HistoryEntry> =
                store.history(HISTORY_RESPONSE_LIMIT)?.iter().map(HistoryEntry::from).collect();
            HttpResponse::json(&HistoryBody {
                count: samples.len(),
                samples,
            })?
        }
        ApiRoute::PhaseContext => HttpResponse::json(&PhaseContextBody::from(&store.current()?))?,
        ApiRoute::Diagnostics => HttpResponse::json(&DiagnosticsBody::from(&store.current()?))?,
    };
    Ok(response)
}

// ============================================================================
// SECTION: Payloads
// ============================================================================

/// `/health` payload.
#[derive(Debug, Serialize)]
struct HealthBody {
    /// Liveness marker.
    status: &'static str,
    /// Service identity.
    service: &'static str,
    /// Crate version.
    version: &'static str,
}

/// `/api/readiness` payload.
#[derive(Debug, Serialize)]
struct ReadinessBody {
    /// Readiness score.
    readiness: f64,
    /// Gate label.
    gate: Gate,
    /// Sample timestamp.
    timestamp_s: f64,
    /// Raw reason flag mask.
    flags: u32,
    /// Stability score.
    stability_score: f64,
    /// Capture time in unix milliseconds.
    captured_at_ms: u64,
}

impl From<&Snapshot> for ReadinessBody {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            readiness: snapshot.verdict.readiness,
            gate: snapshot.verdict.gate,
            timestamp_s: snapshot.t_s,
            flags: snapshot.verdict.flags.bits(),
            stability_score: snapshot.verdict.stability_score,
            captured_at_ms: snapshot.captured_at_ms,
        }
    }
}

/// `/api/thermal` payload.
#[derive(Debug, Serialize)]
struct ThermalBody {
    /// Primary temperature.
    #[serde(rename = "temperature_C")]
    temperature_c: Option<f64>,
    /// Ambient temperature.
    #[serde(rename = "ambient_C")]
    ambient_c: Option<f64>,
    /// Instantaneous derivative.
    #[serde(rename = "gradient_C_per_s")]
    gradient_c_per_s: f64,
    /// Smoothed derivative.
    #[serde(rename = "trend_C")]
    trend_c: f64,
    /// Sample timestamp.
    timestamp_s: f64,
}

impl From<&Snapshot> for ThermalBody {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            temperature_c: snapshot.temp_c,
            ambient_c: snapshot.ambient_c,
            gradient_c_per_s: snapshot.verdict.dtdt_c_per_s,
            trend_c: snapshot.verdict.trend_c_per_s,
            timestamp_s: snapshot.t_s,
        }
    }
}

/// `/api/history` payload.
#[derive(Debug, Serialize)]
struct HistoryBody {
    /// Number of returned entries.
    count: usize,
    /// Entries, oldest first.
    samples: Vec<HistoryEntry>,
}

/// One `/api/history` entry.
#[derive(Debug, Serialize)]
struct HistoryEntry {
    /// Sample timestamp.
    timestamp_s: f64,
    /// Readiness score.
    readiness: f64,
    /// Gate label.
    gate: Gate,
    /// Primary temperature.
    #[serde(rename = "temperature_C")]
    temperature_c: Option<f64>,
    /// Instantaneous derivative.
    #[serde(rename = "gradient_C_per_s")]
    gradient_c_per_s: f64,
}

impl From<&Snapshot> for HistoryEntry {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            timestamp_s: snapshot.t_s,
            readiness: snapshot.verdict.readiness,
            gate: snapshot.verdict.gate,
            temperature_c: snapshot.temp_c,
            gradient_c_per_s: snapshot.verdict.dtdt_c_per_s,
        }
    }
}

/// `/api/phase_context` payload.
#[derive(Debug, Serialize)]
struct PhaseContextBody {
    /// Hysteresis index.
    hysteresis_index: Option<f64>,
    /// Coherence index.
    coherence_index: Option<f64>,
    /// Smoothed derivative.
    #[serde(rename = "trend_C")]
    trend_c: f64,
    /// Gate label.
    gate: Gate,
    /// Sample timestamp.
    timestamp_s: f64,
}

impl From<&Snapshot> for PhaseContextBody {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            hysteresis_index: snapshot.hysteresis_index,
            coherence_index: snapshot.coherence_index,
            trend_c: snapshot.verdict.trend_c_per_s,
            gate: snapshot.verdict.gate,
            timestamp_s: snapshot.t_s,
        }
    }
}

/// `/api/diagnostics` payload.
#[derive(Debug, Serialize)]
struct DiagnosticsBody {
    /// Raw reason flag mask.
    flags: u32,
    /// Every flag label mapped to its state.
    flag_meanings: FlagMeanings,
    /// Readiness score.
    readiness: f64,
    /// Gate label.
    gate: Gate,
    /// Stability score.
    stability_score: f64,
    /// Sample timestamp.
    timestamp_s: f64,
    /// Capture time in unix milliseconds.
    captured_at_ms: u64,
}

impl From<&Snapshot> for DiagnosticsBody {
    fn from(snapshot: &Snapshot) -> Self {
        Self {
            flags: snapshot.verdict.flags.bits(),
            flag_meanings: FlagMeanings(snapshot.verdict.flags),
            readiness: snapshot.verdict.readiness,
            gate: snapshot.verdict.gate,
            stability_score: snapshot.verdict.stability_score,
            timestamp_s: snapshot.t_s,
            captured_at_ms: snapshot.captured_at_ms,
        }
    }
}

/// Serializes every known flag as `label: bool`, in bit order.
#[derive(Debug)]
struct FlagMeanings(ReasonFlags);

impl Serialize for FlagMeanings {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let flags = self.0;
        serializer.collect_map(ReasonFlag::ALL.map(|flag| (flag.as_str(), flags.contains(flag))))
    }
}
