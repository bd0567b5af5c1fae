// crates/phase-readiness-api/tests/common/mod.rs
// =============================================================================
// Module: API Test Helpers
// Description: Loopback server fixtures and a raw HTTP client.
// Purpose: Reduce duplication across integration tests for phase-readiness-api.
// =============================================================================

#![allow(
    dead_code,
    clippy::unwrap_used,
    reason = "Test helpers are selectively used across suites."
)]

use std::io::Read;
use std::io::Write;
use std::net::SocketAddr;
use std::net::TcpStream;
use std::sync::Mutex;
use std::time::Duration;

use phase_readiness_api::ApiMetrics;
use phase_readiness_api::AuditSink;
use phase_readiness_api::audit::ApiRequestAuditEvent;
use phase_readiness_api::audit::GateTransitionAuditEvent;
use phase_readiness_api::audit::LifecycleAuditEvent;
use phase_readiness_api::telemetry::ApiMetricEvent;
use phase_readiness_config::ServerConfig;
use serde_json::Value;

/// Result type for tests that report failures as strings.
pub type TestResult = Result<(), String>;

/// Returns a loopback config on an ephemeral port with a fast accept poll.
pub fn loopback_config() -> ServerConfig {
    ServerConfig {
        bind_address: "127.0.0.1".to_string(),
        port: 0,
        accept_poll_ms: 10,
        socket_timeout_ms: 2_000,
        ..ServerConfig::default()
    }
}

/// Parsed raw HTTP response.
#[derive(Debug)]
pub struct RawResponse {
    /// Status code from the status line.
    pub status: u16,
    /// Header lines as `(name, value)` pairs.
    pub headers: Vec<(String, String)>,
    /// Body text.
    pub body: String,
}

impl RawResponse {
    /// Returns the first header value matching `name`, case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    /// Parses the body as JSON.
    pub fn json(&self) -> Result<Value, String> {
        serde_json::from_str(&self.body).map_err(|err| err.to_string())
    }
}

/// Sends raw request bytes and reads the response until the server closes.
pub fn send_raw(addr: SocketAddr, request: &[u8]) -> Result<RawResponse, String> {
    let mut stream = TcpStream::connect(addr).map_err(|err| err.to_string())?;
    stream.set_read_timeout(Some(Duration::from_secs(5))).map_err(|err| err.to_string())?;
    stream.write_all(request).map_err(|err| err.to_string())?;
    let mut raw = String::new();
    stream.read_to_string(&mut raw).map_err(|err| err.to_string())?;
    parse_response(&raw)
}

/// Issues `METHOD path HTTP/1.1` with a host header.
pub fn request(addr: SocketAddr, method: &str, path: &str) -> Result<RawResponse, String> {
    let head = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\n\r\n");
    send_raw(addr, head.as_bytes())
}

/// Issues a GET request.
pub fn get(addr: SocketAddr, path: &str) -> Result<RawResponse, String> {
    request(addr, "GET", path)
}

/// Splits a raw response into status, headers, and body.
fn parse_response(raw: &str) -> Result<RawResponse, String> {
    let (head, body) =
        raw.split_once("\r\n\r\n").ok_or_else(|| format!("missing header terminator: {raw}"))?;
    let mut lines = head.split("\r\n");
    let status_line = lines.next().ok_or("missing status line")?;
    let status = status_line
        .split_whitespace()
        .nth(1)
        .and_then(|code| code.parse().ok())
        .ok_or_else(|| format!("bad status line: {status_line}"))?;
    let headers = lines
        .filter_map(|line| line.split_once(": "))
        .map(|(key, value)| (key.to_string(), value.to_string()))
        .collect();
    Ok(RawResponse {
        status,
        headers,
        body: body.to_string(),
    })
}

/// Audit sink that keeps every record in memory.
#[derive(Default)]
pub struct RecordingAuditSink {
    /// Request records.
    pub requests: Mutex<Vec<ApiRequestAuditEvent>>,
    /// Lifecycle records.
    pub lifecycle: Mutex<Vec<LifecycleAuditEvent>>,
    /// Gate transition records.
    pub transitions: Mutex<Vec<GateTransitionAuditEvent>>,
}

impl AuditSink for RecordingAuditSink {
    fn record_request(&self, event: &ApiRequestAuditEvent) {
        self.requests.lock().unwrap().push(event.clone());
    }

    fn record_lifecycle(&self, event: &LifecycleAuditEvent) {
        self.lifecycle.lock().unwrap().push(event.clone());
    }

    fn record_gate_transition(&self, event: &GateTransitionAuditEvent) {
        self.transitions.lock().unwrap().push(event.clone());
    }
}

/// Metrics sink that keeps every request event in memory.
#[derive(Default)]
pub struct RecordingMetrics {
    /// Request counter events.
    pub requests: Mutex<Vec<ApiMetricEvent>>,
    /// Latency observation count.
    pub latencies: Mutex<usize>,
}

impl ApiMetrics for RecordingMetrics {
    fn record_request(&self, event: ApiMetricEvent) {
        self.requests.lock().unwrap().push(event);
    }

    fn record_latency(&self, _event: ApiMetricEvent, _latency: Duration) {
        *self.latencies.lock().unwrap() += 1;
    }
}
