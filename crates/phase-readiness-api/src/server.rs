// crates/phase-readiness-api/src/server.rs
// ============================================================================
// Module: Observability Dispatcher
// Description: Single-threaded accept loop serving read-only JSON endpoints.
// Purpose: Serve store snapshots without interfering with the producer.
// Dependencies: phase-readiness-core, phase-readiness-config, socket2
// ============================================================================

//! ## Overview
//! [`ApiServer`] owns one listener and one accept thread. Connections are
//! served sequentially: read the request line, route, write one response,
//! close. The loop polls a non-blocking listener and checks an atomic
//! shutdown flag every iteration, so [`ApiServer::stop`] returns within one
//! poll interval plus any in-flight client.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Read;
use std::io::Write;
use std::net::Shutdown;
use std::net::SocketAddr;
use std::net::TcpListener;
use std::net::TcpStream;
use std::panic;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::Ordering;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;
use std::time::Instant;

use phase_readiness_config::ServerConfig;
use phase_readiness_core::SnapshotStore;
use socket2::Domain;
use socket2::Protocol;
use socket2::Socket;
use socket2::Type;
use thiserror::Error;

use crate::audit::ApiRequestAuditEvent;
use crate::audit::ApiRequestAuditEventParams;
use crate::audit::AuditSink;
use crate::audit::LifecycleAction;
use crate::audit::LifecycleAuditEvent;
use crate::audit::NoopAuditSink;
use crate::http::HttpResponse;
use crate::http::HttpStatus;
use crate::http::MAX_REQUEST_HEAD_BYTES;
use crate::http::RequestLine;
use crate::http::parse_request_line;
use crate::http::read_request_head;
use crate::routes;
use crate::routes::ApiRoute;
use crate::telemetry::ApiMetricEvent;
use crate::telemetry::ApiMetrics;
use crate::telemetry::ApiOutcome;
use crate::telemetry::NoopMetrics;
use crate::telemetry::route_label;


// ============================================================================
// SECTION: Constants
// ============================================================================

/// Name of the accept thread.
const ACCEPT_THREAD_NAME: &str = "phase-readiness-api";
/// Total time allowed for draining unread request bytes before close.
const DRAIN_TIMEOUT: Duration = Duration::from_millis(50);

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Dispatcher lifecycle errors.
#[derive(Debug, Error)]
pub enum ServerError {
    /// `start` was called while the accept thread is running.
    #[error("api server already running")]
    AlreadyRunning,
    /// Server configuration is unusable.
    #[error("api server config error: {0}")]
    Config(String),
    /// Listener could not be created or bound.
    #[error("api server bind error: {0}")]
    Bind(String),
    /// Accept thread could not be spawned.
    #[error("api server io error: {0}")]
    Io(String),
}

// ============================================================================
// SECTION: Server
// ============================================================================

/// Read-only HTTP observability server.
///
/// # Invariants
/// - At most one accept thread exists per server.
/// - The server never mutates the snapshot store.
pub struct ApiServer {
    /// Shared snapshot store.
    store: Arc<SnapshotStore>,
    /// Static listener configuration.
    config: ServerConfig,
    /// Audit sink for requests and lifecycle events.
    audit: Arc<dyn AuditSink>,
    /// Metrics sink for request counters and latency.
    metrics: Arc<dyn ApiMetrics>,
    /// Cooperative shutdown signal for the accept thread.
    shutdown: Arc<AtomicBool>,
    /// True while the accept thread is running.
    running: Arc<AtomicBool>,
    /// Accept thread handle while started.
    worker: Option<JoinHandle<()>>,
    /// Bound address while started.
    local_addr: Option<SocketAddr>,
}

impl ApiServer {
    /// Creates a stopped server with no-op audit and metrics sinks.
    #[must_use]
    pub fn new(store: Arc<SnapshotStore>, config: ServerConfig) -> Self {
        Self {
            store,
            config,
            audit: Arc::new(NoopAuditSink),
            metrics: Arc::new(NoopMetrics),
            shutdown: Arc::new(AtomicBool::new(false)),
            running: Arc::new(AtomicBool::new(false)),
            worker: None,
            local_addr: None,
        }
    }

    /// Replaces the audit sink.
    #[must_use]
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Replaces the metrics sink.
    #[must_use]
    pub fn with_metrics(mut self, metrics: Arc<dyn ApiMetrics>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Binds the listener and spawns the accept thread.
    ///
    /// # Errors
    ///
    /// Returns [`ServerError::AlreadyRunning`] when started twice, or a bind
    /// or spawn error; the server stays stopped on error.
    pub fn start(&mut self) -> Result<SocketAddr, ServerError> {
        if self.worker.is_some() {
            return Err(ServerError::AlreadyRunning);
        }
        let addr = self.config.socket_addr().map_err(|err| ServerError::Config(err.to_string()))?;
        let listener = bind_listener(addr, self.config.listen_backlog)?;
        let local_addr = listener.local_addr().map_err(|err| ServerError::Bind(err.to_string()))?;

        let context = ConnectionContext {
            store: Arc::clone(&self.store),
            audit: Arc::clone(&self.audit),
            metrics: Arc::clone(&self.metrics),
            socket_timeout: self.config.socket_timeout(),
            local_addr,
        };
        let poll = self.config.accept_poll();
        let shutdown = Arc::clone(&self.shutdown);
        let running = Arc::clone(&self.running);
        self.shutdown.store(false, Ordering::SeqCst);
        self.running.store(true, Ordering::SeqCst);

        let spawned = thread::Builder::new().name(ACCEPT_THREAD_NAME.to_string()).spawn(move || {
            accept_loop(&listener, &context, &shutdown, poll);
            running.store(false, Ordering::SeqCst);
        });
        let worker = match spawned {
            Ok(worker) => worker,
            Err(err) => {
                self.running.store(false, Ordering::SeqCst);
                return Err(ServerError::Io(err.to_string()));
            }
        };
        self.worker = Some(worker);
        self.local_addr = Some(local_addr);
        self.audit.record_lifecycle(&LifecycleAuditEvent::new(
            LifecycleAction::Started,
            local_addr.to_string(),
            None,
        ));
        Ok(local_addr)
    }

    /// Signals the accept thread, joins it, and releases the listener.
    ///
    /// Stopping a stopped server is a no-op.
    pub fn stop(&mut self) {
        let Some(worker) = self.worker.take() else {
            return;
        };
        self.shutdown.store(true, Ordering::SeqCst);
        let _ = worker.join();
        self.running.store(false, Ordering::SeqCst);
        if let Some(local_addr) = self.local_addr.take() {
            self.audit.record_lifecycle(&LifecycleAuditEvent::new(
                LifecycleAction::Stopped,
                local_addr.to_string(),
                None,
            ));
        }
    }

    /// Returns true while the accept thread is running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Returns the bound address while started.
    #[must_use]
    pub const fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }
}

impl Drop for ApiServer {
    fn drop(&mut self) {
        self.stop();
    }
}

// ============================================================================
// SECTION: Accept Loop
// ============================================================================

/// Shared state handed to the accept thread.
struct ConnectionContext {
    /// Shared snapshot store.
    store: Arc<SnapshotStore>,
    /// Audit sink.
    audit: Arc<dyn AuditSink>,
    /// Metrics sink.
    metrics: Arc<dyn ApiMetrics>,
    /// Per-socket read and write timeout.
    socket_timeout: Duration,
    /// Bound listener address for lifecycle records.
    local_addr: SocketAddr,
}

/// Creates a non-blocking listener with address reuse and the given backlog.
fn bind_listener(addr: SocketAddr, backlog: u32) -> Result<TcpListener, ServerError> {
    let bind_error = |err: io::Error| ServerError::Bind(format!("{addr}: {err}"));
    let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))
        .map_err(bind_error)?;
    socket.set_reuse_address(true).map_err(bind_error)?;
    socket.bind(&addr.into()).map_err(bind_error)?;
    socket.listen(i32::try_from(backlog).unwrap_or(i32::MAX)).map_err(bind_error)?;
    socket.set_nonblocking(true).map_err(bind_error)?;
    Ok(socket.into())
}

/// Accepts and serves connections until shutdown is signalled.
fn accept_loop(
    listener: &TcpListener,
    context: &ConnectionContext,
    shutdown: &AtomicBool,
    poll: Duration,
) {
    while !shutdown.load(Ordering::SeqCst) {
        match listener.accept() {
            Ok((stream, peer)) => handle_connection(stream, peer, context),
            Err(err) if err.kind() == io::ErrorKind::WouldBlock => thread::sleep(poll),
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) => {
                context.audit.record_lifecycle(&LifecycleAuditEvent::new(
                    LifecycleAction::AcceptFailed,
                    context.local_addr.to_string(),
                    Some(err.to_string()),
                ));
                thread::sleep(poll);
            }
        }
    }
}

/// Serves exactly one request on an accepted connection.
fn handle_connection(mut stream: TcpStream, peer: SocketAddr, context: &ConnectionContext) {
    let started = Instant::now();
    let _ = stream.set_nonblocking(false);
    let _ = stream.set_write_timeout(Some(context.socket_timeout));

    let head = match read_request_head(&mut stream, context.socket_timeout) {
        Ok(head) if !head.is_empty() => head,
        _ => return,
    };
    let exchange = respond(&head, &context.store);
    let _ = stream.write_all(&exchange.response.to_bytes());
    let _ = stream.flush();
    close_gracefully(&mut stream);

    let status = exchange.response.status.code();
    let event = ApiMetricEvent {
        route: exchange.route,
        status,
        outcome: ApiOutcome::from_status(status),
        response_bytes: exchange.response.body.len(),
    };
    let latency = started.elapsed();
    context.metrics.record_request(event);
    context.metrics.record_latency(event, latency);
    let (method, path) = match exchange.request {
        Some(RequestLine {
            method,
            path,
            ..
        }) => (Some(method), Some(path)),
        None => (None, None),
    };
    context.audit.record_request(&ApiRequestAuditEvent::new(ApiRequestAuditEventParams {
        peer: Some(peer.to_string()),
        method,
        path,
        route: route_label(exchange.route),
        status,
        response_bytes: event.response_bytes,
        latency_us: latency.as_micros(),
    }));
}

/// Half-closes the stream and drains unread request bytes so close sends FIN.
///
/// The drain stops at [`DRAIN_TIMEOUT`] after it starts, however the peer
/// paces its writes.
fn close_gracefully(stream: &mut TcpStream) {
    let _ = stream.shutdown(Shutdown::Write);
    let deadline = Instant::now() + DRAIN_TIMEOUT;
    let mut scratch = [0_u8; 512];
    let mut drained = 0;
    while drained < MAX_REQUEST_HEAD_BYTES {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() || stream.set_read_timeout(Some(remaining)).is_err() {
            break;
        }
        match Read::read(stream, &mut scratch) {
            Ok(0) | Err(_) => break,
            Ok(read) => drained += read,
        }
    }
}

// ============================================================================
// SECTION: Routing
// ============================================================================

/// Result of routing one request head.
struct Exchange {
    /// Parsed request line, `None` when malformed.
    request: Option<RequestLine>,
    /// Matched route, `None` for rejected requests.
    route: Option<ApiRoute>,
    /// Rendered response.
    response: HttpResponse,
}

/// Parses, routes, and renders one request head.
fn respond(head: &[u8], store: &SnapshotStore) -> Exchange {
    let Some(request) = parse_request_line(head) else {
        return Exchange {
            request: None,
            route: None,
            response: HttpResponse::error(HttpStatus::BadRequest, "Invalid HTTP request"),
        };
    };
    if request.method != "GET" {
        return Exchange {
            request: Some(request),
            route: None,
            response: HttpResponse::method_not_allowed(),
        };
    }
    let Some(route) = ApiRoute::from_path(&request.path) else {
        return Exchange {
            request: Some(request),
            route: None,
            response: HttpResponse::error(HttpStatus::NotFound, "Endpoint not found"),
        };
    };
    let rendered = panic::catch_unwind(AssertUnwindSafe(|| routes::render(route, store)));
    let response = match rendered {
        Ok(Ok(response)) => response,
        Ok(Err(err)) => {
            HttpResponse::error(HttpStatus::InternalServerError, &format!("Internal error: {err}"))
        }
        Err(_) => HttpResponse::error(HttpStatus::InternalServerError, "Internal error: render panicked"),
    };
    Exchange {
        request: Some(request),
        route: Some(route),
        response,
    }
}
