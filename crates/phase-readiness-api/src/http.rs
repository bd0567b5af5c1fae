// crates/phase-readiness-api/src/http.rs
// ============================================================================
// Module: Minimal HTTP/1.1 Framing
// Description: Request-line parsing and response serialization.
// Purpose: Speak just enough HTTP/1.1 for read-only JSON endpoints.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Only the request line is interpreted; headers and bodies are ignored.
//! Every response is JSON, carries an exact `Content-Length`, and announces
//! `Connection: close`, so each connection serves exactly one request.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io;
use std::io::Read;
use std::net::TcpStream;
use std::time::Duration;
use std::time::Instant;

use serde::Serialize;
use serde_json::json;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum bytes read from a client before parsing.
pub const MAX_REQUEST_HEAD_BYTES: usize = 4096;
/// Content type of every response.
const CONTENT_TYPE: &str = "application/json";
/// Body used if even the error payload cannot be encoded.
const FALLBACK_ERROR_BODY: &[u8] = br#"{"error":{"code":500,"message":"Internal error"}}"#;

// ============================================================================
// SECTION: Request Line
// ============================================================================

/// Parsed HTTP request line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestLine {
    /// Request method token.
    pub method: String,
    /// Request target path.
    pub path: String,
    /// Protocol version token.
    pub version: String,
}

/// Parses the first line of a request head.
///
/// The line must hold exactly a method, a path, and an `HTTP/` version
/// separated by whitespace.
#[must_use]
pub fn parse_request_line(head: &[u8]) -> Option<RequestLine> {
    let line_end = head.iter().position(|byte| *byte == b'\n').unwrap_or(head.len());
    let line = std::str::from_utf8(head.get(.. line_end)?).ok()?;
    let line = line.strip_suffix('\r').unwrap_or(line);
    let mut tokens = line.split_whitespace();
    let method = tokens.next()?;
    let path = tokens.next()?;
    let version = tokens.next()?;
    if tokens.next().is_some() || !version.starts_with("HTTP/") {
        return None;
    }
    Some(RequestLine {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
    })
}

/// Reads a request head until the first line ends, the buffer is full, or
/// `timeout` has elapsed since the call started.
///
/// The deadline covers the whole head, not each read, so a client trickling
/// bytes cannot hold the connection past `timeout`.
///
/// # Errors
///
/// Returns the read error when nothing was received; partial input is
/// returned as-is so the caller can reject it with a 400.
pub fn read_request_head(stream: &mut TcpStream, timeout: Duration) -> io::Result<Vec<u8>> {
    let deadline = Instant::now() + timeout;
    let mut head = Vec::with_capacity(512);
    let mut chunk = [0_u8; 512];
    while head.len() < MAX_REQUEST_HEAD_BYTES {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            if head.is_empty() {
                return Err(io::Error::from(io::ErrorKind::TimedOut));
            }
            break;
        }
        stream.set_read_timeout(Some(remaining))?;
        let budget = (MAX_REQUEST_HEAD_BYTES - head.len()).min(chunk.len());
        let Some(window) = chunk.get_mut(.. budget) else {
            break;
        };
        match stream.read(window) {
            Ok(0) => break,
            Ok(read) => {
                head.extend_from_slice(window.get(.. read).unwrap_or_default());
                if head.contains(&b'\n') {
                    break;
                }
            }
            Err(err) if err.kind() == io::ErrorKind::Interrupted => {}
            Err(err) if head.is_empty() => return Err(err),
            Err(_) => break,
        }
    }
    Ok(head)
}

// ============================================================================
// SECTION: Status
// ============================================================================

/// Response status codes used by the dispatcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpStatus {
    /// 200 OK.
    Ok,
    /// 400 Bad Request.
    BadRequest,
    /// 404 Not Found.
    NotFound,
    /// 405 Method Not Allowed.
    MethodNotAllowed,
    /// 500 Internal Server Error.
    InternalServerError,
}

impl HttpStatus {
    /// Returns the numeric status code.
    #[must_use]
    pub const fn code(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::BadRequest => 400,
            Self::NotFound => 404,
            Self::MethodNotAllowed => 405,
            Self::InternalServerError => 500,
        }
    }

    /// Returns the canonical reason phrase.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::Ok => "OK",
            Self::BadRequest => "Bad Request",
            Self::NotFound => "Not Found",
            Self::MethodNotAllowed => "Method Not Allowed",
            Self::InternalServerError => "Internal Server Error",
        }
    }
}

// ============================================================================
// SECTION: Response
// ============================================================================

/// Fully rendered JSON response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    /// Response status.
    pub status: HttpStatus,
    /// Encoded JSON body.
    pub body: Vec<u8>,
    /// Value of the `Allow` header when present.
    pub allow: Option<&'static str>,
}

impl HttpResponse {
    /// Encodes a successful JSON response.
    ///
    /// # Errors
    ///
    /// Returns the encoder error when the payload cannot be serialized.
    pub fn json<T: Serialize>(payload: &T) -> Result<Self, serde_json::Error> {
        Ok(Self {
            status: HttpStatus::Ok,
            body: serde_json::to_vec_pretty(payload)?,
            allow: None,
        })
    }

    /// Builds a structured JSON error response.
    #[must_use]
    pub fn error(status: HttpStatus, message: &str) -> Self {
        let payload = json!({
            "error": {
                "code": status.code(),
                "message": message,
            }
        });
        let body = serde_json::to_vec_pretty(&payload)
            .unwrap_or_else(|_| FALLBACK_ERROR_BODY.to_vec());
        Self {
            status,
            body,
            allow: None,
        }
    }

    /// Builds the 405 response advertising the only accepted method.
    #[must_use]
    pub fn method_not_allowed() -> Self {
        Self {
            allow: Some("GET"),
            ..Self::error(HttpStatus::MethodNotAllowed, "Only GET requests are allowed")
        }
    }

    /// Serializes the status line, headers, and body.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!(
            "HTTP/1.1 {} {}\r\nContent-Type: {CONTENT_TYPE}\r\nContent-Length: {}\r\n",
            self.status.code(),
            self.status.reason(),
            self.body.len()
        );
        if let Some(allow) = self.allow {
            head.push_str("Allow: ");
            head.push_str(allow);
            head.push_str("\r\n");
        }
        head.push_str("Connection: close\r\n\r\n");
        let mut bytes = head.into_bytes();
        bytes.extend_from_slice(&self.body);
        bytes
    }
}
