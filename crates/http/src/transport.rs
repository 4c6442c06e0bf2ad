//! Transport implementations behind the fetch gateway.

use crate::request::{FetchRequest, Method, wire_headers};
use crate::response::FetchResponse;
use async_trait::async_trait;
use log::debug;
use std::collections::HashMap;
use std::sync::{Mutex, RwLock};
use thiserror::Error;

/// Error type for transport failures.
///
/// These cover the connection itself; response statuses are never mapped
/// here. A transport error is degradable by default and only escalates when
/// the owning processor decides it must.
#[derive(Error, Debug, Clone)]
pub enum TransportError {
    #[error("invalid uri '{uri}': {message}")]
    InvalidUri { uri: String, message: String },

    #[error("invalid header '{name}'")]
    InvalidHeader { name: String },

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("fetch timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("transport i/o error: {0}")]
    Io(String),
}

/// The low-level transport client: dispatch one customized request, return
/// status, headers and body.
///
/// Implementations apply the framing-header policy at dispatch time via
/// [`wire_headers`], so a caller-supplied `content-length` never reaches the
/// wire regardless of the backing client.
#[async_trait]
pub trait Transport: Send + Sync + std::fmt::Debug {
    async fn execute(&self, request: FetchRequest) -> Result<FetchResponse, TransportError>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// Production transport over a shared `reqwest::Client`.
///
/// The client's connection pool is the one process-wide shared resource;
/// checkout and return are internal to reqwest and opaque to processors.
#[derive(Debug, Clone, Default)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn execute(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let url = reqwest::Url::parse(request.uri()).map_err(|e| TransportError::InvalidUri {
            uri: request.uri().to_string(),
            message: e.to_string(),
        })?;
        let method = match request.method() {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Put => reqwest::Method::PUT,
            Method::Delete => reqwest::Method::DELETE,
            Method::Head => reqwest::Method::HEAD,
        };

        let mut headers = reqwest::header::HeaderMap::new();
        for (name, value) in wire_headers(&request) {
            let header_name = reqwest::header::HeaderName::from_bytes(name.as_bytes())
                .map_err(|_| TransportError::InvalidHeader { name: name.clone() })?;
            let header_value = reqwest::header::HeaderValue::from_str(&value)
                .map_err(|_| TransportError::InvalidHeader { name })?;
            // append, not insert: repeated names stay distinct values
            headers.append(header_name, header_value);
        }

        debug!("dispatching {} {}", request.method(), request.uri());
        let mut builder = self.client.request(method, url).headers(headers);
        if let Some(body) = request.body_bytes() {
            builder = builder.body(body.to_vec());
        }

        let response = builder.send().await.map_err(|e| {
            if e.is_timeout() {
                TransportError::Timeout(std::time::Duration::ZERO)
            } else if e.is_connect() {
                TransportError::Connect(e.to_string())
            } else {
                TransportError::Io(e.to_string())
            }
        })?;
        Ok(FetchResponse::remote(response))
    }

    fn name(&self) -> &'static str {
        "ReqwestTransport"
    }
}

/// Canned parts served by [`InMemoryTransport`].
#[derive(Debug, Clone)]
pub struct CannedResponse {
    pub status: u16,
    pub status_text: String,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl CannedResponse {
    pub fn ok(body: Vec<u8>) -> Self {
        Self {
            status: 200,
            status_text: "OK".to_string(),
            headers: Vec::new(),
            body,
        }
    }

    pub fn status(status: u16, status_text: impl Into<String>) -> Self {
        Self {
            status,
            status_text: status_text.into(),
            headers: Vec::new(),
            body: Vec::new(),
        }
    }
}

/// An in-memory transport for tests.
///
/// Serves pre-registered responses keyed by URI and records every request
/// it dispatches, post framing-header policy, so tests can assert on what
/// would have reached the wire.
#[derive(Debug, Default)]
pub struct InMemoryTransport {
    responses: RwLock<HashMap<String, CannedResponse>>,
    dispatched: Mutex<Vec<FetchRequest>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a canned response for a URI.
    pub fn add(&self, uri: impl Into<String>, response: CannedResponse) {
        if let Ok(mut responses) = self.responses.write() {
            responses.insert(uri.into(), response);
        }
    }

    /// The requests dispatched so far, as they would appear on the wire
    /// (framing headers already dropped).
    pub fn dispatched(&self) -> Vec<FetchRequest> {
        self.dispatched
            .lock()
            .map(|d| d.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn execute(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let mut on_wire = FetchRequest::new(request.method(), request.uri());
        for (name, value) in wire_headers(&request) {
            on_wire = on_wire.header(name, value);
        }
        if let Some(body) = request.body_bytes() {
            on_wire = on_wire.body(body.to_vec());
        }
        if let Ok(mut dispatched) = self.dispatched.lock() {
            dispatched.push(on_wire);
        }

        let canned = self
            .responses
            .read()
            .map_err(|_| TransportError::Io("response store lock poisoned".to_string()))?
            .get(request.uri())
            .cloned()
            .ok_or_else(|| {
                TransportError::Connect(format!("no route to '{}'", request.uri()))
            })?;

        Ok(FetchResponse::from_parts(
            canned.status,
            canned.status_text,
            canned.headers,
            canned.body,
        ))
    }

    fn name(&self) -> &'static str {
        "InMemoryTransport"
    }
}
