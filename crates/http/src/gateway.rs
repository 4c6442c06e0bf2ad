//! The fetch gateway used by processors.

use crate::request::FetchRequest;
use crate::response::FetchResponse;
use crate::transport::{Transport, TransportError};
use log::{debug, warn};
use std::sync::Arc;
use std::time::Duration;

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// The abstraction processors use for outbound fetches.
///
/// Wraps a [`Transport`] and applies the per-fetch timeout. One gateway is
/// shared across all processors of a request (and across requests); the
/// transport's connection pool handles concurrent use internally.
#[derive(Debug, Clone)]
pub struct FetchGateway {
    transport: Arc<dyn Transport>,
    timeout: Duration,
}

impl FetchGateway {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Set the upper bound for a single fetch call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Dispatch a customized request.
    ///
    /// A fetch exceeding the configured timeout is reported as
    /// [`TransportError::Timeout`] to the owning processor; it is never
    /// escalated from here.
    pub async fn open(&self, request: FetchRequest) -> Result<FetchResponse, TransportError> {
        let uri = request.uri().to_string();
        debug!(
            "fetch {} {} via {}",
            request.method(),
            uri,
            self.transport.name()
        );

        match tokio::time::timeout(self.timeout, self.transport.execute(request)).await {
            Ok(result) => result,
            Err(_) => {
                warn!("fetch of '{}' timed out after {:?}", uri, self.timeout);
                Err(TransportError::Timeout(self.timeout))
            }
        }
    }
}
