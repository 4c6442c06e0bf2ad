//! Remote fetch gateway for the printflow report engine.
//!
//! Processors that need externally sourced data (map layers, legend icons)
//! go through [`FetchGateway`]: a thin layer over a [`Transport`] that
//! applies the per-fetch timeout and the framing-header policy. Requests are
//! customized with builder methods before dispatch, so a processor can add
//! authentication or per-layer headers without the gateway hard-coding them.
//!
//! Two transports are provided:
//!
//! - [`ReqwestTransport`]: production implementation over a shared
//!   `reqwest::Client` (the one process-wide connection pool)
//! - [`InMemoryTransport`]: canned responses plus request recording, for
//!   tests
//!
//! Non-2xx statuses are not errors at this layer. A missing tile may be a
//! blank tile; that classification belongs to the calling processor.

pub mod gateway;
pub mod request;
pub mod response;
pub mod transport;

pub use gateway::FetchGateway;
pub use request::{FetchRequest, Method, wire_headers};
pub use response::FetchResponse;
pub use transport::{CannedResponse, InMemoryTransport, ReqwestTransport, Transport, TransportError};
