//! printflow: a typed-extraction and processor-chain engine for structured
//! print requests.
//!
//! A print request arrives as a JSON-like document. The engine validates it
//! against a [`Schema`] of typed attribute declarations, seeds a per-request
//! [`ProcessingContext`] with the extracted values, and runs a chain of
//! [`Processor`] stages ordered by their declared input/output dependencies.
//! The final context snapshot goes to an external [`Renderer`].
//!
//! ## Pipeline
//!
//! ```text
//! raw request -> Schema::extract -> ProcessingContext
//!             -> plan + ChainExecutor::run (processors, remote fetches)
//!             -> snapshot -> Renderer
//! ```
//!
//! Remote data (map layers, legend icons) flows through the
//! [`FetchGateway`]; a fetch failure degrades the owning stage to
//! placeholder output and a warning instead of aborting unrelated stages.
//!
//! ## Example
//!
//! ```ignore
//! use printflow::{AttributeDecl, AttributeKind, PrintEngine, ProcessorRegistry, Schema};
//! use printflow::processor::TableProcessor;
//!
//! let schema = Schema::new(vec![
//!     AttributeDecl::new("title", AttributeKind::String),
//!     AttributeDecl::new("table", AttributeKind::Table),
//! ])?;
//! let mut registry = ProcessorRegistry::new();
//! registry.register(Arc::new(TableProcessor::new()))?;
//!
//! let engine = PrintEngine::new(transport);
//! let outcome = engine.run(&schema, &registry, &request, &renderer).await?;
//! ```

pub mod attribute;
pub mod engine;
pub mod error;
pub mod processor;

pub use attribute::{AttributeDecl, AttributeKind, Extraction, Schema};
pub use engine::{EngineConfig, PrintEngine, PrintOutcome};
pub use error::PrintError;
pub use processor::{ProcessorRegistry, RegistryError};

// Re-export the member-crate surface the API is built from.
pub use printflow_executor::{ChainExecutor, ExecuteError, ExecutionPlan, GraphError, plan};
pub use printflow_http::{
    CannedResponse, FetchGateway, FetchRequest, FetchResponse, InMemoryTransport, Method,
    ReqwestTransport, Transport, TransportError,
};
pub use printflow_traits::{
    ContextError, Execution, InputDecl, OutputDecl, ProcessingContext, Processor, ProcessorError,
    RecordingRenderer, RenderError, Renderer, Warning,
};
pub use printflow_values::{PrintValue, RowSet, SchemaError, TableValue, ValueKind};
