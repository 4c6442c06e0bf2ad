//! The print engine: extraction, planning, execution and handoff to the
//! renderer.

use crate::attribute::{Extraction, Schema};
use crate::error::PrintError;
use crate::processor::ProcessorRegistry;
use log::{debug, info};
use printflow_executor::{ChainExecutor, plan};
use printflow_http::{FetchGateway, Transport};
use printflow_traits::{ProcessingContext, Renderer, Warning};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

/// Engine-wide settings.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Upper bound for a single remote fetch.
    pub fetch_timeout: Duration,
    /// Maximum number of processors running concurrently per request.
    pub max_concurrency: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            fetch_timeout: Duration::from_secs(30),
            max_concurrency: parallelism,
        }
    }
}

impl EngineConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_fetch_timeout(mut self, timeout: Duration) -> Self {
        self.fetch_timeout = timeout;
        self
    }

    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency.max(1);
        self
    }
}

/// The result of a completed print request.
#[derive(Debug)]
pub struct PrintOutcome {
    /// Rendered document bytes from the renderer collaborator.
    pub document: Vec<u8>,
    /// Non-fatal problems recorded during extraction and execution.
    pub warnings: Vec<Warning>,
}

/// Orchestrates one print request end to end.
///
/// The engine owns the fetch gateway (and with it the shared transport
/// connection pool) and the chain executor. Each request gets a fresh
/// [`ProcessingContext`]; nothing is shared between concurrent requests
/// except the transport pool.
#[derive(Debug, Clone)]
pub struct PrintEngine {
    gateway: FetchGateway,
    executor: ChainExecutor,
}

impl PrintEngine {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self::with_config(EngineConfig::default(), transport)
    }

    pub fn with_config(config: EngineConfig, transport: Arc<dyn Transport>) -> Self {
        Self {
            gateway: FetchGateway::new(transport).with_timeout(config.fetch_timeout),
            executor: ChainExecutor::new(config.max_concurrency),
        }
    }

    /// The gateway processors should be constructed with, so every stage of
    /// a request shares the engine's timeout policy and connection pool.
    pub fn gateway(&self) -> FetchGateway {
        self.gateway.clone()
    }

    /// Run one print request: extract the schema's attributes, plan the
    /// chain against the bound names, execute it, and hand the final
    /// snapshot to the renderer.
    ///
    /// Schema and planning errors abort immediately; degradable processor
    /// failures surface as warnings on the outcome.
    pub async fn run(
        &self,
        schema: &Schema,
        registry: &ProcessorRegistry,
        request: &Value,
        renderer: &dyn Renderer,
    ) -> Result<PrintOutcome, PrintError> {
        let Extraction {
            values,
            mut warnings,
        } = schema.extract(request)?;

        let ctx = Arc::new(ProcessingContext::new());
        for (name, value) in values {
            ctx.bind(name, value)?;
        }
        debug!(
            "context seeded with {} attribute(s): {:?}",
            ctx.len(),
            ctx.bound_names()
        );

        // Plan against what is actually bound, so a processor depending on
        // an absent optional attribute fails before execution starts.
        let execution_plan = plan(registry.chain(), &ctx.bound_names())?;
        warnings.extend(
            self.executor
                .run(registry.chain(), &execution_plan, &ctx)
                .await?,
        );

        let snapshot = ctx.snapshot();
        debug!(
            "handing {} entries to renderer '{}'",
            snapshot.len(),
            renderer.name()
        );
        let document = renderer.render(&snapshot)?;

        info!(
            "request completed: {} processor(s), {} warning(s), {} byte document",
            registry.len(),
            warnings.len(),
            document.len()
        );
        Ok(PrintOutcome { document, warnings })
    }
}
