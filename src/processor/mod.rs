//! Built-in processors and the chain registry.
//!
//! - [`TableProcessor`]: re-projects a table attribute into a row set
//! - [`LegendProcessor`]: resolves legend icons through the fetch gateway
//! - [`MapLayerProcessor`]: fetches per-layer map data, blanking missing
//!   layers
//!
//! The registry replaces the process-wide stage lookup of older print
//! services: it is built explicitly at schema-load time and passed by
//! reference through the execution.

mod legend;
mod map_layer;
mod table;

pub use legend::LegendProcessor;
pub use map_layer::MapLayerProcessor;
pub use table::TableProcessor;

use printflow_traits::Processor;
use std::sync::Arc;
use thiserror::Error;

/// Error type for registry construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("processor '{0}' is already registered")]
    DuplicateProcessor(String),
}

/// The ordered set of processors available to one request chain.
///
/// Declaration order is the planner's tie-break order, so registration order
/// is meaningful and deterministic.
#[derive(Debug, Default)]
pub struct ProcessorRegistry {
    processors: Vec<Arc<dyn Processor>>,
}

impl ProcessorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a processor to the chain. Names must be unique.
    pub fn register(&mut self, processor: Arc<dyn Processor>) -> Result<(), RegistryError> {
        if self.processors.iter().any(|p| p.name() == processor.name()) {
            return Err(RegistryError::DuplicateProcessor(
                processor.name().to_string(),
            ));
        }
        self.processors.push(processor);
        Ok(())
    }

    /// The chain in declaration order.
    pub fn chain(&self) -> &[Arc<dyn Processor>] {
        &self.processors
    }

    pub fn len(&self) -> usize {
        self.processors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.processors.is_empty()
    }
}
