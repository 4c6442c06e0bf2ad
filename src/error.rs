use crate::processor::RegistryError;
use printflow_executor::{ExecuteError, GraphError};
use printflow_traits::{ContextError, RenderError};
use printflow_values::SchemaError;
use thiserror::Error;

/// A comprehensive error type for a whole print request.
///
/// Schema and graph errors abort before any processor runs; execution errors
/// carry the warnings recorded before the fatal stage.
#[derive(Error, Debug)]
pub enum PrintError {
    #[error("extraction failed: {0}")]
    Schema(#[from] SchemaError),

    #[error("chain planning failed: {0}")]
    Graph(#[from] GraphError),

    #[error("chain execution failed: {0}")]
    Execute(#[from] ExecuteError),

    #[error("context error: {0}")]
    Context(#[from] ContextError),

    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("rendering failed: {0}")]
    Render(#[from] RenderError),
}
