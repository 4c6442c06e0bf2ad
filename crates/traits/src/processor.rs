//! The processor contract.
//!
//! A processor is one named transformation stage in a print request's chain.
//! It declares the context entries it reads and the entries it produces; the
//! executor uses those declarations to order the chain and to substitute
//! placeholders when a stage degrades.

use crate::context::{ContextError, ProcessingContext};
use async_trait::async_trait;
use printflow_values::{PrintValue, ValueKind};
use std::fmt::Debug;
use thiserror::Error;

/// A required input: the context entry name and its expected kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputDecl {
    pub name: String,
    pub kind: ValueKind,
}

impl InputDecl {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A produced output: the context entry name and the kind of value bound.
///
/// The declared kind also defines the placeholder substituted when the
/// producing stage degrades.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDecl {
    pub name: String,
    pub kind: ValueKind,
}

impl OutputDecl {
    pub fn new(name: impl Into<String>, kind: ValueKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }
}

/// A fatal failure inside one processor stage.
///
/// Soft failures are not errors; they are expressed as
/// [`Execution::Degraded`] so the executor's placeholder policy is a visible
/// contract rather than a catch-all.
#[derive(Error, Debug)]
pub enum ProcessorError {
    #[error("processor '{processor}': {message}")]
    Failed { processor: String, message: String },

    /// A read of an unbound input. The executor schedules a processor only
    /// after its producers complete, so this is an internal scheduling bug.
    #[error("processor '{processor}': input read before bind: {source}")]
    Scheduling {
        processor: String,
        #[source]
        source: ContextError,
    },
}

impl ProcessorError {
    pub fn failed(processor: impl Into<String>, message: impl Into<String>) -> Self {
        ProcessorError::Failed {
            processor: processor.into(),
            message: message.into(),
        }
    }

    /// The name of the processor that failed.
    pub fn processor(&self) -> &str {
        match self {
            ProcessorError::Failed { processor, .. }
            | ProcessorError::Scheduling { processor, .. } => processor,
        }
    }
}

/// The typed outcome of one processor execution.
#[derive(Debug, Clone, PartialEq)]
pub enum Execution {
    /// The stage produced exactly its declared outputs.
    Success(Vec<(String, PrintValue)>),

    /// The stage could not produce real output but the failure is tolerable
    /// (a missing remote legend image, for instance). The executor binds the
    /// declared placeholder for every output and records a warning, and
    /// downstream stages proceed against the placeholders.
    Degraded { reason: String },
}

/// A non-fatal problem recorded during a request, attached to an otherwise
/// successful result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Warning {
    /// The stage (processor or attribute) the warning originates from.
    pub stage: String,
    pub message: String,
}

impl Warning {
    pub fn new(stage: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            stage: stage.into(),
            message: message.into(),
        }
    }
}

/// A single named transformation stage.
///
/// Implementations pull exactly their declared inputs from the context and
/// return exactly their declared outputs; the executor owns all binds.
#[async_trait]
pub trait Processor: Send + Sync + Debug {
    /// Unique name of this stage within its chain.
    fn name(&self) -> &str;

    /// Context entries this stage reads, in declaration order.
    fn inputs(&self) -> Vec<InputDecl>;

    /// Context entries this stage produces, in declaration order.
    fn outputs(&self) -> Vec<OutputDecl>;

    /// Run the stage against the shared context.
    async fn execute(&self, ctx: &ProcessingContext) -> Result<Execution, ProcessorError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct Upper;

    #[async_trait]
    impl Processor for Upper {
        fn name(&self) -> &str {
            "upper"
        }

        fn inputs(&self) -> Vec<InputDecl> {
            vec![InputDecl::new("title", ValueKind::String)]
        }

        fn outputs(&self) -> Vec<OutputDecl> {
            vec![OutputDecl::new("title_upper", ValueKind::String)]
        }

        async fn execute(&self, ctx: &ProcessingContext) -> Result<Execution, ProcessorError> {
            let title = ctx.get("title").map_err(|source| ProcessorError::Scheduling {
                processor: self.name().to_string(),
                source,
            })?;
            let title = title
                .as_str()
                .ok_or_else(|| ProcessorError::failed(self.name(), "'title' is not a string"))?;
            Ok(Execution::Success(vec![(
                "title_upper".to_string(),
                PrintValue::String(title.to_uppercase()),
            )]))
        }
    }

    #[tokio::test]
    async fn test_processor_reads_inputs_and_returns_outputs() {
        let ctx = ProcessingContext::new();
        ctx.bind("title", PrintValue::String("quarterly".into()))
            .unwrap();

        let outcome = Upper.execute(&ctx).await.unwrap();
        assert_eq!(
            outcome,
            Execution::Success(vec![(
                "title_upper".to_string(),
                PrintValue::String("QUARTERLY".into())
            )])
        );
    }

    #[tokio::test]
    async fn test_unbound_input_is_a_scheduling_error() {
        let ctx = ProcessingContext::new();
        let err = Upper.execute(&ctx).await.unwrap_err();
        assert!(matches!(err, ProcessorError::Scheduling { .. }));
        assert_eq!(err.processor(), "upper");
    }
}
