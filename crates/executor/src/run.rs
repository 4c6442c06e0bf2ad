//! Concurrent execution of a planned chain.

use crate::plan::ExecutionPlan;
use log::{debug, warn};
use printflow_traits::{Execution, ProcessingContext, Processor, ProcessorError, Warning};
use std::collections::BTreeSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::task::JoinSet;

/// Error type for a failed chain run.
///
/// Warnings recorded before the failure ride along, so callers can still
/// report what degraded before the fatal stage.
#[derive(Error, Debug)]
pub enum ExecuteError {
    #[error("processor '{processor}' failed: {source}")]
    Fatal {
        processor: String,
        #[source]
        source: ProcessorError,
        warnings: Vec<Warning>,
    },

    #[error("chain execution error: {message}")]
    Internal {
        message: String,
        warnings: Vec<Warning>,
    },
}

impl ExecuteError {
    /// Warnings recorded before the run failed.
    pub fn warnings(&self) -> &[Warning] {
        match self {
            ExecuteError::Fatal { warnings, .. } | ExecuteError::Internal { warnings, .. } => {
                warnings
            }
        }
    }
}

/// Executes a planned chain on the tokio runtime.
///
/// Every stage with no unmet dependency runs as its own task, bounded by
/// `max_concurrency`. The executor is the single writer of the context: task
/// results are bound on the completion loop, which gives every later reader
/// a proper creation barrier per name.
#[derive(Debug, Clone)]
pub struct ChainExecutor {
    max_concurrency: usize,
}

impl Default for ChainExecutor {
    fn default() -> Self {
        let parallelism = std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1);
        Self {
            max_concurrency: parallelism,
        }
    }
}

impl ChainExecutor {
    pub fn new(max_concurrency: usize) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Run the chain to completion.
    ///
    /// Degradable failures ([`Execution::Degraded`]) bind the declared
    /// placeholder for each of the stage's outputs and record a warning;
    /// downstream stages proceed against the placeholders. A fatal failure
    /// cancels all not-yet-started stages, lets in-flight ones finish with
    /// their outputs discarded, and fails the run with the first fatal error
    /// plus the warnings recorded so far.
    pub async fn run(
        &self,
        chain: &[Arc<dyn Processor>],
        plan: &ExecutionPlan,
        ctx: &Arc<ProcessingContext>,
    ) -> Result<Vec<Warning>, ExecuteError> {
        let mut remaining: Vec<usize> = plan.dependencies().iter().map(Vec::len).collect();
        let mut ready: BTreeSet<usize> = plan
            .order()
            .iter()
            .copied()
            .filter(|&i| remaining[i] == 0)
            .collect();

        let mut tasks: JoinSet<(usize, Result<Execution, ProcessorError>)> = JoinSet::new();
        let mut in_flight = 0usize;
        let mut warnings: Vec<Warning> = Vec::new();
        let mut fatal: Option<ProcessorError> = None;

        loop {
            while fatal.is_none() && in_flight < self.max_concurrency {
                let Some(&next) = ready.iter().next() else { break };
                ready.remove(&next);
                let processor = Arc::clone(&chain[next]);
                let ctx = Arc::clone(ctx);
                debug!("scheduling processor '{}'", processor.name());
                tasks.spawn(async move {
                    let result = processor.execute(&ctx).await;
                    (next, result)
                });
                in_flight += 1;
            }

            let Some(joined) = tasks.join_next().await else { break };
            in_flight -= 1;
            let (index, result) = joined.map_err(|e| ExecuteError::Internal {
                message: format!("processor task failed to join: {e}"),
                warnings: warnings.clone(),
            })?;
            let processor = &chain[index];

            if fatal.is_some() {
                // Already failing: in-flight stages finish, outputs dropped.
                debug!("discarding output of '{}'", processor.name());
                continue;
            }

            match result {
                Ok(Execution::Success(outputs)) => {
                    self.bind_outputs(processor, outputs, ctx, &warnings)?;
                    Self::release_dependents(plan, index, &mut remaining, &mut ready);
                }
                Ok(Execution::Degraded { reason }) => {
                    warn!("processor '{}' degraded: {}", processor.name(), reason);
                    warnings.push(Warning::new(processor.name(), reason));
                    let placeholders = processor
                        .outputs()
                        .into_iter()
                        .map(|decl| {
                            let value = decl.kind.placeholder();
                            (decl.name, value)
                        })
                        .collect();
                    self.bind_outputs(processor, placeholders, ctx, &warnings)?;
                    Self::release_dependents(plan, index, &mut remaining, &mut ready);
                }
                Err(error) => {
                    warn!("processor '{}' failed fatally: {}", processor.name(), error);
                    ready.clear();
                    fatal = Some(error);
                }
            }
        }

        match fatal {
            Some(source) => Err(ExecuteError::Fatal {
                processor: source.processor().to_string(),
                source,
                warnings,
            }),
            None => Ok(warnings),
        }
    }

    /// Bind a completed stage's outputs, enforcing its declaration: exactly
    /// the declared names, each value admitted by its declared kind, each
    /// name previously unbound.
    fn bind_outputs(
        &self,
        processor: &Arc<dyn Processor>,
        outputs: Vec<(String, printflow_values::PrintValue)>,
        ctx: &Arc<ProcessingContext>,
        warnings: &[Warning],
    ) -> Result<(), ExecuteError> {
        let declared = processor.outputs();
        let internal = |message: String| ExecuteError::Internal {
            message,
            warnings: warnings.to_vec(),
        };

        if outputs.len() != declared.len() {
            return Err(internal(format!(
                "processor '{}' returned {} outputs but declares {}",
                processor.name(),
                outputs.len(),
                declared.len()
            )));
        }
        for (name, value) in outputs {
            let Some(decl) = declared.iter().find(|d| d.name == name) else {
                return Err(internal(format!(
                    "processor '{}' returned undeclared output '{}'",
                    processor.name(),
                    name
                )));
            };
            if !decl.kind.admits(&value) {
                return Err(internal(format!(
                    "processor '{}' output '{}' is not a {}",
                    processor.name(),
                    name,
                    decl.kind
                )));
            }
            ctx.bind(name, value).map_err(|e| {
                internal(format!(
                    "processor '{}' bind failed: {e}",
                    processor.name()
                ))
            })?;
        }
        Ok(())
    }

    fn release_dependents(
        plan: &ExecutionPlan,
        completed: usize,
        remaining: &mut [usize],
        ready: &mut BTreeSet<usize>,
    ) {
        for &dependent in &plan.dependents()[completed] {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }
}
