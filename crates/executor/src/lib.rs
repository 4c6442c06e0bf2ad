//! Dependency planning and chain execution for the printflow report engine.
//!
//! A processor chain is a directed graph: each stage declares the context
//! entries it reads and produces. [`plan`] validates that graph (no two
//! producers per name, every input satisfiable, no cycles) and fixes a
//! deterministic topological order. [`ChainExecutor::run`] then executes the
//! plan on the tokio runtime: stages with no unmet dependency run
//! concurrently, degradable failures become placeholder outputs plus
//! warnings, and a fatal failure cancels everything not yet started.

mod plan;
mod run;

pub use plan::{ExecutionPlan, GraphError, plan};
pub use run::{ChainExecutor, ExecuteError};
