//! Dependency graph validation and ordering.

use printflow_traits::Processor;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::sync::Arc;
use thiserror::Error;

/// Error type for chain planning. All variants abort the request before any
/// processor executes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("dependency cycle among processors: {}", processors.join(", "))]
    Cycle { processors: Vec<String> },

    #[error("processor '{processor}' requires '{input}', which no attribute or processor provides")]
    UnsatisfiedDependency { processor: String, input: String },

    #[error("output '{output}' is produced by both '{first}' and '{second}'")]
    DuplicateProducer {
        output: String,
        first: String,
        second: String,
    },

    #[error("processor '{processor}' output '{output}' collides with a request attribute")]
    AttributeShadowed { output: String, processor: String },
}

/// A validated execution order for one processor chain.
///
/// Indices refer to positions in the chain slice handed to [`plan`].
#[derive(Debug, Clone)]
pub struct ExecutionPlan {
    order: Vec<usize>,
    dependencies: Vec<Vec<usize>>,
    dependents: Vec<Vec<usize>>,
}

impl ExecutionPlan {
    /// Topological order with declaration-order tie-break.
    pub fn order(&self) -> &[usize] {
        &self.order
    }

    /// For each processor, the distinct processors producing its inputs.
    pub fn dependencies(&self) -> &[Vec<usize>] {
        &self.dependencies
    }

    /// Inverse edges of [`ExecutionPlan::dependencies`].
    pub fn dependents(&self) -> &[Vec<usize>] {
        &self.dependents
    }
}

/// Validate a chain against the seeded context names and fix an execution
/// order.
///
/// `seed_names` are the entries already bound before the chain runs (the
/// extracted request attributes). Ordering is a Kahn sort; among processors
/// with no remaining unmet dependency, declaration order wins, so plans are
/// stable and deterministic.
pub fn plan(
    chain: &[Arc<dyn Processor>],
    seed_names: &[String],
) -> Result<ExecutionPlan, GraphError> {
    let seeds: HashSet<&str> = seed_names.iter().map(String::as_str).collect();

    // One producer per output name, and no shadowing of seeded attributes.
    let mut producers: HashMap<String, usize> = HashMap::new();
    for (i, processor) in chain.iter().enumerate() {
        for output in processor.outputs() {
            if seeds.contains(output.name.as_str()) {
                return Err(GraphError::AttributeShadowed {
                    output: output.name,
                    processor: processor.name().to_string(),
                });
            }
            if let Some(&first) = producers.get(&output.name) {
                return Err(GraphError::DuplicateProducer {
                    output: output.name,
                    first: chain[first].name().to_string(),
                    second: processor.name().to_string(),
                });
            }
            producers.insert(output.name, i);
        }
    }

    // Edges: producer -> consumer, one per distinct producer.
    let mut dependencies: Vec<Vec<usize>> = vec![Vec::new(); chain.len()];
    let mut dependents: Vec<Vec<usize>> = vec![Vec::new(); chain.len()];
    for (i, processor) in chain.iter().enumerate() {
        for input in processor.inputs() {
            if seeds.contains(input.name.as_str()) {
                continue;
            }
            let Some(&producer) = producers.get(&input.name) else {
                return Err(GraphError::UnsatisfiedDependency {
                    processor: processor.name().to_string(),
                    input: input.name,
                });
            };
            if !dependencies[i].contains(&producer) {
                dependencies[i].push(producer);
                dependents[producer].push(i);
            }
        }
    }

    // Kahn sort; BTreeSet pops the smallest index, which is declaration
    // order.
    let mut remaining: Vec<usize> = dependencies.iter().map(Vec::len).collect();
    let mut ready: BTreeSet<usize> = (0..chain.len()).filter(|&i| remaining[i] == 0).collect();
    let mut order = Vec::with_capacity(chain.len());
    while let Some(&next) = ready.iter().next() {
        ready.remove(&next);
        order.push(next);
        for &dependent in &dependents[next] {
            remaining[dependent] -= 1;
            if remaining[dependent] == 0 {
                ready.insert(dependent);
            }
        }
    }

    if order.len() < chain.len() {
        return Err(GraphError::Cycle {
            processors: cycle_participants(chain, &order, &dependents),
        });
    }

    Ok(ExecutionPlan {
        order,
        dependencies,
        dependents,
    })
}

/// Names of the processors actually on a cycle, in declaration order.
///
/// The nodes Kahn could not order include everything downstream of a cycle;
/// stripping nodes with no remaining dependents until a fixpoint leaves only
/// the cycle members themselves.
fn cycle_participants(
    chain: &[Arc<dyn Processor>],
    ordered: &[usize],
    dependents: &[Vec<usize>],
) -> Vec<String> {
    let ordered: HashSet<usize> = ordered.iter().copied().collect();
    let mut stuck: BTreeSet<usize> = (0..chain.len()).filter(|i| !ordered.contains(i)).collect();

    loop {
        let leaves: Vec<usize> = stuck
            .iter()
            .copied()
            .filter(|&i| dependents[i].iter().all(|d| !stuck.contains(d)))
            .collect();
        if leaves.is_empty() {
            break;
        }
        for leaf in leaves {
            stuck.remove(&leaf);
        }
    }

    stuck
        .into_iter()
        .map(|i| chain[i].name().to_string())
        .collect()
}
