//! The per-request processing context.

use indexmap::IndexMap;
use printflow_values::PrintValue;
use std::sync::RwLock;
use thiserror::Error;

/// Error type for context operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ContextError {
    #[error("context entry '{0}' is already bound")]
    AlreadyBound(String),

    #[error("context entry '{0}' is not bound")]
    Unbound(String),

    #[error("context lock poisoned")]
    Poisoned,
}

/// An ordered, append-only mapping of named values shared across one
/// request's processor chain.
///
/// A context belongs to exactly one execution. Within that execution it may
/// be read by concurrently running processors, but every name is written
/// exactly once: the executor is the only writer and binds only between task
/// completions, so a bound value is visible to every subsequent reader.
/// Rebinding a name is a contract violation, not a merge.
///
/// Insertion order is preserved for consumers that iterate the final
/// snapshot (legend and table rendering order).
#[derive(Debug, Default)]
pub struct ProcessingContext {
    entries: RwLock<IndexMap<String, PrintValue>>,
}

impl ProcessingContext {
    /// Create an empty context for a new request execution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a value to a name.
    ///
    /// Fails with [`ContextError::AlreadyBound`] if the name is taken,
    /// regardless of whether the values are equal.
    pub fn bind(&self, name: impl Into<String>, value: PrintValue) -> Result<(), ContextError> {
        let name = name.into();
        let mut entries = self.entries.write().map_err(|_| ContextError::Poisoned)?;
        if entries.contains_key(&name) {
            return Err(ContextError::AlreadyBound(name));
        }
        entries.insert(name, value);
        Ok(())
    }

    /// Look up a bound value by name.
    ///
    /// An [`ContextError::Unbound`] here during chain execution indicates a
    /// scheduling bug in the executor, which guarantees producers complete
    /// before their consumers start.
    pub fn get(&self, name: &str) -> Result<PrintValue, ContextError> {
        let entries = self.entries.read().map_err(|_| ContextError::Poisoned)?;
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| ContextError::Unbound(name.to_string()))
    }

    /// Whether a name is currently bound.
    pub fn is_bound(&self, name: &str) -> bool {
        self.entries
            .read()
            .map(|e| e.contains_key(name))
            .unwrap_or(false)
    }

    /// The names bound so far, in insertion order.
    pub fn bound_names(&self) -> Vec<String> {
        self.entries
            .read()
            .map(|e| e.keys().cloned().collect())
            .unwrap_or_default()
    }

    /// Number of bound entries.
    pub fn len(&self) -> usize {
        self.entries.read().map(|e| e.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// An immutable copy of all entries in insertion order, handed to the
    /// renderer once the chain completes.
    pub fn snapshot(&self) -> IndexMap<String, PrintValue> {
        self.entries
            .read()
            .map(|e| e.clone())
            .unwrap_or_default()
    }
}
