//! Renderer trait for the external document-rendering collaborator.
//!
//! Rendering itself (layout, map compositing) is outside this engine; the
//! renderer receives the final context snapshot and returns document bytes.

use indexmap::IndexMap;
use printflow_values::PrintValue;
use std::fmt::Debug;
use std::sync::Mutex;
use thiserror::Error;

/// Error type for the rendering collaborator.
#[derive(Error, Debug, Clone)]
pub enum RenderError {
    #[error("rendering failed: {0}")]
    Failed(String),

    #[error("renderer rejected value '{name}': {message}")]
    InvalidValue { name: String, message: String },
}

/// The document-rendering backend.
///
/// Opaque beyond its contract: it accepts the final ordered mapping of named
/// values and returns rendered bytes or an error.
pub trait Renderer: Send + Sync + Debug {
    fn render(&self, values: &IndexMap<String, PrintValue>) -> Result<Vec<u8>, RenderError>;

    /// Human-readable name for logging.
    fn name(&self) -> &'static str;
}

/// A renderer that records the snapshot it was handed and emits its JSON
/// serialization as the "document". Backs the engine tests.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    snapshots: Mutex<Vec<IndexMap<String, PrintValue>>>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// The snapshots recorded so far, in call order.
    ///
    /// Returns an empty list if the lock is poisoned.
    pub fn snapshots(&self) -> Vec<IndexMap<String, PrintValue>> {
        self.snapshots.lock().map(|s| s.clone()).unwrap_or_default()
    }
}

impl Renderer for RecordingRenderer {
    fn render(&self, values: &IndexMap<String, PrintValue>) -> Result<Vec<u8>, RenderError> {
        let mut doc = serde_json::Map::new();
        for (name, value) in values {
            doc.insert(name.clone(), value.to_json());
        }
        let bytes = serde_json::to_vec(&doc).map_err(|e| RenderError::Failed(e.to_string()))?;

        self.snapshots
            .lock()
            .map_err(|_| RenderError::Failed("recording renderer poisoned".to_string()))?
            .push(values.clone());
        Ok(bytes)
    }

    fn name(&self) -> &'static str {
        "RecordingRenderer"
    }
}
