//! Seam traits and shared runtime types for the printflow engine.
//!
//! This crate defines the contracts the rest of the workspace plugs into:
//!
//! - [`Processor`]: a named transformation stage with declared inputs and
//!   outputs, executed against the shared [`ProcessingContext`]
//! - [`ProcessingContext`]: the per-request, append-only store of bound
//!   name/value entries
//! - [`Renderer`]: the external document-rendering collaborator
//!
//! In-memory implementations used by tests ([`RecordingRenderer`]) live next
//! to their traits, so every environment can exercise the engine without
//! real backends.

pub mod context;
pub mod processor;
pub mod render;

pub use context::{ContextError, ProcessingContext};
pub use processor::{Execution, InputDecl, OutputDecl, Processor, ProcessorError, Warning};
pub use render::{RecordingRenderer, RenderError, Renderer};
