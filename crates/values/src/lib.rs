//! Typed value model for the printflow report engine.
//!
//! A print request arrives as an arbitrary JSON tree. Everything that flows
//! between the extraction layer, the processor chain and the renderer is a
//! [`PrintValue`]: a small closed set of variants with explicit conversions,
//! never implicit coercion.
//!
//! ## Types
//!
//! - [`PrintValue`]: tagged variant held in the processing context
//! - [`ValueKind`]: the type tag used by attribute and processor declarations
//! - [`TableValue`] / [`RowSet`]: tabular input and output structures
//! - [`SchemaError`]: extraction and validation failures

mod error;
mod table;
mod value;

pub use error::SchemaError;
pub use table::{RowSet, TableValue};
pub use value::{PrintValue, ValueKind};
