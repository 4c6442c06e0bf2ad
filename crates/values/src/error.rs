use crate::value::ValueKind;
use thiserror::Error;

/// Error type for schema validation and typed extraction.
///
/// Every variant names the offending field so a failed request can report a
/// single root cause to the caller.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchemaError {
    #[error("missing required field '{field}' (no value and no default)")]
    MissingRequiredField { field: String },

    #[error("type mismatch for field '{field}': expected {expected}, found {found}")]
    TypeMismatch {
        field: String,
        expected: ValueKind,
        found: String,
    },

    #[error(
        "malformed table in field '{field}': row {row} has {found} cells but {expected} columns are declared"
    )]
    MalformedTable {
        field: String,
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("duplicate column '{column}' in table field '{field}'")]
    DuplicateColumn { field: String, column: String },

    #[error("duplicate attribute declaration '{field}'")]
    DuplicateAttribute { field: String },
}

impl SchemaError {
    /// The name of the field this error refers to.
    pub fn field(&self) -> &str {
        match self {
            SchemaError::MissingRequiredField { field }
            | SchemaError::TypeMismatch { field, .. }
            | SchemaError::MalformedTable { field, .. }
            | SchemaError::DuplicateColumn { field, .. }
            | SchemaError::DuplicateAttribute { field } => field,
        }
    }
}
