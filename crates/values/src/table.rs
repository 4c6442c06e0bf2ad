//! Tabular value structures.
//!
//! [`TableValue`] is the typed form of a `table` attribute: ordered columns
//! plus rows keyed by column name. [`RowSet`] is the processor-side output
//! handed to tabular rendering. Both preserve declaration order.

use crate::error::SchemaError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// A two-dimensional table extracted from a print request.
///
/// Every row covers every declared column; short or long rows are rejected
/// during construction rather than padded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableValue {
    columns: Vec<String>,
    rows: Vec<IndexMap<String, String>>,
}

impl TableValue {
    /// Build a table from ordered columns and positional row data.
    ///
    /// Column names must be distinct, since rows are keyed by name. Each
    /// inner vector is zipped against `columns`; a length mismatch in row
    /// `i` fails with [`SchemaError::MalformedTable`] naming `field`.
    pub fn from_rows(
        field: &str,
        columns: Vec<String>,
        data: Vec<Vec<String>>,
    ) -> Result<Self, SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for column in &columns {
            if !seen.insert(column.as_str()) {
                return Err(SchemaError::DuplicateColumn {
                    field: field.to_string(),
                    column: column.clone(),
                });
            }
        }

        let mut rows = Vec::with_capacity(data.len());
        for (i, cells) in data.into_iter().enumerate() {
            if cells.len() != columns.len() {
                return Err(SchemaError::MalformedTable {
                    field: field.to_string(),
                    row: i,
                    expected: columns.len(),
                    found: cells.len(),
                });
            }
            let row: IndexMap<String, String> =
                columns.iter().cloned().zip(cells).collect();
            rows.push(row);
        }
        Ok(Self { columns, rows })
    }

    /// An empty table with no columns. Used as the degraded placeholder.
    pub fn empty() -> Self {
        Self {
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[IndexMap<String, String>] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Processor-produced tabular output, suitable for the renderer.
///
/// Structurally a table, but kept as a distinct type so declarations can
/// distinguish raw request tables from re-projected row sets.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RowSet {
    columns: Vec<String>,
    rows: Vec<IndexMap<String, String>>,
}

impl RowSet {
    /// An empty row set. Used as the degraded placeholder.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Re-project a table into a row set, keyed by column name.
    pub fn from_table(table: &TableValue) -> Self {
        Self {
            columns: table.columns().to_vec(),
            rows: table.rows().to_vec(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[IndexMap<String, String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_table_zips_rows_against_columns() {
        let table = TableValue::from_rows(
            "table",
            cols(&["a", "b"]),
            vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string(), "4".to_string()],
            ],
        )
        .unwrap();

        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].get("a"), Some(&"1".to_string()));
        assert_eq!(table.rows()[0].get("b"), Some(&"2".to_string()));
        assert_eq!(table.rows()[1].get("a"), Some(&"3".to_string()));
        assert_eq!(table.rows()[1].get("b"), Some(&"4".to_string()));
    }

    #[test]
    fn test_table_short_row_is_malformed() {
        let result = TableValue::from_rows(
            "inventory",
            cols(&["a", "b"]),
            vec![vec!["1".to_string()]],
        );

        assert_eq!(
            result,
            Err(SchemaError::MalformedTable {
                field: "inventory".to_string(),
                row: 0,
                expected: 2,
                found: 1,
            })
        );
    }

    #[test]
    fn test_table_long_row_is_malformed() {
        let result = TableValue::from_rows(
            "t",
            cols(&["a"]),
            vec![vec!["1".to_string(), "2".to_string()]],
        );
        assert!(matches!(result, Err(SchemaError::MalformedTable { .. })));
    }

    #[test]
    fn test_table_duplicate_column_is_rejected() {
        let result = TableValue::from_rows(
            "t",
            cols(&["a", "b", "a"]),
            vec![vec!["1".to_string(), "2".to_string(), "3".to_string()]],
        );

        assert_eq!(
            result,
            Err(SchemaError::DuplicateColumn {
                field: "t".to_string(),
                column: "a".to_string(),
            })
        );
    }

    #[test]
    fn test_table_preserves_column_order() {
        let table = TableValue::from_rows(
            "t",
            cols(&["z", "a", "m"]),
            vec![vec!["1".to_string(), "2".to_string(), "3".to_string()]],
        )
        .unwrap();

        let keys: Vec<String> = table.rows()[0].keys().cloned().collect();
        assert_eq!(keys, vec!["z", "a", "m"]);
    }

    #[test]
    fn test_row_set_from_table() {
        let table = TableValue::from_rows(
            "t",
            cols(&["a", "b"]),
            vec![vec!["1".to_string(), "2".to_string()]],
        )
        .unwrap();

        let rows = RowSet::from_table(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows.columns(), table.columns());
        assert_eq!(rows.rows()[0].get("b"), Some(&"2".to_string()));
    }

    #[test]
    fn test_empty_placeholders() {
        assert!(TableValue::empty().is_empty());
        assert!(RowSet::empty().is_empty());
    }
}
