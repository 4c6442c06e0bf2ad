//! Table re-projection stage.

use async_trait::async_trait;
use printflow_traits::{
    Execution, InputDecl, OutputDecl, ProcessingContext, Processor, ProcessorError,
};
use printflow_values::{PrintValue, RowSet, ValueKind};

/// Re-projects a `table` attribute into a row set keyed by column name,
/// suitable for tabular rendering. Pure; no network or I/O side effects.
#[derive(Debug)]
pub struct TableProcessor {
    name: String,
    input: String,
    output: String,
}

impl TableProcessor {
    /// The conventional instance: reads `table`, emits `table_rows`.
    pub fn new() -> Self {
        Self::with_names("table", "table", "table_rows")
    }

    /// An instance over custom entry names, for chains carrying several
    /// tables.
    pub fn with_names(
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
        }
    }
}

impl Default for TableProcessor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Processor for TableProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<InputDecl> {
        vec![InputDecl::new(&self.input, ValueKind::Table)]
    }

    fn outputs(&self) -> Vec<OutputDecl> {
        vec![OutputDecl::new(&self.output, ValueKind::Rows)]
    }

    async fn execute(&self, ctx: &ProcessingContext) -> Result<Execution, ProcessorError> {
        let value = ctx
            .get(&self.input)
            .map_err(|source| ProcessorError::Scheduling {
                processor: self.name.clone(),
                source,
            })?;
        let table = value.as_table().ok_or_else(|| {
            ProcessorError::failed(&self.name, format!("input '{}' is not a table", self.input))
        })?;

        Ok(Execution::Success(vec![(
            self.output.clone(),
            PrintValue::Rows(RowSet::from_table(table)),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printflow_values::TableValue;

    fn sample_table() -> TableValue {
        TableValue::from_rows(
            "table",
            vec!["a".to_string(), "b".to_string()],
            vec![
                vec!["1".to_string(), "2".to_string()],
                vec!["3".to_string(), "4".to_string()],
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_projects_rows_keyed_by_column() {
        let ctx = ProcessingContext::new();
        ctx.bind("table", PrintValue::Table(sample_table())).unwrap();

        let outcome = TableProcessor::new().execute(&ctx).await.unwrap();
        let Execution::Success(outputs) = outcome else {
            panic!("expected success");
        };
        assert_eq!(outputs.len(), 1);
        assert_eq!(outputs[0].0, "table_rows");

        let rows = outputs[0].1.as_rows().unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows.rows()[0].get("a"), Some(&"1".to_string()));
        assert_eq!(rows.rows()[1].get("b"), Some(&"4".to_string()));
    }

    #[tokio::test]
    async fn test_wrong_input_type_is_fatal() {
        let ctx = ProcessingContext::new();
        ctx.bind("table", PrintValue::String("not a table".into()))
            .unwrap();

        let err = TableProcessor::new().execute(&ctx).await.unwrap_err();
        assert!(matches!(err, ProcessorError::Failed { .. }));
    }
}
