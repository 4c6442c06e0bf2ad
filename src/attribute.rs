//! Attribute schema and typed extraction.
//!
//! An attribute is one named, typed field pulled from the incoming request.
//! Extraction is strict: a `string` attribute returns the raw string
//! verbatim, numbers and booleans reject any other JSON shape, and nested
//! structures (`object`, `legend`) pass through untouched for downstream
//! interpretation. The only explicit conversion is table cells, where scalar
//! numbers and booleans are stringified into the row mapping.

use indexmap::IndexMap;
use log::warn;
use printflow_traits::Warning;
use printflow_values::{PrintValue, SchemaError, TableValue, ValueKind};
use serde_json::Value;

/// The closed set of attribute kinds a schema can declare.
#[derive(Debug, Clone)]
pub enum AttributeKind {
    String,
    Number,
    Boolean,
    /// An arbitrary nested structure, passed through unmodified.
    Object,
    /// Columns plus positional row data, zipped into row mappings.
    Table,
    /// A legend payload; structurally an object, tagged for declarations.
    Legend,
    /// A nested set of attribute declarations, extracted recursively.
    Attributes(Schema),
}

impl AttributeKind {
    /// The declaration tag matching this kind.
    pub fn value_kind(&self) -> ValueKind {
        match self {
            AttributeKind::String => ValueKind::String,
            AttributeKind::Number => ValueKind::Number,
            AttributeKind::Boolean => ValueKind::Boolean,
            AttributeKind::Object => ValueKind::Object,
            AttributeKind::Table => ValueKind::Table,
            AttributeKind::Legend => ValueKind::Legend,
            AttributeKind::Attributes(_) => ValueKind::Attributes,
        }
    }
}

/// One declared attribute: name, kind, default and failure policy.
#[derive(Debug, Clone)]
pub struct AttributeDecl {
    name: String,
    kind: AttributeKind,
    default: Option<Value>,
    required: bool,
    best_effort: bool,
}

impl AttributeDecl {
    /// Declare a required attribute with no default.
    pub fn new(name: impl Into<String>, kind: AttributeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            default: None,
            required: true,
            best_effort: false,
        }
    }

    /// Mark the attribute optional: absent without a default means unbound,
    /// not an error.
    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    /// Declare a default used when the request omits the attribute. The
    /// default is parsed under the same strict rules as a supplied value.
    pub fn with_default(mut self, default: Value) -> Self {
        self.default = Some(default);
        self
    }

    /// Degrade a type mismatch to the declared default plus a warning
    /// instead of failing the request. Only effective together with
    /// [`AttributeDecl::with_default`].
    pub fn best_effort(mut self) -> Self {
        self.best_effort = true;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn kind(&self) -> &AttributeKind {
        &self.kind
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Extract this attribute from the raw request object.
    ///
    /// Returns `Ok(None)` for an absent optional attribute without default.
    pub fn extract(
        &self,
        request: &serde_json::Map<String, Value>,
        warnings: &mut Vec<Warning>,
    ) -> Result<Option<PrintValue>, SchemaError> {
        // JSON null counts as absent, like a missing key.
        let raw = request.get(&self.name).filter(|v| !v.is_null());

        match raw {
            Some(value) => match convert(&self.name, &self.kind, value, warnings) {
                Ok(extracted) => Ok(Some(extracted)),
                Err(SchemaError::TypeMismatch { field, expected, found })
                    if self.best_effort && self.default.is_some() =>
                {
                    let message = format!(
                        "type mismatch (expected {expected}, found {found}); falling back to default"
                    );
                    warn!("attribute '{field}': {message}");
                    warnings.push(Warning::new(&field, message));
                    self.extract_default(warnings).map(Some)
                }
                Err(e) => Err(e),
            },
            None => match &self.default {
                Some(_) => self.extract_default(warnings).map(Some),
                None if self.required => Err(SchemaError::MissingRequiredField {
                    field: self.name.clone(),
                }),
                None => Ok(None),
            },
        }
    }

    fn extract_default(&self, warnings: &mut Vec<Warning>) -> Result<PrintValue, SchemaError> {
        // A default that fails its own kind is a schema authoring error.
        let default = self
            .default
            .as_ref()
            .ok_or_else(|| SchemaError::MissingRequiredField {
                field: self.name.clone(),
            })?;
        convert(&self.name, &self.kind, default, warnings)
    }
}

/// An ordered set of attribute declarations with unique names.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    attributes: Vec<AttributeDecl>,
}

/// The result of extracting a whole schema: values in declaration order plus
/// any best-effort warnings.
#[derive(Debug)]
pub struct Extraction {
    pub values: Vec<(String, PrintValue)>,
    pub warnings: Vec<Warning>,
}

impl Schema {
    /// Build a schema, rejecting duplicate attribute names.
    pub fn new(attributes: Vec<AttributeDecl>) -> Result<Self, SchemaError> {
        let mut seen = std::collections::HashSet::new();
        for attribute in &attributes {
            if !seen.insert(attribute.name()) {
                return Err(SchemaError::DuplicateAttribute {
                    field: attribute.name().to_string(),
                });
            }
        }
        Ok(Self { attributes })
    }

    pub fn attributes(&self) -> &[AttributeDecl] {
        &self.attributes
    }

    /// Extract every declared attribute from a raw request document.
    ///
    /// The request must be a top-level JSON object. Extraction is pure and
    /// fails on the first schema violation; best-effort mismatches degrade
    /// to defaults and surface as warnings instead.
    pub fn extract(&self, request: &Value) -> Result<Extraction, SchemaError> {
        let object = request
            .as_object()
            .ok_or_else(|| SchemaError::TypeMismatch {
                field: "(request)".to_string(),
                expected: ValueKind::Object,
                found: json_type(request).to_string(),
            })?;

        let mut values = Vec::with_capacity(self.attributes.len());
        let mut warnings = Vec::new();
        for attribute in &self.attributes {
            if let Some(value) = attribute.extract(object, &mut warnings)? {
                values.push((attribute.name().to_string(), value));
            }
        }
        Ok(Extraction { values, warnings })
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn mismatch(field: &str, expected: ValueKind, value: &Value) -> SchemaError {
    SchemaError::TypeMismatch {
        field: field.to_string(),
        expected,
        found: json_type(value).to_string(),
    }
}

/// Convert one raw value according to its declared kind. No implicit
/// coercion: each arm accepts exactly one JSON shape.
fn convert(
    field: &str,
    kind: &AttributeKind,
    value: &Value,
    warnings: &mut Vec<Warning>,
) -> Result<PrintValue, SchemaError> {
    match kind {
        AttributeKind::String => value
            .as_str()
            .map(|s| PrintValue::String(s.to_string()))
            .ok_or_else(|| mismatch(field, ValueKind::String, value)),
        AttributeKind::Number => value
            .as_f64()
            .map(PrintValue::Number)
            .ok_or_else(|| mismatch(field, ValueKind::Number, value)),
        AttributeKind::Boolean => value
            .as_bool()
            .map(PrintValue::Bool)
            .ok_or_else(|| mismatch(field, ValueKind::Boolean, value)),
        AttributeKind::Object => value
            .is_object()
            .then(|| PrintValue::Object(value.clone()))
            .ok_or_else(|| mismatch(field, ValueKind::Object, value)),
        AttributeKind::Legend => value
            .is_object()
            .then(|| PrintValue::Object(value.clone()))
            .ok_or_else(|| mismatch(field, ValueKind::Legend, value)),
        AttributeKind::Table => convert_table(field, value),
        AttributeKind::Attributes(schema) => convert_nested(field, schema, value, warnings),
    }
}

/// Parse a table structure: `columns` is a sequence of strings, `data` a
/// sequence of rows zipped positionally against the columns.
fn convert_table(field: &str, value: &Value) -> Result<PrintValue, SchemaError> {
    let object = value
        .as_object()
        .ok_or_else(|| mismatch(field, ValueKind::Table, value))?;

    let columns = object
        .get("columns")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch(field, ValueKind::Table, value))?
        .iter()
        .map(|c| {
            c.as_str()
                .map(str::to_string)
                .ok_or_else(|| mismatch(field, ValueKind::Table, c))
        })
        .collect::<Result<Vec<String>, SchemaError>>()?;

    let data = object
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| mismatch(field, ValueKind::Table, value))?;

    let mut rows = Vec::with_capacity(data.len());
    for row in data {
        let cells = row
            .as_array()
            .ok_or_else(|| mismatch(field, ValueKind::Table, row))?
            .iter()
            .map(|cell| cell_string(field, cell))
            .collect::<Result<Vec<String>, SchemaError>>()?;
        rows.push(cells);
    }

    TableValue::from_rows(field, columns, rows).map(PrintValue::Table)
}

/// Table cells accept scalar strings, numbers and booleans; the two latter
/// are stringified explicitly. Structured cells are a type error.
fn cell_string(field: &str, cell: &Value) -> Result<String, SchemaError> {
    match cell {
        Value::String(s) => Ok(s.clone()),
        Value::Number(n) => Ok(n.to_string()),
        Value::Bool(b) => Ok(b.to_string()),
        other => Err(mismatch(field, ValueKind::Table, other)),
    }
}

/// Extract a nested attribute set; inner fields are reported qualified with
/// the parent name.
fn convert_nested(
    field: &str,
    schema: &Schema,
    value: &Value,
    warnings: &mut Vec<Warning>,
) -> Result<PrintValue, SchemaError> {
    if !value.is_object() {
        return Err(mismatch(field, ValueKind::Attributes, value));
    }

    let extraction = schema.extract(value).map_err(|e| qualify(field, e))?;
    for warning in extraction.warnings {
        warnings.push(Warning::new(
            format!("{field}.{}", warning.stage),
            warning.message,
        ));
    }

    let mut nested = IndexMap::new();
    for (name, extracted) in extraction.values {
        nested.insert(name, extracted);
    }
    Ok(PrintValue::Attributes(nested))
}

fn qualify(parent: &str, error: SchemaError) -> SchemaError {
    let qualified = |field: String| format!("{parent}.{field}");
    match error {
        SchemaError::MissingRequiredField { field } => SchemaError::MissingRequiredField {
            field: qualified(field),
        },
        SchemaError::TypeMismatch {
            field,
            expected,
            found,
        } => SchemaError::TypeMismatch {
            field: qualified(field),
            expected,
            found,
        },
        SchemaError::MalformedTable {
            field,
            row,
            expected,
            found,
        } => SchemaError::MalformedTable {
            field: qualified(field),
            row,
            expected,
            found,
        },
        SchemaError::DuplicateColumn { field, column } => SchemaError::DuplicateColumn {
            field: qualified(field),
            column,
        },
        SchemaError::DuplicateAttribute { field } => SchemaError::DuplicateAttribute {
            field: qualified(field),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn extract_one(decl: AttributeDecl, request: Value) -> Result<Extraction, SchemaError> {
        Schema::new(vec![decl]).unwrap().extract(&request)
    }

    #[test]
    fn test_string_is_verbatim() {
        let extraction = extract_one(
            AttributeDecl::new("title", AttributeKind::String),
            json!({"title": "42"}),
        )
        .unwrap();
        assert_eq!(
            extraction.values,
            vec![("title".to_string(), PrintValue::String("42".to_string()))]
        );
    }

    #[test]
    fn test_number_rejects_numeric_string() {
        let err = extract_one(
            AttributeDecl::new("dpi", AttributeKind::Number),
            json!({"dpi": "300"}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::TypeMismatch {
                field: "dpi".to_string(),
                expected: ValueKind::Number,
                found: "string".to_string(),
            }
        );
    }

    #[test]
    fn test_missing_required_field() {
        let err = extract_one(
            AttributeDecl::new("title", AttributeKind::String),
            json!({}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingRequiredField {
                field: "title".to_string()
            }
        );
    }

    #[test]
    fn test_null_counts_as_absent() {
        let err = extract_one(
            AttributeDecl::new("title", AttributeKind::String),
            json!({"title": null}),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::MissingRequiredField { .. }));
    }

    #[test]
    fn test_absent_optional_with_default_gets_default() {
        let extraction = extract_one(
            AttributeDecl::new("opacity", AttributeKind::Number)
                .optional()
                .with_default(json!(1.0)),
            json!({}),
        )
        .unwrap();
        assert_eq!(
            extraction.values,
            vec![("opacity".to_string(), PrintValue::Number(1.0))]
        );
        assert!(extraction.warnings.is_empty());
    }

    #[test]
    fn test_absent_optional_without_default_is_skipped() {
        let extraction = extract_one(
            AttributeDecl::new("comment", AttributeKind::String).optional(),
            json!({}),
        )
        .unwrap();
        assert!(extraction.values.is_empty());
    }

    #[test]
    fn test_best_effort_mismatch_degrades_to_default() {
        let extraction = extract_one(
            AttributeDecl::new("scale", AttributeKind::Number)
                .with_default(json!(25000.0))
                .best_effort(),
            json!({"scale": "not-a-number"}),
        )
        .unwrap();
        assert_eq!(
            extraction.values,
            vec![("scale".to_string(), PrintValue::Number(25000.0))]
        );
        assert_eq!(extraction.warnings.len(), 1);
        assert_eq!(extraction.warnings[0].stage, "scale");
    }

    #[test]
    fn test_best_effort_without_default_still_fails() {
        let err = extract_one(
            AttributeDecl::new("scale", AttributeKind::Number).best_effort(),
            json!({"scale": "oops"}),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn test_table_zip() {
        let extraction = extract_one(
            AttributeDecl::new("table", AttributeKind::Table),
            json!({"table": {"columns": ["a", "b"], "data": [["1", "2"], ["3", "4"]]}}),
        )
        .unwrap();

        let (_, value) = &extraction.values[0];
        let table = value.as_table().unwrap();
        assert_eq!(table.rows().len(), 2);
        assert_eq!(table.rows()[0].get("a"), Some(&"1".to_string()));
        assert_eq!(table.rows()[1].get("b"), Some(&"4".to_string()));
    }

    #[test]
    fn test_table_short_row_fails() {
        let err = extract_one(
            AttributeDecl::new("table", AttributeKind::Table),
            json!({"table": {"columns": ["a", "b"], "data": [["1"]]}}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MalformedTable {
                field: "table".to_string(),
                row: 0,
                expected: 2,
                found: 1,
            }
        );
    }

    #[test]
    fn test_table_duplicate_column_fails() {
        let err = extract_one(
            AttributeDecl::new("table", AttributeKind::Table),
            json!({"table": {"columns": ["a", "a"], "data": [["1", "2"]]}}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateColumn {
                field: "table".to_string(),
                column: "a".to_string(),
            }
        );
    }

    #[test]
    fn test_table_stringifies_scalar_cells_only() {
        let extraction = extract_one(
            AttributeDecl::new("t", AttributeKind::Table),
            json!({"t": {"columns": ["n", "b"], "data": [[7, true]]}}),
        )
        .unwrap();
        let table = extraction.values[0].1.as_table().unwrap();
        assert_eq!(table.rows()[0].get("n"), Some(&"7".to_string()));
        assert_eq!(table.rows()[0].get("b"), Some(&"true".to_string()));

        let err = extract_one(
            AttributeDecl::new("t", AttributeKind::Table),
            json!({"t": {"columns": ["x"], "data": [[["nested"]]]}}),
        )
        .unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }

    #[test]
    fn test_legend_passes_raw_structure_through() {
        let legend = json!({"name": "Roads", "classes": [{"name": "Highway", "icons": []}]});
        let extraction = extract_one(
            AttributeDecl::new("legend", AttributeKind::Legend),
            json!({"legend": legend}),
        )
        .unwrap();
        assert_eq!(
            extraction.values[0].1,
            PrintValue::Object(legend)
        );
    }

    #[test]
    fn test_nested_attributes_extract_recursively() {
        let nested = Schema::new(vec![
            AttributeDecl::new("dpi", AttributeKind::Number),
            AttributeDecl::new("rotation", AttributeKind::Number)
                .optional()
                .with_default(json!(0.0)),
        ])
        .unwrap();
        let extraction = extract_one(
            AttributeDecl::new("map", AttributeKind::Attributes(nested)),
            json!({"map": {"dpi": 254.0}}),
        )
        .unwrap();

        let PrintValue::Attributes(map) = &extraction.values[0].1 else {
            panic!("expected nested attributes");
        };
        assert_eq!(map.get("dpi"), Some(&PrintValue::Number(254.0)));
        assert_eq!(map.get("rotation"), Some(&PrintValue::Number(0.0)));
    }

    #[test]
    fn test_nested_error_is_qualified() {
        let nested = Schema::new(vec![AttributeDecl::new("dpi", AttributeKind::Number)]).unwrap();
        let err = extract_one(
            AttributeDecl::new("map", AttributeKind::Attributes(nested)),
            json!({"map": {}}),
        )
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::MissingRequiredField {
                field: "map.dpi".to_string()
            }
        );
    }

    #[test]
    fn test_duplicate_attribute_rejected() {
        let err = Schema::new(vec![
            AttributeDecl::new("title", AttributeKind::String),
            AttributeDecl::new("title", AttributeKind::Number),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            SchemaError::DuplicateAttribute {
                field: "title".to_string()
            }
        );
    }

    #[test]
    fn test_non_object_request_rejected() {
        let schema = Schema::new(vec![]).unwrap();
        let err = schema.extract(&json!([1, 2, 3])).unwrap_err();
        assert!(matches!(err, SchemaError::TypeMismatch { .. }));
    }
}
