//! The tagged value variant shared by the whole engine.

use crate::table::{RowSet, TableValue};
use indexmap::IndexMap;
use serde_json::Value;
use std::fmt;

/// Type tag carried by attribute and processor declarations.
///
/// `Legend` is structurally an object but kept as its own tag so a chain can
/// declare legend-specific inputs; [`ValueKind::admits`] reflects that.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Number,
    Boolean,
    Object,
    Table,
    Legend,
    Rows,
    Attributes,
}

impl ValueKind {
    /// The well-defined placeholder substituted for a degraded processor's
    /// output of this kind.
    pub fn placeholder(&self) -> PrintValue {
        match self {
            ValueKind::String => PrintValue::String(String::new()),
            ValueKind::Number => PrintValue::Number(0.0),
            ValueKind::Boolean => PrintValue::Bool(false),
            ValueKind::Object | ValueKind::Legend => PrintValue::Object(Value::Null),
            ValueKind::Table => PrintValue::Table(TableValue::empty()),
            ValueKind::Rows => PrintValue::Rows(RowSet::empty()),
            ValueKind::Attributes => PrintValue::Attributes(IndexMap::new()),
        }
    }

    /// Whether a value satisfies this declared kind.
    pub fn admits(&self, value: &PrintValue) -> bool {
        match (self, value) {
            (ValueKind::String, PrintValue::String(_))
            | (ValueKind::Number, PrintValue::Number(_))
            | (ValueKind::Boolean, PrintValue::Bool(_))
            | (ValueKind::Object, PrintValue::Object(_))
            | (ValueKind::Legend, PrintValue::Object(_))
            | (ValueKind::Table, PrintValue::Table(_))
            | (ValueKind::Rows, PrintValue::Rows(_))
            | (ValueKind::Attributes, PrintValue::Attributes(_)) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::String => "string",
            ValueKind::Number => "number",
            ValueKind::Boolean => "boolean",
            ValueKind::Object => "object",
            ValueKind::Table => "table",
            ValueKind::Legend => "legend",
            ValueKind::Rows => "rows",
            ValueKind::Attributes => "attributes",
        };
        f.write_str(name)
    }
}

/// A typed value bound in the processing context.
///
/// Nested request structure (`Object`) stays as a raw [`serde_json::Value`]
/// for downstream interpretation; everything else is fully typed.
#[derive(Debug, Clone, PartialEq)]
pub enum PrintValue {
    String(String),
    Number(f64),
    Bool(bool),
    /// A raw nested structure, also the representation of legend payloads.
    Object(Value),
    Table(TableValue),
    Rows(RowSet),
    /// Values extracted from a nested attribute set, in declaration order.
    Attributes(IndexMap<String, PrintValue>),
}

impl PrintValue {
    /// The kind tag of this value. Legend payloads report `Object`; whether a
    /// declaration accepts them is decided by [`ValueKind::admits`].
    pub fn kind(&self) -> ValueKind {
        match self {
            PrintValue::String(_) => ValueKind::String,
            PrintValue::Number(_) => ValueKind::Number,
            PrintValue::Bool(_) => ValueKind::Boolean,
            PrintValue::Object(_) => ValueKind::Object,
            PrintValue::Table(_) => ValueKind::Table,
            PrintValue::Rows(_) => ValueKind::Rows,
            PrintValue::Attributes(_) => ValueKind::Attributes,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            PrintValue::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_number(&self) -> Option<f64> {
        match self {
            PrintValue::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            PrintValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Value> {
        match self {
            PrintValue::Object(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<&TableValue> {
        match self {
            PrintValue::Table(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_rows(&self) -> Option<&RowSet> {
        match self {
            PrintValue::Rows(r) => Some(r),
            _ => None,
        }
    }

    /// Explicit conversion back to a JSON tree, for diagnostics and for
    /// renderers that want an untyped view of the final context.
    pub fn to_json(&self) -> Value {
        match self {
            PrintValue::String(s) => Value::String(s.clone()),
            PrintValue::Number(n) => serde_json::Number::from_f64(*n)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            PrintValue::Bool(b) => Value::Bool(*b),
            PrintValue::Object(v) => v.clone(),
            PrintValue::Table(t) => serde_json::to_value(t).unwrap_or(Value::Null),
            PrintValue::Rows(r) => serde_json::to_value(r).unwrap_or(Value::Null),
            PrintValue::Attributes(map) => {
                let mut out = serde_json::Map::new();
                for (name, value) in map {
                    out.insert(name.clone(), value.to_json());
                }
                Value::Object(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_kind_round_trip() {
        assert_eq!(PrintValue::String("x".into()).kind(), ValueKind::String);
        assert_eq!(PrintValue::Number(1.5).kind(), ValueKind::Number);
        assert_eq!(PrintValue::Bool(true).kind(), ValueKind::Boolean);
        assert_eq!(PrintValue::Object(json!({})).kind(), ValueKind::Object);
        assert_eq!(
            PrintValue::Table(TableValue::empty()).kind(),
            ValueKind::Table
        );
    }

    #[test]
    fn test_legend_admits_object_value() {
        let legend = PrintValue::Object(json!({"classes": []}));
        assert!(ValueKind::Legend.admits(&legend));
        assert!(ValueKind::Object.admits(&legend));
        assert!(!ValueKind::Legend.admits(&PrintValue::String("no".into())));
    }

    #[test]
    fn test_placeholders_match_their_kind() {
        for kind in [
            ValueKind::String,
            ValueKind::Number,
            ValueKind::Boolean,
            ValueKind::Object,
            ValueKind::Table,
            ValueKind::Legend,
            ValueKind::Rows,
            ValueKind::Attributes,
        ] {
            assert!(kind.admits(&kind.placeholder()), "placeholder for {kind}");
        }
    }

    #[test]
    fn test_no_implicit_coercion_in_accessors() {
        let n = PrintValue::Number(42.0);
        assert!(n.as_str().is_none());
        assert!(n.as_bool().is_none());
        assert_eq!(n.as_number(), Some(42.0));
    }

    #[test]
    fn test_attributes_to_json_preserves_order() {
        let mut map = IndexMap::new();
        map.insert("zeta".to_string(), PrintValue::Number(1.0));
        map.insert("alpha".to_string(), PrintValue::String("a".into()));
        let json = PrintValue::Attributes(map).to_json();

        let keys: Vec<&String> = json.as_object().unwrap().keys().collect();
        assert_eq!(keys, vec!["zeta", "alpha"]);
    }
}
