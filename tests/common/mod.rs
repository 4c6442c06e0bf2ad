use printflow::processor::{LegendProcessor, MapLayerProcessor, TableProcessor};
use printflow::{
    AttributeDecl, AttributeKind, FetchGateway, ProcessorRegistry, Schema,
};
use serde_json::{Value, json};
use std::sync::Arc;

pub type TestResult = Result<(), Box<dyn std::error::Error>>;

/// A schema covering every attribute kind the built-in chain consumes.
pub fn report_schema() -> Schema {
    Schema::new(vec![
        AttributeDecl::new("title", AttributeKind::String),
        AttributeDecl::new("table", AttributeKind::Table),
        AttributeDecl::new("legend", AttributeKind::Legend),
        AttributeDecl::new("map", AttributeKind::Object),
        AttributeDecl::new("copies", AttributeKind::Number)
            .optional()
            .with_default(json!(1.0)),
    ])
    .expect("fixture schema is valid")
}

/// The built-in chain wired against one gateway.
pub fn report_registry(gateway: FetchGateway) -> ProcessorRegistry {
    let mut registry = ProcessorRegistry::new();
    registry
        .register(Arc::new(TableProcessor::new()))
        .expect("unique name");
    registry
        .register(Arc::new(LegendProcessor::new(gateway.clone())))
        .expect("unique name");
    registry
        .register(Arc::new(MapLayerProcessor::new(gateway)))
        .expect("unique name");
    registry
}

/// A request satisfying [`report_schema`], pointing at the given hosts.
pub fn report_request(icon_url: &str, layer_url: &str) -> Value {
    json!({
        "title": "Quarterly Roads Report",
        "table": {
            "columns": ["road", "length"],
            "data": [["A1", "120"], ["B7", "45"]],
        },
        "legend": {
            "name": "Roads",
            "classes": [{"name": "Highway", "icons": [icon_url]}],
        },
        "map": {
            "layers": [{"url": layer_url, "opacity": 0.8}],
        },
    })
}
