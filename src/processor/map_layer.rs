//! Map layer fetch stage.

use async_trait::async_trait;
use log::warn;
use printflow_http::{FetchGateway, FetchRequest};
use printflow_traits::{
    Execution, InputDecl, OutputDecl, ProcessingContext, Processor, ProcessorError,
};
use printflow_values::{PrintValue, ValueKind};
use serde_json::{Value, json};

const DEFAULT_OPACITY: f64 = 1.0;

/// Fetches the remote data behind each declared map layer.
///
/// A layer that cannot be fetched (transport failure or non-2xx status)
/// becomes a blank entry: a missing tile is a blank tile, never a failed
/// request. Malformed layer declarations, by contrast, are a fatal domain
/// error.
#[derive(Debug)]
pub struct MapLayerProcessor {
    name: String,
    input: String,
    output: String,
    gateway: FetchGateway,
}

impl MapLayerProcessor {
    /// The conventional instance: reads `map`, emits `map_layers`.
    pub fn new(gateway: FetchGateway) -> Self {
        Self::with_names(gateway, "map", "map", "map_layers")
    }

    pub fn with_names(
        gateway: FetchGateway,
        name: impl Into<String>,
        input: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            input: input.into(),
            output: output.into(),
            gateway,
        }
    }

    /// Fetch one layer, yielding its output entry.
    async fn fetch_layer(&self, url: &str, opacity: f64) -> Value {
        let blank = |reason: String| {
            warn!("layer '{}' blanked: {}", url, reason);
            json!({"url": url, "opacity": opacity, "blank": true, "content_length": null})
        };

        let response = match self.gateway.open(FetchRequest::get(url)).await {
            Ok(response) => response,
            Err(e) => return blank(e.to_string()),
        };
        if !response.is_success() {
            return blank(format!("{} {}", response.status(), response.status_text()));
        }
        match response.bytes().await {
            Ok(bytes) => json!({
                "url": url,
                "opacity": opacity,
                "blank": false,
                "content_length": bytes.len(),
            }),
            Err(e) => blank(e.to_string()),
        }
    }
}

#[async_trait]
impl Processor for MapLayerProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<InputDecl> {
        vec![InputDecl::new(&self.input, ValueKind::Object)]
    }

    fn outputs(&self) -> Vec<OutputDecl> {
        vec![OutputDecl::new(&self.output, ValueKind::Object)]
    }

    async fn execute(&self, ctx: &ProcessingContext) -> Result<Execution, ProcessorError> {
        let value = ctx
            .get(&self.input)
            .map_err(|source| ProcessorError::Scheduling {
                processor: self.name.clone(),
                source,
            })?;
        let map = value.as_object().ok_or_else(|| {
            ProcessorError::failed(&self.name, format!("input '{}' is not an object", self.input))
        })?;
        let layers = map.get("layers").and_then(Value::as_array).ok_or_else(|| {
            ProcessorError::failed(&self.name, "map object has no 'layers' sequence")
        })?;

        let mut entries = Vec::with_capacity(layers.len());
        for (i, layer) in layers.iter().enumerate() {
            let url = layer.get("url").and_then(Value::as_str).ok_or_else(|| {
                ProcessorError::failed(&self.name, format!("layer {i} has no 'url'"))
            })?;
            let opacity = match layer.get("opacity") {
                None | Some(Value::Null) => DEFAULT_OPACITY,
                Some(v) => v.as_f64().ok_or_else(|| {
                    ProcessorError::failed(&self.name, format!("layer {i} opacity is not a number"))
                })?,
            };
            entries.push(self.fetch_layer(url, opacity).await);
        }

        Ok(Execution::Success(vec![(
            self.output.clone(),
            PrintValue::Object(json!({"layers": entries})),
        )]))
    }
}
