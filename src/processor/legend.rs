//! Legend resolution stage.

use async_trait::async_trait;
use log::debug;
use printflow_http::{FetchGateway, FetchRequest};
use printflow_traits::{
    Execution, InputDecl, OutputDecl, ProcessingContext, Processor, ProcessorError,
};
use printflow_values::{PrintValue, ValueKind};
use serde_json::Value;

/// Resolves a legend attribute by fetching every icon it references.
///
/// A legend payload is a nested structure of classes, each carrying a list
/// of icon URLs. An unreachable or missing icon degrades the whole stage
/// (placeholder output plus a warning); it never fails the request, since a
/// report without its legend graphics is still a report.
#[derive(Debug)]
pub struct LegendProcessor {
    name: String,
    input: String,
    output: String,
    gateway: FetchGateway,
}

impl LegendProcessor {
    /// The conventional instance: reads `legend`, emits `legend_entries`.
    pub fn new(gateway: FetchGateway) -> Self {
        Self::with_names(gateway, "legend", "legend", "legend_entries")
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

    /// Collect icon URLs from the legend tree. Classes may nest.
    fn collect_icons(node: &Value, icons: &mut Vec<String>) {
        if let Some(urls) = node.get("icons").and_then(Value::as_array) {
            for url in urls {
                if let Some(url) = url.as_str() {
                    icons.push(url.to_string());
                }
            }
        }
        if let Some(classes) = node.get("classes").and_then(Value::as_array) {
            for class in classes {
                Self::collect_icons(class, icons);
            }
        }
    }
}

#[async_trait]
impl Processor for LegendProcessor {
    fn name(&self) -> &str {
        &self.name
    }

    fn inputs(&self) -> Vec<InputDecl> {
        vec![InputDecl::new(&self.input, ValueKind::Legend)]
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
        let legend = value.as_object().ok_or_else(|| {
            ProcessorError::failed(&self.name, format!("input '{}' is not a legend", self.input))
        })?;

        let mut icons = Vec::new();
        Self::collect_icons(legend, &mut icons);

        for url in &icons {
            let response = match self.gateway.open(FetchRequest::get(url)).await {
                Ok(response) => response,
                Err(e) => {
                    return Ok(Execution::Degraded {
                        reason: format!("legend icon '{url}' unavailable: {e}"),
                    });
                }
            };
            if !response.is_success() {
                return Ok(Execution::Degraded {
                    reason: format!(
                        "legend icon '{url}' unavailable: {} {}",
                        response.status(),
                        response.status_text()
                    ),
                });
            }
            match response.bytes().await {
                Ok(bytes) => debug!("legend icon '{}' resolved ({} bytes)", url, bytes.len()),
                Err(e) => {
                    return Ok(Execution::Degraded {
                        reason: format!("legend icon '{url}' unreadable: {e}"),
                    });
                }
            }
        }

        Ok(Execution::Success(vec![(
            self.output.clone(),
            PrintValue::Object(legend.clone()),
        )]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use printflow_http::{CannedResponse, InMemoryTransport};
    use serde_json::json;
    use std::sync::Arc;

    fn legend_with_icon(url: &str) -> Value {
        json!({
            "name": "Roads",
            "classes": [{"name": "Highway", "icons": [url]}],
        })
    }

    fn gateway(transport: Arc<InMemoryTransport>) -> FetchGateway {
        FetchGateway::new(transport)
    }

    #[tokio::test]
    async fn test_resolved_legend_passes_through() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.add(
            "http://example.com/highway.png",
            CannedResponse::ok(b"png".to_vec()),
        );
        let legend = legend_with_icon("http://example.com/highway.png");

        let ctx = ProcessingContext::new();
        ctx.bind("legend", PrintValue::Object(legend.clone())).unwrap();

        let outcome = LegendProcessor::new(gateway(transport))
            .execute(&ctx)
            .await
            .unwrap();
        assert_eq!(
            outcome,
            Execution::Success(vec![(
                "legend_entries".to_string(),
                PrintValue::Object(legend)
            )])
        );
    }

    #[tokio::test]
    async fn test_unreachable_icon_degrades() {
        let transport = Arc::new(InMemoryTransport::new());
        let ctx = ProcessingContext::new();
        ctx.bind(
            "legend",
            PrintValue::Object(legend_with_icon("http://example.com/missing.png")),
        )
        .unwrap();

        let outcome = LegendProcessor::new(gateway(transport))
            .execute(&ctx)
            .await
            .unwrap();
        assert!(matches!(outcome, Execution::Degraded { .. }));
    }

    #[tokio::test]
    async fn test_404_icon_degrades() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.add(
            "http://example.com/gone.png",
            CannedResponse::status(404, "Not Found"),
        );
        let ctx = ProcessingContext::new();
        ctx.bind(
            "legend",
            PrintValue::Object(legend_with_icon("http://example.com/gone.png")),
        )
        .unwrap();

        let outcome = LegendProcessor::new(gateway(transport))
            .execute(&ctx)
            .await
            .unwrap();
        let Execution::Degraded { reason } = outcome else {
            panic!("expected degraded outcome");
        };
        assert!(reason.contains("404"));
    }

    #[tokio::test]
    async fn test_nested_classes_are_walked() {
        let transport = Arc::new(InMemoryTransport::new());
        transport.add("http://example.com/inner.png", CannedResponse::ok(vec![1]));
        let legend = json!({
            "name": "Base",
            "classes": [{
                "name": "Group",
                "classes": [{"name": "Leaf", "icons": ["http://example.com/inner.png"]}],
            }],
        });
        let ctx = ProcessingContext::new();
        ctx.bind("legend", PrintValue::Object(legend)).unwrap();

        let outcome = LegendProcessor::new(gateway(transport.clone()))
            .execute(&ctx)
            .await
            .unwrap();
        assert!(matches!(outcome, Execution::Success(_)));
        assert_eq!(transport.dispatched().len(), 1);
    }
}
