//! MCP tool implementations.
//!
//! Each tool:
//! 1. Parses and validates its arguments
//! 2. Calls one domain operation through the shared [`HttpClient`]
//! 3. Returns Markdown or JSON text
//!
//! Upstream failures are rendered into the returned text; only invalid
//! arguments surface as [`ToolError`](crate::error::ToolError).

mod articles;
mod trials;
mod variants;

pub use articles::{ArticleDetailsTool, ArticleSearcherTool};
pub use trials::{
    TrialLocationsTool, TrialOutcomesTool, TrialProtocolTool, TrialReferencesTool,
    TrialSearcherTool,
};
pub use variants::{VariantDetailsTool, VariantSearcherTool};

use std::sync::Arc;

use crate::client::{ApiRequest, HttpClient};
use crate::config::Config;
use crate::error::ToolResult;

/// Tool execution context.
#[derive(Debug, Clone)]
pub struct ToolContext {
    /// Shared HTTP client and cache.
    pub client: Arc<HttpClient>,
    /// Upstream URLs and cache policy.
    pub config: Arc<Config>,
}

impl ToolContext {
    /// Create a new tool context.
    #[must_use]
    pub fn new(client: Arc<HttpClient>, config: Arc<Config>) -> Self {
        Self { client, config }
    }

    /// Build a context with a client created from `config`.
    ///
    /// # Errors
    ///
    /// Returns error if the cache or HTTP client cannot be created.
    pub fn from_config(config: Config) -> anyhow::Result<Self> {
        let client = HttpClient::new(&config)?;
        Ok(Self::new(Arc::new(client), Arc::new(config)))
    }

    /// GET request carrying the configured cache TTL.
    #[must_use]
    pub fn get(&self, url: impl Into<String>) -> ApiRequest {
        ApiRequest::get(url).cache_ttl(self.config.cache_ttl)
    }

    /// POST request carrying the configured cache TTL.
    #[must_use]
    pub fn post(&self, url: impl Into<String>) -> ApiRequest {
        ApiRequest::post(url).cache_ttl(self.config.cache_ttl)
    }
}

/// Trait for MCP tools.
#[async_trait::async_trait]
pub trait McpTool: Send + Sync {
    /// Tool name (e.g., "trial_searcher").
    fn name(&self) -> &'static str;

    /// Tool description for LLM.
    fn description(&self) -> &'static str;

    /// JSON Schema for input parameters.
    fn input_schema(&self) -> serde_json::Value;

    /// Execute the tool with given input.
    async fn execute(&self, ctx: &ToolContext, input: serde_json::Value) -> ToolResult<String>;
}

/// `response_format` property shared by every tool schema.
fn response_format_schema() -> serde_json::Value {
    serde_json::json!({
        "type": "string",
        "enum": ["markdown", "json"],
        "default": "markdown",
        "description": "Output format"
    })
}

/// Register all tools.
#[must_use]
pub fn register_all_tools() -> Vec<Box<dyn McpTool>> {
    vec![
        // Article tools (2)
        Box::new(ArticleSearcherTool),
        Box::new(ArticleDetailsTool),
        // Trial tools (5)
        Box::new(TrialSearcherTool),
        Box::new(TrialProtocolTool),
        Box::new(TrialLocationsTool),
        Box::new(TrialOutcomesTool),
        Box::new(TrialReferencesTool),
        // Variant tools (2)
        Box::new(VariantSearcherTool),
        Box::new(VariantDetailsTool),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_all_tools_names() {
        let names: Vec<&str> = register_all_tools()
            .iter()
            .map(|t| t.name())
            .collect();
        assert_eq!(
            names,
            vec![
                "article_searcher",
                "article_details",
                "trial_searcher",
                "trial_protocol",
                "trial_locations",
                "trial_outcomes",
                "trial_references",
                "variant_searcher",
                "variant_details",
            ]
        );
    }

    #[test]
    fn test_every_schema_offers_response_format() {
        for tool in register_all_tools() {
            let schema = tool.input_schema();
            assert_eq!(schema["type"], "object", "{}", tool.name());
            assert!(
                schema["properties"]["response_format"].is_object(),
                "{}",
                tool.name()
            );
        }
    }
}
