//! Single-variant retrieval from MyVariant.info.

use serde_json::Value;

use super::filters::filter_variants;
use super::links::inject_links;
use crate::error::ToolResult;
use crate::formatters::{ResponseFormat, error_list, render_output};
use crate::tools::ToolContext;

/// Wrap an object as a one-element list; lists pass through, null is empty.
fn ensure_list(value: Value) -> Vec<Value> {
    match value {
        Value::Array(items) => items,
        Value::Null => Vec::new(),
        other => vec![other],
    }
}

/// Fetch every annotation for a variant id (`chr7:g.140453136A>T` or an rsID)
/// and render it with links added and noisy paths removed.
pub async fn get_variant(
    ctx: &ToolContext,
    variant_id: &str,
    format: ResponseFormat,
) -> ToolResult<String> {
    let url = format!("{}/variant/{}", ctx.config.myvariant_url, variant_id);
    let request = ctx.get(url).param("fields", "all");
    tracing::debug!(variant_id, "Fetching variant");

    let data = match ctx.client.request_value(&request).await {
        Ok(response) => {
            let mut variants = ensure_list(response);
            inject_links(&mut variants);
            Value::Array(filter_variants(variants))
        }
        Err(e) => error_list(&e),
    };

    render_output(&data, format)
}
