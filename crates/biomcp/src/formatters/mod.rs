//! Output formatters for Markdown and JSON.

mod json;
mod markdown;

use serde::{Deserialize, Serialize};
use serde_json::Value;

pub use self::json::{error_list, error_payload, to_pretty_json};
pub use markdown::{MAX_WIDTH, label, to_markdown, to_markdown_from, to_markdown_str};

use crate::error::ToolResult;

/// Output format for tool responses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseFormat {
    /// Human-readable Markdown format.
    #[default]
    Markdown,
    /// Machine-readable JSON format.
    Json,
}

impl ResponseFormat {
    /// Pick JSON when `json` is set, Markdown otherwise.
    #[must_use]
    pub const fn from_json_flag(json: bool) -> Self {
        if json { Self::Json } else { Self::Markdown }
    }

    /// Check if this is JSON format.
    #[must_use]
    pub const fn is_json(self) -> bool {
        matches!(self, Self::Json)
    }
}

fn is_empty(data: &Value) -> bool {
    match data {
        Value::Null => true,
        Value::Array(items) => items.is_empty(),
        Value::Object(map) => map.is_empty(),
        _ => false,
    }
}

/// Render a result in the requested format.
///
/// Empty data has nothing to render as Markdown, so it falls back to its
/// JSON text.
pub fn render_output(data: &Value, format: ResponseFormat) -> ToolResult<String> {
    match format {
        ResponseFormat::Json => to_pretty_json(data),
        ResponseFormat::Markdown if is_empty(data) => to_pretty_json(data),
        ResponseFormat::Markdown => Ok(to_markdown(data)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_render_output_markdown() {
        let out = render_output(&json!({"nct_id": "NCT1"}), ResponseFormat::Markdown)
            .unwrap();
        assert_eq!(out, "Nct Id: NCT1\n");
    }

    #[test]
    fn test_render_output_empty_falls_back() {
        let empty_list = render_output(&json!([]), ResponseFormat::Markdown).unwrap();
        assert_eq!(empty_list, "[]");
        let empty_map = render_output(&json!({}), ResponseFormat::Markdown).unwrap();
        assert_eq!(empty_map, "{}");
    }

    #[test]
    fn test_response_format_serde() {
        let fmt: ResponseFormat = serde_json::from_value(json!("json")).unwrap();
        assert!(fmt.is_json());
        assert_eq!(ResponseFormat::default(), ResponseFormat::Markdown);
    }
}
