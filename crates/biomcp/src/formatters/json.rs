//! JSON output and error payloads.

use serde_json::{Value, json};

use crate::error::{RequestError, ToolResult};

/// Pretty-print with two-space indentation.
pub fn to_pretty_json(data: &Value) -> ToolResult<String> {
    Ok(serde_json::to_string_pretty(data)?)
}

/// Uniform tool-facing payload for a failed request.
#[must_use]
pub fn error_payload(err: &RequestError) -> Value {
    json!({ "error": err.to_string() })
}

/// Error payload wrapped in a one-element list, for list-shaped results.
#[must_use]
pub fn error_list(err: &RequestError) -> Value {
    Value::Array(vec![error_payload(err)])
}
