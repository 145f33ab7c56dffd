//! Body parsing for 200 responses.
//!
//! Typed parsing deserializes straight into the caller's shape. Untyped
//! parsing sniffs the body: JSON when it opens with `{` or `[`, CSV when it
//! contains a comma, otherwise plain text wrapped as `{"text": body}`.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{RequestError, RequestResult};

/// Deserialize a body into `T`.
pub fn parse_typed<T: DeserializeOwned>(body: &str) -> RequestResult<T> {
    serde_json::from_str(body).map_err(RequestError::parse)
}

/// Parse a body without a known shape.
pub fn parse_value(body: &str) -> RequestResult<Value> {
    let trimmed = body.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        serde_json::from_str(body).map_err(RequestError::parse)
    } else if body.contains(',') {
        parse_csv(body)
    } else {
        let mut map = Map::new();
        map.insert("text".to_string(), Value::String(body.to_string()));
        Ok(Value::Object(map))
    }
}

/// Parse CSV with a header row into an array of objects.
///
/// Rows shorter than the header get `null` for the missing cells.
pub fn parse_csv(body: &str) -> RequestResult<Value> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(RequestError::parse)?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(RequestError::parse)?;
        let mut row = Map::new();
        for (idx, header) in headers.iter().enumerate() {
            let cell = record.get(idx).map_or(Value::Null, |v| Value::String(v.to_string()));
            row.insert(header.clone(), cell);
        }
        rows.push(Value::Object(row));
    }

    Ok(Value::Array(rows))
}
