//! Page decoding

use super::types::DecodeConfig;
use crate::error::{Error, Result};
use crate::types::{OptionStringExt, Page, Record};
use serde_json::Value;

/// Decodes JSON response bodies into pages
#[derive(Debug, Clone, Default)]
pub struct PageDecoder {
    config: DecodeConfig,
}

impl PageDecoder {
    /// Create a decoder
    pub fn new(config: DecodeConfig) -> Self {
        Self { config }
    }

    /// Decoder configuration
    pub fn config(&self) -> &DecodeConfig {
        &self.config
    }

    /// Decode a response body
    pub fn decode(&self, body: &str) -> Result<Page> {
        let value: Value = serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })?;
        self.decode_value(&value)
    }

    /// Decode an already parsed response
    pub fn decode_value(&self, value: &Value) -> Result<Page> {
        let records = self
            .extract_records(value)?
            .iter()
            .enumerate()
            .map(|(index, raw)| self.to_record(index, raw))
            .collect::<Result<Vec<_>>>()?;

        let next_cursor = extract_path(value, &self.config.next_cursor_path)
            .and_then(|v| scalar_to_string(&v))
            .none_if_empty();

        Ok(Page::new(records, next_cursor))
    }

    fn extract_records(&self, value: &Value) -> Result<Vec<Value>> {
        let Some(path) = &self.config.records_path else {
            return match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Err(Error::record_extraction("$", "response body is not an array")),
            };
        };

        if path.contains('*') {
            return extract_with_jsonpath(value, path);
        }

        match extract_path(value, path) {
            Some(Value::Array(arr)) => Ok(arr),
            Some(Value::Null) | None => Ok(Vec::new()),
            Some(_) => Err(Error::record_extraction(path, "expected an array")),
        }
    }

    fn to_record(&self, index: usize, raw: &Value) -> Result<Record> {
        let id = extract_path(raw, &self.config.id_field)
            .and_then(|v| scalar_to_string(&v))
            .none_if_empty()
            .ok_or_else(|| {
                Error::record_extraction(
                    &self.config.id_field,
                    format!("record {index} has no usable id"),
                )
            })?;

        let display_name = extract_path(raw, &self.config.name_field)
            .and_then(|v| scalar_to_string(&v))
            .ok_or_else(|| {
                Error::record_extraction(
                    &self.config.name_field,
                    format!("record {index} (id {id}) has no display name"),
                )
            })?;

        Ok(Record { id, display_name })
    }
}

/// Render a scalar JSON value as a string
fn scalar_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Extract a value using simple dot-notation path
///
/// Supports a leading `$.`, nested keys and array indexing such as
/// `data[0]` or `items[-1]`.
pub fn extract_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        let Some(bracket_pos) = part.find('[') else {
            current = current.get(part)?;
            continue;
        };

        let name = &part[..bracket_pos];
        let index_str = part[bracket_pos + 1..].strip_suffix(']')?;
        if !name.is_empty() {
            current = current.get(name)?;
        }

        let index = index_str.parse::<i64>().ok()?;
        let Value::Array(arr) = current else {
            return None;
        };
        #[allow(clippy::cast_possible_wrap)]
        let idx = if index < 0 {
            arr.len() as i64 + index
        } else {
            index
        };
        current = arr.get(usize::try_from(idx).ok()?)?;
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path).map_err(|e| Error::JsonPath {
        message: format!("Invalid JSONPath: {e}"),
    })?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
