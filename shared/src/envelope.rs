//! List and mutation response envelopes
//!
//! The backends disagree on where they put the row array and the total
//! count. Decoding tries a fixed fallback order so every list endpoint can
//! be read the same way.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ModelError, ModelResult};

/// Generic row keys tried after the resource-specific one
pub const FALLBACK_ROW_KEYS: &[&str] = &["data", "rows", "items"];

/// One settled page of a list endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListPage<T> {
    pub rows: Vec<T>,
    pub total: u64,
}

impl ListPage<Value> {
    /// Decode a list response, trying `primary_key` first then
    /// [`FALLBACK_ROW_KEYS`]. A bare JSON array is accepted as the rows.
    ///
    /// The total is read from `pagination.total`, then `total`, then falls
    /// back to the row count.
    pub fn from_response(body: Value, primary_key: &str) -> ModelResult<Self> {
        let Value::Object(mut map) = body else {
            return match body {
                Value::Array(rows) => {
                    let total = rows.len() as u64;
                    Ok(Self { rows, total })
                }
                other => Err(ModelError::NotAnObject(json_kind(&other))),
            };
        };

        let keys = std::iter::once(primary_key).chain(FALLBACK_ROW_KEYS.iter().copied());
        let mut rows = None;
        for key in keys {
            if let Some(Value::Array(found)) = map.remove(key) {
                rows = Some(found);
                break;
            }
        }
        let rows = rows.ok_or_else(|| ModelError::MissingRows {
            tried: std::iter::once(primary_key)
                .chain(FALLBACK_ROW_KEYS.iter().copied())
                .collect::<Vec<_>>()
                .join(", "),
        })?;

        let total = map
            .get("pagination")
            .and_then(|p| p.get("total"))
            .and_then(as_count)
            .or_else(|| map.get("total").and_then(as_count))
            .unwrap_or(rows.len() as u64);

        Ok(Self { rows, total })
    }

    /// Decode raw rows into typed records
    pub fn decode<T: serde::de::DeserializeOwned>(self) -> ModelResult<ListPage<T>> {
        let rows = self
            .rows
            .into_iter()
            .map(serde_json::from_value)
            .collect::<Result<Vec<T>, _>>()?;
        Ok(ListPage {
            rows,
            total: self.total,
        })
    }
}

/// Counts sometimes arrive as strings
fn as_count(v: &Value) -> Option<u64> {
    match v {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Success body of an `add-<entity>` mutation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MutationReply {
    #[serde(default)]
    pub data: Option<Value>,
    #[serde(default)]
    pub message: Option<String>,
    /// Out-of-band default password note for affiliate/vendor creation
    #[serde(default)]
    pub password_note: Option<String>,
}

/// Structured error body; `error` wins over `message`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    pub fn text(&self) -> Option<&str> {
        self.error
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .or_else(|| self.message.as_deref().filter(|s| !s.trim().is_empty()))
    }
}
