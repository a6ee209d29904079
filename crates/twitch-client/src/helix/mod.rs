//! Helix API request layer.
//!
//! [`HelixClient`] attaches a current bearer token and the `Client-Id`
//! header to every call, drops null fields from parameters and bodies, and
//! maps failures onto [`ClientError`].

use log::debug;
use reqwest::header::HeaderMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ClientError;

mod client;

pub use client::HelixClient;

/// Default Helix API root.
pub const HELIX_BASE_URL: &str = "https://api.twitch.tv/helix";

/// Header carrying the epoch second at which the rate-limit bucket refills.
pub const RATELIMIT_RESET_HEADER: &str = "ratelimit-reset";

/// Error body returned by Helix, e.g.
/// `{"error":"Bad Request","status":400,"message":"Missing required parameter"}`.
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Serializes `value` and removes its top-level null fields.
///
/// `()`, `None` and JSON `null` all serialize to `Value::Null`, which callers
/// treat as "absent".
pub(crate) fn to_payload<T: Serialize + ?Sized>(value: &T) -> Result<Value, ClientError> {
    Ok(strip_nulls(serde_json::to_value(value)?))
}

/// Removes null-valued fields from a top-level object. Nested values and
/// non-object values are returned unchanged.
pub(crate) fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(map.into_iter().filter(|(_, v)| !v.is_null()).collect()),
        other => other,
    }
}

/// Flattens query parameters into key/value pairs.
///
/// Arrays expand into one pair per element, so `{"id": ["1", "2"]}` becomes
/// `id=1&id=2`. Strings are sent verbatim; other values use their JSON text.
pub(crate) fn query_pairs(params: Value) -> Result<Vec<(String, String)>, ClientError> {
    let map = match params {
        Value::Null => return Ok(Vec::new()),
        Value::Object(map) => map,
        other => {
            return Err(ClientError::InvalidRequest(format!(
                "Query parameters must be an object, got {other}"
            )));
        }
    };

    let mut pairs = Vec::with_capacity(map.len());
    for (key, value) in map {
        match value {
            Value::Null => {}
            Value::Array(items) => pairs.extend(
                items
                    .into_iter()
                    .filter(|item| !item.is_null())
                    .map(|item| (key.clone(), query_value(item))),
            ),
            value => pairs.push((key, query_value(value))),
        }
    }

    Ok(pairs)
}

fn query_value(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}

/// `Ratelimit-Reset` as an integer, if present and numeric.
pub(crate) fn rate_limit_reset(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(RATELIMIT_RESET_HEADER)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

/// Builds an [`ClientError::ApiError`] from a non-success response body.
pub(crate) fn api_error(status: u16, body: &str) -> ClientError {
    match serde_json::from_str::<ErrorResponse>(body) {
        Ok(parsed) => {
            debug!("Parsed structured error response");
            ClientError::ApiError {
                status,
                message: parsed.message.unwrap_or_else(|| body.to_string()),
                error: parsed.error,
            }
        }
        Err(parse_err) => {
            debug!("Failed to parse error response as JSON: {parse_err}. Using raw text instead.");
            ClientError::ApiError {
                status,
                message: body.to_string(),
                error: None,
            }
        }
    }
}
