//! Request body helpers

use axum::body::{to_bytes, Body};
use serde::de::DeserializeOwned;

use crate::error::{ServerError, ServerResult};

/// Largest JSON body accepted by the payment endpoints
pub const MAX_JSON_BODY: usize = 64 * 1024;

/// Read and parse a JSON body; an empty body parses as `{}`
pub async fn read_json<T: DeserializeOwned>(body: Body) -> ServerResult<T> {
    let bytes = to_bytes(body, MAX_JSON_BODY)
        .await
        .map_err(|e| ServerError::InvalidArgument(format!("Failed to read body: {}", e)))?;

    parse_json(&bytes)
}

/// Parse JSON bytes, treating whitespace-only input as an empty object
pub fn parse_json<T: DeserializeOwned>(bytes: &[u8]) -> ServerResult<T> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(serde_json::from_slice(b"{}")?);
    }
    Ok(serde_json::from_slice(bytes)?)
}
