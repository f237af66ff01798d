//! Small conversions shared by the request/response types.

use serde::{Deserialize, Deserializer};

use crate::error::AppError;

/// Parse a path id; anything that is not a positive integer is rejected with
/// "Invalid {entity} ID".
pub fn parse_id(raw: &str, entity: &str) -> Result<i32, AppError> {
    match raw.trim().parse::<i32>() {
        Ok(id) if id > 0 => Ok(id),
        _ => Err(AppError::bad_request(format!("Invalid {} ID", entity))),
    }
}

/// Prefix a stored `/uploads/...` path with the public base URL
pub fn public_url(base_url: &str, path: &str) -> String {
    if base_url.is_empty() || path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    format!("{}/{}", base_url.trim_end_matches('/'), path.trim_start_matches('/'))
}

/// Distinguishes an omitted field (`None`) from an explicit `null` (`Some(None)`).
/// Use with `#[serde(default, deserialize_with = "double_option")]`.
pub fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Upper-cased, trimmed, and non-blank
pub fn upper(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_uppercase())
        .filter(|v| !v.is_empty())
}
