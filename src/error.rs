// HTTP API Error Types
use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::{json, Map, Value};
use std::collections::HashMap;

use crate::middleware::response::Meta;

pub const CODE_NOT_FOUND: &str = "NOT_FOUND";
pub const CODE_ALREADY_EXISTS: &str = "ALREADY_EXISTS";
pub const CODE_VALIDATION_ERROR: &str = "VALIDATION_ERROR";
pub const CODE_INTERNAL_ERROR: &str = "INTERNAL_SERVER_ERROR";
pub const CODE_BAD_REQUEST: &str = "BAD_REQUEST";

/// Application error with an HTTP status, a stable code, and a client-safe message
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AppError {
    // 404 Not Found
    #[error("{0} not found")]
    NotFound(String),

    // 409 Conflict
    #[error("{0} already exists")]
    AlreadyExists(String),

    // 400 Bad Request, with per-field details
    #[error("{message}")]
    Validation {
        message: String,
        details: HashMap<String, String>,
    },

    // 400 Bad Request
    #[error("{0}")]
    BadRequest(String),

    // 500 Internal Server Error
    #[error("{0}")]
    Internal(String),
}

impl AppError {
    /// `resource` is the subject of the message, e.g. "Division" -> "Division not found"
    pub fn not_found(resource: impl Into<String>) -> Self {
        AppError::NotFound(resource.into())
    }

    pub fn already_exists(resource: impl Into<String>) -> Self {
        AppError::AlreadyExists(resource.into())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        AppError::Validation {
            message: message.into(),
            details: HashMap::new(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        AppError::Internal(message.into())
    }

    /// Attach field-level details. Only validation errors carry them on the wire.
    pub fn with_details(self, details: HashMap<String, String>) -> Self {
        match self {
            AppError::Validation { message, .. } => AppError::Validation { message, details },
            other => other,
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::AlreadyExists(_) => StatusCode::CONFLICT,
            AppError::Validation { .. } => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => CODE_NOT_FOUND,
            AppError::AlreadyExists(_) => CODE_ALREADY_EXISTS,
            AppError::Validation { .. } => CODE_VALIDATION_ERROR,
            AppError::BadRequest(_) => CODE_BAD_REQUEST,
            AppError::Internal(_) => CODE_INTERNAL_ERROR,
        }
    }

    pub fn details(&self) -> Option<&HashMap<String, String>> {
        match self {
            AppError::Validation { details, .. } if !details.is_empty() => Some(details),
            _ => None,
        }
    }

    /// Convert to the JSON error envelope
    pub fn to_json(&self) -> Value {
        let mut error = Map::new();
        error.insert("code".into(), Value::String(self.code().to_string()));
        error.insert("message".into(), Value::String(self.to_string()));
        if let Some(details) = self.details() {
            error.insert("details".into(), json!(details));
        }

        json!({
            "error": Value::Object(error),
            "meta": Meta::now(),
        })
    }
}

// Extractor rejections never leak framework wording to clients
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected request body");
        AppError::bad_request("Invalid request body")
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected query string");
        AppError::bad_request("Invalid query parameters")
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        tracing::debug!(error = %rejection, "rejected path parameters");
        AppError::bad_request("Invalid path parameters")
    }
}

// Automatic HTTP response conversion for Axum
impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_kinds_to_status_and_code() {
        let cases = [
            (AppError::not_found("Division"), StatusCode::NOT_FOUND, "NOT_FOUND"),
            (AppError::already_exists("Category"), StatusCode::CONFLICT, "ALREADY_EXISTS"),
            (AppError::validation("Validation failed"), StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            (AppError::bad_request("Invalid user ID"), StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            (AppError::internal("boom"), StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_SERVER_ERROR"),
        ];

        for (err, status, code) in cases {
            assert_eq!(err.status_code(), status, "{err:?}");
            assert_eq!(err.code(), code, "{err:?}");
        }
    }

    #[test]
    fn resource_messages_are_formatted() {
        assert_eq!(AppError::not_found("User").to_string(), "User not found");
        assert_eq!(
            AppError::already_exists("User with this email").to_string(),
            "User with this email already exists"
        );
    }

    #[test]
    fn details_only_render_for_validation() {
        let mut details = HashMap::new();
        details.insert("name".to_string(), "name is required".to_string());

        let err = AppError::validation("Validation failed").with_details(details.clone());
        let body = err.to_json();
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["details"]["name"], "name is required");
        assert!(body["meta"]["timestamp"].is_string());

        let err = AppError::bad_request("nope").with_details(details);
        let body = err.to_json();
        assert!(body["error"].get("details").is_none());
    }
}
