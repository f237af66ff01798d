use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use chrono::{SecondsFormat, Utc};
use serde::Serialize;
use serde_json::{json, Value};

/// Metadata attached to every envelope
#[derive(Debug, Clone, Serialize)]
pub struct Meta {
    pub timestamp: String,
}

impl Meta {
    pub fn now() -> Self {
        Self {
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }
}

/// Wrapper for API responses that adds the `{message, data, meta}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub message: String,
    pub data: T,
    pub status_code: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response with default 200 status
    pub fn ok(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, data, StatusCode::OK)
    }

    /// Create a 201 Created response
    pub fn created(message: impl Into<String>, data: T) -> Self {
        Self::with_status(message, data, StatusCode::CREATED)
    }

    pub fn with_status(message: impl Into<String>, data: T, status_code: StatusCode) -> Self {
        Self {
            message: message.into(),
            data,
            status_code,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        // Convert data to JSON Value for consistent envelope format
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response data");
                return crate::error::AppError::internal("Failed to serialize response data")
                    .into_response();
            }
        };

        let mut envelope = json!({
            "message": self.message,
            "meta": Meta::now(),
        });
        if !data_value.is_null() {
            envelope["data"] = data_value;
        }

        (self.status_code, Json(envelope)).into_response()
    }
}

/// Body returned by delete endpoints: `{"success": true, "message": "..."}`
#[derive(Debug)]
pub struct Deleted(pub String);

impl Deleted {
    pub fn new(entity: &str) -> Self {
        Deleted(format!("{} deleted successfully", entity))
    }
}

impl IntoResponse for Deleted {
    fn into_response(self) -> Response {
        let body: Value = json!({
            "success": true,
            "message": self.0,
        });
        (StatusCode::OK, Json(body)).into_response()
    }
}

// Convenience type aliases
pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn created_wraps_data_in_envelope() {
        let response = ApiResponse::created("Division created successfully", json!({"id": 1}))
            .into_response();
        assert_eq!(response.status(), StatusCode::CREATED);

        let body = body_json(response).await;
        assert_eq!(body["message"], "Division created successfully");
        assert_eq!(body["data"]["id"], 1);
        assert!(body["meta"]["timestamp"].as_str().unwrap().ends_with('Z'));
        assert!(body.get("error").is_none());
    }

    #[tokio::test]
    async fn deleted_uses_flat_success_body() {
        let response = Deleted::new("Category").into_response();
        assert_eq!(response.status(), StatusCode::OK);

        let body = body_json(response).await;
        assert_eq!(body["success"], true);
        assert_eq!(body["message"], "Category deleted successfully");
    }
}
