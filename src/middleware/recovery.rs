use std::any::Any;

use axum::response::{IntoResponse, Response};

use crate::error::AppError;

/// Panic handler for `CatchPanicLayer`: log the payload, answer with the error envelope
pub fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    tracing::error!(panic = %detail, "panic recovered");

    AppError::internal("Internal server error").into_response()
}
