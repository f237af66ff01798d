//! Business rules per feature.
//!
//! Services validate requests, enforce uniqueness and reference rules, and
//! translate storage failures into client-safe [`AppError`]s. They are cheap
//! to clone: every dependency sits behind an `Arc`.

use std::collections::HashMap;

use tracing::error;

use crate::database::DatabaseError;
use crate::error::AppError;

pub mod category_service;
pub mod division_service;
pub mod ticket_attachment_service;
pub mod ticket_resolution_service;
pub mod ticket_service;
pub mod user_service;

pub use category_service::CategoryService;
pub use division_service::DivisionService;
pub use ticket_attachment_service::TicketAttachmentService;
pub use ticket_resolution_service::TicketResolutionService;
pub use ticket_service::TicketService;
pub use user_service::UserService;

/// Validation failure on a single field
pub(crate) fn field_error(field: &str, message: impl Into<String>) -> AppError {
    let mut details = HashMap::new();
    details.insert(field.to_string(), message.into());
    AppError::validation("Validation failed").with_details(details)
}

/// Log the storage error and hide it behind `message`
pub(crate) fn internal(err: DatabaseError, message: &str) -> AppError {
    error!(error = %err, "{}", message);
    AppError::internal(message)
}
