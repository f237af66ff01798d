//! Request and response types for the HTTP API.
//!
//! Requests validate themselves into the storage-facing shapes under
//! `database::models`; responses are the camelCase JSON clients see.

pub mod category;
pub mod division;
pub mod format;
pub mod pagination;
pub mod ticket;
pub mod ticket_attachment;
pub mod ticket_resolution;
pub mod user;

pub use pagination::{ListResponse, PaginationQuery, PaginationResponse};
