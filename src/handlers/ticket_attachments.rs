// handlers/ticket_attachments.rs - /api/ticket-attachments handlers

use axum::extract::{
    multipart::{Multipart, MultipartRejection},
    rejection::QueryRejection,
    Path, Query, State,
};

use crate::api::format::parse_id;
use crate::api::pagination::ListResponse;
use crate::api::ticket_attachment::{GetTicketAttachmentsQuery, TicketAttachmentResponse};
use crate::error::AppError;
use crate::handlers::read_multipart;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

const ENTITY: &str = "ticket attachment";

/// GET /api/ticket-attachments
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GetTicketAttachmentsQuery>, QueryRejection>,
) -> ApiResult<ListResponse<TicketAttachmentResponse>> {
    let Query(query) = query?;
    let attachments = state.ticket_attachments.get_all(query).await?;
    Ok(ApiResponse::ok("Ticket attachments retrieved successfully", attachments))
}

/// GET /api/ticket-attachments/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TicketAttachmentResponse> {
    let id = parse_id(&id, ENTITY)?;
    let attachment = state.ticket_attachments.get_by_id(id).await?;
    Ok(ApiResponse::ok("Ticket attachment retrieved successfully", attachment))
}

/// POST /api/ticket-attachments - multipart with `ticketId` and `file`
pub async fn create(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<TicketAttachmentResponse> {
    let (mut fields, file) = read_multipart(multipart, "file").await?;
    let attachment = state
        .ticket_attachments
        .create(fields.remove("ticketId"), file)
        .await?;
    Ok(ApiResponse::created("Ticket attachment uploaded successfully", attachment))
}

/// DELETE /api/ticket-attachments/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Deleted, AppError> {
    let id = parse_id(&id, ENTITY)?;
    state.ticket_attachments.delete(id).await?;
    Ok(Deleted::new("Ticket attachment"))
}
