// handlers/ticket_resolutions.rs - /api/ticket-resolutions handlers

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};

use crate::api::format::parse_id;
use crate::api::pagination::ListResponse;
use crate::api::ticket_resolution::{
    CreateTicketResolutionRequest, GetTicketResolutionsQuery, TicketResolutionResponse,
    UpdateTicketResolutionRequest,
};
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

const ENTITY: &str = "ticket resolution";

/// GET /api/ticket-resolutions
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GetTicketResolutionsQuery>, QueryRejection>,
) -> ApiResult<ListResponse<TicketResolutionResponse>> {
    let Query(query) = query?;
    let resolutions = state.ticket_resolutions.get_all(query).await?;
    Ok(ApiResponse::ok("Ticket resolutions retrieved successfully", resolutions))
}

/// GET /api/ticket-resolutions/:id
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<TicketResolutionResponse> {
    let id = parse_id(&id, ENTITY)?;
    let resolution = state.ticket_resolutions.get_by_id(id).await?;
    Ok(ApiResponse::ok("Ticket resolution retrieved successfully", resolution))
}

/// POST /api/ticket-resolutions
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateTicketResolutionRequest>, JsonRejection>,
) -> ApiResult<TicketResolutionResponse> {
    let Json(req) = body?;
    let resolution = state.ticket_resolutions.create(req).await?;
    Ok(ApiResponse::created("Ticket resolution created successfully", resolution))
}

/// PATCH /api/ticket-resolutions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTicketResolutionRequest>, JsonRejection>,
) -> ApiResult<TicketResolutionResponse> {
    let id = parse_id(&id, ENTITY)?;
    let Json(req) = body?;
    let resolution = state.ticket_resolutions.update(id, req).await?;
    Ok(ApiResponse::ok("Ticket resolution updated successfully", resolution))
}

/// DELETE /api/ticket-resolutions/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Deleted, AppError> {
    let id = parse_id(&id, ENTITY)?;
    state.ticket_resolutions.delete(id).await?;
    Ok(Deleted::new("Ticket resolution"))
}
