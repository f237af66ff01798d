// handlers/tickets.rs - /api/tickets handlers

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};

use crate::api::format::parse_id;
use crate::api::pagination::ListResponse;
use crate::api::ticket::{CreateTicketRequest, GetTicketsQuery, TicketResponse, UpdateTicketRequest};
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

/// GET /api/tickets
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GetTicketsQuery>, QueryRejection>,
) -> ApiResult<ListResponse<TicketResponse>> {
    let Query(query) = query?;
    let tickets = state.tickets.get_all(query).await?;
    Ok(ApiResponse::ok("Tickets retrieved successfully", tickets))
}

/// GET /api/tickets/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<TicketResponse> {
    let id = parse_id(&id, "ticket")?;
    let ticket = state.tickets.get_by_id(id).await?;
    Ok(ApiResponse::ok("Ticket retrieved successfully", ticket))
}

/// POST /api/tickets
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> ApiResult<TicketResponse> {
    let Json(req) = body?;
    let ticket = state.tickets.create(req).await?;
    Ok(ApiResponse::created("Ticket created successfully", ticket))
}

/// PATCH /api/tickets/:id - omitted optional fields keep their values
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateTicketRequest>, JsonRejection>,
) -> ApiResult<TicketResponse> {
    let id = parse_id(&id, "ticket")?;
    let Json(req) = body?;
    let ticket = state.tickets.update(id, req).await?;
    Ok(ApiResponse::ok("Ticket updated successfully", ticket))
}

/// DELETE /api/tickets/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Deleted, AppError> {
    let id = parse_id(&id, "ticket")?;
    state.tickets.delete(id).await?;
    Ok(Deleted::new("Ticket"))
}
