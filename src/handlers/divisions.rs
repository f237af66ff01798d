// handlers/divisions.rs - /api/divisions handlers

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};

use crate::api::division::{CreateDivisionRequest, DivisionResponse, GetDivisionsQuery, UpdateDivisionRequest};
use crate::api::format::parse_id;
use crate::api::pagination::ListResponse;
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

/// GET /api/divisions - filtered, paginated list
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GetDivisionsQuery>, QueryRejection>,
) -> ApiResult<ListResponse<DivisionResponse>> {
    let Query(query) = query?;
    let divisions = state.divisions.get_all(query).await?;
    Ok(ApiResponse::ok("Divisions retrieved successfully", divisions))
}

/// GET /api/divisions/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<DivisionResponse> {
    let id = parse_id(&id, "division")?;
    let division = state.divisions.get_by_id(id).await?;
    Ok(ApiResponse::ok("Division retrieved successfully", division))
}

/// POST /api/divisions
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateDivisionRequest>, JsonRejection>,
) -> ApiResult<DivisionResponse> {
    let Json(req) = body?;
    let division = state.divisions.create(req).await?;
    Ok(ApiResponse::created("Division created successfully", division))
}

/// PATCH /api/divisions/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateDivisionRequest>, JsonRejection>,
) -> ApiResult<DivisionResponse> {
    let id = parse_id(&id, "division")?;
    let Json(req) = body?;
    let division = state.divisions.update(id, req).await?;
    Ok(ApiResponse::ok("Division updated successfully", division))
}

/// DELETE /api/divisions/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Deleted, AppError> {
    let id = parse_id(&id, "division")?;
    state.divisions.delete(id).await?;
    Ok(Deleted::new("Division"))
}
