// handlers/categories.rs - /api/categories handlers

use axum::{
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    Json,
};

use crate::api::category::{CreateCategoryRequest, CategoryResponse, GetCategoriesQuery, UpdateCategoryRequest};
use crate::api::format::parse_id;
use crate::api::pagination::ListResponse;
use crate::error::AppError;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

/// GET /api/categories - filtered, paginated list
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GetCategoriesQuery>, QueryRejection>,
) -> ApiResult<ListResponse<CategoryResponse>> {
    let Query(query) = query?;
    let categories = state.categories.get_all(query).await?;
    Ok(ApiResponse::ok("Categories retrieved successfully", categories))
}

/// GET /api/categories/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<CategoryResponse> {
    let id = parse_id(&id, "category")?;
    let category = state.categories.get_by_id(id).await?;
    Ok(ApiResponse::ok("Category retrieved successfully", category))
}

/// POST /api/categories
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateCategoryRequest>, JsonRejection>,
) -> ApiResult<CategoryResponse> {
    let Json(req) = body?;
    let category = state.categories.create(req).await?;
    Ok(ApiResponse::created("Category created successfully", category))
}

/// PATCH /api/categories/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateCategoryRequest>, JsonRejection>,
) -> ApiResult<CategoryResponse> {
    let id = parse_id(&id, "category")?;
    let Json(req) = body?;
    let category = state.categories.update(id, req).await?;
    Ok(ApiResponse::ok("Category updated successfully", category))
}

/// DELETE /api/categories/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Deleted, AppError> {
    let id = parse_id(&id, "category")?;
    state.categories.delete(id).await?;
    Ok(Deleted::new("Category"))
}
