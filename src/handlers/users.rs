// handlers/users.rs - /api/users handlers

use axum::{
    extract::{
        multipart::{Multipart, MultipartRejection},
        rejection::{JsonRejection, QueryRejection},
        Path, Query, State,
    },
    Json,
};

use crate::api::format::parse_id;
use crate::api::pagination::ListResponse;
use crate::api::user::{CreateUserRequest, GetUsersQuery, UpdateUserRequest, UserResponse};
use crate::error::AppError;
use crate::handlers::read_multipart;
use crate::middleware::{ApiResponse, ApiResult, Deleted};
use crate::state::AppState;

/// GET /api/users
pub async fn list(
    State(state): State<AppState>,
    query: Result<Query<GetUsersQuery>, QueryRejection>,
) -> ApiResult<ListResponse<UserResponse>> {
    let Query(query) = query?;
    let users = state.users.get_all(query).await?;
    Ok(ApiResponse::ok("Users retrieved successfully", users))
}

/// GET /api/users/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<UserResponse> {
    let id = parse_id(&id, "user")?;
    let user = state.users.get_by_id(id).await?;
    Ok(ApiResponse::ok("User retrieved successfully", user))
}

/// POST /api/users
pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateUserRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let Json(req) = body?;
    let user = state.users.create(req).await?;
    Ok(ApiResponse::created("User created successfully", user))
}

/// PATCH /api/users/:id
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    body: Result<Json<UpdateUserRequest>, JsonRejection>,
) -> ApiResult<UserResponse> {
    let id = parse_id(&id, "user")?;
    let Json(req) = body?;
    let user = state.users.update(id, req).await?;
    Ok(ApiResponse::ok("User updated successfully", user))
}

/// PATCH /api/users/:id/avatar - multipart with an `avatar` file field
pub async fn update_avatar(
    State(state): State<AppState>,
    Path(id): Path<String>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UserResponse> {
    let id = parse_id(&id, "user")?;
    let (_, avatar) = read_multipart(multipart, "avatar").await?;
    let user = state.users.update_avatar(id, avatar).await?;
    Ok(ApiResponse::ok("Avatar updated successfully", user))
}

/// DELETE /api/users/:id
pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> Result<Deleted, AppError> {
    let id = parse_id(&id, "user")?;
    state.users.delete(id).await?;
    Ok(Deleted::new("User"))
}
