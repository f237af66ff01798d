use std::sync::Arc;

use tracing::{info, warn};

use crate::api::pagination::ListResponse;
use crate::api::user::{CreateUserRequest, GetUsersQuery, UpdateUserRequest, UserResponse};
use crate::database::models::{NewUser, UserChanges, UserWithDivision};
use crate::database::repository::UserRepository;
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::services::{field_error, internal, DivisionService};
use crate::uploads::{UploadStore, UploadedFile};

#[derive(Clone)]
pub struct UserService {
    repo: Arc<dyn UserRepository>,
    divisions: DivisionService,
    uploads: UploadStore,
    base_url: String,
    bcrypt_cost: u32,
}

impl UserService {
    pub fn new(
        repo: Arc<dyn UserRepository>,
        divisions: DivisionService,
        uploads: UploadStore,
        base_url: String,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            repo,
            divisions,
            uploads,
            base_url,
            bcrypt_cost,
        }
    }

    fn respond(&self, user: UserWithDivision) -> UserResponse {
        UserResponse::from_row(user, &self.base_url)
    }

    pub async fn get_all(&self, query: GetUsersQuery) -> Result<ListResponse<UserResponse>, AppError> {
        let filter = query.into_filter()?;

        let (users, total) = self
            .repo
            .get_all(&filter)
            .await
            .map_err(|e| internal(e, "Failed to retrieve users"))?;

        let items = users.into_iter().map(|u| self.respond(u)).collect();
        Ok(ListResponse::new(items, filter.page, total))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<UserResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid user ID"));
        }

        let user = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to retrieve user"))?
            .ok_or_else(|| AppError::not_found("User"))?;

        Ok(self.respond(user))
    }

    pub async fn create(&self, req: CreateUserRequest) -> Result<UserResponse, AppError> {
        if let Err(e) = req.validate() {
            warn!(error = %e, "user validation failed");
            return Err(e);
        }

        let email = req.email.trim().to_string();
        let role = req.role().ok_or_else(|| field_error("role", "Invalid role"))?;

        self.divisions.validate_for_assignment(req.division_id).await?;

        let existing = self
            .repo
            .get_by_email(&email)
            .await
            .map_err(|e| internal(e, "Failed to create user"))?;
        if existing.is_some() {
            return Err(AppError::already_exists("User with this email"));
        }

        let password_hash = hash_password(req.password, self.bcrypt_cost).await?;

        let new_user = NewUser {
            name: req.name.trim().to_string(),
            email,
            password_hash,
            phone: clean_phone(req.phone),
            role,
            division_id: req.division_id,
        };

        let user = self.repo.create(&new_user).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => AppError::already_exists("User with this email"),
            e => internal(e, "Failed to create user"),
        })?;

        info!(id = user.id, email = %user.email, "user created");
        Ok(self.respond(user))
    }

    pub async fn update(&self, id: i32, req: UpdateUserRequest) -> Result<UserResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid user ID"));
        }
        if let Err(e) = req.validate() {
            warn!(error = %e, id, "user validation failed");
            return Err(e);
        }

        let current = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to update user"))?
            .ok_or_else(|| AppError::not_found("User"))?;

        self.divisions.validate_for_assignment(req.division_id).await?;

        let role = req.role().ok_or_else(|| field_error("role", "Invalid role"))?;

        let changes = UserChanges {
            name: req.name.trim().to_string(),
            phone: clean_phone(req.phone),
            role,
            division_id: req.division_id,
            is_active: req.is_active.unwrap_or(current.is_active),
        };

        let user = self
            .repo
            .update(id, &changes)
            .await
            .map_err(|e| internal(e, "Failed to update user"))?
            .ok_or_else(|| AppError::not_found("User"))?;

        info!(id = user.id, email = %user.email, "user updated");
        Ok(self.respond(user))
    }

    /// Store the new image, point the row at it, then drop the previous file.
    pub async fn update_avatar(&self, id: i32, avatar: Option<UploadedFile>) -> Result<UserResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid user ID"));
        }
        let avatar = avatar.ok_or_else(|| AppError::bad_request("Avatar file is required"))?;

        let previous = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to update avatar"))?
            .ok_or_else(|| AppError::not_found("User"))?;

        let avatar_url = self
            .uploads
            .save_avatar_image(&avatar.file_name, &avatar.bytes)
            .await?;

        let updated = match self.repo.update_avatar(id, &avatar_url).await {
            Ok(Some(user)) => user,
            Ok(None) => {
                self.discard(&avatar_url).await;
                return Err(AppError::not_found("User"));
            }
            Err(e) => {
                self.discard(&avatar_url).await;
                return Err(internal(e, "Failed to update avatar"));
            }
        };

        if let Some(old) = previous.avatar_url.as_deref().filter(|u| !u.is_empty()) {
            if let Err(e) = self.uploads.delete_file(old).await {
                warn!(error = %e, path = %old, "failed to delete old avatar");
            }
        }

        info!(id = updated.id, "user avatar updated");
        Ok(self.respond(updated))
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid user ID"));
        }

        let user = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to delete user"))?
            .ok_or_else(|| AppError::not_found("User"))?;

        let deleted = self.repo.delete(id).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => AppError::bad_request("User is still in use"),
            e => internal(e, "Failed to delete user"),
        })?;
        if !deleted {
            return Err(AppError::not_found("User"));
        }

        if let Some(avatar) = user.avatar_url.as_deref().filter(|u| !u.is_empty()) {
            if let Err(e) = self.uploads.delete_file(avatar).await {
                warn!(error = %e, path = %avatar, "failed to delete user avatar");
            }
        }

        info!(id, "user deleted");
        Ok(())
    }

    /// The user must exist and be active to be referenced from `field`
    pub async fn validate_for_assignment(&self, field: &str, id: i32) -> Result<(), AppError> {
        let user = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to validate user"))?;

        match user {
            None => Err(field_error(field, "User not found")),
            Some(u) if !u.is_active => Err(field_error(field, "User is inactive")),
            Some(_) => Ok(()),
        }
    }

    async fn discard(&self, url: &str) {
        if let Err(e) = self.uploads.delete_file(url).await {
            warn!(error = %e, path = %url, "failed to remove orphaned upload");
        }
    }
}

fn clean_phone(phone: Option<String>) -> Option<String> {
    phone.map(|p| p.trim().to_string()).filter(|p| !p.is_empty())
}

/// bcrypt is CPU-bound; keep it off the async workers
async fn hash_password(password: String, cost: u32) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || bcrypt::hash(password, cost))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "password hashing task failed");
            AppError::internal("Failed to create user")
        })?
        .map_err(|e| {
            tracing::error!(error = %e, "failed to hash password");
            AppError::internal("Failed to create user")
        })
}
