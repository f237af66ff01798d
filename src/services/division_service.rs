use std::sync::Arc;

use tracing::{info, warn};

use crate::api::division::{
    CreateDivisionRequest, DivisionResponse, GetDivisionsQuery, UpdateDivisionRequest,
};
use crate::api::pagination::{map_responses, ListResponse};
use crate::database::repository::DivisionRepository;
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::services::{field_error, internal};

#[derive(Clone)]
pub struct DivisionService {
    repo: Arc<dyn DivisionRepository>,
}

impl DivisionService {
    pub fn new(repo: Arc<dyn DivisionRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self, query: GetDivisionsQuery) -> Result<ListResponse<DivisionResponse>, AppError> {
        let filter = query.into_filter()?;

        let (divisions, total) = self
            .repo
            .get_all(&filter)
            .await
            .map_err(|e| internal(e, "Failed to retrieve divisions"))?;

        Ok(ListResponse::new(
            map_responses(divisions, DivisionResponse::from),
            filter.page,
            total,
        ))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<DivisionResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid division ID"));
        }

        self.repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to retrieve division"))?
            .map(DivisionResponse::from)
            .ok_or_else(|| AppError::not_found("Division"))
    }

    pub async fn create(&self, req: CreateDivisionRequest) -> Result<DivisionResponse, AppError> {
        if let Err(e) = req.validate() {
            warn!(error = %e, "division validation failed");
            return Err(e);
        }

        let name = req.name.trim();

        let existing = self
            .repo
            .get_by_name(name)
            .await
            .map_err(|e| internal(e, "Failed to create division"))?;
        if existing.is_some() {
            return Err(AppError::already_exists("Division"));
        }

        let division = self.repo.create(name).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => AppError::already_exists("Division"),
            e => internal(e, "Failed to create division"),
        })?;

        info!(id = division.id, name = %division.name, "division created");
        Ok(division.into())
    }

    pub async fn update(&self, id: i32, req: UpdateDivisionRequest) -> Result<DivisionResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid division ID"));
        }
        if let Err(e) = req.validate() {
            warn!(error = %e, id, "division validation failed");
            return Err(e);
        }

        let current = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to update division"))?
            .ok_or_else(|| AppError::not_found("Division"))?;

        let name = req.name.trim();

        let existing = self
            .repo
            .get_by_name(name)
            .await
            .map_err(|e| internal(e, "Failed to update division"))?;
        if existing.is_some_and(|d| d.id != id) {
            return Err(AppError::already_exists("Division with this name"));
        }

        let is_active = req.is_active.unwrap_or(current.is_active);

        let division = self
            .repo
            .update(id, name, is_active)
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => AppError::already_exists("Division with this name"),
                e => internal(e, "Failed to update division"),
            })?
            .ok_or_else(|| AppError::not_found("Division"))?;

        info!(id = division.id, name = %division.name, "division updated");
        Ok(division.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid division ID"));
        }

        let exists = self
            .repo
            .exists(id)
            .await
            .map_err(|e| internal(e, "Failed to delete division"))?;
        if !exists {
            return Err(AppError::not_found("Division"));
        }

        let deleted = self.repo.delete(id).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => AppError::bad_request("Division is still in use"),
            e => internal(e, "Failed to delete division"),
        })?;
        if !deleted {
            return Err(AppError::not_found("Division"));
        }

        info!(id, "division deleted");
        Ok(())
    }

    /// The division must exist and be active before users can be placed in it
    pub async fn validate_for_assignment(&self, id: i32) -> Result<(), AppError> {
        let division = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to validate division"))?;

        match division {
            None => Err(field_error("divisionId", "Division not found")),
            Some(d) if !d.is_active => Err(field_error("divisionId", "Division is inactive")),
            Some(_) => Ok(()),
        }
    }
}
