use std::sync::Arc;

use tracing::{info, warn};

use crate::api::pagination::{map_responses, ListResponse};
use crate::api::ticket_resolution::{
    CreateTicketResolutionRequest, GetTicketResolutionsQuery, TicketResolutionResponse,
    UpdateTicketResolutionRequest,
};
use crate::database::repository::{TicketRepository, TicketResolutionRepository};
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::services::{field_error, internal, UserService};

const ALREADY_RESOLVED: &str = "Resolution for this ticket";

#[derive(Clone)]
pub struct TicketResolutionService {
    repo: Arc<dyn TicketResolutionRepository>,
    tickets: Arc<dyn TicketRepository>,
    users: UserService,
}

impl TicketResolutionService {
    pub fn new(
        repo: Arc<dyn TicketResolutionRepository>,
        tickets: Arc<dyn TicketRepository>,
        users: UserService,
    ) -> Self {
        Self { repo, tickets, users }
    }

    pub async fn get_all(
        &self,
        query: GetTicketResolutionsQuery,
    ) -> Result<ListResponse<TicketResolutionResponse>, AppError> {
        let filter = query.into_filter();

        let (rows, total) = self
            .repo
            .get_all(&filter)
            .await
            .map_err(|e| internal(e, "Failed to retrieve ticket resolutions"))?;

        Ok(ListResponse::new(
            map_responses(rows, TicketResolutionResponse::from),
            filter.page,
            total,
        ))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<TicketResolutionResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket resolution ID"));
        }

        self.repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to retrieve ticket resolution"))?
            .map(TicketResolutionResponse::from)
            .ok_or_else(|| AppError::not_found("Ticket resolution"))
    }

    pub async fn create(&self, req: CreateTicketResolutionRequest) -> Result<TicketResolutionResponse, AppError> {
        if let Err(e) = req.validate() {
            warn!(error = %e, "ticket resolution validation failed");
            return Err(e);
        }

        let ticket_exists = self
            .tickets
            .exists(req.ticket_id)
            .await
            .map_err(|e| internal(e, "Failed to create ticket resolution"))?;
        if !ticket_exists {
            return Err(field_error("ticketId", "Ticket not found"));
        }

        self.users
            .validate_for_assignment("resolvedBy", req.resolved_by)
            .await?;

        let existing = self
            .repo
            .get_by_ticket_id(req.ticket_id)
            .await
            .map_err(|e| internal(e, "Failed to create ticket resolution"))?;
        if existing.is_some() {
            return Err(AppError::already_exists(ALREADY_RESOLVED));
        }

        let resolution = self
            .repo
            .create(req.ticket_id, req.resolved_by, req.note.trim())
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => AppError::already_exists(ALREADY_RESOLVED),
                DatabaseError::ForeignKeyViolation(_) => {
                    AppError::bad_request("Referenced ticket or user does not exist")
                }
                e => internal(e, "Failed to create ticket resolution"),
            })?;

        info!(
            id = resolution.id,
            ticket_id = resolution.ticket_id,
            resolved_by = resolution.resolved_by,
            "ticket resolution created"
        );
        Ok(resolution.into())
    }

    pub async fn update(
        &self,
        id: i32,
        req: UpdateTicketResolutionRequest,
    ) -> Result<TicketResolutionResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket resolution ID"));
        }
        if let Err(e) = req.validate() {
            warn!(error = %e, id, "ticket resolution validation failed");
            return Err(e);
        }

        let resolution = self
            .repo
            .update(id, req.note.trim())
            .await
            .map_err(|e| internal(e, "Failed to update ticket resolution"))?
            .ok_or_else(|| AppError::not_found("Ticket resolution"))?;

        info!(id, "ticket resolution updated");
        Ok(resolution.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket resolution ID"));
        }

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| internal(e, "Failed to delete ticket resolution"))?;
        if !deleted {
            return Err(AppError::not_found("Ticket resolution"));
        }

        info!(id, "ticket resolution deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestContext;

    fn request(ticket_id: i32, resolved_by: i32) -> CreateTicketResolutionRequest {
        CreateTicketResolutionRequest {
            ticket_id,
            resolved_by,
            note: " Reseated the RAM module ".into(),
        }
    }

    #[tokio::test]
    async fn one_resolution_per_ticket() {
        let ctx = TestContext::new();
        let (_, category_id, user_id) = ctx.seed_basics();
        let ticket_id = ctx.seed_ticket(category_id, user_id).await;

        let created = ctx
            .resolution_service
            .create(request(ticket_id, user_id))
            .await
            .unwrap();
        assert_eq!(created.note, "Reseated the RAM module");
        assert_eq!(created.resolver_name, "Sam Staff");

        let err = ctx
            .resolution_service
            .create(request(ticket_id, user_id))
            .await
            .unwrap_err();
        assert_eq!(err, AppError::already_exists("Resolution for this ticket"));
        assert_eq!(err.to_string(), "Resolution for this ticket already exists");
    }

    #[tokio::test]
    async fn ticket_must_exist() {
        let ctx = TestContext::new();
        let (_, _, user_id) = ctx.seed_basics();

        let err = ctx
            .resolution_service
            .create(request(77, user_id))
            .await
            .unwrap_err();
        assert_eq!(err.details().unwrap()["ticketId"], "Ticket not found");
    }

    #[tokio::test]
    async fn update_and_delete() {
        let ctx = TestContext::new();
        let (_, category_id, user_id) = ctx.seed_basics();
        let ticket_id = ctx.seed_ticket(category_id, user_id).await;
        let created = ctx
            .resolution_service
            .create(request(ticket_id, user_id))
            .await
            .unwrap();

        let updated = ctx
            .resolution_service
            .update(
                created.id,
                UpdateTicketResolutionRequest { note: "Replaced the RAM module".into() },
            )
            .await
            .unwrap();
        assert_eq!(updated.note, "Replaced the RAM module");

        ctx.resolution_service.delete(created.id).await.unwrap();
        assert_eq!(
            ctx.resolution_service.delete(created.id).await.unwrap_err(),
            AppError::not_found("Ticket resolution")
        );
        assert_eq!(
            ctx.resolution_service.get_by_id(-1).await.unwrap_err(),
            AppError::bad_request("Invalid ticket resolution ID")
        );
    }
}
