use std::sync::Arc;

use tracing::{info, warn};

use crate::api::pagination::{map_responses, ListResponse};
use crate::api::ticket::{CreateTicketRequest, GetTicketsQuery, TicketResponse, UpdateTicketRequest};
use crate::database::models::{NewTicket, Priority, TicketChanges};
use crate::database::repository::{TicketAttachmentRepository, TicketRepository};
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::services::{internal, CategoryService, UserService};
use crate::uploads::UploadStore;

#[derive(Clone)]
pub struct TicketService {
    repo: Arc<dyn TicketRepository>,
    attachments: Arc<dyn TicketAttachmentRepository>,
    categories: CategoryService,
    users: UserService,
    uploads: UploadStore,
}

impl TicketService {
    pub fn new(
        repo: Arc<dyn TicketRepository>,
        attachments: Arc<dyn TicketAttachmentRepository>,
        categories: CategoryService,
        users: UserService,
        uploads: UploadStore,
    ) -> Self {
        Self {
            repo,
            attachments,
            categories,
            users,
            uploads,
        }
    }

    pub async fn get_all(&self, query: GetTicketsQuery) -> Result<ListResponse<TicketResponse>, AppError> {
        let filter = query.into_filter()?;

        let (tickets, total) = self
            .repo
            .get_all(&filter)
            .await
            .map_err(|e| internal(e, "Failed to retrieve tickets"))?;

        Ok(ListResponse::new(
            map_responses(tickets, TicketResponse::from),
            filter.page,
            total,
        ))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<TicketResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket ID"));
        }

        self.repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to retrieve ticket"))?
            .map(TicketResponse::from)
            .ok_or_else(|| AppError::not_found("Ticket"))
    }

    pub async fn create(&self, req: CreateTicketRequest) -> Result<TicketResponse, AppError> {
        if let Err(e) = req.validate() {
            warn!(error = %e, "ticket validation failed");
            return Err(e);
        }

        self.categories.validate_for_assignment(req.category_id).await?;
        self.users
            .validate_for_assignment("requesterId", req.requester_id)
            .await?;
        if let Some(assignee_id) = req.assignee_id {
            self.users
                .validate_for_assignment("assigneeId", assignee_id)
                .await?;
        }

        let new_ticket = NewTicket {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            priority: req.priority(),
            category_id: req.category_id,
            requester_id: req.requester_id,
            assignee_id: req.assignee_id,
        };

        let ticket = self.repo.create(&new_ticket).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => {
                AppError::bad_request("Referenced category or user does not exist")
            }
            e => internal(e, "Failed to create ticket"),
        })?;

        info!(
            id = ticket.id,
            requester_id = ticket.requester_id,
            priority = %ticket.priority,
            "ticket created"
        );
        Ok(ticket.into())
    }

    pub async fn update(&self, id: i32, req: UpdateTicketRequest) -> Result<TicketResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket ID"));
        }
        if let Err(e) = req.validate() {
            warn!(error = %e, id, "ticket validation failed");
            return Err(e);
        }

        let current = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to update ticket"))?
            .ok_or_else(|| AppError::not_found("Ticket"))?;

        if req.category_id != current.category_id {
            self.categories.validate_for_assignment(req.category_id).await?;
        }

        let assignee_id = match req.assignee_id {
            None => current.assignee_id,
            Some(None) => None,
            Some(Some(assignee_id)) => {
                if current.assignee_id != Some(assignee_id) {
                    self.users
                        .validate_for_assignment("assigneeId", assignee_id)
                        .await?;
                }
                Some(assignee_id)
            }
        };

        let changes = TicketChanges {
            title: req.title.trim().to_string(),
            description: req.description.trim().to_string(),
            status: req.status().unwrap_or(current.status),
            priority: req
                .priority()
                .or_else(|| Priority::parse(&current.priority))
                .unwrap_or_default(),
            category_id: req.category_id,
            assignee_id,
        };

        let ticket = self
            .repo
            .update(id, &changes)
            .await
            .map_err(|e| match e {
                DatabaseError::ForeignKeyViolation(_) => {
                    AppError::bad_request("Referenced category or user does not exist")
                }
                e => internal(e, "Failed to update ticket"),
            })?
            .ok_or_else(|| AppError::not_found("Ticket"))?;

        info!(id = ticket.id, status = %ticket.status, "ticket updated");
        Ok(ticket.into())
    }

    /// Resolution and attachment rows go with the ticket; attachment files are removed afterwards.
    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket ID"));
        }

        let exists = self
            .repo
            .exists(id)
            .await
            .map_err(|e| internal(e, "Failed to delete ticket"))?;
        if !exists {
            return Err(AppError::not_found("Ticket"));
        }

        let attachments = self
            .attachments
            .get_by_ticket_id(id)
            .await
            .map_err(|e| internal(e, "Failed to delete ticket"))?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| internal(e, "Failed to delete ticket"))?;
        if !deleted {
            return Err(AppError::not_found("Ticket"));
        }

        let file_urls: Vec<String> = attachments.into_iter().map(|a| a.file_url).collect();
        let errors = self.uploads.delete_files(&file_urls).await;
        for e in &errors {
            warn!(error = %e, ticket_id = id, "failed to delete attachment file");
        }

        info!(id, attachments = file_urls.len(), "ticket deleted");
        Ok(())
    }
}
