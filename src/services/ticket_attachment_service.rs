use std::sync::Arc;

use tracing::{info, warn};

use crate::api::pagination::ListResponse;
use crate::api::ticket_attachment::{GetTicketAttachmentsQuery, TicketAttachmentResponse};
use crate::database::models::{FileType, NewTicketAttachment, TicketAttachment};
use crate::database::repository::{TicketAttachmentRepository, TicketRepository};
use crate::error::AppError;
use crate::services::internal;
use crate::uploads::{classify, UploadStore, UploadedFile, MAX_FILE_NAME_LENGTH};
use crate::validation::Validator;

#[derive(Clone)]
pub struct TicketAttachmentService {
    repo: Arc<dyn TicketAttachmentRepository>,
    tickets: Arc<dyn TicketRepository>,
    uploads: UploadStore,
    base_url: String,
}

impl TicketAttachmentService {
    pub fn new(
        repo: Arc<dyn TicketAttachmentRepository>,
        tickets: Arc<dyn TicketRepository>,
        uploads: UploadStore,
        base_url: String,
    ) -> Self {
        Self {
            repo,
            tickets,
            uploads,
            base_url,
        }
    }

    fn respond(&self, attachment: TicketAttachment) -> TicketAttachmentResponse {
        TicketAttachmentResponse::from_row(attachment, &self.base_url)
    }

    pub async fn get_all(
        &self,
        query: GetTicketAttachmentsQuery,
    ) -> Result<ListResponse<TicketAttachmentResponse>, AppError> {
        let filter = query.into_filter()?;

        let (rows, total) = self
            .repo
            .get_all(&filter)
            .await
            .map_err(|e| internal(e, "Failed to retrieve ticket attachments"))?;

        let items = rows.into_iter().map(|a| self.respond(a)).collect();
        Ok(ListResponse::new(items, filter.page, total))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<TicketAttachmentResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket attachment ID"));
        }

        let attachment = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to retrieve ticket attachment"))?
            .ok_or_else(|| AppError::not_found("Ticket attachment"))?;

        Ok(self.respond(attachment))
    }

    /// `ticket_id` is the raw multipart field. Images and documents go to separate
    /// directories; the stored file is removed again if the row cannot be written.
    pub async fn create(
        &self,
        ticket_id: Option<String>,
        file: Option<UploadedFile>,
    ) -> Result<TicketAttachmentResponse, AppError> {
        let mut v = Validator::new();
        let ticket_id = ticket_id
            .as_deref()
            .and_then(|raw| raw.trim().parse::<i32>().ok())
            .filter(|id| *id > 0);
        if ticket_id.is_none() {
            v.add_error("ticketId", "Required and must be greater than 0");
        }
        match &file {
            None => v.add_error("file", "Required"),
            Some(f) if f.file_name.chars().count() > MAX_FILE_NAME_LENGTH => v.add_error(
                "file",
                format!("File name must not be more than {} characters long", MAX_FILE_NAME_LENGTH),
            ),
            Some(_) => {}
        }
        if let Err(e) = v.into_result() {
            warn!(error = %e, "ticket attachment validation failed");
            return Err(e);
        }
        let (Some(ticket_id), Some(file)) = (ticket_id, file) else {
            return Err(AppError::bad_request("Invalid request body"));
        };

        let ticket_exists = self
            .tickets
            .exists(ticket_id)
            .await
            .map_err(|e| internal(e, "Failed to create ticket attachment"))?;
        if !ticket_exists {
            return Err(AppError::not_found("Ticket"));
        }

        let file_type = classify(&file.file_name).ok_or_else(|| {
            AppError::bad_request(
                "Invalid file type. Only jpg, jpeg, png, webp, pdf, doc, docx, xls, xlsx, and txt are allowed",
            )
        })?;

        let file_url = match file_type {
            FileType::Image => self.uploads.save_ticket_image(&file.file_name, &file.bytes).await?,
            FileType::Document => self.uploads.save_document(&file.file_name, &file.bytes).await?,
        };

        let new_attachment = NewTicketAttachment {
            ticket_id,
            file_url: file_url.clone(),
            file_name: file.file_name.clone(),
            file_type,
            file_size: file.bytes.len() as i64,
        };

        let attachment = match self.repo.create(&new_attachment).await {
            Ok(row) => row,
            Err(e) => {
                if let Err(cleanup) = self.uploads.delete_file(&file_url).await {
                    warn!(error = %cleanup, path = %file_url, "failed to remove orphaned upload");
                }
                return Err(internal(e, "Failed to create ticket attachment"));
            }
        };

        info!(
            id = attachment.id,
            ticket_id,
            file_type = file_type.as_str(),
            size = attachment.file_size,
            "ticket attachment created"
        );
        Ok(self.respond(attachment))
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid ticket attachment ID"));
        }

        let attachment = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to delete ticket attachment"))?
            .ok_or_else(|| AppError::not_found("Ticket attachment"))?;

        let deleted = self
            .repo
            .delete(id)
            .await
            .map_err(|e| internal(e, "Failed to delete ticket attachment"))?;
        if !deleted {
            return Err(AppError::not_found("Ticket attachment"));
        }

        if let Err(e) = self.uploads.delete_file(&attachment.file_url).await {
            warn!(error = %e, path = %attachment.file_url, "failed to delete attachment file");
        }

        info!(id, ticket_id = attachment.ticket_id, "ticket attachment deleted");
        Ok(())
    }
}
