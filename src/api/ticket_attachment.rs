use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::format::{public_url, upper};
use crate::api::pagination::{positive, PaginationQuery};
use crate::database::models::{FileType, TicketAttachment, TicketAttachmentListFilter};
use crate::error::AppError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTicketAttachmentsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub ticket_id: Option<i32>,
    pub file_type: Option<String>,
}

impl GetTicketAttachmentsQuery {
    pub fn into_filter(self) -> Result<TicketAttachmentListFilter, AppError> {
        let file_type = upper(self.file_type);
        if let Some(ft) = &file_type {
            if !FileType::ALL.iter().any(|t| *t == ft.as_str()) {
                return Err(AppError::bad_request(format!(
                    "fileType must be one of: {}",
                    FileType::ALL.join(", ")
                )));
            }
        }

        Ok(TicketAttachmentListFilter {
            page: PaginationQuery::new(self.page, self.limit).normalize(),
            ticket_id: positive(self.ticket_id),
            file_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAttachmentResponse {
    pub id: i32,
    pub ticket_id: i32,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

impl TicketAttachmentResponse {
    pub fn from_row(a: TicketAttachment, base_url: &str) -> Self {
        Self {
            id: a.id,
            ticket_id: a.ticket_id,
            file_url: public_url(base_url, &a.file_url),
            file_name: a.file_name,
            file_type: a.file_type,
            file_size: a.file_size,
            created_at: a.created_at,
        }
    }
}
