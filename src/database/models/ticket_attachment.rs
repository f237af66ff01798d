use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::pagination::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum FileType {
    Image,
    Document,
}

impl FileType {
    pub const ALL: [&'static str; 2] = ["IMAGE", "DOCUMENT"];

    pub fn as_str(&self) -> &'static str {
        match self {
            FileType::Image => "IMAGE",
            FileType::Document => "DOCUMENT",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TicketAttachment {
    pub id: i32,
    pub ticket_id: i32,
    pub file_url: String,
    pub file_name: String,
    pub file_type: String,
    pub file_size: i64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewTicketAttachment {
    pub ticket_id: i32,
    pub file_url: String,
    pub file_name: String,
    pub file_type: FileType,
    pub file_size: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketAttachmentListFilter {
    pub page: Page,
    pub ticket_id: Option<i32>,
    pub file_type: Option<String>,
}
