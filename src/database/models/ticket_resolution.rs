use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::pagination::Page;

/// `ticket_resolutions` row joined with the resolver's name
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct TicketResolution {
    pub id: i32,
    pub ticket_id: i32,
    pub resolved_by: i32,
    pub resolver_name: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketResolutionListFilter {
    pub page: Page,
    pub ticket_id: Option<i32>,
    pub resolved_by: Option<i32>,
}
