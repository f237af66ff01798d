use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::pagination::{positive, PaginationQuery};
use crate::database::models::{TicketResolution, TicketResolutionListFilter};
use crate::error::AppError;
use crate::validation::{validate_id, validate_string, Validator};

pub const NOTE_MIN: usize = 5;
pub const NOTE_MAX: usize = 2000;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketResolutionRequest {
    #[serde(default)]
    pub ticket_id: i32,
    #[serde(default)]
    pub resolved_by: i32,
    #[serde(default)]
    pub note: String,
}

impl CreateTicketResolutionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_id(&mut v, "ticketId", self.ticket_id);
        validate_id(&mut v, "resolvedBy", self.resolved_by);
        validate_string(&mut v, "note", &self.note, true, NOTE_MIN, NOTE_MAX);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketResolutionRequest {
    #[serde(default)]
    pub note: String,
}

impl UpdateTicketResolutionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "note", &self.note, true, NOTE_MIN, NOTE_MAX);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTicketResolutionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub ticket_id: Option<i32>,
    pub resolved_by: Option<i32>,
}

impl GetTicketResolutionsQuery {
    pub fn into_filter(self) -> TicketResolutionListFilter {
        TicketResolutionListFilter {
            page: PaginationQuery::new(self.page, self.limit).normalize(),
            ticket_id: positive(self.ticket_id),
            resolved_by: positive(self.resolved_by),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResolutionResponse {
    pub id: i32,
    pub ticket_id: i32,
    pub resolved_by: i32,
    pub resolver_name: String,
    pub note: String,
    pub created_at: DateTime<Utc>,
}

impl From<TicketResolution> for TicketResolutionResponse {
    fn from(r: TicketResolution) -> Self {
        Self {
            id: r.id,
            ticket_id: r.ticket_id,
            resolved_by: r.resolved_by,
            resolver_name: r.resolver_name,
            note: r.note,
            created_at: r.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn note_bounds() {
        let req = CreateTicketResolutionRequest {
            ticket_id: 1,
            resolved_by: 2,
            note: "done".into(),
        };
        assert_eq!(
            req.validate().unwrap_err().details().unwrap()["note"],
            "note must be at least 5 characters long"
        );

        let req = UpdateTicketResolutionRequest {
            note: "x".repeat(2001),
        };
        assert!(req.validate().is_err());

        let req = UpdateTicketResolutionRequest {
            note: "Replaced the toner cartridge".into(),
        };
        assert!(req.validate().is_ok());
    }
}
