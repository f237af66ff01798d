use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::format::{double_option, upper};
use crate::api::pagination::{parse_date, positive, trimmed, PaginationQuery};
use crate::database::models::{Priority, Ticket, TicketListFilter};
use crate::error::AppError;
use crate::validation::{validate_id, validate_string, Validator};

pub const TITLE_MIN: usize = 3;
pub const TITLE_MAX: usize = 100;
pub const DESCRIPTION_MIN: usize = 10;
pub const DESCRIPTION_MAX: usize = 5000;
pub const STATUS_MIN: usize = 2;
pub const STATUS_MAX: usize = 30;

fn validate_priority(v: &mut Validator, value: Option<&str>) {
    if let Some(raw) = value {
        if Priority::parse(&raw.trim().to_uppercase()).is_none() {
            v.add_error(
                "priority",
                format!("Must be one of: {}", Priority::ALL.join(", ")),
            );
        }
    }
}

/// Priority from an already validated request; absent means the default
fn resolve_priority(value: Option<&str>) -> Option<Priority> {
    value.and_then(|raw| Priority::parse(&raw.trim().to_uppercase()))
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Option<String>,
    #[serde(default)]
    pub category_id: i32,
    #[serde(default)]
    pub requester_id: i32,
    pub assignee_id: Option<i32>,
}

impl CreateTicketRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "title", &self.title, true, TITLE_MIN, TITLE_MAX);
        validate_string(
            &mut v,
            "description",
            &self.description,
            true,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        );
        validate_priority(&mut v, self.priority.as_deref());
        validate_id(&mut v, "categoryId", self.category_id);
        validate_id(&mut v, "requesterId", self.requester_id);
        if let Some(assignee_id) = self.assignee_id {
            validate_id(&mut v, "assigneeId", assignee_id);
        }
        v.into_result()
    }

    pub fn priority(&self) -> Priority {
        resolve_priority(self.priority.as_deref()).unwrap_or_default()
    }
}

/// Omitted optional fields keep their stored value; `assigneeId: null` unassigns.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateTicketRequest {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub status: Option<String>,
    pub priority: Option<String>,
    #[serde(default)]
    pub category_id: i32,
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<i32>>,
}

impl UpdateTicketRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "title", &self.title, true, TITLE_MIN, TITLE_MAX);
        validate_string(
            &mut v,
            "description",
            &self.description,
            true,
            DESCRIPTION_MIN,
            DESCRIPTION_MAX,
        );
        // Bounds apply to the stored, upper-cased form
        if let Some(status) = &self.status {
            validate_string(&mut v, "status", &status.to_uppercase(), true, STATUS_MIN, STATUS_MAX);
        }
        validate_priority(&mut v, self.priority.as_deref());
        validate_id(&mut v, "categoryId", self.category_id);
        if let Some(Some(assignee_id)) = self.assignee_id {
            validate_id(&mut v, "assigneeId", assignee_id);
        }
        v.into_result()
    }

    pub fn status(&self) -> Option<String> {
        upper(self.status.clone())
    }

    pub fn priority(&self) -> Option<Priority> {
        resolve_priority(self.priority.as_deref())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetTicketsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<i32>,
    pub requester_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub created_at: Option<String>,
}

impl GetTicketsQuery {
    pub fn into_filter(self) -> Result<TicketListFilter, AppError> {
        let priority = upper(self.priority);
        if let Some(p) = &priority {
            if Priority::parse(p).is_none() {
                return Err(AppError::bad_request(format!(
                    "priority must be one of: {}",
                    Priority::ALL.join(", ")
                )));
            }
        }

        Ok(TicketListFilter {
            page: PaginationQuery::new(self.page, self.limit).normalize(),
            created_at: parse_date(self.created_at.as_deref())?,
            title: trimmed(self.title),
            status: upper(self.status),
            priority,
            category_id: positive(self.category_id),
            requester_id: positive(self.requester_id),
            assignee_id: positive(self.assignee_id),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketResponse {
    pub id: i32,
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: String,
    pub category_id: i32,
    pub category_name: String,
    pub requester_id: i32,
    pub requester_name: String,
    pub assignee_id: Option<i32>,
    pub assignee_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Ticket> for TicketResponse {
    fn from(t: Ticket) -> Self {
        Self {
            id: t.id,
            title: t.title,
            description: t.description,
            status: t.status,
            priority: t.priority,
            category_id: t.category_id,
            category_name: t.category_name,
            requester_id: t.requester_id,
            requester_name: t.requester_name,
            assignee_id: t.assignee_id,
            assignee_name: t.assignee_name,
            created_at: t.created_at,
            updated_at: t.updated_at,
        }
    }
}
