use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::pagination::Page;

pub const DEFAULT_STATUS: &str = "OPEN";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Urgent,
}

impl Priority {
    pub const ALL: [&'static str; 4] = ["LOW", "MEDIUM", "HIGH", "URGENT"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "LOW",
            Priority::Medium => "MEDIUM",
            Priority::High => "HIGH",
            Priority::Urgent => "URGENT",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "LOW" => Some(Priority::Low),
            "MEDIUM" => Some(Priority::Medium),
            "HIGH" => Some(Priority::High),
            "URGENT" => Some(Priority::Urgent),
            _ => None,
        }
    }
}

/// `tickets` row joined with category, requester, and assignee names
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Ticket {
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

#[derive(Debug, Clone, PartialEq)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub category_id: i32,
    pub requester_id: i32,
    pub assignee_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketChanges {
    pub title: String,
    pub description: String,
    pub status: String,
    pub priority: Priority,
    pub category_id: i32,
    pub assignee_id: Option<i32>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TicketListFilter {
    pub page: Page,
    pub title: Option<String>,
    pub status: Option<String>,
    pub priority: Option<String>,
    pub category_id: Option<i32>,
    pub requester_id: Option<i32>,
    pub assignee_id: Option<i32>,
    pub created_at: Option<NaiveDate>,
}
