use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::pagination::Page;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Division {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DivisionListFilter {
    pub page: Page,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<NaiveDate>,
}
