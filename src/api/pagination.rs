//! Shared pagination, list-response, and date-filter conventions.
//!
//! Every list endpoint accepts `page`/`limit`, normalizes them with
//! [`PaginationQuery::normalize`], and answers with a [`ListResponse`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;

pub const DEFAULT_PAGE: i64 = 1;
pub const DEFAULT_LIMIT: i64 = 10;
pub const MAX_LIMIT: i64 = 100;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PaginationQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
}

/// Normalized paging window
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Page {
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
}

impl PaginationQuery {
    pub fn new(page: Option<i64>, limit: Option<i64>) -> Self {
        Self { page, limit }
    }

    /// Missing, zero, or negative values fall back to the defaults; limit is capped at [`MAX_LIMIT`].
    pub fn normalize(&self) -> Page {
        let page = match self.page {
            Some(p) if p >= 1 => p,
            _ => DEFAULT_PAGE,
        };

        let limit = match self.limit {
            Some(l) if l >= 1 => l.min(MAX_LIMIT),
            _ => DEFAULT_LIMIT,
        };

        Page {
            page,
            limit,
            offset: (page - 1).saturating_mul(limit),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationResponse {
    pub page: i64,
    pub limit: i64,
    pub total_items: i64,
    pub total_pages: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ListResponse<T> {
    pub items: Vec<T>,
    pub pagination: PaginationResponse,
}

impl<T> ListResponse<T> {
    pub fn new(items: Vec<T>, page: Page, total_items: i64) -> Self {
        Self {
            items,
            pagination: PaginationResponse {
                page: page.page,
                limit: page.limit,
                total_items,
                total_pages: calculate_total_pages(total_items, page.limit),
            },
        }
    }
}

pub fn calculate_total_pages(total_items: i64, limit: i64) -> i64 {
    if total_items <= 0 || limit <= 0 {
        return 0;
    }
    (total_items + limit - 1) / limit
}

/// Blank input means "no filter"; anything else must be `YYYY-MM-DD`.
pub fn parse_date(value: Option<&str>) -> Result<Option<NaiveDate>, AppError> {
    let trimmed = match value.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(s) => s,
    };

    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
        .map(Some)
        .map_err(|_| AppError::bad_request("Date must use YYYY-MM-DD format"))
}

pub fn map_responses<T, R>(items: Vec<T>, mapper: impl Fn(T) -> R) -> Vec<R> {
    items.into_iter().map(mapper).collect()
}

/// Trim a free-text filter, treating blank as absent
pub fn trimmed(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Id filters only apply when positive
pub fn positive(value: Option<i32>) -> Option<i32> {
    value.filter(|v| *v > 0)
}
