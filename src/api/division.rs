use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::pagination::{parse_date, trimmed, PaginationQuery};
use crate::database::models::{Division, DivisionListFilter};
use crate::error::AppError;
use crate::validation::{validate_string, Validator};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 50;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDivisionRequest {
    #[serde(default)]
    pub name: String,
}

impl CreateDivisionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "name", &self.name, true, NAME_MIN, NAME_MAX);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDivisionRequest {
    #[serde(default)]
    pub name: String,
    pub is_active: Option<bool>,
}

impl UpdateDivisionRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "name", &self.name, true, NAME_MIN, NAME_MAX);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetDivisionsQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<String>,
}

impl GetDivisionsQuery {
    pub fn into_filter(self) -> Result<DivisionListFilter, AppError> {
        Ok(DivisionListFilter {
            page: PaginationQuery::new(self.page, self.limit).normalize(),
            created_at: parse_date(self.created_at.as_deref())?,
            name: trimmed(self.name),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DivisionResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Division> for DivisionResponse {
    fn from(d: Division) -> Self {
        Self {
            id: d.id,
            name: d.name,
            is_active: d.is_active,
            created_at: d.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, http::Uri};

    #[test]
    fn create_requires_name_within_bounds() {
        let err = CreateDivisionRequest { name: " ".into() }.validate().unwrap_err();
        assert_eq!(err.details().unwrap()["name"], "name is required");

        let err = CreateDivisionRequest { name: "a".repeat(51) }.validate().unwrap_err();
        assert_eq!(
            err.details().unwrap()["name"],
            "name must not be more than 50 characters long"
        );

        assert!(CreateDivisionRequest { name: "IT Support".into() }.validate().is_ok());
    }

    #[test]
    fn query_parses_camel_case_filters() {
        let uri: Uri = "/api/divisions?page=2&limit=5&name=%20ops%20&isActive=false&createdAt=2024-01-31"
            .parse()
            .unwrap();
        let Query(q) = Query::<GetDivisionsQuery>::try_from_uri(&uri).unwrap();
        let f = q.into_filter().unwrap();
        assert_eq!(f.page.offset, 5);
        assert_eq!(f.name.as_deref(), Some("ops"));
        assert_eq!(f.is_active, Some(false));
        assert_eq!(f.created_at.unwrap().to_string(), "2024-01-31");
    }

    #[test]
    fn bad_created_at_is_rejected() {
        let q = GetDivisionsQuery {
            created_at: Some("yesterday".into()),
            ..Default::default()
        };
        assert_eq!(
            q.into_filter().unwrap_err(),
            AppError::bad_request("Date must use YYYY-MM-DD format")
        );
    }

    #[test]
    fn response_is_camel_case() {
        let value = serde_json::to_value(DivisionResponse {
            id: 1,
            name: "Finance".into(),
            is_active: true,
            created_at: Utc::now(),
        })
        .unwrap();
        assert_eq!(value["isActive"], true);
        assert!(value["createdAt"].is_string());
    }
}
