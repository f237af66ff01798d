use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::pagination::{parse_date, trimmed, PaginationQuery};
use crate::database::models::{Category, CategoryListFilter};
use crate::error::AppError;
use crate::validation::{validate_string, Validator};

pub const NAME_MIN: usize = 2;
pub const NAME_MAX: usize = 20;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryRequest {
    #[serde(default)]
    pub name: String,
}

impl CreateCategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "name", &self.name, true, NAME_MIN, NAME_MAX);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryRequest {
    #[serde(default)]
    pub name: String,
    pub is_active: Option<bool>,
}

impl UpdateCategoryRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "name", &self.name, true, NAME_MIN, NAME_MAX);
        v.into_result()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetCategoriesQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub is_active: Option<bool>,
    pub created_at: Option<String>,
}

impl GetCategoriesQuery {
    pub fn into_filter(self) -> Result<CategoryListFilter, AppError> {
        Ok(CategoryListFilter {
            page: PaginationQuery::new(self.page, self.limit).normalize(),
            created_at: parse_date(self.created_at.as_deref())?,
            name: trimmed(self.name),
            is_active: self.is_active,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryResponse {
    pub id: i32,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl From<Category> for CategoryResponse {
    fn from(c: Category) -> Self {
        Self {
            id: c.id,
            name: c.name,
            is_active: c.is_active,
            created_at: c.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_names_are_shorter_than_divisions() {
        assert!(CreateCategoryRequest { name: "Hardware".into() }.validate().is_ok());

        let err = UpdateCategoryRequest {
            name: "Networking and Infrastructure".into(),
            is_active: Some(true),
        }
        .validate()
        .unwrap_err();
        assert_eq!(
            err.details().unwrap()["name"],
            "name must not be more than 20 characters long"
        );
    }

    #[test]
    fn empty_query_uses_default_page() {
        let f = GetCategoriesQuery::default().into_filter().unwrap();
        assert_eq!(f.page.page, 1);
        assert_eq!(f.page.limit, 10);
        assert!(f.name.is_none() && f.is_active.is_none() && f.created_at.is_none());
    }
}
