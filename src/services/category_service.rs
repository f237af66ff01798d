use std::sync::Arc;

use tracing::{info, warn};

use crate::api::category::{
    CreateCategoryRequest, CategoryResponse, GetCategoriesQuery, UpdateCategoryRequest,
};
use crate::api::pagination::{map_responses, ListResponse};
use crate::database::repository::CategoryRepository;
use crate::database::DatabaseError;
use crate::error::AppError;
use crate::services::{field_error, internal};

#[derive(Clone)]
pub struct CategoryService {
    repo: Arc<dyn CategoryRepository>,
}

impl CategoryService {
    pub fn new(repo: Arc<dyn CategoryRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_all(&self, query: GetCategoriesQuery) -> Result<ListResponse<CategoryResponse>, AppError> {
        let filter = query.into_filter()?;

        let (categorys, total) = self
            .repo
            .get_all(&filter)
            .await
            .map_err(|e| internal(e, "Failed to retrieve categories"))?;

        Ok(ListResponse::new(
            map_responses(categorys, CategoryResponse::from),
            filter.page,
            total,
        ))
    }

    pub async fn get_by_id(&self, id: i32) -> Result<CategoryResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid category ID"));
        }

        self.repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to retrieve category"))?
            .map(CategoryResponse::from)
            .ok_or_else(|| AppError::not_found("Category"))
    }

    pub async fn create(&self, req: CreateCategoryRequest) -> Result<CategoryResponse, AppError> {
        if let Err(e) = req.validate() {
            warn!(error = %e, "category validation failed");
            return Err(e);
        }

        let name = req.name.trim();

        let existing = self
            .repo
            .get_by_name(name)
            .await
            .map_err(|e| internal(e, "Failed to create category"))?;
        if existing.is_some() {
            return Err(AppError::already_exists("Category"));
        }

        let category = self.repo.create(name).await.map_err(|e| match e {
            DatabaseError::UniqueViolation(_) => AppError::already_exists("Category"),
            e => internal(e, "Failed to create category"),
        })?;

        info!(id = category.id, name = %category.name, "category created");
        Ok(category.into())
    }

    pub async fn update(&self, id: i32, req: UpdateCategoryRequest) -> Result<CategoryResponse, AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid category ID"));
        }
        if let Err(e) = req.validate() {
            warn!(error = %e, id, "category validation failed");
            return Err(e);
        }

        let current = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to update category"))?
            .ok_or_else(|| AppError::not_found("Category"))?;

        let name = req.name.trim();

        let existing = self
            .repo
            .get_by_name(name)
            .await
            .map_err(|e| internal(e, "Failed to update category"))?;
        if existing.is_some_and(|d| d.id != id) {
            return Err(AppError::already_exists("Category with this name"));
        }

        let is_active = req.is_active.unwrap_or(current.is_active);

        let category = self
            .repo
            .update(id, name, is_active)
            .await
            .map_err(|e| match e {
                DatabaseError::UniqueViolation(_) => AppError::already_exists("Category with this name"),
                e => internal(e, "Failed to update category"),
            })?
            .ok_or_else(|| AppError::not_found("Category"))?;

        info!(id = category.id, name = %category.name, "category updated");
        Ok(category.into())
    }

    pub async fn delete(&self, id: i32) -> Result<(), AppError> {
        if id <= 0 {
            return Err(AppError::bad_request("Invalid category ID"));
        }

        let exists = self
            .repo
            .exists(id)
            .await
            .map_err(|e| internal(e, "Failed to delete category"))?;
        if !exists {
            return Err(AppError::not_found("Category"));
        }

        let deleted = self.repo.delete(id).await.map_err(|e| match e {
            DatabaseError::ForeignKeyViolation(_) => AppError::bad_request("Category is still in use"),
            e => internal(e, "Failed to delete category"),
        })?;
        if !deleted {
            return Err(AppError::not_found("Category"));
        }

        info!(id, "category deleted");
        Ok(())
    }

    /// Tickets may only be filed under an existing, active category
    pub async fn validate_for_assignment(&self, id: i32) -> Result<(), AppError> {
        let category = self
            .repo
            .get_by_id(id)
            .await
            .map_err(|e| internal(e, "Failed to validate category"))?;

        match category {
            None => Err(field_error("categoryId", "Category not found")),
            Some(c) if !c.is_active => Err(field_error("categoryId", "Category is inactive")),
            Some(_) => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::InMemoryCategories;

    fn service() -> (CategoryService, Arc<InMemoryCategories>) {
        let repo = Arc::new(InMemoryCategories::default());
        (CategoryService::new(repo.clone()), repo)
    }

    #[tokio::test]
    async fn create_validates_short_names() {
        let (svc, _) = service();

        let err = svc
            .create(CreateCategoryRequest { name: "Access and Permissions".into() })
            .await
            .unwrap_err();
        assert_eq!(err.code(), "VALIDATION_ERROR");

        let created = svc
            .create(CreateCategoryRequest { name: "Access".into() })
            .await
            .unwrap();
        assert_eq!(created.name, "Access");
    }

    #[tokio::test]
    async fn renaming_to_own_name_in_other_case_is_allowed() {
        let (svc, repo) = service();
        let id = repo.seed("Hardware", true);

        let updated = svc
            .update(id, UpdateCategoryRequest { name: "HARDWARE".into(), is_active: Some(false) })
            .await
            .unwrap();
        assert_eq!(updated.name, "HARDWARE");
        assert!(!updated.is_active);
    }

    #[tokio::test]
    async fn missing_category_on_update() {
        let (svc, _) = service();
        let err = svc
            .update(7, UpdateCategoryRequest { name: "Software".into(), is_active: None })
            .await
            .unwrap_err();
        assert_eq!(err, AppError::not_found("Category"));
    }

    #[tokio::test]
    async fn category_with_tickets_cannot_be_deleted() {
        let (svc, repo) = service();
        let used = repo.seed("Network", true);
        let unused = repo.seed("Email", true);
        repo.mark_in_use(used);

        assert_eq!(
            svc.delete(used).await.unwrap_err(),
            AppError::bad_request("Category is still in use")
        );
        svc.delete(unused).await.unwrap();
        assert_eq!(svc.get_by_id(unused).await.unwrap_err(), AppError::not_found("Category"));
    }

    #[tokio::test]
    async fn list_filters_by_active_flag() {
        let (svc, repo) = service();
        repo.seed("Hardware", true);
        repo.seed("Retired", false);

        let list = svc
            .get_all(GetCategoriesQuery { is_active: Some(false), ..Default::default() })
            .await
            .unwrap();
        assert_eq!(list.items.len(), 1);
        assert_eq!(list.items[0].name, "Retired");
    }

    #[tokio::test]
    async fn inactive_category_cannot_take_tickets() {
        let (svc, repo) = service();
        let id = repo.seed("Retired", false);
        let err = svc.validate_for_assignment(id).await.unwrap_err();
        assert_eq!(err.details().unwrap()["categoryId"], "Category is inactive");
    }
}
