use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::filter::WhereClause;
use crate::database::manager::DatabaseError;
use crate::database::models::{Division, DivisionListFilter};

const COLUMNS: &str = "id, name, is_active, created_at";

#[async_trait]
pub trait DivisionRepository: Send + Sync {
    async fn get_all(&self, filter: &DivisionListFilter) -> Result<(Vec<Division>, i64), DatabaseError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<Division>, DatabaseError>;
    /// Case-insensitive exact match
    async fn get_by_name(&self, name: &str) -> Result<Option<Division>, DatabaseError>;
    async fn exists(&self, id: i32) -> Result<bool, DatabaseError>;
    async fn create(&self, name: &str) -> Result<Division, DatabaseError>;
    async fn update(&self, id: i32, name: &str, is_active: bool) -> Result<Option<Division>, DatabaseError>;
    async fn delete(&self, id: i32) -> Result<bool, DatabaseError>;
}

pub struct PgDivisionRepository {
    pool: PgPool,
}

impl PgDivisionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn build_where(filter: &DivisionListFilter) -> WhereClause {
    let mut w = WhereClause::new();
    w.ilike("name", filter.name.as_deref())
        .eq_opt("is_active", filter.is_active)
        .on_date("created_at", filter.created_at);
    w
}

#[async_trait]
impl DivisionRepository for PgDivisionRepository {
    async fn get_all(&self, filter: &DivisionListFilter) -> Result<(Vec<Division>, i64), DatabaseError> {
        let w = build_where(filter);
        let where_sql = w.to_sql();

        let count_sql = format!("SELECT COUNT(*) FROM divisions{}", where_sql);
        let total = w
            .bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit_index = w.next_index();
        let list_sql = format!(
            "SELECT {} FROM divisions{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            COLUMNS,
            where_sql,
            limit_index,
            limit_index + 1
        );
        let rows = w
            .bind_query_as(sqlx::query_as::<_, Division>(&list_sql))
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Division>, DatabaseError> {
        let sql = format!("SELECT {} FROM divisions WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, Division>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_name(&self, name: &str) -> Result<Option<Division>, DatabaseError> {
        let sql = format!("SELECT {} FROM divisions WHERE LOWER(name) = LOWER($1)", COLUMNS);
        let row = sqlx::query_as::<_, Division>(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM divisions WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, name: &str) -> Result<Division, DatabaseError> {
        let sql = format!("INSERT INTO divisions (name) VALUES ($1) RETURNING {}", COLUMNS);
        let row = sqlx::query_as::<_, Division>(&sql)
            .bind(name)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn update(&self, id: i32, name: &str, is_active: bool) -> Result<Option<Division>, DatabaseError> {
        let sql = format!(
            "UPDATE divisions SET name = $1, is_active = $2 WHERE id = $3 RETURNING {}",
            COLUMNS
        );
        let row = sqlx::query_as::<_, Division>(&sql)
            .bind(name)
            .bind(is_active)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM divisions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
