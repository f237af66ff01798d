use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::filter::WhereClause;
use crate::database::manager::DatabaseError;
use crate::database::models::{TicketResolution, TicketResolutionListFilter};

const JOINED_SELECT: &str = r#"
    SELECT tr.id, tr.ticket_id, tr.resolved_by, u.name AS resolver_name, tr.note, tr.created_at
    FROM ticket_resolutions tr
    INNER JOIN users u ON tr.resolved_by = u.id"#;

#[async_trait]
pub trait TicketResolutionRepository: Send + Sync {
    async fn get_all(
        &self,
        filter: &TicketResolutionListFilter,
    ) -> Result<(Vec<TicketResolution>, i64), DatabaseError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<TicketResolution>, DatabaseError>;
    async fn get_by_ticket_id(&self, ticket_id: i32) -> Result<Option<TicketResolution>, DatabaseError>;
    async fn create(&self, ticket_id: i32, resolved_by: i32, note: &str) -> Result<TicketResolution, DatabaseError>;
    async fn update(&self, id: i32, note: &str) -> Result<Option<TicketResolution>, DatabaseError>;
    async fn delete(&self, id: i32) -> Result<bool, DatabaseError>;
}

pub struct PgTicketResolutionRepository {
    pool: PgPool,
}

impl PgTicketResolutionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, column: &str, value: i32) -> Result<Option<TicketResolution>, DatabaseError> {
        let sql = format!("{} WHERE tr.{} = $1", JOINED_SELECT, column);
        let row = sqlx::query_as::<_, TicketResolution>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }
}

#[async_trait]
impl TicketResolutionRepository for PgTicketResolutionRepository {
    async fn get_all(
        &self,
        filter: &TicketResolutionListFilter,
    ) -> Result<(Vec<TicketResolution>, i64), DatabaseError> {
        let mut w = WhereClause::new();
        w.eq_opt("tr.ticket_id", filter.ticket_id)
            .eq_opt("tr.resolved_by", filter.resolved_by);
        let where_sql = w.to_sql();

        let count_sql = format!("SELECT COUNT(*) FROM ticket_resolutions tr{}", where_sql);
        let total = w
            .bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit_index = w.next_index();
        let list_sql = format!(
            "{}{} ORDER BY tr.created_at DESC, tr.id DESC LIMIT ${} OFFSET ${}",
            JOINED_SELECT,
            where_sql,
            limit_index,
            limit_index + 1
        );
        let rows = w
            .bind_query_as(sqlx::query_as::<_, TicketResolution>(&list_sql))
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<TicketResolution>, DatabaseError> {
        self.find_one("id", id).await
    }

    async fn get_by_ticket_id(&self, ticket_id: i32) -> Result<Option<TicketResolution>, DatabaseError> {
        self.find_one("ticket_id", ticket_id).await
    }

    async fn create(&self, ticket_id: i32, resolved_by: i32, note: &str) -> Result<TicketResolution, DatabaseError> {
        let id = sqlx::query_scalar::<_, i32>(
            "INSERT INTO ticket_resolutions (ticket_id, resolved_by, note) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(ticket_id)
        .bind(resolved_by)
        .bind(note)
        .fetch_one(&self.pool)
        .await?;

        self.find_one("id", id)
            .await?
            .ok_or(DatabaseError::Sqlx(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i32, note: &str) -> Result<Option<TicketResolution>, DatabaseError> {
        let result = sqlx::query("UPDATE ticket_resolutions SET note = $1 WHERE id = $2")
            .bind(note)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.find_one("id", id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM ticket_resolutions WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
