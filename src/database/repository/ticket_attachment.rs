use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::filter::WhereClause;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewTicketAttachment, TicketAttachment, TicketAttachmentListFilter};

const COLUMNS: &str = "id, ticket_id, file_url, file_name, file_type, file_size, created_at";

#[async_trait]
pub trait TicketAttachmentRepository: Send + Sync {
    async fn get_all(
        &self,
        filter: &TicketAttachmentListFilter,
    ) -> Result<(Vec<TicketAttachment>, i64), DatabaseError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<TicketAttachment>, DatabaseError>;
    /// Every attachment of a ticket, used for file cleanup on ticket delete
    async fn get_by_ticket_id(&self, ticket_id: i32) -> Result<Vec<TicketAttachment>, DatabaseError>;
    async fn create(&self, attachment: &NewTicketAttachment) -> Result<TicketAttachment, DatabaseError>;
    async fn delete(&self, id: i32) -> Result<bool, DatabaseError>;
}

pub struct PgTicketAttachmentRepository {
    pool: PgPool,
}

impl PgTicketAttachmentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TicketAttachmentRepository for PgTicketAttachmentRepository {
    async fn get_all(
        &self,
        filter: &TicketAttachmentListFilter,
    ) -> Result<(Vec<TicketAttachment>, i64), DatabaseError> {
        let mut w = WhereClause::new();
        w.eq_opt("ticket_id", filter.ticket_id)
            .eq_opt("file_type", filter.file_type.as_deref());
        let where_sql = w.to_sql();

        let count_sql = format!("SELECT COUNT(*) FROM ticket_attachments{}", where_sql);
        let total = w
            .bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit_index = w.next_index();
        let list_sql = format!(
            "SELECT {} FROM ticket_attachments{} ORDER BY created_at DESC, id DESC LIMIT ${} OFFSET ${}",
            COLUMNS,
            where_sql,
            limit_index,
            limit_index + 1
        );
        let rows = w
            .bind_query_as(sqlx::query_as::<_, TicketAttachment>(&list_sql))
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<TicketAttachment>, DatabaseError> {
        let sql = format!("SELECT {} FROM ticket_attachments WHERE id = $1", COLUMNS);
        let row = sqlx::query_as::<_, TicketAttachment>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_ticket_id(&self, ticket_id: i32) -> Result<Vec<TicketAttachment>, DatabaseError> {
        let sql = format!(
            "SELECT {} FROM ticket_attachments WHERE ticket_id = $1 ORDER BY id",
            COLUMNS
        );
        let rows = sqlx::query_as::<_, TicketAttachment>(&sql)
            .bind(ticket_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(rows)
    }

    async fn create(&self, attachment: &NewTicketAttachment) -> Result<TicketAttachment, DatabaseError> {
        let sql = format!(
            r#"
            INSERT INTO ticket_attachments (ticket_id, file_url, file_name, file_type, file_size)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            COLUMNS
        );
        let row = sqlx::query_as::<_, TicketAttachment>(&sql)
            .bind(attachment.ticket_id)
            .bind(&attachment.file_url)
            .bind(&attachment.file_name)
            .bind(attachment.file_type.as_str())
            .bind(attachment.file_size)
            .fetch_one(&self.pool)
            .await?;
        Ok(row)
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM ticket_attachments WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
