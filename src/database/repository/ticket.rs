use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::filter::WhereClause;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewTicket, Ticket, TicketChanges, TicketListFilter};

const JOINED_SELECT: &str = r#"
    SELECT t.id, t.title, t.description, t.status, t.priority,
           t.category_id, c.name AS category_name,
           t.requester_id, r.name AS requester_name,
           t.assignee_id, a.name AS assignee_name,
           t.created_at, t.updated_at
    FROM tickets t
    INNER JOIN categories c ON t.category_id = c.id
    INNER JOIN users r ON t.requester_id = r.id
    LEFT JOIN users a ON t.assignee_id = a.id"#;

#[async_trait]
pub trait TicketRepository: Send + Sync {
    async fn get_all(&self, filter: &TicketListFilter) -> Result<(Vec<Ticket>, i64), DatabaseError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<Ticket>, DatabaseError>;
    async fn exists(&self, id: i32) -> Result<bool, DatabaseError>;
    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, DatabaseError>;
    /// Also refreshes `updated_at`
    async fn update(&self, id: i32, changes: &TicketChanges) -> Result<Option<Ticket>, DatabaseError>;
    async fn delete(&self, id: i32) -> Result<bool, DatabaseError>;
}

pub struct PgTicketRepository {
    pool: PgPool,
}

impl PgTicketRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn build_where(filter: &TicketListFilter) -> WhereClause {
    let mut w = WhereClause::new();
    w.ilike("t.title", filter.title.as_deref())
        .eq_opt("t.status", filter.status.as_deref())
        .eq_opt("t.priority", filter.priority.as_deref())
        .eq_opt("t.category_id", filter.category_id)
        .eq_opt("t.requester_id", filter.requester_id)
        .eq_opt("t.assignee_id", filter.assignee_id)
        .on_date("t.created_at", filter.created_at);
    w
}

#[async_trait]
impl TicketRepository for PgTicketRepository {
    async fn get_all(&self, filter: &TicketListFilter) -> Result<(Vec<Ticket>, i64), DatabaseError> {
        let w = build_where(filter);
        let where_sql = w.to_sql();

        let count_sql = format!("SELECT COUNT(*) FROM tickets t{}", where_sql);
        let total = w
            .bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit_index = w.next_index();
        let list_sql = format!(
            "{}{} ORDER BY t.created_at DESC, t.id DESC LIMIT ${} OFFSET ${}",
            JOINED_SELECT,
            where_sql,
            limit_index,
            limit_index + 1
        );
        let rows = w
            .bind_query_as(sqlx::query_as::<_, Ticket>(&list_sql))
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<Ticket>, DatabaseError> {
        let sql = format!("{} WHERE t.id = $1", JOINED_SELECT);
        let row = sqlx::query_as::<_, Ticket>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tickets WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, ticket: &NewTicket) -> Result<Ticket, DatabaseError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO tickets (title, description, priority, category_id, requester_id, assignee_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&ticket.title)
        .bind(&ticket.description)
        .bind(ticket.priority.as_str())
        .bind(ticket.category_id)
        .bind(ticket.requester_id)
        .bind(ticket.assignee_id)
        .fetch_one(&self.pool)
        .await?;

        self.get_by_id(id)
            .await?
            .ok_or(DatabaseError::Sqlx(sqlx::Error::RowNotFound))
    }

    async fn update(&self, id: i32, changes: &TicketChanges) -> Result<Option<Ticket>, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE tickets
            SET title = $1, description = $2, status = $3, priority = $4,
                category_id = $5, assignee_id = $6, updated_at = NOW()
            WHERE id = $7
            "#,
        )
        .bind(&changes.title)
        .bind(&changes.description)
        .bind(&changes.status)
        .bind(changes.priority.as_str())
        .bind(changes.category_id)
        .bind(changes.assignee_id)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM tickets WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
