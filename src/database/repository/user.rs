use async_trait::async_trait;
use sqlx::PgPool;

use crate::database::filter::WhereClause;
use crate::database::manager::DatabaseError;
use crate::database::models::{NewUser, User, UserChanges, UserListFilter, UserWithDivision};

const USER_COLUMNS: &str =
    "id, name, email, password, avatar_url, phone, role, division_id, is_active, created_at";

const JOINED_SELECT: &str = r#"
    SELECT u.id, u.name, u.email, u.password, u.avatar_url, u.phone, u.role,
           u.division_id, d.name AS division_name, u.is_active, u.created_at
    FROM users u
    INNER JOIN divisions d ON u.division_id = d.id"#;

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn get_all(&self, filter: &UserListFilter) -> Result<(Vec<UserWithDivision>, i64), DatabaseError>;
    async fn get_by_id(&self, id: i32) -> Result<Option<UserWithDivision>, DatabaseError>;
    /// Case-insensitive exact match
    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError>;
    async fn exists(&self, id: i32) -> Result<bool, DatabaseError>;
    async fn create(&self, user: &NewUser) -> Result<UserWithDivision, DatabaseError>;
    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<UserWithDivision>, DatabaseError>;
    async fn update_avatar(&self, id: i32, avatar_url: &str) -> Result<Option<UserWithDivision>, DatabaseError>;
    async fn delete(&self, id: i32) -> Result<bool, DatabaseError>;
}

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Re-read through the division join after a write
    async fn reload(&self, id: i32) -> Result<UserWithDivision, DatabaseError> {
        self.get_by_id(id)
            .await?
            .ok_or(DatabaseError::Sqlx(sqlx::Error::RowNotFound))
    }
}

fn build_where(filter: &UserListFilter) -> WhereClause {
    let mut w = WhereClause::new();
    w.ilike("u.name", filter.name.as_deref())
        .eq_opt("u.role", filter.role.as_deref())
        .eq_opt("u.division_id", filter.division_id)
        .eq_opt("u.is_active", filter.is_active);
    w
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn get_all(&self, filter: &UserListFilter) -> Result<(Vec<UserWithDivision>, i64), DatabaseError> {
        let w = build_where(filter);
        let where_sql = w.to_sql();

        let count_sql = format!("SELECT COUNT(*) FROM users u{}", where_sql);
        let total = w
            .bind_query_scalar(sqlx::query_scalar::<_, i64>(&count_sql))
            .fetch_one(&self.pool)
            .await?;

        let limit_index = w.next_index();
        let list_sql = format!(
            "{}{} ORDER BY u.created_at DESC, u.id DESC LIMIT ${} OFFSET ${}",
            JOINED_SELECT,
            where_sql,
            limit_index,
            limit_index + 1
        );
        let rows = w
            .bind_query_as(sqlx::query_as::<_, UserWithDivision>(&list_sql))
            .bind(filter.page.limit)
            .bind(filter.page.offset)
            .fetch_all(&self.pool)
            .await?;

        Ok((rows, total))
    }

    async fn get_by_id(&self, id: i32) -> Result<Option<UserWithDivision>, DatabaseError> {
        let sql = format!("{} WHERE u.id = $1", JOINED_SELECT);
        let row = sqlx::query_as::<_, UserWithDivision>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn get_by_email(&self, email: &str) -> Result<Option<User>, DatabaseError> {
        let sql = format!("SELECT {} FROM users WHERE LOWER(email) = LOWER($1)", USER_COLUMNS);
        let row = sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row)
    }

    async fn exists(&self, id: i32) -> Result<bool, DatabaseError> {
        let exists = sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }

    async fn create(&self, user: &NewUser) -> Result<UserWithDivision, DatabaseError> {
        let id = sqlx::query_scalar::<_, i32>(
            r#"
            INSERT INTO users (name, email, password, phone, role, division_id)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING id
            "#,
        )
        .bind(&user.name)
        .bind(&user.email)
        .bind(&user.password_hash)
        .bind(user.phone.as_deref())
        .bind(user.role.as_str())
        .bind(user.division_id)
        .fetch_one(&self.pool)
        .await?;

        self.reload(id).await
    }

    async fn update(&self, id: i32, changes: &UserChanges) -> Result<Option<UserWithDivision>, DatabaseError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET name = $1, phone = $2, role = $3, division_id = $4, is_active = $5
            WHERE id = $6
            "#,
        )
        .bind(&changes.name)
        .bind(changes.phone.as_deref())
        .bind(changes.role.as_str())
        .bind(changes.division_id)
        .bind(changes.is_active)
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn update_avatar(&self, id: i32, avatar_url: &str) -> Result<Option<UserWithDivision>, DatabaseError> {
        let result = sqlx::query("UPDATE users SET avatar_url = $1 WHERE id = $2")
            .bind(avatar_url)
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    async fn delete(&self, id: i32) -> Result<bool, DatabaseError> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
