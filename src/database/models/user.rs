use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::api::pagination::Page;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    It,
    Staff,
}

impl Role {
    pub const ALL: [&'static str; 3] = ["ADMIN", "IT", "STAFF"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::It => "IT",
            Role::Staff => "STAFF",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "ADMIN" => Some(Role::Admin),
            "IT" => Some(Role::It),
            "STAFF" => Some(Role::Staff),
            _ => None,
        }
    }
}

/// Bare `users` row, including the password hash
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub division_id: i32,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

/// `users` row joined with its division name
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct UserWithDivision {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub password: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub division_id: i32,
    pub division_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub phone: Option<String>,
    pub role: Role,
    pub division_id: i32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserChanges {
    pub name: String,
    pub phone: Option<String>,
    pub role: Role,
    pub division_id: i32,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UserListFilter {
    pub page: Page,
    pub name: Option<String>,
    pub role: Option<String>,
    pub division_id: Option<i32>,
    pub is_active: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn role_round_trips_through_str() {
        for raw in Role::ALL {
            assert_eq!(Role::parse(raw).unwrap().as_str(), raw);
        }
        assert_eq!(Role::parse(" IT "), Some(Role::It));
        assert_eq!(Role::parse("it"), None);
    }
}
