use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::format::{public_url, upper};
use crate::api::pagination::{positive, trimmed, PaginationQuery};
use crate::database::models::{Role, UserListFilter, UserWithDivision};
use crate::error::AppError;
use crate::validation::{validate_email, validate_id, validate_one_of, validate_string, Validator};

pub const PHONE_MAX: usize = 30;

fn validate_phone(v: &mut Validator, phone: Option<&str>) {
    if let Some(phone) = phone {
        validate_string(v, "phone", phone, false, 0, PHONE_MAX);
    }
}

/// Roles are matched case-insensitively, like the `role` list filter
fn parse_role(raw: &str) -> Option<Role> {
    Role::parse(&raw.trim().to_uppercase())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub division_id: i32,
}

impl CreateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();

        validate_string(&mut v, "name", &self.name, true, 2, 50);
        validate_string(&mut v, "email", &self.email, true, 5, 255);
        if !self.email.trim().is_empty() && !validate_email(self.email.trim()) {
            v.add_error("email", "Must be a valid email address");
        }
        validate_string(&mut v, "password", &self.password, true, 6, 255);
        validate_phone(&mut v, self.phone.as_deref());
        validate_one_of(&mut v, "role", &self.role.to_uppercase(), &Role::ALL);
        validate_id(&mut v, "divisionId", self.division_id);

        v.into_result()
    }

    pub fn role(&self) -> Option<Role> {
        parse_role(&self.role)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateUserRequest {
    #[serde(default)]
    pub name: String,
    pub phone: Option<String>,
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub division_id: i32,
    pub is_active: Option<bool>,
}

impl UpdateUserRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        let mut v = Validator::new();
        validate_string(&mut v, "name", &self.name, true, 2, 50);
        validate_phone(&mut v, self.phone.as_deref());
        validate_one_of(&mut v, "role", &self.role.to_uppercase(), &Role::ALL);
        validate_id(&mut v, "divisionId", self.division_id);
        v.into_result()
    }

    pub fn role(&self) -> Option<Role> {
        parse_role(&self.role)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GetUsersQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    pub name: Option<String>,
    pub role: Option<String>,
    pub division_id: Option<i32>,
    pub is_active: Option<bool>,
}

impl GetUsersQuery {
    pub fn into_filter(self) -> Result<UserListFilter, AppError> {
        let role = upper(self.role);
        if let Some(role) = &role {
            if Role::parse(role).is_none() {
                return Err(AppError::bad_request(format!(
                    "role must be one of: {}",
                    Role::ALL.join(", ")
                )));
            }
        }

        Ok(UserListFilter {
            page: PaginationQuery::new(self.page, self.limit).normalize(),
            name: trimmed(self.name),
            role,
            division_id: positive(self.division_id),
            is_active: self.is_active,
        })
    }
}

/// Public view of a user; the password hash never leaves the service layer
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: i32,
    pub name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub phone: Option<String>,
    pub role: String,
    pub division_id: i32,
    pub division_name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}

impl UserResponse {
    pub fn from_row(u: UserWithDivision, base_url: &str) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            avatar_url: u
                .avatar_url
                .filter(|url| !url.is_empty())
                .map(|url| public_url(base_url, &url)),
            phone: u.phone,
            role: u.role,
            division_id: u.division_id,
            division_name: u.division_name,
            is_active: u.is_active,
            created_at: u.created_at,
        }
    }
}
