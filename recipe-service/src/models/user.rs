//! User model - email-identified accounts.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

/// User entity. `password_hash` is `None` for accounts without a usable
/// password.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub name: String,
    pub password_hash: Option<String>,
    pub is_active: bool,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub created_utc: DateTime<Utc>,
    pub updated_utc: DateTime<Utc>,
}

impl User {
    pub fn has_usable_password(&self) -> bool {
        self.password_hash.is_some()
    }

    /// Convert to sanitized response (no sensitive fields).
    pub fn sanitized(&self) -> UserResponse {
        UserResponse::from(self)
    }
}

/// Public projection of a user.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
pub struct UserResponse {
    #[schema(example = "test@londonappdev.com")]
    pub email: String,
    #[schema(example = "Test name")]
    pub name: String,
}

impl From<&User> for UserResponse {
    fn from(u: &User) -> Self {
        Self {
            email: u.email.clone(),
            name: u.name.clone(),
        }
    }
}
