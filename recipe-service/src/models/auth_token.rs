use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Opaque credential bound to one user.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct AuthToken {
    pub key: String,
    pub user_id: i64,
    pub created_utc: DateTime<Utc>,
}
