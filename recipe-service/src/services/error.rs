use service_core::error::AppError;
use thiserror::Error;

use crate::models::AttributeKind;

#[derive(Error, Debug)]
pub enum ServiceError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),

    #[error("User must have an email address")]
    MissingEmail,

    #[error("A user with this email already exists")]
    EmailAlreadyRegistered,

    #[error("Unable to log in with provided credentials")]
    InvalidCredentials,

    #[error("Authentication credentials were not provided")]
    MissingToken,

    #[error("Invalid token")]
    InvalidToken,

    #[error("User not found")]
    UserNotFound,

    #[error("{0} not found")]
    NotFound(&'static str),

    #[error("Invalid {kind} id {id}")]
    InvalidReference { kind: AttributeKind, id: i64 },

    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl ServiceError {
    /// True when the error is a violated UNIQUE constraint.
    pub fn is_unique_violation(&self) -> bool {
        matches!(self, ServiceError::Database(sqlx::Error::Database(e)) if e.is_unique_violation())
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Database(e) => AppError::DatabaseError(anyhow::Error::new(e)),
            ServiceError::Internal(e) => AppError::InternalError(e),
            ServiceError::MissingToken => AppError::AuthError(anyhow::anyhow!(
                "Authentication credentials were not provided"
            )),
            ServiceError::InvalidToken => AppError::AuthError(anyhow::anyhow!("Invalid token")),
            ServiceError::UserNotFound => AppError::NotFound(anyhow::anyhow!("User not found")),
            ServiceError::NotFound(what) => AppError::NotFound(anyhow::anyhow!("{} not found", what)),
            e @ (ServiceError::MissingEmail
            | ServiceError::EmailAlreadyRegistered
            | ServiceError::InvalidCredentials
            | ServiceError::InvalidReference { .. }
            | ServiceError::ValidationError(_)) => AppError::BadRequest(anyhow::anyhow!(e.to_string())),
        }
    }
}
