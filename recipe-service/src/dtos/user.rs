use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use super::not_blank;

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct CreateUserRequest {
    #[validate(
        email(message = "Enter a valid email address"),
        length(max = 255, message = "Email must be at most 255 characters")
    )]
    #[schema(example = "test@londonappdev.com")]
    pub email: String,

    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    #[schema(example = "testpass", min_length = 5)]
    pub password: String,

    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    #[schema(example = "Test name")]
    pub name: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct TokenRequest {
    #[validate(length(min = 1, message = "Email is required"))]
    #[schema(example = "test@londonappdev.com")]
    pub email: String,

    #[validate(length(min = 1, message = "Password is required"))]
    #[schema(example = "testpass")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct TokenResponse {
    #[schema(example = "9944b09199c62bcf9418ad846dd0e4bbdfc6ee4b")]
    pub token: String,
}

/// Partial profile update. Fields other than `name` and `password` are
/// ignored.
#[derive(Debug, Default, Deserialize, Validate, ToSchema)]
pub struct UpdateProfileRequest {
    #[validate(
        custom(function = "not_blank"),
        length(max = 255, message = "Name must be at most 255 characters")
    )]
    #[schema(example = "asilbek")]
    pub name: Option<String>,

    #[validate(length(min = 5, message = "Password must be at least 5 characters"))]
    #[schema(example = "new_password", min_length = 5)]
    pub password: Option<String>,
}
