use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use service_core::error::AppError;

use crate::{
    dtos::user::{CreateUserRequest, TokenRequest, TokenResponse, UpdateProfileRequest},
    middleware::CurrentUser,
    services::{NewUser, ProfileUpdate, ServiceError},
    utils::{Password, ValidatedJson},
    AppState,
};

/// Register a new user
#[utoipa::path(
    post,
    path = "/user/create/",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserResponse),
        (status = 400, description = "Invalid payload or email already registered", body = ErrorResponse),
        (status = 429, description = "Too many registrations", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn create_user(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_store
        .create_user(NewUser {
            email: req.email,
            password: Some(Password::new(req.password)),
            name: req.name,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(user.sanitized())))
}

/// Exchange email and password for an API token
#[utoipa::path(
    post,
    path = "/user/token/",
    request_body = TokenRequest,
    responses(
        (status = 200, description = "Token issued", body = TokenResponse),
        (status = 400, description = "Unable to log in with provided credentials", body = ErrorResponse),
        (status = 429, description = "Too many attempts", body = ErrorResponse)
    ),
    tag = "User"
)]
pub async fn create_token(
    State(state): State<AppState>,
    ValidatedJson(req): ValidatedJson<TokenRequest>,
) -> Result<Json<TokenResponse>, AppError> {
    let user = state
        .user_store
        .authenticate(&req.email, &req.password)
        .await?
        .ok_or(ServiceError::InvalidCredentials)?;

    let token = state.token_service.issue_token(&user).await?;

    Ok(Json(TokenResponse { token: token.key }))
}

/// Current user's profile
#[utoipa::path(
    get,
    path = "/user/me/",
    responses(
        (status = 200, description = "Profile of the authenticated user", body = UserResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "User",
    security(("token_auth" = []))
)]
pub async fn get_me(CurrentUser(user): CurrentUser) -> impl IntoResponse {
    Json(user.sanitized())
}

/// Update the current user's name and/or password
///
/// Serves both PATCH and PUT; absent fields are left unchanged.
#[utoipa::path(
    patch,
    path = "/user/me/",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "Profile updated", body = UserResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "User",
    security(("token_auth" = []))
)]
pub async fn update_me(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateProfileRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state
        .user_store
        .update_profile(
            user.id,
            ProfileUpdate {
                name: req.name,
                password: req.password.map(Password::new),
            },
        )
        .await?;

    Ok(Json(user.sanitized()))
}
