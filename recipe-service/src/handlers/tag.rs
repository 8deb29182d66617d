use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use super::attribute;
use crate::{
    dtos::recipe::{AttributeListParams, AttributePatchRequest, AttributeRequest},
    middleware::CurrentUser,
    models::{AttributeKind, AttributeResponse},
    utils::{ResourceId, ValidatedJson},
    AppState,
};

const KIND: AttributeKind = AttributeKind::Tag;

/// List the caller's tags
#[utoipa::path(
    get,
    path = "/recipe/tags/",
    params(AttributeListParams),
    responses(
        (status = 200, description = "Tags owned by the caller, by name descending", body = [AttributeResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Tags",
    security(("token_auth" = []))
)]
pub async fn list_tags(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: Result<Query<AttributeListParams>, QueryRejection>,
) -> Result<Json<Vec<AttributeResponse>>, AppError> {
    attribute::list(&state, KIND, user.id, params).await
}

/// Create a tag
#[utoipa::path(
    post,
    path = "/recipe/tags/",
    request_body = AttributeRequest,
    responses(
        (status = 201, description = "Tag created", body = AttributeResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Tags",
    security(("token_auth" = []))
)]
pub async fn create_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<AttributeRequest>,
) -> Result<impl IntoResponse, AppError> {
    attribute::create(&state, KIND, user.id, req).await
}

/// Retrieve one of the caller's tags
#[utoipa::path(
    get,
    path = "/recipe/tags/{id}/",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 200, description = "Tag found", body = AttributeResponse),
        (status = 404, description = "No such tag for this user", body = ErrorResponse)
    ),
    tag = "Tags",
    security(("token_auth" = []))
)]
pub async fn get_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
) -> Result<Json<AttributeResponse>, AppError> {
    attribute::retrieve(&state, KIND, user.id, id).await
}

/// Replace a tag
#[utoipa::path(
    put,
    path = "/recipe/tags/{id}/",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = AttributeRequest,
    responses(
        (status = 200, description = "Tag updated", body = AttributeResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No such tag for this user", body = ErrorResponse)
    ),
    tag = "Tags",
    security(("token_auth" = []))
)]
pub async fn replace_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
    ValidatedJson(req): ValidatedJson<AttributeRequest>,
) -> Result<Json<AttributeResponse>, AppError> {
    attribute::update(&state, KIND, user.id, id, Some(&req.name)).await
}

/// Partially update a tag
#[utoipa::path(
    patch,
    path = "/recipe/tags/{id}/",
    params(("id" = i64, Path, description = "Tag id")),
    request_body = AttributePatchRequest,
    responses(
        (status = 200, description = "Tag updated", body = AttributeResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No such tag for this user", body = ErrorResponse)
    ),
    tag = "Tags",
    security(("token_auth" = []))
)]
pub async fn patch_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
    ValidatedJson(req): ValidatedJson<AttributePatchRequest>,
) -> Result<Json<AttributeResponse>, AppError> {
    attribute::update(&state, KIND, user.id, id, req.name.as_deref()).await
}

/// Delete a tag; recipes using it keep existing
#[utoipa::path(
    delete,
    path = "/recipe/tags/{id}/",
    params(("id" = i64, Path, description = "Tag id")),
    responses(
        (status = 204, description = "Tag deleted"),
        (status = 404, description = "No such tag for this user", body = ErrorResponse)
    ),
    tag = "Tags",
    security(("token_auth" = []))
)]
pub async fn delete_tag(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    attribute::destroy(&state, KIND, user.id, id).await
}
