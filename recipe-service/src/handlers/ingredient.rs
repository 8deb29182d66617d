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

const KIND: AttributeKind = AttributeKind::Ingredient;

/// List the caller's ingredients
#[utoipa::path(
    get,
    path = "/recipe/ingredient/",
    params(AttributeListParams),
    responses(
        (status = 200, description = "Ingredients owned by the caller, by name descending", body = [AttributeResponse]),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Ingredients",
    security(("token_auth" = []))
)]
pub async fn list_ingredients(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: Result<Query<AttributeListParams>, QueryRejection>,
) -> Result<Json<Vec<AttributeResponse>>, AppError> {
    attribute::list(&state, KIND, user.id, params).await
}

/// Create an ingredient
#[utoipa::path(
    post,
    path = "/recipe/ingredient/",
    request_body = AttributeRequest,
    responses(
        (status = 201, description = "Ingredient created", body = AttributeResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Ingredients",
    security(("token_auth" = []))
)]
pub async fn create_ingredient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<AttributeRequest>,
) -> Result<impl IntoResponse, AppError> {
    attribute::create(&state, KIND, user.id, req).await
}

/// Retrieve one of the caller's ingredients
#[utoipa::path(
    get,
    path = "/recipe/ingredient/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 200, description = "Ingredient found", body = AttributeResponse),
        (status = 404, description = "No such ingredient for this user", body = ErrorResponse)
    ),
    tag = "Ingredients",
    security(("token_auth" = []))
)]
pub async fn get_ingredient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
) -> Result<Json<AttributeResponse>, AppError> {
    attribute::retrieve(&state, KIND, user.id, id).await
}

/// Replace an ingredient
#[utoipa::path(
    put,
    path = "/recipe/ingredient/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    request_body = AttributeRequest,
    responses(
        (status = 200, description = "Ingredient updated", body = AttributeResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No such ingredient for this user", body = ErrorResponse)
    ),
    tag = "Ingredients",
    security(("token_auth" = []))
)]
pub async fn replace_ingredient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
    ValidatedJson(req): ValidatedJson<AttributeRequest>,
) -> Result<Json<AttributeResponse>, AppError> {
    attribute::update(&state, KIND, user.id, id, Some(&req.name)).await
}

/// Partially update an ingredient
#[utoipa::path(
    patch,
    path = "/recipe/ingredient/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    request_body = AttributePatchRequest,
    responses(
        (status = 200, description = "Ingredient updated", body = AttributeResponse),
        (status = 400, description = "Invalid payload", body = ErrorResponse),
        (status = 404, description = "No such ingredient for this user", body = ErrorResponse)
    ),
    tag = "Ingredients",
    security(("token_auth" = []))
)]
pub async fn patch_ingredient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
    ValidatedJson(req): ValidatedJson<AttributePatchRequest>,
) -> Result<Json<AttributeResponse>, AppError> {
    attribute::update(&state, KIND, user.id, id, req.name.as_deref()).await
}

/// Delete an ingredient; recipes using it keep existing
#[utoipa::path(
    delete,
    path = "/recipe/ingredient/{id}/",
    params(("id" = i64, Path, description = "Ingredient id")),
    responses(
        (status = 204, description = "Ingredient deleted"),
        (status = 404, description = "No such ingredient for this user", body = ErrorResponse)
    ),
    tag = "Ingredients",
    security(("token_auth" = []))
)]
pub async fn delete_ingredient(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    attribute::destroy(&state, KIND, user.id, id).await
}
