//! Shared request handling for tags and ingredients.

use axum::{
    extract::{rejection::QueryRejection, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::recipe::{AttributeListParams, AttributeRequest},
    models::{AttributeKind, AttributeResponse},
    AppState,
};

pub(crate) async fn list(
    state: &AppState,
    kind: AttributeKind,
    user_id: i64,
    params: Result<Query<AttributeListParams>, QueryRejection>,
) -> Result<Json<Vec<AttributeResponse>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;

    let attributes = state
        .recipe_store
        .list_attributes(kind, user_id, params.assigned_only())
        .await?;

    Ok(Json(attributes.into_iter().map(AttributeResponse::from).collect()))
}

pub(crate) async fn create(
    state: &AppState,
    kind: AttributeKind,
    user_id: i64,
    req: AttributeRequest,
) -> Result<impl IntoResponse, AppError> {
    let attribute = state
        .recipe_store
        .create_attribute(kind, user_id, &req.name)
        .await?;
    Ok((StatusCode::CREATED, Json(AttributeResponse::from(attribute))))
}

pub(crate) async fn retrieve(
    state: &AppState,
    kind: AttributeKind,
    user_id: i64,
    id: i64,
) -> Result<Json<AttributeResponse>, AppError> {
    let attribute = state.recipe_store.get_attribute(kind, user_id, id).await?;
    Ok(Json(attribute.into()))
}

pub(crate) async fn update(
    state: &AppState,
    kind: AttributeKind,
    user_id: i64,
    id: i64,
    name: Option<&str>,
) -> Result<Json<AttributeResponse>, AppError> {
    let attribute = state
        .recipe_store
        .update_attribute(kind, user_id, id, name)
        .await?;
    Ok(Json(attribute.into()))
}

pub(crate) async fn destroy(
    state: &AppState,
    kind: AttributeKind,
    user_id: i64,
    id: i64,
) -> Result<StatusCode, AppError> {
    state.recipe_store.delete_attribute(kind, user_id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
