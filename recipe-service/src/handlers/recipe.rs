use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use service_core::error::AppError;

use crate::{
    dtos::recipe::{RecipeListParams, RecipePatchRequest, RecipeRequest},
    middleware::CurrentUser,
    models::{RecipeDetailResponse, RecipeResponse},
    services::{NewRecipe, RecipeUpdate},
    utils::{ResourceId, ValidatedJson},
    AppState,
};

/// List the caller's recipes, newest first
#[utoipa::path(
    get,
    path = "/recipe/recipes/",
    params(RecipeListParams),
    responses(
        (status = 200, description = "Recipes owned by the caller", body = [RecipeResponse]),
        (status = 400, description = "Malformed id filter", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Recipes",
    security(("token_auth" = []))
)]
pub async fn list_recipes(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    params: Result<Query<RecipeListParams>, QueryRejection>,
) -> Result<Json<Vec<RecipeResponse>>, AppError> {
    let Query(params) = params.map_err(|e| AppError::BadRequest(anyhow::anyhow!(e.body_text())))?;
    let tag_ids = params.tag_ids()?;
    let ingredient_ids = params.ingredient_ids()?;

    let recipes = state
        .recipe_store
        .list_recipes(user.id, tag_ids.as_deref(), ingredient_ids.as_deref())
        .await?;

    Ok(Json(recipes))
}

/// Create a recipe
#[utoipa::path(
    post,
    path = "/recipe/recipes/",
    request_body = RecipeRequest,
    responses(
        (status = 201, description = "Recipe created", body = RecipeDetailResponse),
        (status = 400, description = "Invalid payload or unknown tag/ingredient", body = ErrorResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse)
    ),
    tag = "Recipes",
    security(("token_auth" = []))
)]
pub async fn create_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<RecipeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let recipe = state
        .recipe_store
        .create_recipe(user.id, NewRecipe::from(req))
        .await?;
    Ok((StatusCode::CREATED, Json(recipe)))
}

/// Retrieve a recipe with its tags and ingredients
#[utoipa::path(
    get,
    path = "/recipe/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 200, description = "Recipe found", body = RecipeDetailResponse),
        (status = 404, description = "No such recipe for this user", body = ErrorResponse)
    ),
    tag = "Recipes",
    security(("token_auth" = []))
)]
pub async fn get_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    Ok(Json(state.recipe_store.get_recipe(user.id, id).await?))
}

/// Replace a recipe
#[utoipa::path(
    put,
    path = "/recipe/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipeRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetailResponse),
        (status = 400, description = "Invalid payload or unknown tag/ingredient", body = ErrorResponse),
        (status = 404, description = "No such recipe for this user", body = ErrorResponse)
    ),
    tag = "Recipes",
    security(("token_auth" = []))
)]
pub async fn replace_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
    ValidatedJson(req): ValidatedJson<RecipeRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let recipe = state
        .recipe_store
        .update_recipe(user.id, id, RecipeUpdate::from(req))
        .await?;
    Ok(Json(recipe))
}

/// Partially update a recipe
#[utoipa::path(
    patch,
    path = "/recipe/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    request_body = RecipePatchRequest,
    responses(
        (status = 200, description = "Recipe updated", body = RecipeDetailResponse),
        (status = 400, description = "Invalid payload or unknown tag/ingredient", body = ErrorResponse),
        (status = 404, description = "No such recipe for this user", body = ErrorResponse)
    ),
    tag = "Recipes",
    security(("token_auth" = []))
)]
pub async fn patch_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
    ValidatedJson(req): ValidatedJson<RecipePatchRequest>,
) -> Result<Json<RecipeDetailResponse>, AppError> {
    let recipe = state
        .recipe_store
        .update_recipe(user.id, id, RecipeUpdate::from(req))
        .await?;
    Ok(Json(recipe))
}

/// Delete a recipe
#[utoipa::path(
    delete,
    path = "/recipe/recipes/{id}/",
    params(("id" = i64, Path, description = "Recipe id")),
    responses(
        (status = 204, description = "Recipe deleted"),
        (status = 404, description = "No such recipe for this user", body = ErrorResponse)
    ),
    tag = "Recipes",
    security(("token_auth" = []))
)]
pub async fn delete_recipe(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    ResourceId(id): ResourceId,
) -> Result<StatusCode, AppError> {
    state.recipe_store.delete_recipe(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
