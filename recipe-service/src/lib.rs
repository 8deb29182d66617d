pub mod config;
pub mod db;
pub mod dtos;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod services;
pub mod utils;

use axum::{
    extract::State,
    http::{header, HeaderName, HeaderValue, Method},
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post},
    Json, Router,
};
use service_core::error::AppError;
use service_core::middleware::{
    rate_limit::{create_ip_rate_limiter, ip_rate_limit_middleware, IpRateLimiter},
    security_headers::security_headers_middleware,
    tracing::{make_request_span, request_id_middleware, REQUEST_ID_HEADER},
};
use sqlx::SqlitePool;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::config::{RecipeConfig, SwaggerMode};
use crate::handlers::{ingredient, method_not_allowed, recipe, tag, user};
use crate::services::{Database, RecipeStore, TokenService, UserStore};

#[derive(OpenApi)]
#[openapi(
    paths(
        health_check,
        handlers::user::create_user,
        handlers::user::create_token,
        handlers::user::get_me,
        handlers::user::update_me,
        handlers::tag::list_tags,
        handlers::tag::create_tag,
        handlers::tag::get_tag,
        handlers::tag::replace_tag,
        handlers::tag::patch_tag,
        handlers::tag::delete_tag,
        handlers::ingredient::list_ingredients,
        handlers::ingredient::create_ingredient,
        handlers::ingredient::get_ingredient,
        handlers::ingredient::replace_ingredient,
        handlers::ingredient::patch_ingredient,
        handlers::ingredient::delete_ingredient,
        handlers::recipe::list_recipes,
        handlers::recipe::create_recipe,
        handlers::recipe::get_recipe,
        handlers::recipe::replace_recipe,
        handlers::recipe::patch_recipe,
        handlers::recipe::delete_recipe,
    ),
    components(
        schemas(
            dtos::ErrorResponse,
            dtos::user::CreateUserRequest,
            dtos::user::TokenRequest,
            dtos::user::TokenResponse,
            dtos::user::UpdateProfileRequest,
            dtos::recipe::AttributeRequest,
            dtos::recipe::AttributePatchRequest,
            dtos::recipe::RecipeRequest,
            dtos::recipe::RecipePatchRequest,
            models::UserResponse,
            models::AttributeResponse,
            models::RecipeResponse,
            models::RecipeDetailResponse,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "User", description = "Registration, tokens and the caller's profile"),
        (name = "Tags", description = "Recipe tags owned by the caller"),
        (name = "Ingredients", description = "Ingredients owned by the caller"),
        (name = "Recipes", description = "Recipes owned by the caller"),
        (name = "Observability", description = "Service health"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "token_auth",
                SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::with_description(
                    "Authorization",
                    "Token <key> as returned by /user/token/",
                ))),
            );
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: RecipeConfig,
    pub db: Database,
    pub user_store: UserStore,
    pub token_service: TokenService,
    pub recipe_store: RecipeStore,
    pub token_rate_limiter: IpRateLimiter,
    pub register_rate_limiter: IpRateLimiter,
}

impl AppState {
    /// Wire services and rate limiters over an already migrated pool.
    pub fn new(config: RecipeConfig, pool: SqlitePool) -> Self {
        let db = Database::new(pool);

        let token_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.token_attempts,
            config.rate_limit.token_window_seconds,
        );
        let register_rate_limiter = create_ip_rate_limiter(
            config.rate_limit.register_attempts,
            config.rate_limit.register_window_seconds,
        );

        Self {
            user_store: UserStore::new(db.clone()),
            token_service: TokenService::new(db.clone()),
            recipe_store: RecipeStore::new(db.clone()),
            db,
            config,
            token_rate_limiter,
            register_rate_limiter,
        }
    }
}

pub fn build_router(state: AppState) -> Result<Router, AppError> {
    // Public routes, each with its own IP budget
    let register_route = Router::new()
        .route(
            "/user/create/",
            post(user::create_user).fallback(method_not_allowed),
        )
        .layer(from_fn_with_state(
            state.register_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    let token_route = Router::new()
        .route(
            "/user/token/",
            post(user::create_token).fallback(method_not_allowed),
        )
        .layer(from_fn_with_state(
            state.token_rate_limiter.clone(),
            ip_rate_limit_middleware,
        ));

    // Everything below requires a token. Authentication runs before method
    // dispatch, so an anonymous unsupported method is a 401, not a 405.
    let private_routes = Router::new()
        .route(
            "/user/me/",
            get(user::get_me)
                .patch(user::update_me)
                .put(user::update_me)
                .fallback(method_not_allowed),
        )
        .route(
            "/recipe/tags/",
            get(tag::list_tags)
                .post(tag::create_tag)
                .fallback(method_not_allowed),
        )
        .route(
            "/recipe/tags/:id/",
            get(tag::get_tag)
                .put(tag::replace_tag)
                .patch(tag::patch_tag)
                .delete(tag::delete_tag)
                .fallback(method_not_allowed),
        )
        .route(
            "/recipe/ingredient/",
            get(ingredient::list_ingredients)
                .post(ingredient::create_ingredient)
                .fallback(method_not_allowed),
        )
        .route(
            "/recipe/ingredient/:id/",
            get(ingredient::get_ingredient)
                .put(ingredient::replace_ingredient)
                .patch(ingredient::patch_ingredient)
                .delete(ingredient::delete_ingredient)
                .fallback(method_not_allowed),
        )
        .route(
            "/recipe/recipes/",
            get(recipe::list_recipes)
                .post(recipe::create_recipe)
                .fallback(method_not_allowed),
        )
        .route(
            "/recipe/recipes/:id/",
            get(recipe::get_recipe)
                .put(recipe::replace_recipe)
                .patch(recipe::patch_recipe)
                .delete(recipe::delete_recipe)
                .fallback(method_not_allowed),
        )
        .layer(from_fn_with_state(
            state.clone(),
            middleware::auth_middleware,
        ));

    let mut app = Router::new().route("/health", get(health_check));

    if state.config.swagger.enabled == SwaggerMode::Public {
        app = app.merge(SwaggerUi::new("/docs").url("/.well-known/openapi.json", ApiDoc::openapi()));
    } else {
        app = app.route(
            "/.well-known/openapi.json",
            get(|| async { Json(ApiDoc::openapi()) }),
        );
    }

    let app = app
        .merge(register_route)
        .merge(token_route)
        .merge(private_routes)
        .with_state(state.clone())
        .layer(TraceLayer::new_for_http().make_span_with(make_request_span::<axum::body::Body>))
        .layer(from_fn(request_id_middleware))
        .layer(from_fn(security_headers_middleware))
        .layer(cors_layer(&state.config.security.allowed_origins));

    Ok(app)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(origin = %origin, error = %e, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
}

/// Service health check
#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy"),
        (status = 500, description = "Database unreachable", body = dtos::ErrorResponse)
    ),
    tag = "Observability"
)]
pub async fn health_check(State(state): State<AppState>) -> Result<Json<serde_json::Value>, AppError> {
    state.db.health_check().await?;

    Ok(Json(serde_json::json!({
        "status": "healthy",
        "service": state.config.service_name,
        "version": state.config.service_version,
        "environment": format!("{:?}", state.config.environment),
        "checks": {
            "database": "up"
        }
    })))
}
