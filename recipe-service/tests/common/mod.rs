//! Test helper module for recipe-service integration tests.
//!
//! Every `TestApp` owns a fresh in-memory SQLite database and drives the real
//! router through `tower::ServiceExt::oneshot`.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use recipe_service::{
    build_router,
    config::RecipeConfig,
    db,
    models::User,
    services::NewUser,
    AppState,
};
use serde_json::Value;
use tower::util::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

pub struct TestResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl TestApp {
    pub async fn spawn() -> Self {
        Self::spawn_with(RecipeConfig::for_testing()).await
    }

    pub async fn spawn_with(config: RecipeConfig) -> Self {
        let pool = db::create_pool(&config.database)
            .await
            .expect("Failed to create test pool");
        db::run_migrations(&pool)
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(config, pool);
        let router = build_router(state.clone()).expect("Failed to build router");

        Self { router, state }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Token {}", token));
        }

        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into_owned()))
        };

        TestResponse { status, body }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::DELETE, uri, token, None).await
    }

    /// Create a user directly through the store.
    pub async fn create_user(&self, email: &str, password: &str) -> User {
        self.state
            .user_store
            .create_user(NewUser::new(email, password).with_name("Test name"))
            .await
            .expect("Failed to create user")
    }

    /// Create a user and return it with a valid API token.
    pub async fn authenticated_user(&self, email: &str) -> (User, String) {
        let user = self.create_user(email, "testpass").await;
        let token = self
            .state
            .token_service
            .issue_token(&user)
            .await
            .expect("Failed to issue token");
        (user, token.key)
    }

    /// Create a tag or ingredient over HTTP and return its id.
    pub async fn create_named(&self, collection: &str, token: &str, name: &str) -> i64 {
        let res = self
            .post(collection, Some(token), serde_json::json!({ "name": name }))
            .await;
        assert_eq!(res.status, StatusCode::CREATED, "{}", res.body);
        res.body["id"].as_i64().expect("id in response")
    }
}
