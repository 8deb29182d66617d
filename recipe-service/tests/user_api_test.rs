mod common;

use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
};
use common::TestApp;
use recipe_service::config::RecipeConfig;
use serde_json::json;
use tower::util::ServiceExt;

const CREATE_USER_URL: &str = "/user/create/";
const TOKEN_URL: &str = "/user/token/";
const ME_URL: &str = "/user/me/";

#[tokio::test]
async fn create_valid_user_success() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            CREATE_USER_URL,
            None,
            json!({
                "email": "test@londonappdev.com",
                "password": "testpass",
                "name": "Test name"
            }),
        )
        .await;

    assert_eq!(res.status, StatusCode::CREATED);
    assert_eq!(res.body["email"], "test@londonappdev.com");
    assert_eq!(res.body["name"], "Test name");
    assert!(res.body.get("password").is_none());
    assert!(res.body.get("password_hash").is_none());

    let user = app
        .state
        .user_store
        .authenticate("test@londonappdev.com", "testpass")
        .await
        .unwrap();
    assert!(user.is_some());
}

#[tokio::test]
async fn registering_twice_fails_the_second_time() {
    let app = TestApp::spawn().await;
    let payload = json!({
        "email": "test@londonappdev.com",
        "password": "testpass",
        "name": "Test"
    });

    let first = app.post(CREATE_USER_URL, None, payload.clone()).await;
    assert_eq!(first.status, StatusCode::CREATED);

    let second = app.post(CREATE_USER_URL, None, payload).await;
    assert_eq!(second.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_cannot_set_admin_flags() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            CREATE_USER_URL,
            None,
            json!({
                "email": "sneaky@example.com",
                "password": "testpass",
                "name": "Sneaky",
                "is_staff": true,
                "is_superuser": true
            }),
        )
        .await;
    assert_eq!(res.status, StatusCode::CREATED);

    let user = app
        .state
        .user_store
        .find_by_email("sneaky@example.com")
        .await
        .unwrap()
        .unwrap();
    assert!(!user.is_staff);
    assert!(!user.is_superuser);
}

#[tokio::test]
async fn password_too_short() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            CREATE_USER_URL,
            None,
            json!({ "email": "test@londonappdev.com", "password": "pw", "name": "Test" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    let exists = app
        .state
        .user_store
        .find_by_email("test@londonappdev.com")
        .await
        .unwrap();
    assert!(exists.is_none());
}

#[tokio::test]
async fn missing_email_is_rejected() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            CREATE_USER_URL,
            None,
            json!({ "email": "", "password": "testpass", "name": "Test" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);

    let res = app
        .post(CREATE_USER_URL, None, json!({ "password": "testpass", "name": "Test" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn create_token_for_user() {
    let app = TestApp::spawn().await;
    app.create_user("test@londonappdev.com", "testpass").await;

    let res = app
        .post(
            TOKEN_URL,
            None,
            json!({ "email": "test@londonappdev.com", "password": "testpass" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::OK);
    let token = res.body["token"].as_str().unwrap();
    assert_eq!(token.len(), 40);

    // Same token on a second login
    let again = app
        .post(
            TOKEN_URL,
            None,
            json!({ "email": "test@londonappdev.com", "password": "testpass" }),
        )
        .await;
    assert_eq!(again.body["token"], res.body["token"]);
}

#[tokio::test]
async fn token_login_ignores_email_domain_case() {
    let app = TestApp::spawn().await;
    app.create_user("test@londonappdev.com", "testpass").await;

    let res = app
        .post(
            TOKEN_URL,
            None,
            json!({ "email": "test@LondonAppDev.COM", "password": "testpass" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert!(res.body.get("token").is_some());
}

#[tokio::test]
async fn create_token_invalid_credentials() {
    let app = TestApp::spawn().await;
    app.create_user("test@londonappdev.com", "testpass").await;

    let res = app
        .post(
            TOKEN_URL,
            None,
            json!({ "email": "test@londonappdev.com", "password": "wrong" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.get("token").is_none());
}

#[tokio::test]
async fn create_token_no_user() {
    let app = TestApp::spawn().await;

    let res = app
        .post(
            TOKEN_URL,
            None,
            json!({ "email": "test@londonappdev.com", "password": "testpass" }),
        )
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.get("token").is_none());
}

#[tokio::test]
async fn create_token_missing_field() {
    let app = TestApp::spawn().await;

    let res = app
        .post(TOKEN_URL, None, json!({ "email": "one", "password": "" }))
        .await;

    assert_eq!(res.status, StatusCode::BAD_REQUEST);
    assert!(res.body.get("token").is_none());
}

#[tokio::test]
async fn retrieve_user_unauthorized() {
    let app = TestApp::spawn().await;

    let res = app.get(ME_URL, None).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);

    let res = app.get(ME_URL, Some("0000000000000000000000000000000000000000")).await;
    assert_eq!(res.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn retrieve_profile_success() {
    let app = TestApp::spawn().await;
    let (user, token) = app.authenticated_user("test@londonappdev.com").await;

    let res = app.get(ME_URL, Some(&token)).await;

    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body, json!({ "name": user.name, "email": user.email }));
}

#[tokio::test]
async fn bearer_scheme_is_accepted() {
    let app = TestApp::spawn().await;
    let (_, token) = app.authenticated_user("test@londonappdev.com").await;

    let request = Request::builder()
        .method(Method::GET)
        .uri(ME_URL)
        .header("Authorization", format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn post_me_not_allowed() {
    let app = TestApp::spawn().await;
    let (_, token) = app.authenticated_user("test@londonappdev.com").await;

    let res = app.post(ME_URL, Some(&token), json!({})).await;
    assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(res.body["error"], "Method not allowed");

    // Credentials are checked first
    let anonymous = app.post(ME_URL, None, json!({})).await;
    assert_eq!(anonymous.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_user_profile() {
    let app = TestApp::spawn().await;
    let (user, token) = app.authenticated_user("test@londonappdev.com").await;

    let res = app
        .patch(
            ME_URL,
            Some(&token),
            json!({ "name": "new name", "password": "newpassword123" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "new name");

    let me = app.get(ME_URL, Some(&token)).await;
    assert_eq!(me.body["name"], "new name");
    assert_eq!(me.body["email"], user.email.as_str());

    let store = &app.state.user_store;
    assert!(store
        .authenticate("test@londonappdev.com", "newpassword123")
        .await
        .unwrap()
        .is_some());
    assert!(store
        .authenticate("test@londonappdev.com", "testpass")
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn put_profile_is_partial_and_ignores_email() {
    let app = TestApp::spawn().await;
    let (_, token) = app.authenticated_user("test@londonappdev.com").await;

    let res = app
        .put(
            ME_URL,
            Some(&token),
            json!({ "name": "Renamed", "email": "other@example.com" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::OK);
    assert_eq!(res.body["name"], "Renamed");
    assert_eq!(res.body["email"], "test@londonappdev.com");

    // Password untouched
    assert!(app
        .state
        .user_store
        .authenticate("test@londonappdev.com", "testpass")
        .await
        .unwrap()
        .is_some());
}

#[tokio::test]
async fn profile_update_rejects_short_password() {
    let app = TestApp::spawn().await;
    let (_, token) = app.authenticated_user("test@londonappdev.com").await;

    let res = app
        .patch(ME_URL, Some(&token), json!({ "password": "abc" }))
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deactivated_user_loses_access() {
    let app = TestApp::spawn().await;
    let (user, token) = app.authenticated_user("test@londonappdev.com").await;

    app.state
        .user_store
        .set_active(&user.email, false)
        .await
        .unwrap();

    assert_eq!(app.get(ME_URL, Some(&token)).await.status, StatusCode::UNAUTHORIZED);
    let res = app
        .post(
            TOKEN_URL,
            None,
            json!({ "email": "test@londonappdev.com", "password": "testpass" }),
        )
        .await;
    assert_eq!(res.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn registration_is_rate_limited_per_ip() {
    let mut config = RecipeConfig::for_testing();
    config.rate_limit.register_attempts = 1;
    config.rate_limit.register_window_seconds = 3600;
    let app = TestApp::spawn_with(config).await;

    let register = |email: &str| {
        Request::builder()
            .method(Method::POST)
            .uri(CREATE_USER_URL)
            .header("content-type", "application/json")
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::from(
                json!({ "email": email, "password": "testpass", "name": "Test" }).to_string(),
            ))
            .unwrap()
    };

    let first = app
        .router
        .clone()
        .oneshot(register("one@example.com"))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app
        .router
        .clone()
        .oneshot(register("two@example.com"))
        .await
        .unwrap();
    assert_eq!(second.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(second.headers().contains_key("retry-after"));
}

#[tokio::test]
async fn get_on_public_endpoints_not_allowed() {
    let app = TestApp::spawn().await;

    for uri in [CREATE_USER_URL, TOKEN_URL] {
        let res = app.get(uri, None).await;
        assert_eq!(res.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(res.body["error"], "Method not allowed");
    }
}
