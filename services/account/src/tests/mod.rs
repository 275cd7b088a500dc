use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use crate::routes::create_routes;
use app_auth::{AccountService, CredentialHasher, JwtService};
use app_config::{AppConfig, Argon2Config};
use app_database::{db_connect::initialize_memory_db, service::DbService};
use app_models::user::{USER_TABLE, User};

async fn setup_test_app_with_config(config: AppConfig) -> Router {
    // Each test gets its own in-memory database, leaked to satisfy the
    // 'static lifetime: a connection cached in the global DB_ARC would be
    // bound to the first test's tokio runtime and die with it.
    let db_arc = &*Box::leak(Box::new(
        initialize_memory_db()
            .await
            .expect("memory db initialization failed"),
    ));

    let user_db = Arc::new(DbService::<User>::new(db_arc, USER_TABLE));

    let jwt_service = Arc::new(JwtService::new(b"router_test_secret", 24).unwrap());
    let hasher = CredentialHasher::new(&Argon2Config {
        variant: "argon2id".to_string(),
        memory: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();

    let account_service = Arc::new(
        AccountService::new(jwt_service, hasher, config.security.password.clone())
            .with_db(user_db),
    );

    create_routes(account_service, &config)
}

async fn setup_test_app() -> Router {
    setup_test_app_with_config(AppConfig::default()).await
}

fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

async fn response_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_check_responds_ok() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn signup_responds_with_token_and_redacted_user() {
    let app = setup_test_app().await;

    let request = json_request(
        "POST",
        "/api/v1/auth/signup",
        json!({
            "name": "Router Test",
            "email": "router@example.com",
            "password": "abc123",
            "confirm_password": "abc123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = response_json(response).await;
    assert!(!body["token"].as_str().unwrap().is_empty());
    assert_eq!(body["user"]["email"], "router@example.com");
    assert!(body["user"].get("password").is_none());
}

#[tokio::test]
async fn protected_route_without_token_is_unauthorized() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .uri("/api/v1/auth/me")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn body_limit_from_config_is_enforced() {
    let mut config = AppConfig::default();
    config.server.body_limit = 64;
    let app = setup_test_app_with_config(config).await;

    let request = json_request(
        "POST",
        "/api/v1/auth/signup",
        json!({
            "name": "x".repeat(256),
            "email": "limit@example.com",
            "password": "abc123",
            "confirm_password": "abc123"
        }),
    );

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let body = response_json(response).await;
    assert_eq!(body["code"], "PAYLOAD_TOO_LARGE");
}

#[tokio::test]
async fn responses_carry_security_headers() {
    let app = setup_test_app().await;

    let request = Request::builder()
        .uri("/health")
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    assert_eq!(
        response.headers().get("X-Content-Type-Options").unwrap(),
        "nosniff"
    );
    assert_eq!(response.headers().get("X-Frame-Options").unwrap(), "DENY");
}
