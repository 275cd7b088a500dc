use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

use account_service::routes::create_routes;
use app_auth::{AccountService, CredentialHasher, JwtService};
use app_config::{AppConfig, Argon2Config};
use app_database::{db_connect::initialize_memory_db, service::DbService};
use app_models::user::{USER_TABLE, User};

/// Signing secret shared by every test in this crate, so individual tests
/// can mint their own tokens (expired, foreign subject) that the app will
/// accept as correctly signed.
pub const TEST_JWT_SECRET: &[u8] = b"integration_test_signing_secret";

/// Builds the full router, wired to a fresh in-memory database.
///
/// Each test gets its own database, leaked to satisfy the 'static lifetime:
/// a connection cached in the global DB_ARC would be bound to the first
/// test's tokio runtime and die with it.
pub async fn setup_test_app() -> Router {
    let db_arc = &*Box::leak(Box::new(
        initialize_memory_db()
            .await
            .expect("memory db initialization failed"),
    ));

    let user_db = Arc::new(DbService::<User>::new(db_arc, USER_TABLE));

    let jwt_service = Arc::new(JwtService::new(TEST_JWT_SECRET, 24).unwrap());
    // Low hashing cost keeps the suite fast
    let hasher = CredentialHasher::new(&Argon2Config {
        variant: "argon2id".to_string(),
        memory: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap();

    let config = AppConfig::default();
    let account_service = Arc::new(
        AccountService::new(jwt_service, hasher, config.security.password.clone())
            .with_db(user_db),
    );

    create_routes(account_service, &config)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn authed_request(method: &str, uri: &str, token: &str, body: Option<Value>) -> Request<Body> {
    let builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, format!("Bearer {}", token));

    match body {
        Some(value) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(serde_json::to_string(&value).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap()
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    let bytes = response_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}

/// Registers an account and returns `(token, user_id)`.
pub async fn signup(app: &Router, name: &str, email: &str, password: &str) -> (String, String) {
    let request = json_request(
        "POST",
        "/api/v1/auth/signup",
        json!({
            "name": name,
            "email": email,
            "password": password,
            "confirm_password": password
        }),
    );

    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK, "signup failed for {}", email);

    let body = response_json(response).await;
    let token = body["token"].as_str().unwrap().to_string();
    let id = body["user"]["id"].as_str().unwrap().to_string();
    (token, id)
}
