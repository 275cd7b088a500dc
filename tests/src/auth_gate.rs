use axum::{
    body::Body,
    http::{Request, StatusCode, header},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{EncodingKey, Header};
use serde_json::json;
use tower::ServiceExt;
use uuid::Uuid;

use app_auth::Claims;

use crate::common::{TEST_JWT_SECRET, authed_request, response_json, setup_test_app, signup};

fn request_with_auth_header(uri: &str, value: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(header::AUTHORIZATION, value)
        .body(Body::empty())
        .unwrap()
}

fn mint_token(claims: &Claims) -> String {
    jsonwebtoken::encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_JWT_SECRET),
    )
    .unwrap()
}

#[tokio::test]
async fn malformed_authorization_headers_are_rejected() {
    let app = setup_test_app().await;

    // Each of these must fail cleanly with 401, never panic on slicing
    let malformed = [
        "",
        "B",
        "Bearer",
        "Bearer ",
        "bearer sometoken",
        "Basic dXNlcjpwYXNz",
        "Token abc.def.ghi",
    ];

    for value in malformed {
        let response = app
            .clone()
            .oneshot(request_with_auth_header("/api/v1/auth/me", value))
            .await
            .unwrap();
        assert_eq!(
            response.status(),
            StatusCode::UNAUTHORIZED,
            "header {:?} should be rejected",
            value
        );
    }
}

#[tokio::test]
async fn expired_token_is_rejected() {
    let app = setup_test_app().await;

    let (_, id) = signup(&app, "Expired User", "expired@example.com", "abc123").await;

    // Correctly signed, real subject, expiry in the past
    let now = Utc::now();
    let token = mint_token(&Claims {
        sub: id,
        iat: (now - Duration::hours(2)).timestamp(),
        exp: (now - Duration::hours(1)).timestamp(),
    });

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/auth/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_signed_with_another_secret_is_rejected() {
    let app = setup_test_app().await;

    let (_, id) = signup(&app, "Forged User", "forged@example.com", "abc123").await;

    let now = Utc::now();
    let claims = Claims {
        sub: id,
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    };
    let token = jsonwebtoken::encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(b"some_other_secret"),
    )
    .unwrap();

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/auth/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn token_with_non_identifier_subject_is_rejected() {
    let app = setup_test_app().await;

    let now = Utc::now();
    let token = mint_token(&Claims {
        sub: "not-a-record-key".to_string(),
        iat: now.timestamp(),
        exp: (now + Duration::hours(1)).timestamp(),
    });

    let response = app
        .clone()
        .oneshot(authed_request("GET", "/api/v1/auth/me", &token, None))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn update_on_another_account_is_forbidden() {
    let app = setup_test_app().await;

    let (owner_token, _) = signup(&app, "Owner", "owner-update@example.com", "abc123").await;
    let (_, victim_id) = signup(&app, "Victim", "victim-update@example.com", "abc123").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "PUT",
            &format!("/api/v1/auth/{}", victim_id),
            &owner_token,
            Some(json!({ "name": "Hijacked" })),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    // The victim's account is untouched; their credentials still work
    let victim_login = app
        .clone()
        .oneshot(crate::common::json_request(
            "POST",
            "/api/v1/auth/login",
            json!({ "email": "victim-update@example.com", "password": "abc123" }),
        ))
        .await
        .unwrap();
    assert_eq!(victim_login.status(), StatusCode::OK);
    let body = response_json(victim_login).await;
    assert_eq!(body["user"]["name"], "Victim");
}

#[tokio::test]
async fn delete_on_another_account_is_forbidden_even_for_missing_ids() {
    let app = setup_test_app().await;

    let (token, _) = signup(&app, "Deleter", "deleter@example.com", "abc123").await;

    // Ownership is checked before existence, so a random id is 403 rather
    // than 404 and cannot be used to probe which accounts exist.
    let random_id = Uuid::new_v4().simple().to_string();
    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            &format!("/api/v1/auth/{}", random_id),
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn non_uuid_path_id_is_a_client_error() {
    let app = setup_test_app().await;

    let (token, _) = signup(&app, "Path User", "path@example.com", "abc123").await;

    let response = app
        .clone()
        .oneshot(authed_request(
            "DELETE",
            "/api/v1/auth/definitely-not-a-uuid",
            &token,
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
