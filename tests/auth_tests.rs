//! Bearer token handling on guarded routes.
#![cfg(feature = "sqlite")]

mod common;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
};
use chrono::Utc;
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use tower::ServiceExt;

use common::{send, setup_app, TEST_SECRET};

fn sign(claims: Value, secret: &str) -> String {
    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .unwrap()
}

async fn get_users_with_header(value: &str) -> (StatusCode, Value) {
    let app = setup_app().await;
    let request = Request::builder()
        .method(Method::GET)
        .uri("/user")
        .header(header::AUTHORIZATION, value)
        .body(Body::empty())
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn expired_token_is_reported_as_expired() {
    let app = setup_app().await;
    let now = Utc::now().timestamp();
    let token = sign(
        json!({ "sub": "ash", "iat": now - 7200, "exp": now - 3600 }),
        TEST_SECRET,
    );

    let (status, body) = send(&app, Method::GET, "/user", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token has expired");
}

#[tokio::test]
async fn token_signed_with_other_secret_is_rejected() {
    let app = setup_app().await;
    let token = sign(json!({ "sub": "ash" }), "some-other-secret");

    let (status, body) = send(&app, Method::GET, "/user", None, Some(&token)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Unauthorized");
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn garbage_token_is_rejected() {
    let app = setup_app().await;

    let (status, body) = send(&app, Method::GET, "/user", None, Some("not.a.jwt")).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["message"], "Token is invalid");
}

#[tokio::test]
async fn token_without_expiry_is_accepted() {
    let app = setup_app().await;
    let token = sign(json!({ "sub": "ash" }), TEST_SECRET);

    let (status, _) = send(&app, Method::GET, "/user", None, Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn header_must_use_bearer_scheme() {
    let (status, body) = get_users_with_header("Basic dXNlcjpwYXNz").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(
        body["message"],
        "Authorization header must be 'Bearer <token>'"
    );
}

#[tokio::test]
async fn header_with_extra_parts_is_rejected() {
    let (status, _) = get_users_with_header("Bearer a b").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = get_users_with_header("Bearer ").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn public_routes_ignore_missing_token() {
    let app = setup_app().await;

    let (status, _) = send(&app, Method::GET, "/pokemon/1", None, None).await;
    assert_eq!(status, StatusCode::OK);
}
