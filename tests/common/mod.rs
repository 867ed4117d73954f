//! Shared helpers for the HTTP integration tests.
#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use tower::ServiceExt;

use pokedex::config::{AuthConfig, DatabaseConfig};
use pokedex::server::auth::{AuthState, JwtValidator};
use pokedex::server::catalog::seed_catalog;
use pokedex::server::database::Database;
use pokedex::server::handlers::AppState;
use pokedex::server::routes::build_router;

pub const TEST_SECRET: &str = "integration-test-secret";

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: TEST_SECRET.to_string(),
        ..Default::default()
    }
}

/// Fresh in-memory database with the schema applied and the bundled
/// catalog seeded.
pub async fn setup_db() -> Database {
    let config = DatabaseConfig {
        db_type: "sqlite".to_string(),
        sqlite_url: "sqlite::memory:".to_string(),
        // Every connection to `sqlite::memory:` is a separate database.
        max_connections: 1,
        ..Default::default()
    };

    let db = Database::connect(&config)
        .await
        .expect("failed to open in-memory database");
    db.migrate().await.expect("failed to migrate");

    let catalog = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/pokemon.json");
    seed_catalog(&db, &catalog)
        .await
        .expect("failed to seed catalog");

    db
}

pub async fn setup_app() -> Router {
    let auth = AuthState::from_config(&auth_config()).expect("valid auth config");
    build_router(AppState::new(Arc::new(setup_db().await), auth))
}

/// A valid token for the test secret.
pub fn token() -> String {
    JwtValidator::from_config(&auth_config())
        .unwrap()
        .create_token("ash")
        .unwrap()
}

/// Send one request and decode the JSON response body.
///
/// Returns `Value::Null` for an empty body.
pub async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
    bearer: Option<&str>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = bearer {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };

    (status, value)
}

pub async fn get(app: &Router, uri: &str) -> (StatusCode, Value) {
    send(app, Method::GET, uri, None, None).await
}

/// Create a trainer and return its id.
pub async fn create_trainer(app: &Router, name: &str, name_jp: &str) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        "/trainer",
        Some(serde_json::json!({ "name": name, "name_jp": name_jp })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}
