//! Integration tests for the Pokemon catalog endpoints.
#![cfg(feature = "sqlite")]

mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::{get, setup_app};

#[tokio::test]
async fn get_pokemon_by_number() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/pokemon/25").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["no"], 25);
    assert_eq!(body["name"], "Pikachu");
    assert_eq!(body["species"], "Mouse Pokemon");
}

#[tokio::test]
async fn unknown_number_is_404() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/pokemon/9999").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body, json!({ "error": "404 - not found" }));
}

#[tokio::test]
async fn non_numeric_number_is_400() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/pokemon/pikachu").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 - invalid pokemon id");
    assert_eq!(body["details"][0]["code"], "invalid_type");
}

#[tokio::test]
async fn list_defaults_to_ten_in_catalog_order() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/pokemon").await;
    assert_eq!(status, StatusCode::OK);
    let numbers: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["no"].as_i64().unwrap())
        .collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5, 6, 7, 8, 9, 25]);
}

#[tokio::test]
async fn list_with_limit() {
    let app = setup_app().await;

    let (_, body) = get(&app, "/pokemon?limit=3").await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (_, body) = get(&app, "/pokemon?limit=0").await;
    assert_eq!(body, json!([]));

    let (_, body) = get(&app, "/pokemon?limit=100").await;
    assert_eq!(body.as_array().unwrap().len(), 11);
}

#[tokio::test]
async fn undecodable_number_is_json_validation_error() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/pokemon/%FF").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 - invalid pokemon id");
    assert_eq!(body["details"][0]["code"], "invalid_type");
}

#[tokio::test]
async fn repeated_limit_is_json_validation_error() {
    let app = setup_app().await;

    let (status, body) = get(&app, "/pokemon?limit=1&limit=2").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 - invalid limit");
    assert_eq!(body["details"][0]["field"], "limit");
    assert_eq!(body["details"][0]["code"], "invalid_type");
}
