//! Integration tests for the catch endpoints.
#![cfg(feature = "sqlite")]

mod common;

use axum::http::{Method, StatusCode};
use serde_json::{json, Value};

use common::{create_trainer, get, send, setup_app};

async fn catch(app: &axum::Router, body: Value) -> (StatusCode, Value) {
    send(app, Method::POST, "/catch", Some(body), None).await
}

#[tokio::test]
async fn create_catch_without_names() {
    let app = setup_app().await;
    let trainer = create_trainer(&app, "Ash", "Satoshi").await;

    let (status, body) = catch(&app, json!({ "trainerId": trainer, "pokemonNo": 25 })).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["trainerId"], trainer);
    assert_eq!(body["pokemonNo"], 25);
    assert_eq!(body["name"], Value::Null);
    assert_eq!(body["name_jp"], Value::Null);
}

#[tokio::test]
async fn nickname_overrides_species_name_on_trainer() {
    let app = setup_app().await;
    let trainer = create_trainer(&app, "Ash", "Satoshi").await;

    let (status, _) = catch(
        &app,
        json!({ "trainerId": trainer, "pokemonNo": 1, "name": "Bulby" }),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let (_, body) = get(&app, &format!("/trainer/{trainer}")).await;
    assert_eq!(body["pokemons"][0]["name"], "Bulby");
    assert_eq!(body["pokemons"][0]["name_jp"], "Fushigidane");
}

#[tokio::test]
async fn patch_changes_only_given_fields() {
    let app = setup_app().await;
    let trainer = create_trainer(&app, "Ash", "Satoshi").await;
    let (_, created) = catch(&app, json!({ "trainerId": trainer, "pokemonNo": 25 })).await;
    let id = created["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/catch",
        Some(json!({ "id": id, "name": "Sparky" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["id"], id);
    assert_eq!(body["name"], "Sparky");
    assert_eq!(body["trainerId"], trainer);
    assert_eq!(body["pokemonNo"], 25);
    assert_eq!(body["name_jp"], Value::Null);
}

#[tokio::test]
async fn patch_requires_id() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/catch",
        Some(json!({ "name": "Sparky" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 - invalid catch update");
    assert_eq!(body["details"][0]["code"], "required");
}

#[tokio::test]
async fn patch_missing_catch_is_store_fault() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        "/catch",
        Some(json!({ "id": 77, "name": "Ghost" })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["kind"], "record_not_found");
}

#[tokio::test]
async fn unknown_trainer_or_species_is_rejected() {
    let app = setup_app().await;
    let trainer = create_trainer(&app, "Ash", "Satoshi").await;

    let (status, body) = catch(&app, json!({ "trainerId": 999, "pokemonNo": 25 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "400 - bad request");

    let (status, _) = catch(&app, json!({ "trainerId": trainer, "pokemonNo": 151 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn string_numbers_are_rejected() {
    let app = setup_app().await;
    let trainer = create_trainer(&app, "Ash", "Satoshi").await;

    let (status, body) = catch(&app, json!({ "trainerId": trainer, "pokemonNo": "25" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"][0]["field"], "pokemonNo");
    assert_eq!(body["details"][0]["code"], "invalid_type");
}

#[tokio::test]
async fn delete_catch_frees_trainer() {
    let app = setup_app().await;
    let trainer = create_trainer(&app, "Ash", "Satoshi").await;
    let (_, created) = catch(&app, json!({ "trainerId": trainer, "pokemonNo": 4 })).await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/catch",
        Some(json!({ "id": created["id"] })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let (status, _) = send(
        &app,
        Method::DELETE,
        "/trainer",
        Some(json!({ "id": trainer })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn delete_missing_catch_is_store_fault() {
    let app = setup_app().await;

    let (status, body) = send(
        &app,
        Method::DELETE,
        "/catch",
        Some(json!({ "id": 5 })),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["details"]["kind"], "record_not_found");
}
