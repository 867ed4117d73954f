//! Endpoints for caught Pokemon.
//!
//! - `POST /catch` - Record a catch
//! - `PATCH /catch` - Partially update a catch
//! - `DELETE /catch` - Delete a catch by `{ id }`

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::server::api_error::ApiError;
use crate::server::database::{CatchChanges, CatchedPokemon};
use crate::server::handlers::{AppState, DeleteRequest};
use crate::server::logging::{log_record_event, RecordEvent};
use crate::server::validation::{FieldRule, FieldType, Payload, Schema};

/// Body of `POST /catch`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCatchRequest {
    #[serde(rename = "trainerId")]
    pub trainer_id: i64,
    #[serde(rename = "pokemonNo")]
    pub pokemon_no: i64,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_jp: Option<String>,
}

impl Schema for CreateCatchRequest {
    const NAME: &'static str = "catch";
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("trainerId", FieldType::Integer),
        FieldRule::required("pokemonNo", FieldType::Integer),
        FieldRule::optional("name", FieldType::String),
        FieldRule::optional("name_jp", FieldType::String),
    ];
}

/// Body of `PATCH /catch`. Every field but `id` is optional.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct UpdateCatchRequest {
    pub id: i64,
    #[serde(default, rename = "trainerId")]
    pub trainer_id: Option<i64>,
    #[serde(default, rename = "pokemonNo")]
    pub pokemon_no: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub name_jp: Option<String>,
}

impl Schema for UpdateCatchRequest {
    const NAME: &'static str = "catch update";
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("id", FieldType::Integer),
        FieldRule::optional("trainerId", FieldType::Integer),
        FieldRule::optional("pokemonNo", FieldType::Integer),
        FieldRule::optional("name", FieldType::String),
        FieldRule::optional("name_jp", FieldType::String),
    ];
}

impl UpdateCatchRequest {
    /// Split into the target id and the columns to change.
    pub fn into_parts(self) -> (i64, CatchChanges) {
        (
            self.id,
            CatchChanges {
                trainer_id: self.trainer_id,
                pokemon_no: self.pokemon_no,
                name: self.name,
                name_jp: self.name_jp,
            },
        )
    }
}

/// Record a catch.
///
/// `POST /catch`
pub async fn create_catch_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateCatchRequest>,
) -> Result<(StatusCode, Json<CatchedPokemon>), ApiError> {
    info!(
        "Trainer {} caught pokemon no={}",
        payload.trainer_id, payload.pokemon_no
    );

    let catch = state
        .db
        .create_catch(
            payload.trainer_id,
            payload.pokemon_no,
            payload.name.as_deref(),
            payload.name_jp.as_deref(),
        )
        .await?;

    log_record_event(RecordEvent::Created, "catch", catch.id);
    Ok((StatusCode::CREATED, Json(catch)))
}

/// Partially update a catch.
///
/// `PATCH /catch`
pub async fn update_catch_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<UpdateCatchRequest>,
) -> Result<Json<CatchedPokemon>, ApiError> {
    let (id, changes) = payload.into_parts();
    let catch = state.db.update_catch(id, &changes).await?;

    log_record_event(RecordEvent::Updated, "catch", catch.id);
    Ok(Json(catch))
}

/// Delete a catch.
///
/// `DELETE /catch`
pub async fn delete_catch_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<DeleteRequest>,
) -> Result<Json<CatchedPokemon>, ApiError> {
    let catch = state.db.delete_catch(payload.id).await?;

    log_record_event(RecordEvent::Deleted, "catch", catch.id);
    Ok(Json(catch))
}
