//! Trainer endpoints.
//!
//! - `GET /trainer/:id` - Trainer with the Pokemon they caught
//! - `GET /trainer?limit=N` - List trainers
//! - `POST /trainer` - Create a trainer
//! - `DELETE /trainer` - Delete a trainer by `{ id }`

use axum::{
    extract::State,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::server::api_error::ApiError;
use crate::server::database::{CatchWithPokemon, Trainer};
use crate::server::handlers::{path_id, AppState, DeleteRequest, IdSegment, ListParams};
use crate::server::logging::{log_record_event, RecordEvent};
use crate::server::validation::{FieldRule, FieldType, Payload, Schema};

// ============================================================================
// Request/Response Types
// ============================================================================

/// Body of `POST /trainer`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateTrainerRequest {
    pub name: String,
    pub name_jp: String,
}

impl Schema for CreateTrainerRequest {
    const NAME: &'static str = "trainer";
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("name", FieldType::String).min_length(1),
        FieldRule::required("name_jp", FieldType::String),
    ];
}

/// A caught Pokemon as shown on its trainer.
///
/// `id` is the catch id; the names are the nickname when one is set and
/// the species name otherwise.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainerPokemon {
    pub id: i64,
    pub no: i64,
    pub name: String,
    pub name_jp: String,
    pub species: String,
    pub description: String,
}

impl From<CatchWithPokemon> for TrainerPokemon {
    fn from(row: CatchWithPokemon) -> Self {
        Self {
            id: row.id,
            no: row.no,
            name: row.name.unwrap_or(row.base_name),
            name_jp: row.name_jp.unwrap_or(row.base_name_jp),
            species: row.species,
            description: row.description,
        }
    }
}

/// Response of `GET /trainer/:id`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrainerDetail {
    pub id: i64,
    pub name: String,
    pub name_jp: String,
    pub pokemons: Vec<TrainerPokemon>,
}

// ============================================================================
// Handlers
// ============================================================================

/// Get a trainer and their caught Pokemon.
///
/// `GET /trainer/:id`
pub async fn get_trainer_handler(
    State(state): State<AppState>,
    segment: IdSegment,
) -> Result<Json<TrainerDetail>, ApiError> {
    let id = path_id(segment, "trainer id")?;

    let trainer = state
        .db
        .get_trainer(id)
        .await?
        .ok_or_else(ApiError::not_found)?;

    let pokemons = state
        .db
        .list_trainer_catches(trainer.id)
        .await?
        .into_iter()
        .map(TrainerPokemon::from)
        .collect();

    Ok(Json(TrainerDetail {
        id: trainer.id,
        name: trainer.name,
        name_jp: trainer.name_jp,
        pokemons,
    }))
}

/// List trainers.
///
/// `GET /trainer?limit=N`
pub async fn list_trainers_handler(
    State(state): State<AppState>,
    query: ListParams,
) -> Result<Json<Vec<Trainer>>, ApiError> {
    let limit = state.limit(query)?;
    let trainers = state.db.list_trainers(limit).await?;
    Ok(Json(trainers))
}

/// Create a trainer.
///
/// `POST /trainer`
pub async fn create_trainer_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateTrainerRequest>,
) -> Result<(StatusCode, Json<Trainer>), ApiError> {
    info!("Creating trainer name={}", payload.name);

    let trainer = state
        .db
        .create_trainer(&payload.name, &payload.name_jp)
        .await?;

    log_record_event(RecordEvent::Created, "trainer", trainer.id);
    Ok((StatusCode::CREATED, Json(trainer)))
}

/// Delete a trainer. Trainers that still own catches cannot be deleted.
///
/// `DELETE /trainer`
pub async fn delete_trainer_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<DeleteRequest>,
) -> Result<Json<Trainer>, ApiError> {
    let trainer = state.db.delete_trainer(payload.id).await?;

    log_record_event(RecordEvent::Deleted, "trainer", trainer.id);
    Ok(Json(trainer))
}
