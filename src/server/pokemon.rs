//! Read-only Pokemon catalog endpoints.
//!
//! - `GET /pokemon/:id` - Look up a species by its number
//! - `GET /pokemon?limit=N` - List species

use axum::{extract::State, Json};
use tracing::debug;

use crate::server::api_error::ApiError;
use crate::server::database::Pokemon;
use crate::server::handlers::{path_id, AppState, IdSegment, ListParams};

/// Get a species by number.
///
/// `GET /pokemon/:id`
pub async fn get_pokemon_handler(
    State(state): State<AppState>,
    segment: IdSegment,
) -> Result<Json<Pokemon>, ApiError> {
    let no = path_id(segment, "pokemon id")?;
    debug!("Looking up pokemon no={no}");

    let pokemon = state
        .db
        .get_pokemon_by_no(no)
        .await?
        .ok_or_else(ApiError::not_found)?;

    Ok(Json(pokemon))
}

/// List species.
///
/// `GET /pokemon?limit=N`
pub async fn list_pokemon_handler(
    State(state): State<AppState>,
    query: ListParams,
) -> Result<Json<Vec<Pokemon>>, ApiError> {
    let limit = state.limit(query)?;
    let pokemon = state.db.list_pokemon(limit).await?;
    Ok(Json(pokemon))
}
