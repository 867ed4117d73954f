//! User endpoints. Passwords are hashed before they reach the database.
//!
//! - `GET /user` - List users (bearer token required)
//! - `POST /user` - Create a user
//! - `DELETE /user/:id` - Delete a user (bearer token required)

use axum::{extract::State, http::StatusCode, Json};
use serde::Deserialize;
use tracing::info;

use crate::server::api_error::ApiError;
use crate::server::auth::AuthenticatedUser;
use crate::server::database::User;
use crate::server::handlers::{path_id, AppState, IdSegment};
use crate::server::logging::{log_record_event, RecordEvent};
use crate::server::password::hash_password;
use crate::server::validation::{validate_min, FieldRule, FieldType, Payload, Schema};

/// Body of `POST /user`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateUserRequest {
    pub name: String,
    pub password: String,
}

impl Schema for CreateUserRequest {
    const NAME: &'static str = "user";
    const FIELDS: &'static [FieldRule] = &[
        FieldRule::required("name", FieldType::String),
        FieldRule::required("password", FieldType::String),
    ];
}

/// List users.
///
/// `GET /user`
pub async fn list_users_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
) -> Result<Json<Vec<User>>, ApiError> {
    info!("Listing users for subject={:?}", caller.subject);
    let users = state.db.list_users().await?;
    Ok(Json(users))
}

/// Create a user.
///
/// `POST /user`
pub async fn create_user_handler(
    State(state): State<AppState>,
    Payload(payload): Payload<CreateUserRequest>,
) -> Result<(StatusCode, Json<User>), ApiError> {
    let password = payload.password;
    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| ApiError::internal(format!("password hashing task failed: {e}")))??;
    let user = state.db.create_user(&payload.name, &password_hash).await?;

    log_record_event(RecordEvent::Created, "user", user.id);
    Ok((StatusCode::CREATED, Json(user)))
}

/// Delete a user. The id must be at least 1.
///
/// `DELETE /user/:id`
pub async fn delete_user_handler(
    State(state): State<AppState>,
    caller: AuthenticatedUser,
    segment: IdSegment,
) -> Result<Json<User>, ApiError> {
    let id = path_id(segment, "user id")?;
    validate_min(id, 1, "id").map_err(|e| ApiError::invalid_parameter("user id", e))?;

    let user = state.db.delete_user(id).await?;

    info!("User {} deleted by subject={:?}", user.id, caller.subject);
    log_record_event(RecordEvent::Deleted, "user", user.id);
    Ok(Json(user))
}
