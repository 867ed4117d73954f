//! Error responses for every Pokedex endpoint.
//!
//! Handlers return `Result<_, ApiError>`; this is the only place where a
//! failure is turned into a status code and JSON body.
//!
//! # Response Format
//!
//! ```json
//! { "error": "404 - not found" }
//! { "error": "400 - invalid trainer", "details": [{ "field": "name", "code": "too_small", "message": "..." }] }
//! { "error": "400 - bad request", "details": { "kind": "database", "code": "787", "message": "FOREIGN KEY constraint failed" } }
//! ```
//!
//! Store faults carry the raw driver message in `details`; nothing is masked.
//! Authentication failures are rendered by [`AuthError`](crate::server::auth::AuthError).

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use crate::errors::PokedexError;
use crate::server::validation::ValidationError;

/// Error categories, each with a fixed status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body, path or query failed validation
    ValidationFailed,
    /// Single-resource lookup found no row
    NotFound,
    /// The data store rejected the operation
    StoreFault,
    /// No route matches the method and path
    EndpointNotFound,
    /// Unexpected failure outside the data store
    InternalError,
}

impl ErrorCode {
    /// Returns the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::ValidationFailed | ErrorCode::StoreFault => StatusCode::BAD_REQUEST,
            ErrorCode::NotFound | ErrorCode::EndpointNotFound => StatusCode::NOT_FOUND,
            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Returns the default `error` text for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "400 - validation failed",
            ErrorCode::NotFound => "404 - not found",
            ErrorCode::StoreFault => "400 - bad request",
            ErrorCode::EndpointNotFound => "endpoint don't exists",
            ErrorCode::InternalError => "500 - internal server error",
        }
    }
}

/// An API error response.
#[derive(Debug, Clone, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    pub code: ErrorCode,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ApiError {
    /// Creates an error with the default message for `code`.
    pub fn new(code: ErrorCode) -> Self {
        Self {
            code,
            error: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_message(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            error: message.into(),
            details: None,
        }
    }

    pub fn with_details(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            error: message.into(),
            details: Some(details),
        }
    }

    /// Returns the HTTP status code for this error.
    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // === Convenience constructors ===

    /// Validation failure for `subject` with the collected issues.
    pub fn validation(subject: &str, issues: Vec<ValidationError>) -> Self {
        Self::with_details(
            ErrorCode::ValidationFailed,
            format!("400 - invalid {subject}"),
            json!(issues),
        )
    }

    /// Validation failure for a single path or query scalar.
    pub fn invalid_parameter(subject: &str, issue: ValidationError) -> Self {
        Self::validation(subject, vec![issue])
    }

    pub fn not_found() -> Self {
        Self::new(ErrorCode::NotFound)
    }

    pub fn endpoint_not_found() -> Self {
        Self::new(ErrorCode::EndpointNotFound)
    }

    /// A data-store failure, surfaced with its raw message.
    pub fn store_fault(err: &PokedexError) -> Self {
        Self::with_details(
            ErrorCode::StoreFault,
            ErrorCode::StoreFault.default_message(),
            fault_details(err),
        )
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::with_details(
            ErrorCode::InternalError,
            ErrorCode::InternalError.default_message(),
            json!({ "message": message.into() }),
        )
    }
}

fn fault_details(err: &PokedexError) -> Value {
    match err {
        PokedexError::Database(sqlx::Error::Database(db_err)) => json!({
            "kind": "database",
            "code": db_err.code().map(|c| c.into_owned()),
            "message": db_err.message(),
        }),
        PokedexError::Database(other) => json!({
            "kind": "database",
            "message": other.to_string(),
        }),
        PokedexError::RecordNotFound { entity, id } => json!({
            "kind": "record_not_found",
            "entity": entity,
            "id": id,
            "message": err.to_string(),
        }),
        other => json!({
            "kind": "internal",
            "message": other.to_string(),
        }),
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        (status, Json(self)).into_response()
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.details {
            Some(details) => write!(f, "{}: {}", self.error, details),
            None => write!(f, "{}", self.error),
        }
    }
}

impl std::error::Error for ApiError {}

impl From<PokedexError> for ApiError {
    fn from(err: PokedexError) -> Self {
        match err {
            PokedexError::Database(_) | PokedexError::RecordNotFound { .. } => {
                warn!(error = %err, "Data store rejected request");
                ApiError::store_fault(&err)
            }
            other => {
                error!(error = %other, "Unexpected failure while handling request");
                ApiError::internal(other.to_string())
            }
        }
    }
}
