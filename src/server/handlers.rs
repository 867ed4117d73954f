use std::sync::Arc;

use axum::extract::{
    rejection::{PathRejection, QueryRejection},
    Path, Query,
};
use serde::Deserialize;

use crate::server::api_error::ApiError;
use crate::server::auth::AuthState;
use crate::server::database::Database;
use crate::server::validation::{
    parse_integer, parse_limit, FieldRule, FieldType, IssueCode, Schema, ValidationError,
};

/// Rows returned by list endpoints when `limit` is not given.
pub const DEFAULT_LIMIT: i64 = 10;

/// Shared application state for handlers.
///
/// Built once at startup and cloned into every request; the database
/// handle is the only resource shared between requests.
#[derive(Clone, Debug)]
pub struct AppState {
    pub db: Arc<Database>,
    pub auth: AuthState,
    pub default_limit: i64,
}

impl AppState {
    pub fn new(db: Arc<Database>, auth: AuthState) -> Self {
        Self {
            db,
            auth,
            default_limit: DEFAULT_LIMIT,
        }
    }

    pub fn with_default_limit(mut self, limit: i64) -> Self {
        self.default_limit = limit;
        self
    }

    /// Resolve a `?limit=` value against the configured default.
    ///
    /// A query string the extractor cannot decode (e.g. `limit` given twice)
    /// is reported like any other invalid limit.
    pub fn limit(&self, query: ListParams) -> Result<i64, ApiError> {
        let Query(query) = query.map_err(|rejection| {
            ApiError::invalid_parameter(
                "limit",
                ValidationError::new("limit", IssueCode::InvalidType, rejection.body_text()),
            )
        })?;

        parse_limit(query.limit.as_deref(), self.default_limit)
            .map_err(|e| ApiError::invalid_parameter("limit", e))
    }
}

/// Query string of the list endpoints.
///
/// `limit` is kept as text so a non-numeric value is reported as a
/// validation failure rather than an extractor rejection.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub limit: Option<String>,
}

/// `?limit=` as extracted, rejection included.
pub type ListParams = Result<Query<ListQuery>, QueryRejection>;

/// A single `:id` path segment as extracted, rejection included.
pub type IdSegment = Result<Path<String>, PathRejection>;

/// Body of `DELETE /trainer` and `DELETE /catch`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DeleteRequest {
    pub id: i64,
}

impl Schema for DeleteRequest {
    const NAME: &'static str = "delete request";
    const FIELDS: &'static [FieldRule] = &[FieldRule::required("id", FieldType::Integer)];
}

/// Parse a numeric path segment, naming `subject` in the error.
pub fn parse_path_id(raw: &str, subject: &str) -> Result<i64, ApiError> {
    parse_integer(raw, "id").map_err(|e| ApiError::invalid_parameter(subject, e))
}

/// Resolve an `:id` segment, turning extractor rejections (such as
/// invalid percent-encoding) into the same validation error as a
/// non-numeric id.
pub fn path_id(segment: IdSegment, subject: &str) -> Result<i64, ApiError> {
    let Path(raw) = segment.map_err(|rejection| {
        ApiError::invalid_parameter(
            subject,
            ValidationError::new("id", IssueCode::InvalidType, rejection.body_text()),
        )
    })?;
    parse_path_id(&raw, subject)
}

/// Fallback for unmatched routes and methods.
pub async fn endpoint_not_found() -> ApiError {
    ApiError::endpoint_not_found()
}
