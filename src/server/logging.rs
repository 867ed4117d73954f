//! Request logging and tracing setup for the Pokedex API.
//!
//! This module provides:
//! - Subscriber initialisation from [`LoggingConfig`]
//! - Unique request ID tracking with request timing
//! - Request ID propagation in response headers
//! - Structured events for record changes
//!
//! # Usage
//!
//! ```rust,ignore
//! use axum::middleware;
//! use pokedex::server::logging::request_logging_middleware;
//!
//! let app = Router::new()
//!     .route("/trainer", get(list_trainers_handler))
//!     .layer(middleware::from_fn(request_logging_middleware));
//! ```

use axum::{
    body::Body,
    extract::Request,
    http::{HeaderValue, Response},
    middleware::Next,
};
use std::time::Instant;
use tracing::{info, info_span, Instrument, Level};
use uuid::Uuid;

use crate::config::LoggingConfig;

/// Install the global `tracing` subscriber.
///
/// Unknown levels fall back to `info`. Calling this twice is harmless.
pub fn init_tracing(config: &LoggingConfig) {
    let level = config.level.parse::<Level>().unwrap_or(Level::INFO);
    let _ = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .try_init();
}

/// Record change event types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordEvent {
    Created,
    Updated,
    Deleted,
}

impl std::fmt::Display for RecordEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            RecordEvent::Created => "created",
            RecordEvent::Updated => "updated",
            RecordEvent::Deleted => "deleted",
        };
        write!(f, "{}", s)
    }
}

/// Log a change to a stored record.
///
/// # Arguments
///
/// * `event` - What happened to the record
/// * `entity` - Table-level name, e.g. `"trainer"`
/// * `id` - The record id
pub fn log_record_event(event: RecordEvent, entity: &str, id: i64) {
    let span = info_span!(
        "record_event",
        event = %event,
        entity = %entity,
        id = id,
    );
    let _enter = span.enter();
    info!("Record event occurred");
}

/// Header name for the request ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Generate a new unique request ID.
pub fn generate_request_id() -> String {
    Uuid::new_v4().to_string()
}

/// Logging middleware that tracks request timing and generates request IDs.
///
/// This middleware:
/// 1. Generates a unique request ID for each incoming request
/// 2. Creates a tracing span with the request ID
/// 3. Logs the request method and path
/// 4. Measures and logs the response time
/// 5. Adds the request ID to the response headers
pub async fn request_logging_middleware(request: Request, next: Next) -> Response<Body> {
    let request_id = generate_request_id();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    let span = info_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    let start = Instant::now();

    let response = async move {
        info!("Started processing request");
        next.run(request).await
    }
    .instrument(span.clone())
    .await;

    let duration = start.elapsed();
    let status = response.status();

    let _enter = span.enter();
    info!(
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "Request completed"
    );

    let (mut parts, body) = response.into_parts();
    if let Ok(header_value) = HeaderValue::from_str(&request_id) {
        parts.headers.insert(REQUEST_ID_HEADER, header_value);
    }

    Response::from_parts(parts, body)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_id_is_valid_uuid() {
        let id = generate_request_id();
        assert!(Uuid::parse_str(&id).is_ok());
    }

    #[test]
    fn request_ids_are_unique() {
        assert_ne!(generate_request_id(), generate_request_id());
    }

    #[test]
    fn record_event_display() {
        assert_eq!(RecordEvent::Created.to_string(), "created");
        assert_eq!(RecordEvent::Updated.to_string(), "updated");
        assert_eq!(RecordEvent::Deleted.to_string(), "deleted");
    }

    #[test]
    fn init_tracing_tolerates_bad_level() {
        init_tracing(&LoggingConfig {
            level: "chatty".to_string(),
        });
        init_tracing(&LoggingConfig::default());
    }
}
