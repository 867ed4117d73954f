//! HTTP server for the Pokedex API.
//!
//! This module contains:
//! - `database`    → DB abstraction over SQLite/Postgres
//! - `catalog`     → Pokemon catalog loading and seeding
//! - `validation`  → Schema validation and the strict JSON extractor
//! - `api_error`   → Error taxonomy to HTTP response mapping
//! - `auth`        → Bearer token middleware and validator
//! - `password`    → Argon2id password hashing
//! - `handlers`    → Shared state and helpers for handlers
//! - `pokemon`, `trainer`, `catches`, `users` → Route handlers
//! - `routes`      → Declarative route table and router builder
//! - `logging`     → Tracing setup and request logging middleware
//! - `bootstrap`   → `token create` CLI command

pub mod api_error;
pub mod auth;
pub mod bootstrap;
pub mod catalog;
pub mod catches;
pub mod database;
pub mod handlers;
pub mod logging;
pub mod password;
pub mod pokemon;
pub mod routes;
pub mod trainer;
pub mod users;
pub mod validation;

pub use api_error::{ApiError, ErrorCode};
pub use auth::{AuthError, AuthState, AuthenticatedUser, Claims, JwtValidator};
pub use bootstrap::{execute_token_command, parse_token_command, TokenCommand};
pub use database::{CatchedPokemon, Database, Pokemon, Trainer, User};
pub use handlers::AppState;
pub use routes::build_router;
pub use validation::{Payload, Schema, ValidationError, ValidationResult};
