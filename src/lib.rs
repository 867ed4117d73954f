//! Pokedex - a REST API for Pokemon trainers and their catches
//!
//! # Features
//!
//! - `sqlite` - SQLite database backend. Enabled by default.
//! - `postgres` - PostgreSQL database backend.
//!
//! # Example
//!
//! ```toml
//! # Use defaults (sqlite)
//! pokedex-api = { path = "." }
//!
//! # PostgreSQL only
//! pokedex-api = { path = ".", default-features = false, features = ["postgres"] }
//! ```

#[cfg(not(any(feature = "sqlite", feature = "postgres")))]
compile_error!("enable at least one database backend: `sqlite` or `postgres`");

pub mod config;
pub mod errors;

pub mod server;
