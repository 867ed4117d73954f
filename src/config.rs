//! Configuration system for the Pokedex API.
//!
//! Configuration is loaded from multiple sources with the following precedence:
//! 1. Environment variables (highest priority)
//! 2. `config.toml` file
//! 3. Default values (lowest priority)
//!
//! # Environment Variables
//!
//! - `POKEDEX_SERVER_HOST` - Server bind address
//! - `POKEDEX_SERVER_PORT` (or `PORT`) - Server port
//! - `POKEDEX_DATABASE_TYPE` - `sqlite` or `postgres`
//! - `POKEDEX_DATABASE_URL` (or `DATABASE_URL`) - Database connection URL
//! - `POKEDEX_DATABASE_MAX_CONNECTIONS` - Pool size
//! - `POKEDEX_SEED_FILE` - Pokemon catalog JSON seeded into an empty table
//! - `POKEDEX_LOG_LEVEL` - Log level (trace, debug, info, warn, error)
//! - `POKEDEX_JWT_SECRET` (or `JWT_SECRET`) - Secret for signing/validating bearer tokens
//! - `POKEDEX_JWT_ISSUER` - Required issuer claim, if any
//! - `POKEDEX_JWT_AUDIENCE` - Required audience claim, if any
//! - `POKEDEX_TOKEN_EXPIRATION_SECS` - Lifetime of minted tokens
//! - `POKEDEX_DEFAULT_LIMIT` - Row count for list endpoints without `?limit=`

use config::Config;
use serde::Deserialize;
use std::env;
use std::sync::OnceLock;

use crate::errors::{PokedexError, PokedexResult};

/// Global configuration singleton.
static CONFIG: OnceLock<PokedexConfig> = OnceLock::new();

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct PokedexConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub auth: AuthConfig,
    pub api: ApiConfig,
}

/// Server configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host address to bind to
    pub host: String,
    /// Port to listen on
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
        }
    }
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// Database type: "sqlite" or "postgres"
    pub db_type: String,
    /// SQLite connection URL
    pub sqlite_url: String,
    /// PostgreSQL connection URL
    pub postgres_url: String,
    /// Maximum pooled connections
    pub max_connections: u32,
    /// Optional Pokemon catalog file seeded on startup
    pub seed_file: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            db_type: "sqlite".to_string(),
            sqlite_url: "sqlite://pokedex.db".to_string(),
            postgres_url: "postgres://localhost/pokedex".to_string(),
            max_connections: 10,
            seed_file: None,
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Bearer token configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret (use `env:VAR_NAME` to read from another variable)
    pub jwt_secret: String,
    /// Issuer claim (iss) required on incoming tokens when set
    pub jwt_issuer: Option<String>,
    /// Audience claim (aud) required on incoming tokens when set
    pub jwt_audience: Option<String>,
    /// Lifetime of tokens minted by the CLI, in seconds
    pub token_expiration_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_issuer: None,
            jwt_audience: None,
            token_expiration_secs: 3600,
        }
    }
}

/// Behaviour of the public API surface.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Rows returned by list endpoints when `limit` is not given
    pub default_limit: i64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self { default_limit: 10 }
    }
}

fn config_err(e: config::ConfigError) -> PokedexError {
    PokedexError::ConfigError(e.to_string())
}

/// First set variable among `names`.
fn first_env(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| env::var(name).ok())
}

/// First set variable among `names`, parsed as an integer.
///
/// A set but unparsable value is an error rather than a silent fallback.
fn first_env_i64(names: &[&str]) -> PokedexResult<Option<i64>> {
    let Some((name, value)) = names
        .iter()
        .find_map(|name| env::var(name).ok().map(|value| (*name, value)))
    else {
        return Ok(None);
    };

    value.trim().parse::<i64>().map(Some).map_err(|_| {
        PokedexError::ConfigError(format!("{name} must be an integer, got '{value}'"))
    })
}

impl PokedexConfig {
    /// Load configuration from file and environment.
    ///
    /// Configuration is loaded in this order (later sources override earlier):
    /// 1. Default values
    /// 2. `config.toml` file (optional)
    /// 3. Environment variables
    pub fn load() -> PokedexResult<Self> {
        let database_url = first_env(&["POKEDEX_DATABASE_URL", "DATABASE_URL"]);
        let port = first_env_i64(&["POKEDEX_SERVER_PORT", "PORT"])?;
        let max_connections = first_env_i64(&["POKEDEX_DATABASE_MAX_CONNECTIONS"])?;
        let token_expiration_secs = first_env_i64(&["POKEDEX_TOKEN_EXPIRATION_SECS"])?;
        let default_limit = first_env_i64(&["POKEDEX_DEFAULT_LIMIT"])?;

        let builder = Config::builder()
            .set_default("server.host", "0.0.0.0")
            .map_err(config_err)?
            .set_default("server.port", 3000)
            .map_err(config_err)?
            .set_default("database.db_type", "sqlite")
            .map_err(config_err)?
            .set_default("database.sqlite_url", "sqlite://pokedex.db")
            .map_err(config_err)?
            .set_default("database.postgres_url", "postgres://localhost/pokedex")
            .map_err(config_err)?
            .set_default("database.max_connections", 10)
            .map_err(config_err)?
            .set_default("logging.level", "info")
            .map_err(config_err)?
            .set_default("auth.jwt_secret", "")
            .map_err(config_err)?
            .set_default("auth.token_expiration_secs", 3600)
            .map_err(config_err)?
            .set_default("api.default_limit", 10)
            .map_err(config_err)?
            // Load from config.toml (optional)
            .add_source(config::File::with_name("config").required(false))
            // Override with environment variables
            .set_override_option("server.host", env::var("POKEDEX_SERVER_HOST").ok())
            .map_err(config_err)?
            .set_override_option("server.port", port)
            .map_err(config_err)?
            .set_override_option("database.db_type", env::var("POKEDEX_DATABASE_TYPE").ok())
            .map_err(config_err)?
            .set_override_option(
                "database.sqlite_url",
                database_url
                    .clone()
                    .filter(|url| url.starts_with("sqlite")),
            )
            .map_err(config_err)?
            .set_override_option(
                "database.postgres_url",
                database_url.filter(|url| url.starts_with("postgres")),
            )
            .map_err(config_err)?
            .set_override_option("database.max_connections", max_connections)
            .map_err(config_err)?
            .set_override_option("database.seed_file", env::var("POKEDEX_SEED_FILE").ok())
            .map_err(config_err)?
            .set_override_option("logging.level", env::var("POKEDEX_LOG_LEVEL").ok())
            .map_err(config_err)?
            .set_override_option(
                "auth.jwt_secret",
                first_env(&["POKEDEX_JWT_SECRET", "JWT_SECRET"]),
            )
            .map_err(config_err)?
            .set_override_option("auth.jwt_issuer", env::var("POKEDEX_JWT_ISSUER").ok())
            .map_err(config_err)?
            .set_override_option("auth.jwt_audience", env::var("POKEDEX_JWT_AUDIENCE").ok())
            .map_err(config_err)?
            .set_override_option("auth.token_expiration_secs", token_expiration_secs)
            .map_err(config_err)?
            .set_override_option("api.default_limit", default_limit)
            .map_err(config_err)?;

        let settings = builder
            .build()
            .map_err(|e| PokedexError::ConfigError(format!("failed to build config: {e}")))?;

        settings
            .try_deserialize()
            .map_err(|e| PokedexError::ConfigError(format!("failed to deserialize config: {e}")))
    }

    /// Validate the configuration.
    pub fn validate(&self) -> PokedexResult<()> {
        if self.server.port == 0 {
            return Err(PokedexError::ConfigError(
                "server.port must be greater than 0".to_string(),
            ));
        }

        match self.database.db_type.as_str() {
            "sqlite" | "postgres" => {}
            other => {
                return Err(PokedexError::ConfigError(format!(
                    "database.db_type must be 'sqlite' or 'postgres', got '{other}'"
                )));
            }
        }

        if self.database.max_connections == 0 {
            return Err(PokedexError::ConfigError(
                "database.max_connections must be greater than 0".to_string(),
            ));
        }

        match self.logging.level.to_lowercase().as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            other => {
                return Err(PokedexError::ConfigError(format!(
                    "logging.level must be one of: trace, debug, info, warn, error. Got '{other}'"
                )));
            }
        }

        if self.auth.jwt_secret.is_empty() {
            return Err(PokedexError::ConfigError(
                "auth.jwt_secret is required (set POKEDEX_JWT_SECRET or JWT_SECRET)".to_string(),
            ));
        }

        if self.api.default_limit < 0 {
            return Err(PokedexError::ConfigError(
                "api.default_limit cannot be negative".to_string(),
            ));
        }

        Ok(())
    }
}

/// Get the global configuration.
///
/// This loads the configuration on first access and caches it.
/// Returns an error if configuration loading or validation fails.
pub fn get_config() -> PokedexResult<&'static PokedexConfig> {
    if let Some(config) = CONFIG.get() {
        return Ok(config);
    }

    let config = PokedexConfig::load()?;
    config.validate()?;

    // Another thread may have won the race; either value is valid.
    Ok(CONFIG.get_or_init(|| config))
}

/// Initialize configuration explicitly.
///
/// Call this early in your application to catch configuration errors.
pub fn init_config() -> PokedexResult<&'static PokedexConfig> {
    get_config()
}
