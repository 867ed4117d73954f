use thiserror::Error;

/// Errors raised below the HTTP layer.
///
/// Handlers never return this type directly; it is converted into an
/// [`ApiError`](crate::server::api_error::ApiError) at the response boundary.
#[derive(Debug, Error)]
pub enum PokedexError {
    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An update or delete matched no row.
    #[error("{entity} with id {id} does not exist")]
    RecordNotFound { entity: &'static str, id: i64 },

    #[error("catalog error: {0}")]
    Catalog(String),

    #[error("token error: {0}")]
    Token(String),

    #[error("password hashing failed: {0}")]
    PasswordHash(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PokedexResult<T> = Result<T, PokedexError>;
