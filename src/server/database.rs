use serde::{Deserialize, Serialize};
use sqlx::{query, query_as, query_scalar, FromRow};
use tracing::{error, info};

#[cfg(feature = "sqlite")]
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

#[cfg(feature = "postgres")]
use sqlx::postgres::{PgPool, PgPoolOptions};

use crate::config::DatabaseConfig;
use crate::errors::{PokedexError, PokedexResult};

/// A species from the reference catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Pokemon {
    pub id: i64,
    pub no: i64,
    pub name: String,
    pub name_jp: String,
    pub species: String,
    pub description: String,
}

/// Catalog entry before it has been stored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NewPokemon {
    pub no: i64,
    pub name: String,
    pub name_jp: String,
    pub species: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct Trainer {
    pub id: i64,
    pub name: String,
    pub name_jp: String,
}

/// One trainer's record of a caught species, with optional nicknames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow)]
pub struct CatchedPokemon {
    pub id: i64,
    #[serde(rename = "trainerId")]
    pub trainer_id: i64,
    #[serde(rename = "pokemonNo")]
    pub pokemon_no: i64,
    pub name: Option<String>,
    pub name_jp: Option<String>,
}

/// A catch joined with its catalog row.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct CatchWithPokemon {
    /// Id of the catch, not of the species
    pub id: i64,
    pub no: i64,
    pub name: Option<String>,
    pub name_jp: Option<String>,
    pub base_name: String,
    pub base_name_jp: String,
    pub species: String,
    pub description: String,
}

/// Partial update of a catch. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatchChanges {
    pub trainer_id: Option<i64>,
    pub pokemon_no: Option<i64>,
    pub name: Option<String>,
    pub name_jp: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct User {
    pub id: i64,
    pub name: String,
    /// PHC password hash; never serialized.
    #[serde(skip_serializing)]
    pub password: String,
}

/// Unified database abstraction over SQLite and Postgres.
///
/// Available variants depend on enabled features:
/// - `sqlite` feature enables `Database::SQLite`
/// - `postgres` feature enables `Database::Postgres`
///
/// Queries use `$n` placeholders, which both backends accept, so each
/// statement is written once and dispatched through `with_pool!`.
#[derive(Debug, Clone)]
pub enum Database {
    #[cfg(feature = "sqlite")]
    SQLite(SqlitePool),
    #[cfg(feature = "postgres")]
    Postgres(PgPool),
}

/// Evaluate `$body` with `$pool` bound to whichever pool backs `$db`.
macro_rules! with_pool {
    ($db:expr, |$pool:ident| $body:expr) => {
        match $db {
            #[cfg(feature = "sqlite")]
            Database::SQLite($pool) => $body,
            #[cfg(feature = "postgres")]
            Database::Postgres($pool) => $body,
        }
    };
}

#[cfg(feature = "sqlite")]
const SQLITE_SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS trainer (
        id      INTEGER PRIMARY KEY AUTOINCREMENT,
        name    TEXT NOT NULL,
        name_jp TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS pokemon (
        id          INTEGER PRIMARY KEY AUTOINCREMENT,
        "no"        INTEGER NOT NULL UNIQUE,
        name        TEXT NOT NULL,
        name_jp     TEXT NOT NULL,
        species     TEXT NOT NULL,
        description TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS catched_pokemon (
        id         INTEGER PRIMARY KEY AUTOINCREMENT,
        trainer_id INTEGER NOT NULL REFERENCES trainer (id) ON DELETE RESTRICT,
        pokemon_no INTEGER NOT NULL REFERENCES pokemon ("no") ON DELETE RESTRICT,
        name       TEXT,
        name_jp    TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id       INTEGER PRIMARY KEY AUTOINCREMENT,
        name     TEXT NOT NULL,
        password TEXT NOT NULL
    )"#,
];

#[cfg(feature = "postgres")]
const POSTGRES_SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS trainer (
        id      BIGSERIAL PRIMARY KEY,
        name    TEXT NOT NULL,
        name_jp TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS pokemon (
        id          BIGSERIAL PRIMARY KEY,
        "no"        BIGINT NOT NULL UNIQUE,
        name        TEXT NOT NULL,
        name_jp     TEXT NOT NULL,
        species     TEXT NOT NULL,
        description TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS catched_pokemon (
        id         BIGSERIAL PRIMARY KEY,
        trainer_id BIGINT NOT NULL REFERENCES trainer (id) ON DELETE RESTRICT,
        pokemon_no BIGINT NOT NULL REFERENCES pokemon ("no") ON DELETE RESTRICT,
        name       TEXT,
        name_jp    TEXT
    )"#,
    r#"CREATE TABLE IF NOT EXISTS users (
        id       BIGSERIAL PRIMARY KEY,
        name     TEXT NOT NULL,
        password TEXT NOT NULL
    )"#,
];

/// Log a failed statement and wrap it.
fn db_error(operation: &str, e: sqlx::Error) -> PokedexError {
    error!("{operation} failed: {e}");
    PokedexError::Database(e)
}

impl Database {
    /// Open a connection pool for the configured backend.
    pub async fn connect(config: &DatabaseConfig) -> PokedexResult<Self> {
        match config.db_type.as_str() {
            #[cfg(feature = "sqlite")]
            "sqlite" => {
                let options = config
                    .sqlite_url
                    .parse::<SqliteConnectOptions>()
                    .map_err(|e| db_error("parse SQLite url", e))?
                    .create_if_missing(true);

                let pool = SqlitePoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect_with(options)
                    .await
                    .map_err(|e| db_error("connect to SQLite", e))?;

                info!("Connected to SQLite at {}", config.sqlite_url);
                Ok(Database::SQLite(pool))
            }
            #[cfg(not(feature = "sqlite"))]
            "sqlite" => Err(PokedexError::ConfigError(
                "SQLite support not compiled in. Enable the 'sqlite' feature.".to_string(),
            )),
            #[cfg(feature = "postgres")]
            "postgres" => {
                let pool = PgPoolOptions::new()
                    .max_connections(config.max_connections)
                    .connect(&config.postgres_url)
                    .await
                    .map_err(|e| db_error("connect to PostgreSQL", e))?;

                info!("Connected to PostgreSQL");
                Ok(Database::Postgres(pool))
            }
            #[cfg(not(feature = "postgres"))]
            "postgres" => Err(PokedexError::ConfigError(
                "PostgreSQL support not compiled in. Enable the 'postgres' feature.".to_string(),
            )),
            other => Err(PokedexError::ConfigError(format!(
                "unsupported database type: {other}"
            ))),
        }
    }

    /// Backend name, for logs.
    pub fn kind(&self) -> &'static str {
        match self {
            #[cfg(feature = "sqlite")]
            Database::SQLite(_) => "sqlite",
            #[cfg(feature = "postgres")]
            Database::Postgres(_) => "postgres",
        }
    }

    /// Create all tables that do not exist yet.
    pub async fn migrate(&self) -> PokedexResult<()> {
        match self {
            #[cfg(feature = "sqlite")]
            Database::SQLite(pool) => {
                for statement in SQLITE_SCHEMA {
                    query(*statement)
                        .execute(pool)
                        .await
                        .map_err(|e| db_error("migrate", e))?;
                }
            }
            #[cfg(feature = "postgres")]
            Database::Postgres(pool) => {
                for statement in POSTGRES_SCHEMA {
                    query(*statement)
                        .execute(pool)
                        .await
                        .map_err(|e| db_error("migrate", e))?;
                }
            }
        }
        Ok(())
    }

    // ========================================================================
    // Pokemon
    // ========================================================================

    /// Look up a species by its number.
    pub async fn get_pokemon_by_no(&self, no: i64) -> PokedexResult<Option<Pokemon>> {
        with_pool!(self, |pool| {
            query_as::<_, Pokemon>(
                r#"SELECT id, "no", name, name_jp, species, description
                   FROM pokemon WHERE "no" = $1"#,
            )
            .bind(no)
            .fetch_optional(pool)
            .await
        })
        .map_err(|e| db_error("get_pokemon_by_no", e))
    }

    pub async fn list_pokemon(&self, limit: i64) -> PokedexResult<Vec<Pokemon>> {
        with_pool!(self, |pool| {
            query_as::<_, Pokemon>(
                r#"SELECT id, "no", name, name_jp, species, description
                   FROM pokemon ORDER BY id LIMIT $1"#,
            )
            .bind(limit)
            .fetch_all(pool)
            .await
        })
        .map_err(|e| db_error("list_pokemon", e))
    }

    /// Insert a catalog entry, or refresh the one with the same number.
    pub async fn upsert_pokemon(&self, pokemon: &NewPokemon) -> PokedexResult<Pokemon> {
        with_pool!(self, |pool| {
            query_as::<_, Pokemon>(
                r#"INSERT INTO pokemon ("no", name, name_jp, species, description)
                   VALUES ($1, $2, $3, $4, $5)
                   ON CONFLICT ("no") DO UPDATE SET
                       name        = excluded.name,
                       name_jp     = excluded.name_jp,
                       species     = excluded.species,
                       description = excluded.description
                   RETURNING id, "no", name, name_jp, species, description"#,
            )
            .bind(pokemon.no)
            .bind(&pokemon.name)
            .bind(&pokemon.name_jp)
            .bind(&pokemon.species)
            .bind(&pokemon.description)
            .fetch_one(pool)
            .await
        })
        .map_err(|e| db_error("upsert_pokemon", e))
    }

    pub async fn count_pokemon(&self) -> PokedexResult<i64> {
        with_pool!(self, |pool| {
            query_scalar::<_, i64>("SELECT COUNT(*) FROM pokemon")
                .fetch_one(pool)
                .await
        })
        .map_err(|e| db_error("count_pokemon", e))
    }

    // ========================================================================
    // Trainers
    // ========================================================================

    pub async fn get_trainer(&self, id: i64) -> PokedexResult<Option<Trainer>> {
        with_pool!(self, |pool| {
            query_as::<_, Trainer>("SELECT id, name, name_jp FROM trainer WHERE id = $1")
                .bind(id)
                .fetch_optional(pool)
                .await
        })
        .map_err(|e| db_error("get_trainer", e))
    }

    pub async fn list_trainers(&self, limit: i64) -> PokedexResult<Vec<Trainer>> {
        with_pool!(self, |pool| {
            query_as::<_, Trainer>("SELECT id, name, name_jp FROM trainer ORDER BY id LIMIT $1")
                .bind(limit)
                .fetch_all(pool)
                .await
        })
        .map_err(|e| db_error("list_trainers", e))
    }

    pub async fn create_trainer(&self, name: &str, name_jp: &str) -> PokedexResult<Trainer> {
        with_pool!(self, |pool| {
            query_as::<_, Trainer>(
                "INSERT INTO trainer (name, name_jp) VALUES ($1, $2) RETURNING id, name, name_jp",
            )
            .bind(name)
            .bind(name_jp)
            .fetch_one(pool)
            .await
        })
        .map_err(|e| db_error("create_trainer", e))
    }

    /// Delete a trainer. Fails while catches still reference it.
    pub async fn delete_trainer(&self, id: i64) -> PokedexResult<Trainer> {
        with_pool!(self, |pool| {
            query_as::<_, Trainer>(
                "DELETE FROM trainer WHERE id = $1 RETURNING id, name, name_jp",
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        })
        .map_err(|e| db_error("delete_trainer", e))?
        .ok_or(PokedexError::RecordNotFound {
            entity: "trainer",
            id,
        })
    }

    /// All catches of a trainer, joined with their catalog rows.
    pub async fn list_trainer_catches(
        &self,
        trainer_id: i64,
    ) -> PokedexResult<Vec<CatchWithPokemon>> {
        with_pool!(self, |pool| {
            query_as::<_, CatchWithPokemon>(
                r#"SELECT c.id, p."no", c.name, c.name_jp,
                          p.name AS base_name, p.name_jp AS base_name_jp,
                          p.species, p.description
                   FROM catched_pokemon c
                   JOIN pokemon p ON p."no" = c.pokemon_no
                   WHERE c.trainer_id = $1
                   ORDER BY c.id"#,
            )
            .bind(trainer_id)
            .fetch_all(pool)
            .await
        })
        .map_err(|e| db_error("list_trainer_catches", e))
    }

    // ========================================================================
    // Catches
    // ========================================================================

    pub async fn create_catch(
        &self,
        trainer_id: i64,
        pokemon_no: i64,
        name: Option<&str>,
        name_jp: Option<&str>,
    ) -> PokedexResult<CatchedPokemon> {
        with_pool!(self, |pool| {
            query_as::<_, CatchedPokemon>(
                r#"INSERT INTO catched_pokemon (trainer_id, pokemon_no, name, name_jp)
                   VALUES ($1, $2, $3, $4)
                   RETURNING id, trainer_id, pokemon_no, name, name_jp"#,
            )
            .bind(trainer_id)
            .bind(pokemon_no)
            .bind(name)
            .bind(name_jp)
            .fetch_one(pool)
            .await
        })
        .map_err(|e| db_error("create_catch", e))
    }

    /// Apply a partial update. The row id itself is never changed.
    pub async fn update_catch(
        &self,
        id: i64,
        changes: &CatchChanges,
    ) -> PokedexResult<CatchedPokemon> {
        with_pool!(self, |pool| {
            query_as::<_, CatchedPokemon>(
                r#"UPDATE catched_pokemon SET
                       trainer_id = COALESCE($1, trainer_id),
                       pokemon_no = COALESCE($2, pokemon_no),
                       name       = COALESCE($3, name),
                       name_jp    = COALESCE($4, name_jp)
                   WHERE id = $5
                   RETURNING id, trainer_id, pokemon_no, name, name_jp"#,
            )
            .bind(changes.trainer_id)
            .bind(changes.pokemon_no)
            .bind(changes.name.as_deref())
            .bind(changes.name_jp.as_deref())
            .bind(id)
            .fetch_optional(pool)
            .await
        })
        .map_err(|e| db_error("update_catch", e))?
        .ok_or(PokedexError::RecordNotFound {
            entity: "catch",
            id,
        })
    }

    pub async fn delete_catch(&self, id: i64) -> PokedexResult<CatchedPokemon> {
        with_pool!(self, |pool| {
            query_as::<_, CatchedPokemon>(
                r#"DELETE FROM catched_pokemon WHERE id = $1
                   RETURNING id, trainer_id, pokemon_no, name, name_jp"#,
            )
            .bind(id)
            .fetch_optional(pool)
            .await
        })
        .map_err(|e| db_error("delete_catch", e))?
        .ok_or(PokedexError::RecordNotFound {
            entity: "catch",
            id,
        })
    }

    // ========================================================================
    // Users
    // ========================================================================

    pub async fn list_users(&self) -> PokedexResult<Vec<User>> {
        with_pool!(self, |pool| {
            query_as::<_, User>("SELECT id, name, password FROM users ORDER BY id")
                .fetch_all(pool)
                .await
        })
        .map_err(|e| db_error("list_users", e))
    }

    /// Store a user. `password_hash` must already be hashed.
    pub async fn create_user(&self, name: &str, password_hash: &str) -> PokedexResult<User> {
        with_pool!(self, |pool| {
            query_as::<_, User>(
                "INSERT INTO users (name, password) VALUES ($1, $2) RETURNING id, name, password",
            )
            .bind(name)
            .bind(password_hash)
            .fetch_one(pool)
            .await
        })
        .map_err(|e| db_error("create_user", e))
    }

    pub async fn delete_user(&self, id: i64) -> PokedexResult<User> {
        with_pool!(self, |pool| {
            query_as::<_, User>("DELETE FROM users WHERE id = $1 RETURNING id, name, password")
                .bind(id)
                .fetch_optional(pool)
                .await
        })
        .map_err(|e| db_error("delete_user", e))?
        .ok_or(PokedexError::RecordNotFound { entity: "user", id })
    }
}
