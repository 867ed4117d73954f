use std::path::Path;
use std::sync::Arc;

use tracing::{error, info};

use pokedex::config::init_config;
use pokedex::errors::PokedexResult;
use pokedex::server::auth::AuthState;
use pokedex::server::bootstrap::{execute_token_command, parse_token_command};
use pokedex::server::catalog::seed_catalog;
use pokedex::server::database::Database;
use pokedex::server::handlers::AppState;
use pokedex::server::logging::init_tracing;
use pokedex::server::routes::build_router;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!("Server failed: {e}");
        eprintln!("pokedex_server: {e}");
        std::process::exit(1);
    }
}

async fn run() -> PokedexResult<()> {
    let config = init_config()?;
    init_tracing(&config.logging);

    let args: Vec<String> = std::env::args().collect();
    if execute_token_command(&parse_token_command(&args), &config.auth)? {
        return Ok(());
    }

    let db = Database::connect(&config.database).await?;
    db.migrate().await?;
    info!("Database ready ({})", db.kind());

    if let Some(seed_file) = &config.database.seed_file {
        seed_catalog(&db, Path::new(seed_file)).await?;
    }

    let auth = AuthState::from_config(&config.auth)?;
    let state =
        AppState::new(Arc::new(db), auth).with_default_limit(config.api.default_limit);
    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Pokedex API listening on http://{addr}");

    axum::serve(listener, app).await?;
    Ok(())
}
