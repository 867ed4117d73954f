//! Pokemon reference catalog.
//!
//! The API never creates species; they are loaded from a JSON file, either a
//! bare array of entries or an object with a `pokemon` array:
//!
//! ```json
//! [{ "no": 25, "name": "Pikachu", "name_jp": "Pikachu", "species": "Mouse Pokemon", "description": "..." }]
//! ```

use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::errors::{PokedexError, PokedexResult};
use crate::server::database::{Database, NewPokemon};

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogFile {
    List(Vec<NewPokemon>),
    Wrapped { pokemon: Vec<NewPokemon> },
}

/// Parse catalog JSON and check every entry.
pub fn parse_catalog(json: &str) -> PokedexResult<Vec<NewPokemon>> {
    let entries = match serde_json::from_str::<CatalogFile>(json)
        .map_err(|e| PokedexError::Catalog(format!("invalid catalog JSON: {e}")))?
    {
        CatalogFile::List(entries) | CatalogFile::Wrapped { pokemon: entries } => entries,
    };

    for entry in &entries {
        if entry.no < 1 {
            return Err(PokedexError::Catalog(format!(
                "pokemon number must be positive, got {}",
                entry.no
            )));
        }
        if entry.name.trim().is_empty() {
            return Err(PokedexError::Catalog(format!(
                "pokemon #{} has an empty name",
                entry.no
            )));
        }
    }

    Ok(entries)
}

/// Read and parse a catalog file.
pub async fn load_catalog(path: &Path) -> PokedexResult<Vec<NewPokemon>> {
    let json = tokio::fs::read_to_string(path).await?;
    parse_catalog(&json)
}

/// Seed the catalog from `path` when the pokemon table is empty.
///
/// Returns the number of entries written; zero when the table already held data.
pub async fn seed_catalog(db: &Database, path: &Path) -> PokedexResult<usize> {
    let existing = db.count_pokemon().await?;
    if existing > 0 {
        info!("Pokemon catalog already holds {existing} entries, skipping seed");
        return Ok(0);
    }

    let entries = load_catalog(path).await?;
    for entry in &entries {
        db.upsert_pokemon(entry).await?;
    }

    info!(
        "Seeded {} pokemon from {}",
        entries.len(),
        path.display()
    );
    Ok(entries.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PIKACHU: &str = r#"{
        "no": 25,
        "name": "Pikachu",
        "name_jp": "Pikachu",
        "species": "Mouse Pokemon",
        "description": "Stores electricity in its cheeks."
    }"#;

    #[test]
    fn parses_bare_array() {
        let entries = parse_catalog(&format!("[{PIKACHU}]")).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].no, 25);
        assert_eq!(entries[0].name, "Pikachu");
    }

    #[test]
    fn parses_wrapped_object() {
        let entries = parse_catalog(&format!(r#"{{ "pokemon": [{PIKACHU}] }}"#)).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn rejects_non_positive_number() {
        let json = PIKACHU.replace("25", "0");
        assert!(parse_catalog(&format!("[{json}]")).is_err());
    }

    #[test]
    fn rejects_missing_fields() {
        assert!(parse_catalog(r#"[{ "no": 1, "name": "Bulbasaur" }]"#).is_err());
    }

    #[test]
    fn bundled_catalog_is_valid() {
        let entries = parse_catalog(include_str!("../../data/pokemon.json")).unwrap();
        assert!(entries.iter().any(|p| p.no == 25 && p.name == "Pikachu"));
    }

    #[test]
    fn load_catalog_reads_file() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("data/pokemon.json");
        let entries = tokio_test::block_on(load_catalog(&path)).unwrap();
        assert_eq!(entries.first().map(|p| p.no), Some(1));
    }

    #[test]
    fn load_catalog_missing_file_is_io_error() {
        let result = tokio_test::block_on(load_catalog(Path::new("no/such/catalog.json")));
        assert!(matches!(result, Err(PokedexError::Io(_))));
    }
}
