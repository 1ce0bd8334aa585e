//! Load ingredients and dietary guidelines from a JSON file
//!
//! Usage: `seed-catalog <file.json>` where the file holds
//! `{"ingredients": [...], "dietary_guidelines": [...]}`. Entries go through
//! the same validation as the HTTP API. Ingredients whose name already exists
//! are skipped, so the catalog can be loaded more than once.

use std::path::PathBuf;

use serde_json::Value;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nurture::config::Config;
use nurture::models::{DietaryGuideline, Ingredient};
use nurture::store::{Entity, Store, StoreError};
use nurture::validation::FromJson;

#[derive(Debug, Default)]
struct Tally {
    created: usize,
    skipped: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("nurture=info".parse()?))
        .init();

    let Some(file) = std::env::args().nth(1).map(PathBuf::from) else {
        eprintln!("Usage: seed-catalog <file.json>");
        std::process::exit(2);
    };

    let catalog: Value = serde_json::from_str(&std::fs::read_to_string(&file)?)?;

    let config = Config::load();
    if let Some(parent) = config.database_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let store = Store::open(&config.database_path, 1)?;
    info!("Seeding {} from {}", config.database_path.display(), file.display());

    let ingredients = load::<Ingredient>(&store, &catalog, "ingredients")?;
    let guidelines = load::<DietaryGuideline>(&store, &catalog, "dietary_guidelines")?;

    info!(
        "Ingredients: {} created, {} skipped | Dietary guidelines: {} created",
        ingredients.created, ingredients.skipped, guidelines.created
    );
    Ok(())
}

/// Create every entry of one catalog section
fn load<E: Entity>(store: &Store, catalog: &Value, section: &str) -> Result<Tally, StoreError> {
    let mut tally = Tally::default();
    let Some(entries) = catalog.get(section).and_then(Value::as_array) else {
        warn!("No {} section in catalog", section);
        return Ok(tally);
    };

    for (index, entry) in entries.iter().enumerate() {
        let input = <E::Create as FromJson>::from_json(entry).map_err(|err| {
            warn!("{}[{}] is invalid: {:?}", section, index, err.fields);
            err
        })?;

        match store.create::<E>(&input) {
            Ok(_) => tally.created += 1,
            Err(StoreError::Conflict(message)) => {
                info!("Skipping {}[{}]: {}", section, index, message);
                tally.skipped += 1;
            }
            Err(err) => return Err(err),
        }
    }

    Ok(tally)
}
