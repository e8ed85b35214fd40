pub mod csv_file;
pub mod json_file;
pub mod record;
pub mod sqlite;

pub use csv_file::CsvPlantStore;
pub use json_file::JsonPlantStore;
pub use sqlite::SqlitePlantStore;

use crate::config::{StoreConfig, StoreKind};
use crate::error::Result;
use crate::models::Plant;
use std::path::Path;

/// Record-store contract shared by every storage backend.
///
/// Names are matched case-insensitively.
pub trait PlantStore: Send + Sync {
    /// Label used in logs and fan-out reports
    fn name(&self) -> &str;

    fn add(&self, plant: &Plant) -> Result<()>;

    /// Replace the record stored under `old_name`. Inserts `plant` when no
    /// such record exists.
    fn update(&self, old_name: &str, plant: &Plant) -> Result<()>;

    /// Remove the record for `name`. Absent names are a no-op.
    fn delete(&self, name: &str) -> Result<()>;

    fn get(&self, name: &str) -> Result<Option<Plant>>;

    /// All records in store-defined order
    fn get_all(&self) -> Result<Vec<Plant>>;
}

/// Open the store described by `config`, resolving relative paths against
/// `data_dir`.
pub fn open_store(config: &StoreConfig, data_dir: &Path) -> Result<Box<dyn PlantStore>> {
    let path = if config.path.is_absolute() {
        config.path.clone()
    } else {
        data_dir.join(&config.path)
    };
    let label = config.label();

    let store: Box<dyn PlantStore> = match config.kind {
        StoreKind::Csv => Box::new(CsvPlantStore::open(label, path)?),
        StoreKind::Json => Box::new(JsonPlantStore::open(label, path)?),
        StoreKind::Sqlite => Box::new(SqlitePlantStore::open(label, &path)?),
    };
    Ok(store)
}

/// Shared list-rewrite helpers for the file-backed stores, which load every
/// record, edit the list in memory and write it back.
pub(crate) fn upsert_in(plants: &mut Vec<Plant>, old_name: &str, plant: &Plant) {
    match plants.iter_mut().find(|p| p.has_name(old_name)) {
        Some(existing) => *existing = plant.clone(),
        None => plants.push(plant.clone()),
    }
}

pub(crate) fn remove_from(plants: &mut Vec<Plant>, name: &str) -> bool {
    let before = plants.len();
    plants.retain(|p| !p.has_name(name));
    plants.len() != before
}
