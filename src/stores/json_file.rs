use super::{remove_from, upsert_in, PlantStore};
use crate::error::Result;
use crate::models::Plant;
use std::path::PathBuf;

/// Pretty-printed JSON array of plant documents.
pub struct JsonPlantStore {
    label: String,
    path: PathBuf,
}

impl JsonPlantStore {
    pub fn open(label: impl Into<String>, path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let store = Self {
            label: label.into(),
            path,
        };
        if !store.path.exists() {
            store.save(&[])?;
        }
        Ok(store)
    }

    fn load(&self) -> Result<Vec<Plant>> {
        let content = std::fs::read_to_string(&self.path)?;
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        Ok(serde_json::from_str(&content)?)
    }

    fn save(&self, plants: &[Plant]) -> Result<()> {
        let json = serde_json::to_string_pretty(plants)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

impl PlantStore for JsonPlantStore {
    fn name(&self) -> &str {
        &self.label
    }

    fn add(&self, plant: &Plant) -> Result<()> {
        let mut plants = self.load()?;
        plants.push(plant.clone());
        self.save(&plants)
    }

    fn update(&self, old_name: &str, plant: &Plant) -> Result<()> {
        let mut plants = self.load()?;
        upsert_in(&mut plants, old_name, plant);
        self.save(&plants)
    }

    fn delete(&self, name: &str) -> Result<()> {
        let mut plants = self.load()?;
        if remove_from(&mut plants, name) {
            self.save(&plants)?;
        }
        Ok(())
    }

    fn get(&self, name: &str) -> Result<Option<Plant>> {
        Ok(self.load()?.into_iter().find(|p| p.has_name(name)))
    }

    fn get_all(&self) -> Result<Vec<Plant>> {
        self.load()
    }
}
