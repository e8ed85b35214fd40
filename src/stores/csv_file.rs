use super::{record, remove_from, upsert_in, PlantStore};
use crate::error::Result;
use crate::models::Plant;
use std::path::PathBuf;
use tracing::warn;

/// Line-per-record flat file store. Every mutation rewrites the whole file.
pub struct CsvPlantStore {
    label: String,
    path: PathBuf,
}

impl CsvPlantStore {
    pub fn open(label: impl Into<String>, path: PathBuf) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if !path.exists() {
            std::fs::File::create(&path)?;
        }
        Ok(Self {
            label: label.into(),
            path,
        })
    }

    fn load(&self) -> Result<Vec<Plant>> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;

        let mut plants = Vec::new();
        for (line, row) in rdr.records().enumerate() {
            let parsed = row.map_err(Into::into).and_then(|r| record::from_fields(&r));
            match parsed {
                Ok(plant) => plants.push(plant),
                Err(e) => {
                    warn!(
                        store = %self.label,
                        line = line + 1,
                        error = %e,
                        "Skipping malformed plant record"
                    );
                }
            }
        }
        Ok(plants)
    }

    fn save(&self, plants: &[Plant]) -> Result<()> {
        let mut wtr = csv::WriterBuilder::new()
            .has_headers(false)
            .from_path(&self.path)?;
        for plant in plants {
            wtr.write_record(record::to_fields(plant))?;
        }
        wtr.flush()?;
        Ok(())
    }
}

impl PlantStore for CsvPlantStore {
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::{exercise_contract, sample_plant};

    #[test]
    fn csv_store_satisfies_contract() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPlantStore::open("csv", dir.path().join("plants.csv")).unwrap();
        exercise_contract(&store);
    }

    #[test]
    fn open_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("data").join("plants.csv");
        let store = CsvPlantStore::open("csv", path.clone()).unwrap();
        assert!(path.exists());
        assert!(store.get_all().unwrap().is_empty());
    }

    #[test]
    fn history_survives_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPlantStore::open("csv", dir.path().join("plants.csv")).unwrap();
        let rose = sample_plant("Rose");
        store.add(&rose).unwrap();

        let loaded = store.get("Rose").unwrap().unwrap();
        assert_eq!(loaded, rose);
    }

    #[test]
    fn reads_legacy_file_and_skips_bad_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plants.csv");
        std::fs::write(
            &path,
            "Rose,flowering,2024-05-01,1.0,yellow leaves,Active,2024-05-04\n\
             broken line\n\
             Fern,foliage,not-a-date,0.5,,Active,\n\
             Cactus,succulent,,0.2,,Inactive,,2024-01-01;2024-02-01\n",
        )
        .unwrap();
        let store = CsvPlantStore::open("csv", path).unwrap();

        let plants = store.get_all().unwrap();
        let names: Vec<&str> = plants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["Rose", "Cactus"]);
        assert_eq!(plants[1].watering_history().len(), 2);
    }

    #[test]
    fn symptoms_with_commas_are_quoted() {
        let dir = tempfile::tempdir().unwrap();
        let store = CsvPlantStore::open("csv", dir.path().join("plants.csv")).unwrap();
        let plant = sample_plant("Rose").with_symptoms(["spots, mostly on top"]);
        store.add(&plant).unwrap();

        let loaded = store.get("Rose").unwrap().unwrap();
        assert_eq!(loaded.symptoms, vec!["spots, mostly on top".to_string()]);
    }
}
