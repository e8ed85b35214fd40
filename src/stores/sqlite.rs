use super::PlantStore;
use crate::db::Database;
use crate::error::Result;
use crate::models::Plant;
use std::path::Path;

/// Relational store backed by a local SQLite database.
pub struct SqlitePlantStore {
    label: String,
    db: Database,
}

impl SqlitePlantStore {
    pub fn open(label: impl Into<String>, path: &Path) -> Result<Self> {
        Ok(Self::with_database(label, Database::open(path)?))
    }

    pub fn with_database(label: impl Into<String>, db: Database) -> Self {
        Self {
            label: label.into(),
            db,
        }
    }
}

impl PlantStore for SqlitePlantStore {
    fn name(&self) -> &str {
        &self.label
    }

    fn add(&self, plant: &Plant) -> Result<()> {
        self.db.insert_plant(plant)
    }

    fn update(&self, old_name: &str, plant: &Plant) -> Result<()> {
        self.db.upsert_plant(old_name, plant)
    }

    fn delete(&self, name: &str) -> Result<()> {
        self.db.delete_plant(name)
    }

    fn get(&self, name: &str) -> Result<Option<Plant>> {
        self.db.get_plant(name)
    }

    fn get_all(&self) -> Result<Vec<Plant>> {
        self.db.get_plants()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stores::testing::{date, exercise_contract, sample_plant};

    fn store() -> SqlitePlantStore {
        SqlitePlantStore::with_database("sqlite", Database::open_in_memory().unwrap())
    }

    #[test]
    fn sqlite_store_satisfies_contract() {
        exercise_contract(&store());
    }

    #[test]
    fn full_record_round_trips() {
        let store = store();
        let rose = sample_plant("Rose");
        store.add(&rose).unwrap();
        assert_eq!(store.get("rose").unwrap().unwrap(), rose);
    }

    #[test]
    fn duplicate_insert_is_rejected() {
        let store = store();
        store.add(&sample_plant("Rose")).unwrap();
        assert!(store.add(&sample_plant("ROSE")).is_err());
    }

    #[test]
    fn rename_carries_history() {
        let store = store();
        store.add(&sample_plant("Rose")).unwrap();

        let renamed = sample_plant("Climbing Rose").with_history(vec![date(2024, 4, 30)]);
        store.update("rose", &renamed).unwrap();

        let loaded = store.get("climbing rose").unwrap().unwrap();
        assert_eq!(loaded.watering_history(), &[date(2024, 4, 30)]);
        assert!(store.get("rose").unwrap().is_none());
    }

    #[test]
    fn delete_removes_history_rows() {
        let store = store();
        store.add(&sample_plant("Rose")).unwrap();
        store.delete("Rose").unwrap();

        let remaining: i64 = store
            .db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM watering_history", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn file_database_persists_between_opens() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plants.db");
        SqlitePlantStore::open("sqlite", &path)
            .unwrap()
            .add(&sample_plant("Rose"))
            .unwrap();

        let reopened = SqlitePlantStore::open("sqlite", &path).unwrap();
        assert_eq!(reopened.get_all().unwrap().len(), 1);
    }
}
