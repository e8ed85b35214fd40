use crate::db::Database;
use crate::error::Result;
use crate::models::{Plant, PlantStatus};
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension, Row};
use tracing::warn;

// Plant Queries

impl Database {
    pub fn insert_plant(&self, plant: &Plant) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            tx.execute(
                r#"
                INSERT INTO plants
                    (name, plant_type, last_watered, next_watering, growth_rate, status, symptoms)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                "#,
                params![
                    plant.name,
                    plant.plant_type,
                    plant.last_watered().map(|d| d.to_string()),
                    plant.next_watering.map(|d| d.to_string()),
                    plant.growth_rate,
                    plant.status.as_str(),
                    serde_json::to_string(&plant.symptoms)?,
                ],
            )?;
            replace_history(&tx, &plant.name, plant.watering_history())?;
            tx.commit()?;
            Ok(())
        })
    }

    /// Overwrite the row stored under `old_name`, inserting when it is absent.
    pub fn upsert_plant(&self, old_name: &str, plant: &Plant) -> Result<()> {
        self.with_conn_mut(|conn| {
            let tx = conn.transaction()?;
            let updated = tx.execute(
                r#"
                UPDATE plants SET
                    name = ?1, plant_type = ?2, last_watered = ?3, next_watering = ?4,
                    growth_rate = ?5, status = ?6, symptoms = ?7, updated_at = datetime('now')
                WHERE name = ?8
                "#,
                params![
                    plant.name,
                    plant.plant_type,
                    plant.last_watered().map(|d| d.to_string()),
                    plant.next_watering.map(|d| d.to_string()),
                    plant.growth_rate,
                    plant.status.as_str(),
                    serde_json::to_string(&plant.symptoms)?,
                    old_name,
                ],
            )?;
            if updated == 0 {
                tx.execute(
                    r#"
                    INSERT INTO plants
                        (name, plant_type, last_watered, next_watering, growth_rate, status, symptoms)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
                    "#,
                    params![
                        plant.name,
                        plant.plant_type,
                        plant.last_watered().map(|d| d.to_string()),
                        plant.next_watering.map(|d| d.to_string()),
                        plant.growth_rate,
                        plant.status.as_str(),
                        serde_json::to_string(&plant.symptoms)?,
                    ],
                )?;
            }
            replace_history(&tx, &plant.name, plant.watering_history())?;
            tx.commit()?;
            Ok(())
        })
    }

    pub fn delete_plant(&self, name: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM plants WHERE name = ?1", [name])?;
            Ok(())
        })
    }

    pub fn get_plant(&self, name: &str) -> Result<Option<Plant>> {
        self.with_conn(|conn| {
            let plant = conn
                .query_row(
                    "SELECT * FROM plants WHERE name = ?1",
                    [name],
                    row_to_plant,
                )
                .optional()?;
            match plant {
                Some(plant) => Ok(Some(with_history(conn, plant)?)),
                None => Ok(None),
            }
        })
    }

    pub fn get_plants(&self) -> Result<Vec<Plant>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT * FROM plants ORDER BY rowid")?;
            let rows = stmt.query_map([], row_to_plant)?;

            let mut plants = Vec::new();
            for row in rows {
                match row {
                    Ok(plant) => plants.push(with_history(conn, plant)?),
                    Err(e) => warn!(error = %e, "Skipping unreadable plant row"),
                }
            }
            Ok(plants)
        })
    }
}

fn replace_history(conn: &Connection, name: &str, history: &[NaiveDate]) -> Result<()> {
    conn.execute("DELETE FROM watering_history WHERE plant_name = ?1", [name])?;
    let mut stmt = conn.prepare(
        "INSERT INTO watering_history (plant_name, position, watered_on) VALUES (?1, ?2, ?3)",
    )?;
    for (position, date) in history.iter().enumerate() {
        stmt.execute(params![name, position as i64, date.to_string()])?;
    }
    Ok(())
}

fn with_history(conn: &Connection, plant: Plant) -> Result<Plant> {
    let mut stmt = conn.prepare(
        "SELECT watered_on FROM watering_history WHERE plant_name = ?1 ORDER BY position",
    )?;
    let history = stmt
        .query_map([&plant.name], |row| row.get::<_, String>(0))?
        .filter_map(|r| r.ok())
        .filter_map(|s| parse_date(&s))
        .collect();
    Ok(plant.with_history(history))
}

fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .map_err(|_| warn!(value = %s, "Invalid date in database, ignoring"))
        .ok()
}

fn row_to_plant(row: &Row) -> rusqlite::Result<Plant> {
    let status_str: String = row.get("status")?;
    let symptoms_str: String = row.get("symptoms")?;
    let last_watered: Option<String> = row.get("last_watered")?;
    let next_watering: Option<String> = row.get("next_watering")?;

    let status = PlantStatus::from_str(&status_str).unwrap_or_else(|| {
        warn!(status = %status_str, "Unknown status in database, defaulting to Active");
        PlantStatus::Active
    });
    let symptoms: Vec<String> = serde_json::from_str(&symptoms_str).unwrap_or_else(|_| {
        warn!(symptoms = %symptoms_str, "Unreadable symptoms in database, ignoring");
        Vec::new()
    });

    let name: String = row.get("name")?;
    let mut plant = Plant::new(name, row.get::<_, String>("plant_type")?)
        .with_growth_rate(row.get("growth_rate")?)
        .with_symptoms(symptoms)
        .with_status(status);
    if let Some(date) = last_watered.as_deref().and_then(parse_date) {
        plant = plant.with_last_watered(date);
    }
    plant.next_watering = next_watering.as_deref().and_then(parse_date);
    Ok(plant)
}
