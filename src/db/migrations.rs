use crate::db::Database;
use crate::error::Result;

const MIGRATIONS: &[&str] = &[
    // Migration 1: Plant records
    r#"
    CREATE TABLE IF NOT EXISTS plants (
        name TEXT PRIMARY KEY COLLATE NOCASE,
        plant_type TEXT NOT NULL,
        last_watered TEXT,
        next_watering TEXT,
        growth_rate REAL NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'Active',
        symptoms TEXT NOT NULL DEFAULT '[]',
        updated_at TEXT NOT NULL DEFAULT (datetime('now'))
    );
    "#,
    // Migration 2: Watering history
    r#"
    CREATE TABLE IF NOT EXISTS watering_history (
        id INTEGER PRIMARY KEY,
        plant_name TEXT NOT NULL COLLATE NOCASE
            REFERENCES plants(name) ON DELETE CASCADE ON UPDATE CASCADE,
        position INTEGER NOT NULL,
        watered_on TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_watering_history_plant
        ON watering_history(plant_name, position);
    "#,
];

/// Applies every migration newer than the recorded schema version, each in
/// its own transaction.
pub fn run(db: &Database) -> Result<()> {
    db.with_conn_mut(|conn| {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS schema_migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL DEFAULT (datetime('now'))
            );",
        )?;

        let applied: i64 = conn.query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_migrations",
            [],
            |row| row.get(0),
        )?;

        for (i, sql) in MIGRATIONS.iter().enumerate() {
            let version = i as i64 + 1;
            if version <= applied {
                continue;
            }
            tracing::info!(version, "Applying plant store migration");
            let tx = conn.transaction()?;
            tx.execute_batch(sql)?;
            tx.execute(
                "INSERT INTO schema_migrations (version) VALUES (?1)",
                [version],
            )?;
            tx.commit()?;
        }

        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_are_idempotent() {
        let db = Database::open_in_memory().unwrap();
        run(&db).unwrap();

        let applied: i64 = db
            .with_conn(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM schema_migrations", [], |row| {
                    row.get(0)
                })?)
            })
            .unwrap();
        assert_eq!(applied as usize, MIGRATIONS.len());
    }
}
