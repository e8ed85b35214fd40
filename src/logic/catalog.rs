use crate::error::Result;
use crate::models::{name_key, CatalogEntry, WateringRule};
use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

/// Rule applied to plants with no catalog entry.
pub const DEFAULT_RULE: WateringRule = WateringRule::new(7, 7, 7, 14, 52);

const BUILTIN_CATALOG: &str = include_str!("../../resources/plants_catalog.csv");

const CATALOG_FIELDS: usize = 7;

/// Species reference table keyed by lowercase plant name.
#[derive(Debug, Clone, Default)]
pub struct Catalog {
    entries: HashMap<String, CatalogEntry>,
    types: HashSet<String>,
}

impl Catalog {
    pub fn builtin() -> Self {
        // An embedded str cannot fail to read
        Self::from_reader(BUILTIN_CATALOG.as_bytes()).unwrap_or_default()
    }

    /// Loads a catalog file. A missing file yields an empty catalog.
    pub fn load_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::warn!(path = %path.display(), "Catalog file not found, catalog is empty");
            return Ok(Self::default());
        }
        let file = std::fs::File::open(path)?;
        let catalog = Self::from_reader(file)?;
        tracing::info!(
            path = %path.display(),
            entries = catalog.len(),
            "Loaded plant catalog"
        );
        Ok(catalog)
    }

    /// Parses `name,type,spring,summer,autumn,winter,repot_weeks` rows.
    /// The first row is a header. Malformed rows are skipped; later rows
    /// replace earlier rows with the same name.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let mut catalog = Self::default();
        for (line, record) in rdr.records().enumerate() {
            let record = match record {
                Ok(r) => r,
                Err(e) => {
                    tracing::debug!(line = line + 2, error = %e, "Skipping unreadable catalog row");
                    continue;
                }
            };
            match parse_row(&record) {
                Some(entry) => catalog.insert(entry),
                None => {
                    tracing::debug!(line = line + 2, "Skipping malformed catalog row");
                }
            }
        }
        Ok(catalog)
    }

    fn insert(&mut self, entry: CatalogEntry) {
        self.types.insert(entry.plant_type.clone());
        self.entries.insert(entry.name.clone(), entry);
    }

    pub fn lookup(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.get(&name_key(name))
    }

    pub fn is_known_name(&self, name: &str) -> bool {
        self.lookup(name).is_some()
    }

    pub fn is_known_type(&self, plant_type: &str) -> bool {
        self.types.contains(&name_key(plant_type))
    }

    pub fn canonical_type(&self, name: &str) -> Option<&str> {
        self.lookup(name).map(|e| e.plant_type.as_str())
    }

    /// Catalog rule for `name`, or [`DEFAULT_RULE`] when the name is unknown.
    pub fn rule_for(&self, name: &str) -> WateringRule {
        self.lookup(name).map(|e| e.rule).unwrap_or(DEFAULT_RULE)
    }

    pub fn entries(&self) -> Vec<&CatalogEntry> {
        let mut entries: Vec<&CatalogEntry> = self.entries.values().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn parse_row(record: &csv::StringRecord) -> Option<CatalogEntry> {
    if record.len() < CATALOG_FIELDS {
        return None;
    }
    let name = name_key(record.get(0)?);
    let plant_type = name_key(record.get(1)?);
    if name.is_empty() {
        return None;
    }

    let mut counts = [0u32; 5];
    for (slot, field) in counts.iter_mut().zip(2..CATALOG_FIELDS) {
        let value: u32 = record.get(field)?.parse().ok()?;
        if value == 0 {
            return None;
        }
        *slot = value;
    }
    let [spring, summer, autumn, winter, repot] = counts;

    Some(CatalogEntry {
        name,
        plant_type,
        rule: WateringRule::new(spring, summer, autumn, winter, repot),
    })
}
