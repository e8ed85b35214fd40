use super::catalog::Catalog;
use super::diagnosis;
use super::schedule::Scheduler;
use super::status;
use crate::error::{PlantCareError, Result};
use crate::models::Plant;
use crate::stores::PlantStore;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use tracing::{error, info, warn};

/// What happens when one store fails part-way through a fan-out write.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FanOutPolicy {
    /// Attempt every store, log and report failures, never undo.
    #[default]
    BestEffort,
    /// Stop at the first failure and undo the stores that already applied
    /// the write.
    Rollback,
}

impl FanOutPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            FanOutPolicy::BestEffort => "best_effort",
            FanOutPolicy::Rollback => "rollback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreFailure {
    pub store: String,
    pub message: String,
}

/// Per-store outcome of a fan-out write.
#[derive(Debug, Clone, Default)]
pub struct FanOutReport {
    pub applied: Vec<String>,
    pub failed: Vec<StoreFailure>,
}

impl FanOutReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
enum Mutation<'a> {
    Add(&'a Plant),
    Update { old_name: &'a str, plant: &'a Plant },
    Delete(&'a str),
}

impl Mutation<'_> {
    fn apply(&self, store: &dyn PlantStore) -> Result<()> {
        match *self {
            Mutation::Add(plant) => store.add(plant),
            Mutation::Update { old_name, plant } => store.update(old_name, plant),
            Mutation::Delete(name) => store.delete(name),
        }
    }

    /// Snapshot what a store holds before the mutation so it can be undone.
    fn capture(&self, store: &dyn PlantStore) -> Result<Undo> {
        Ok(match *self {
            Mutation::Add(plant) => Self::capture_target(store, plant)?,
            Mutation::Update { old_name, plant } => match store.get(old_name)? {
                Some(prior) => Undo::Restore {
                    current_name: plant.name.clone(),
                    prior,
                },
                None => Self::capture_target(store, plant)?,
            },
            Mutation::Delete(name) => match store.get(name)? {
                Some(prior) => Undo::Reinsert(prior),
                None => Undo::Nothing,
            },
        })
    }

    /// Undo for a write that lands on `plant.name` without replacing an
    /// existing `old_name` record. A record already stored under that name
    /// is put back rather than lost.
    fn capture_target(store: &dyn PlantStore, plant: &Plant) -> Result<Undo> {
        Ok(match store.get(&plant.name)? {
            Some(prior) => Undo::Replace(prior),
            None => Undo::Remove(plant.name.clone()),
        })
    }
}

enum Undo {
    Remove(String),
    Restore { current_name: String, prior: Plant },
    /// Drop every record under the name, then reinsert the prior one.
    Replace(Plant),
    Reinsert(Plant),
    Nothing,
}

impl Undo {
    fn apply(&self, store: &dyn PlantStore) -> Result<()> {
        match self {
            Undo::Remove(name) => store.delete(name),
            Undo::Restore {
                current_name,
                prior,
            } => store.update(current_name, prior),
            Undo::Replace(prior) => {
                store.delete(&prior.name)?;
                store.add(prior)
            }
            Undo::Reinsert(plant) => store.add(plant),
            Undo::Nothing => Ok(()),
        }
    }
}

/// Merges plant records from every registered store and fans writes out to
/// all of them.
///
/// Stores are consulted in registration order; the first store to report a
/// name owns that name in the merged view. Writes take `&mut self` so callers
/// cannot interleave mutations.
pub struct PlantService {
    catalog: Catalog,
    stores: Vec<Box<dyn PlantStore>>,
    policy: FanOutPolicy,
}

impl PlantService {
    pub fn new(catalog: Catalog, policy: FanOutPolicy) -> Self {
        Self {
            catalog,
            stores: Vec::new(),
            policy,
        }
    }

    pub fn register_store(&mut self, store: Box<dyn PlantStore>) {
        info!(store = %store.name(), "Registered plant store");
        self.stores.push(store);
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn scheduler(&self) -> Scheduler<'_> {
        Scheduler::new(&self.catalog)
    }

    pub fn store_names(&self) -> Vec<&str> {
        self.stores.iter().map(|s| s.name()).collect()
    }

    /// Merged, status-annotated view of every store. Unreachable stores are
    /// skipped.
    pub fn list(&self, today: NaiveDate) -> Vec<Plant> {
        let mut seen = HashSet::new();
        let mut merged = Vec::new();
        for store in &self.stores {
            let plants = match store.get_all() {
                Ok(plants) => plants,
                Err(e) => {
                    warn!(store = %store.name(), error = %e, "Skipping store while listing plants");
                    continue;
                }
            };
            for plant in plants {
                if seen.insert(plant.key()) {
                    merged.push(plant);
                }
            }
        }
        for plant in &mut merged {
            status::refresh(plant, today);
        }
        merged
    }

    /// First store's record for `name`, status-annotated.
    pub fn get(&self, name: &str, today: NaiveDate) -> Option<Plant> {
        for store in &self.stores {
            match store.get(name) {
                Ok(Some(mut plant)) => {
                    status::refresh(&mut plant, today);
                    return Some(plant);
                }
                Ok(None) => {}
                Err(e) => {
                    warn!(store = %store.name(), error = %e, "Skipping store while looking up plant");
                }
            }
        }
        None
    }

    pub fn add(&mut self, mut plant: Plant, today: NaiveDate) -> Result<FanOutReport> {
        self.validate(&plant)?;
        if self.list(today).iter().any(|p| p.has_name(&plant.name)) {
            return Err(PlantCareError::Validation(format!(
                "A plant named '{}' already exists",
                plant.name.trim()
            )));
        }

        self.snap_type(&mut plant);
        self.scheduler().reschedule(&mut plant, today)?;
        self.fan_out(Mutation::Add(&plant))
    }

    pub fn update(
        &mut self,
        old_name: &str,
        mut plant: Plant,
        today: NaiveDate,
    ) -> Result<FanOutReport> {
        self.validate(&plant)?;
        if !plant.has_name(old_name)
            && self.list(today).iter().any(|p| p.has_name(&plant.name))
        {
            return Err(PlantCareError::Validation(format!(
                "Cannot rename '{}' to '{}': that name is already taken",
                old_name,
                plant.name.trim()
            )));
        }

        self.snap_type(&mut plant);
        self.scheduler().reschedule(&mut plant, today)?;
        self.fan_out(Mutation::Update {
            old_name,
            plant: &plant,
        })
    }

    pub fn delete(&mut self, name: &str) -> Result<FanOutReport> {
        self.fan_out(Mutation::Delete(name))
    }

    /// Record a watering on `plant` and persist it to every store.
    pub fn perform_watering(&mut self, plant: &mut Plant, today: NaiveDate) -> Result<FanOutReport> {
        self.scheduler().perform_watering(plant, today)?;
        let name = plant.name.clone();
        self.fan_out(Mutation::Update {
            old_name: &name,
            plant: &*plant,
        })
    }

    /// Look up `name`, water it on `today` and persist the result.
    pub fn water(&mut self, name: &str, today: NaiveDate) -> Result<(Plant, FanOutReport)> {
        let mut plant = self
            .get(name, today)
            .ok_or_else(|| PlantCareError::NotFound(format!("plant '{}'", name)))?;
        let report = self.perform_watering(&mut plant, today)?;
        Ok((plant, report))
    }

    pub fn clear_history(&mut self, name: &str, today: NaiveDate) -> Result<FanOutReport> {
        let mut plant = self
            .get(name, today)
            .ok_or_else(|| PlantCareError::NotFound(format!("plant '{}'", name)))?;
        plant.clear_history();
        let key = plant.name.clone();
        self.fan_out(Mutation::Update {
            old_name: &key,
            plant: &plant,
        })
    }

    pub fn next_repot(&self, name: &str, today: NaiveDate) -> Result<NaiveDate> {
        let plant = self
            .get(name, today)
            .ok_or_else(|| PlantCareError::NotFound(format!("plant '{}'", name)))?;
        self.scheduler().next_repot(&plant)
    }

    pub fn diagnose(&self, name: &str, today: NaiveDate) -> Result<String> {
        let plant = self
            .get(name, today)
            .ok_or_else(|| PlantCareError::NotFound(format!("plant '{}'", name)))?;
        Ok(diagnosis::diagnose(&plant.symptoms))
    }

    fn validate(&self, plant: &Plant) -> Result<()> {
        if !self.catalog.is_known_name(&plant.name) {
            return Err(PlantCareError::Validation(format!(
                "Plant '{}' is not in the catalog",
                plant.name.trim()
            )));
        }
        if !plant.growth_rate.is_finite() || plant.growth_rate < 0.0 {
            return Err(PlantCareError::Validation(format!(
                "Growth rate must be a non-negative number, got {}",
                plant.growth_rate
            )));
        }
        Ok(())
    }

    fn snap_type(&self, plant: &mut Plant) {
        let given = plant.plant_type.trim();
        if !given.is_empty() && !self.catalog.is_known_type(given) {
            warn!(plant = %plant.name, plant_type = %given, "Unknown plant type, using catalog type");
        }
        if let Some(canonical) = self.catalog.canonical_type(&plant.name) {
            plant.plant_type = canonical.to_string();
        }
    }

    fn fan_out(&self, mutation: Mutation<'_>) -> Result<FanOutReport> {
        let mut report = FanOutReport::default();
        let mut undo_log: Vec<(&dyn PlantStore, Undo)> = Vec::new();

        for store in &self.stores {
            let store: &dyn PlantStore = &**store;
            let outcome = match self.policy {
                FanOutPolicy::BestEffort => mutation.apply(store),
                FanOutPolicy::Rollback => mutation.capture(store).and_then(|undo| {
                    mutation.apply(store)?;
                    undo_log.push((store, undo));
                    Ok(())
                }),
            };

            match outcome {
                Ok(()) => report.applied.push(store.name().to_string()),
                Err(e) => {
                    warn!(store = %store.name(), error = %e, "Store write failed");
                    if self.policy == FanOutPolicy::Rollback {
                        roll_back(undo_log);
                        return Err(PlantCareError::Storage {
                            store: store.name().to_string(),
                            message: e.to_string(),
                        });
                    }
                    report.failed.push(StoreFailure {
                        store: store.name().to_string(),
                        message: e.to_string(),
                    });
                }
            }
        }

        if report.applied.is_empty() && !report.failed.is_empty() {
            let stores: Vec<&str> = report.failed.iter().map(|f| f.store.as_str()).collect();
            return Err(PlantCareError::Storage {
                store: stores.join(", "),
                message: "write reached no store".into(),
            });
        }

        Ok(report)
    }
}

fn roll_back(undo_log: Vec<(&dyn PlantStore, Undo)>) {
    for (store, undo) in undo_log.into_iter().rev() {
        match undo.apply(store) {
            Ok(()) => info!(store = %store.name(), "Rolled back store write"),
            Err(e) => error!(store = %store.name(), error = %e, "Rollback failed, store left modified"),
        }
    }
}
