use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PlantStatus {
    #[default]
    Active,
    Inactive,
}

impl PlantStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlantStatus::Active => "Active",
            PlantStatus::Inactive => "Inactive",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "active" => Some(PlantStatus::Active),
            "inactive" => Some(PlantStatus::Inactive),
            _ => None,
        }
    }
}

impl std::fmt::Display for PlantStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A tracked houseplant.
///
/// `last_watered` is private so that every overwrite goes through
/// [`Plant::set_last_watered`], which keeps `watering_history` as an audit
/// trail of previous watering dates.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plant {
    pub name: String,
    #[serde(rename = "type")]
    pub plant_type: String,
    last_watered: Option<NaiveDate>,
    pub next_watering: Option<NaiveDate>,
    pub growth_rate: f64,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub status: PlantStatus,
    #[serde(default)]
    watering_history: Vec<NaiveDate>,
}

impl Plant {
    pub fn new(name: impl Into<String>, plant_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            plant_type: plant_type.into(),
            last_watered: None,
            next_watering: None,
            growth_rate: 0.0,
            symptoms: Vec::new(),
            status: PlantStatus::Active,
            watering_history: Vec::new(),
        }
    }

    /// Sets the initial watering date without touching history, for plants
    /// being constructed or loaded from storage.
    pub fn with_last_watered(mut self, date: NaiveDate) -> Self {
        self.last_watered = Some(date);
        self
    }

    pub fn with_growth_rate(mut self, rate: f64) -> Self {
        self.growth_rate = rate;
        self
    }

    pub fn with_symptoms<I, S>(mut self, symptoms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.symptoms = symptoms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_status(mut self, status: PlantStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_next_watering(mut self, date: NaiveDate) -> Self {
        self.next_watering = Some(date);
        self
    }

    pub fn with_history(mut self, history: Vec<NaiveDate>) -> Self {
        self.watering_history = history;
        self
    }

    pub fn last_watered(&self) -> Option<NaiveDate> {
        self.last_watered
    }

    pub fn watering_history(&self) -> &[NaiveDate] {
        &self.watering_history
    }

    /// Overwrites the last-watered date, appending the previous value to the
    /// history when it differs from the new one.
    pub fn set_last_watered(&mut self, date: Option<NaiveDate>) {
        if let Some(previous) = self.last_watered {
            if Some(previous) != date {
                self.watering_history.push(previous);
            }
        }
        self.last_watered = date;
    }

    pub fn clear_history(&mut self) {
        self.watering_history.clear();
    }

    /// Lowercased, trimmed name used for identity comparisons.
    pub fn key(&self) -> String {
        name_key(&self.name)
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.key() == name_key(name)
    }
}

pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
