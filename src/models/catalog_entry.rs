use super::Season;
use serde::{Deserialize, Serialize};

/// Seasonal watering intervals (days) and repot interval (weeks).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WateringRule {
    pub spring_days: u32,
    pub summer_days: u32,
    pub autumn_days: u32,
    pub winter_days: u32,
    pub repot_weeks: u32,
}

impl WateringRule {
    pub const fn new(
        spring_days: u32,
        summer_days: u32,
        autumn_days: u32,
        winter_days: u32,
        repot_weeks: u32,
    ) -> Self {
        Self {
            spring_days,
            summer_days,
            autumn_days,
            winter_days,
            repot_weeks,
        }
    }

    pub fn interval_days(&self, season: Season) -> u32 {
        match season {
            Season::Spring => self.spring_days,
            Season::Summer => self.summer_days,
            Season::Autumn => self.autumn_days,
            Season::Winter => self.winter_days,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    pub plant_type: String,
    pub rule: WateringRule,
}
