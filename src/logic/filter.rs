use crate::models::{Plant, PlantStatus};

/// Narrows the merged plant view by status and free-text search.
#[derive(Debug, Clone, Default)]
pub struct PlantFilter {
    pub status: Option<PlantStatus>,
    pub search: Option<String>,
}

impl PlantFilter {
    pub fn new(status: Option<PlantStatus>, search: Option<String>) -> Self {
        Self { status, search }
    }

    pub fn matches(&self, plant: &Plant) -> bool {
        if let Some(status) = self.status {
            if plant.status != status {
                return false;
            }
        }

        let needle = match self.search.as_deref().map(str::trim) {
            Some(s) if !s.is_empty() => s.to_lowercase(),
            _ => return true,
        };

        plant.name.to_lowercase().contains(&needle)
            || plant.plant_type.to_lowercase().contains(&needle)
            || plant
                .symptoms
                .iter()
                .any(|s| s.to_lowercase().contains(&needle))
    }

    pub fn apply(&self, plants: Vec<Plant>) -> Vec<Plant> {
        plants.into_iter().filter(|p| self.matches(p)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plants() -> Vec<Plant> {
        vec![
            Plant::new("Rose", "flowering").with_symptoms(["Black spots"]),
            Plant::new("Boston Fern", "foliage").with_status(PlantStatus::Inactive),
            Plant::new("Basil", "herb"),
        ]
    }

    fn names(plants: &[Plant]) -> Vec<&str> {
        plants.iter().map(|p| p.name.as_str()).collect()
    }

    #[test]
    fn empty_filter_keeps_everything() {
        assert_eq!(PlantFilter::default().apply(plants()).len(), 3);
        let blank = PlantFilter::new(None, Some("   ".into()));
        assert_eq!(blank.apply(plants()).len(), 3);
    }

    #[test]
    fn status_filter() {
        let filter = PlantFilter::new(Some(PlantStatus::Inactive), None);
        assert_eq!(names(&filter.apply(plants())), vec!["Boston Fern"]);
    }

    #[test]
    fn search_covers_name_type_and_symptoms() {
        let by_name = PlantFilter::new(None, Some("FERN".into()));
        assert_eq!(names(&by_name.apply(plants())), vec!["Boston Fern"]);

        let by_type = PlantFilter::new(None, Some("herb".into()));
        assert_eq!(names(&by_type.apply(plants())), vec!["Basil"]);

        let by_symptom = PlantFilter::new(None, Some("spots".into()));
        assert_eq!(names(&by_symptom.apply(plants())), vec!["Rose"]);
    }

    #[test]
    fn status_and_search_combine() {
        let filter = PlantFilter::new(Some(PlantStatus::Active), Some("fern".into()));
        assert!(filter.apply(plants()).is_empty());
    }
}
