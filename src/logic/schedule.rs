use super::catalog::Catalog;
use super::status;
use crate::error::{PlantCareError, Result};
use crate::models::{Plant, Season};
use chrono::{Days, NaiveDate};

/// Season-aware watering and repotting calculations.
///
/// All dates are derived from the plant's last-watered date, the catalog rule
/// for its name (or the default rule) and the season of `today`.
pub struct Scheduler<'a> {
    catalog: &'a Catalog,
}

impl<'a> Scheduler<'a> {
    pub fn new(catalog: &'a Catalog) -> Self {
        Self { catalog }
    }

    /// Next watering date. Plants never watered are scheduled from `today`.
    pub fn next_watering(&self, plant: &Plant, today: NaiveDate) -> Result<NaiveDate> {
        let base = plant.last_watered().unwrap_or(today);
        let rule = self.catalog.rule_for(&plant.name);
        let days = rule.interval_days(Season::of(today));
        add_days(base, u64::from(days), &plant.name)
    }

    pub fn next_repot(&self, plant: &Plant) -> Result<NaiveDate> {
        let last = plant.last_watered().ok_or_else(|| {
            PlantCareError::Validation(format!(
                "'{}' has never been watered, repot date cannot be computed",
                plant.name
            ))
        })?;
        let rule = self.catalog.rule_for(&plant.name);
        add_days(last, u64::from(rule.repot_weeks) * 7, &plant.name)
    }

    /// Recomputes next watering and status in one step. The plant is left
    /// untouched when the date cannot be computed.
    pub fn reschedule(&self, plant: &mut Plant, today: NaiveDate) -> Result<()> {
        plant.next_watering = Some(self.next_watering(plant, today)?);
        status::refresh(plant, today);
        Ok(())
    }

    /// Records a watering on `today`. The previous last-watered date moves
    /// into history when it differs.
    pub fn perform_watering(&self, plant: &mut Plant, today: NaiveDate) -> Result<()> {
        plant.set_last_watered(Some(today));
        self.reschedule(plant, today)
    }
}

fn add_days(base: NaiveDate, days: u64, name: &str) -> Result<NaiveDate> {
    base.checked_add_days(Days::new(days)).ok_or_else(|| {
        PlantCareError::Validation(format!(
            "Schedule for '{}' falls outside the supported date range ({} + {} days)",
            name, base, days
        ))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PlantStatus;

    const SAMPLE: &str = "name,type,spring,summer,autumn,winter,repot\n\
        Rose,flowering,4,3,5,8,52\n";

    fn catalog() -> Catalog {
        Catalog::from_reader(SAMPLE.as_bytes()).unwrap()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn next_watering_uses_season_of_today() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let plant = Plant::new("Rose", "flowering").with_last_watered(date(2024, 7, 1));

        assert_eq!(scheduler.next_watering(&plant, date(2024, 7, 2)).unwrap(), date(2024, 7, 4));
        assert_eq!(scheduler.next_watering(&plant, date(2024, 4, 2)).unwrap(), date(2024, 7, 5));
        assert_eq!(scheduler.next_watering(&plant, date(2024, 10, 2)).unwrap(), date(2024, 7, 6));
        assert_eq!(scheduler.next_watering(&plant, date(2024, 1, 2)).unwrap(), date(2024, 7, 9));
    }

    #[test]
    fn never_watered_plant_is_scheduled_from_today() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let plant = Plant::new("Rose", "flowering");
        let today = date(2024, 12, 20);

        let next = scheduler.next_watering(&plant, today).unwrap();

        assert_eq!(next, date(2024, 12, 28));
        assert!(next > today);
    }

    #[test]
    fn unknown_plant_uses_default_rule() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let plant = Plant::new("Mystery", "unknown").with_last_watered(date(2024, 1, 1));

        assert_eq!(scheduler.next_watering(&plant, date(2024, 1, 5)).unwrap(), date(2024, 1, 15));
        assert_eq!(scheduler.next_repot(&plant).unwrap(), date(2024, 12, 30));
    }

    #[test]
    fn next_watering_is_strictly_after_last_watered() {
        let catalog = Catalog::builtin();
        let scheduler = Scheduler::new(&catalog);
        let last = date(2024, 2, 28);
        for entry in catalog.entries() {
            let plant = Plant::new(entry.name.clone(), "").with_last_watered(last);
            for month in 1..=12 {
                let next = scheduler.next_watering(&plant, date(2024, month, 10)).unwrap();
                assert!(next > last, "{} in month {}", entry.name, month);
            }
        }
    }

    #[test]
    fn repot_adds_weeks_to_last_watered() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let plant = Plant::new("rose", "flowering").with_last_watered(date(2024, 1, 1));

        assert_eq!(scheduler.next_repot(&plant).unwrap(), date(2024, 12, 30));
    }

    #[test]
    fn repot_without_watering_date_is_rejected() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let plant = Plant::new("Rose", "flowering");

        let err = scheduler.next_repot(&plant).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn watering_records_history_and_reschedules() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let mut plant = Plant::new("Rose", "flowering")
            .with_last_watered(date(2024, 5, 1))
            .with_status(PlantStatus::Inactive);

        scheduler.perform_watering(&mut plant, date(2024, 7, 10)).unwrap();

        assert_eq!(plant.last_watered(), Some(date(2024, 7, 10)));
        assert_eq!(plant.watering_history(), &[date(2024, 5, 1)]);
        assert_eq!(plant.next_watering, Some(date(2024, 7, 13)));
        assert_eq!(plant.status, PlantStatus::Active);
    }

    #[test]
    fn watering_twice_on_same_day_keeps_single_history_entry() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let mut plant = Plant::new("Rose", "flowering").with_last_watered(date(2024, 5, 1));

        scheduler.perform_watering(&mut plant, date(2024, 5, 3)).unwrap();
        scheduler.perform_watering(&mut plant, date(2024, 5, 3)).unwrap();
        assert_eq!(plant.watering_history(), &[date(2024, 5, 1)]);

        scheduler.perform_watering(&mut plant, date(2024, 5, 6)).unwrap();
        assert_eq!(plant.watering_history(), &[date(2024, 5, 1), date(2024, 5, 3)]);
    }

    #[test]
    fn huge_intervals_are_rejected_instead_of_overflowing() {
        let catalog = Catalog::from_reader(
            "name,type,spring,summer,autumn,winter,repot\n\
             Rose,flowering,4000000000,3,5,8,4000000000\n"
                .as_bytes(),
        )
        .unwrap();
        let scheduler = Scheduler::new(&catalog);
        let mut plant = Plant::new("Rose", "flowering").with_last_watered(date(2024, 4, 1));

        assert!(scheduler
            .next_watering(&plant, date(2024, 4, 1))
            .unwrap_err()
            .is_validation());
        assert!(scheduler.next_repot(&plant).unwrap_err().is_validation());

        assert!(scheduler.reschedule(&mut plant, date(2024, 4, 1)).is_err());
        assert_eq!(plant.next_watering, None);
    }

    #[test]
    fn last_watered_near_max_date_is_rejected() {
        let catalog = catalog();
        let scheduler = Scheduler::new(&catalog);
        let plant = Plant::new("Rose", "flowering").with_last_watered(NaiveDate::MAX);

        assert!(scheduler.next_watering(&plant, date(2024, 7, 1)).is_err());
        assert!(scheduler.next_repot(&plant).is_err());
    }
}
