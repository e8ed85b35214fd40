use crate::models::{Plant, PlantStatus};
use chrono::NaiveDate;

/// Days without watering after which a plant counts as inactive.
pub const INACTIVE_AFTER_DAYS: i64 = 30;

/// Status implied by the last watering date, if there is one.
pub fn evaluate(last_watered: Option<NaiveDate>, today: NaiveDate) -> Option<PlantStatus> {
    let last = last_watered?;
    let elapsed = (today - last).num_days();
    Some(if elapsed > INACTIVE_AFTER_DAYS {
        PlantStatus::Inactive
    } else {
        PlantStatus::Active
    })
}

/// Recomputes `plant.status`. Plants that were never watered keep whatever
/// status they already carry.
pub fn refresh(plant: &mut Plant, today: NaiveDate) {
    if let Some(status) = evaluate(plant.last_watered(), today) {
        plant.status = status;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 7, 15).unwrap()
    }

    fn watered_days_ago(days: i64) -> Plant {
        Plant::new("Rose", "flowering").with_last_watered(today() - Duration::days(days))
    }

    #[test]
    fn recently_watered_is_active() {
        let mut plant = watered_days_ago(10).with_status(PlantStatus::Inactive);
        refresh(&mut plant, today());
        assert_eq!(plant.status, PlantStatus::Active);
    }

    #[test]
    fn exactly_thirty_days_is_still_active() {
        let mut plant = watered_days_ago(30);
        refresh(&mut plant, today());
        assert_eq!(plant.status, PlantStatus::Active);
    }

    #[test]
    fn thirty_one_days_is_inactive() {
        let mut plant = watered_days_ago(31);
        refresh(&mut plant, today());
        assert_eq!(plant.status, PlantStatus::Inactive);
    }

    #[test]
    fn never_watered_keeps_existing_status() {
        let mut plant = Plant::new("Rose", "flowering").with_status(PlantStatus::Inactive);
        refresh(&mut plant, today());
        assert_eq!(plant.status, PlantStatus::Inactive);
        assert_eq!(evaluate(None, today()), None);
    }

    #[test]
    fn future_watering_date_is_active() {
        assert_eq!(
            evaluate(Some(today() + Duration::days(3)), today()),
            Some(PlantStatus::Active)
        );
    }
}
