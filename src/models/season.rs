use chrono::{Datelike, Local, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Season {
    Spring,
    Summer,
    Autumn,
    Winter,
}

impl Season {
    /// Calendar-month season buckets: Mar-May, Jun-Aug, Sep-Nov, Dec-Feb.
    pub fn of(date: NaiveDate) -> Self {
        match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Autumn,
            _ => Season::Winter,
        }
    }

    pub fn current() -> Self {
        Self::of(Local::now().date_naive())
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Season::Spring => "Spring",
            Season::Summer => "Summer",
            Season::Autumn => "Autumn",
            Season::Winter => "Winter",
        }
    }
}

impl std::fmt::Display for Season {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn season_for_month(month: u32) -> Season {
        Season::of(NaiveDate::from_ymd_opt(2024, month, 15).unwrap())
    }

    #[test]
    fn months_map_to_seasons() {
        let expected = [
            (1, Season::Winter),
            (2, Season::Winter),
            (3, Season::Spring),
            (4, Season::Spring),
            (5, Season::Spring),
            (6, Season::Summer),
            (7, Season::Summer),
            (8, Season::Summer),
            (9, Season::Autumn),
            (10, Season::Autumn),
            (11, Season::Autumn),
            (12, Season::Winter),
        ];
        for (month, season) in expected {
            assert_eq!(season_for_month(month), season, "month {}", month);
        }
    }

    #[test]
    fn season_boundaries_follow_first_of_month() {
        assert_eq!(
            Season::of(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap()),
            Season::Winter
        );
        assert_eq!(
            Season::of(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap()),
            Season::Spring
        );
        assert_eq!(
            Season::of(NaiveDate::from_ymd_opt(2024, 11, 30).unwrap()),
            Season::Autumn
        );
        assert_eq!(
            Season::of(NaiveDate::from_ymd_opt(2024, 12, 1).unwrap()),
            Season::Winter
        );
    }
}
