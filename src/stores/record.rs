//! Flat record layout shared by the line-oriented store:
//! `name,type,lastWatered,growthRate,symptoms,status,nextWatering,history`.
//! Lists are `;`-joined, dates are ISO-8601 and an empty field is a null date.

use crate::error::{PlantCareError, Result};
use crate::models::{Plant, PlantStatus};
use chrono::NaiveDate;

const LIST_SEPARATOR: char = ';';
const MIN_FIELDS: usize = 7;

pub fn to_fields(plant: &Plant) -> [String; 8] {
    [
        plant.name.clone(),
        plant.plant_type.clone(),
        format_date(plant.last_watered()),
        plant.growth_rate.to_string(),
        plant.symptoms.join(";"),
        plant.status.as_str().to_string(),
        format_date(plant.next_watering),
        plant
            .watering_history()
            .iter()
            .map(|d| d.to_string())
            .collect::<Vec<_>>()
            .join(";"),
    ]
}

pub fn from_fields(fields: &csv::StringRecord) -> Result<Plant> {
    if fields.len() < MIN_FIELDS {
        return Err(PlantCareError::InvalidData(format!(
            "expected at least {} fields, found {}",
            MIN_FIELDS,
            fields.len()
        )));
    }
    let field = |i: usize| field_at(fields, i);

    let growth_rate: f64 = field(3).trim().parse().map_err(|_| {
        PlantCareError::InvalidData(format!("growth rate '{}' is not a number", field(3)))
    })?;
    let status = if field(5).trim().is_empty() {
        PlantStatus::Active
    } else {
        PlantStatus::from_str(field(5))
            .ok_or_else(|| PlantCareError::InvalidData(format!("unknown status '{}'", field(5))))?
    };
    let history = split_list(field(7))
        .map(parse_date)
        .collect::<Result<Vec<NaiveDate>>>()?;

    let mut plant = Plant::new(field(0), field(1))
        .with_growth_rate(growth_rate)
        .with_symptoms(split_list(field(4)))
        .with_status(status)
        .with_history(history);
    if let Some(last) = parse_optional_date(field(2))? {
        plant = plant.with_last_watered(last);
    }
    plant.next_watering = parse_optional_date(field(6))?;
    Ok(plant)
}

fn field_at(fields: &csv::StringRecord, i: usize) -> &str {
    fields.get(i).unwrap_or("")
}

fn split_list(field: &str) -> impl Iterator<Item = &str> {
    field
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_default()
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
        .map_err(|_| PlantCareError::InvalidData(format!("invalid date '{}'", s)))
}

fn parse_optional_date(s: &str) -> Result<Option<NaiveDate>> {
    if s.trim().is_empty() {
        Ok(None)
    } else {
        parse_date(s).map(Some)
    }
}
