use crate::error::{PlantCareError, Result};
use crate::models::{Plant, PlantStatus};
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "plantcare",
    version,
    about = "Houseplant watering and repotting scheduler"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Path to config.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Override the directory relative store paths resolve against
    #[arg(short, long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Only use the configured store with this name
    #[arg(short, long, global = true)]
    pub store: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List plants merged from every store
    List {
        #[arg(long, value_enum)]
        status: Option<StatusArg>,
        /// Case-insensitive text matched against name, type and symptoms
        #[arg(long)]
        search: Option<String>,
    },
    /// Show one plant in detail
    Show { name: String },
    /// Add a plant from the catalog
    Add {
        name: String,
        #[command(flatten)]
        fields: PlantFields,
    },
    /// Edit a plant's record, optionally renaming it
    Update {
        old_name: String,
        /// New name
        #[arg(long)]
        name: Option<String>,
        #[command(flatten)]
        fields: PlantFields,
    },
    Delete { name: String },
    /// Record a watering
    Water {
        name: String,
        /// Defaults to today
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Show or clear the watering history
    History {
        name: String,
        #[arg(long)]
        clear: bool,
    },
    Diagnose { name: String },
    /// Show the next repot date
    Repot { name: String },
    /// Print the plant catalog
    Catalog,
    /// Re-list plants on an interval until interrupted
    Watch {
        /// Defaults to refresh_interval_secs from the config
        #[arg(long)]
        interval_secs: Option<u64>,
    },
    /// Re-run interactive setup
    Init,
    /// Validate config and test every store
    Check,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for PlantStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::Active => PlantStatus::Active,
            StatusArg::Inactive => PlantStatus::Inactive,
        }
    }
}

/// Editable plant attributes. Unset flags leave the record unchanged.
#[derive(Args)]
pub struct PlantFields {
    /// Replaced by the catalog type when the name is known
    #[arg(long = "type")]
    pub plant_type: Option<String>,

    #[arg(long)]
    pub last_watered: Option<NaiveDate>,

    #[arg(long)]
    pub growth_rate: Option<String>,

    /// May be repeated; replaces the existing symptom list
    #[arg(long = "symptom")]
    pub symptoms: Vec<String>,
}

impl PlantFields {
    pub fn apply(self, mut plant: Plant) -> Result<Plant> {
        if let Some(plant_type) = self.plant_type {
            plant.plant_type = plant_type;
        }
        if let Some(raw) = self.growth_rate {
            plant.growth_rate = raw.trim().parse().map_err(|_| {
                PlantCareError::Validation(format!("Growth rate must be a number, got '{}'", raw))
            })?;
        }
        if !self.symptoms.is_empty() {
            plant.symptoms = self
                .symptoms
                .into_iter()
                .filter(|s| !s.trim().is_empty())
                .collect();
        }
        if self.last_watered.is_some() {
            plant.set_last_watered(self.last_watered);
        }
        Ok(plant)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("plantcare").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn add_fields_build_a_plant() {
        let cli = parse(&[
            "add",
            "Rose",
            "--last-watered",
            "2024-05-01",
            "--growth-rate",
            "1.5",
            "--symptom",
            "yellow leaves",
            "--symptom",
            "",
        ]);
        let Commands::Add { name, fields } = cli.command else {
            panic!("expected add");
        };
        let plant = fields.apply(Plant::new(name, "")).unwrap();
        assert_eq!(plant.name, "Rose");
        assert_eq!(plant.growth_rate, 1.5);
        assert_eq!(plant.symptoms, vec!["yellow leaves".to_string()]);
        assert_eq!(plant.last_watered(), NaiveDate::from_ymd_opt(2024, 5, 1));
        assert!(plant.watering_history().is_empty());
    }

    #[test]
    fn update_fields_keep_unset_values_and_record_history() {
        let cli = parse(&["update", "Rose", "--last-watered", "2024-05-10"]);
        let Commands::Update { name, fields, .. } = cli.command else {
            panic!("expected update");
        };
        assert!(name.is_none());

        let existing = Plant::new("Rose", "flowering")
            .with_growth_rate(2.0)
            .with_symptoms(["webbing"])
            .with_last_watered(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap());
        let plant = fields.apply(existing).unwrap();

        assert_eq!(plant.growth_rate, 2.0);
        assert_eq!(plant.symptoms, vec!["webbing".to_string()]);
        assert_eq!(plant.last_watered(), NaiveDate::from_ymd_opt(2024, 5, 10));
        assert_eq!(
            plant.watering_history(),
            &[NaiveDate::from_ymd_opt(2024, 5, 1).unwrap()]
        );
    }

    #[test]
    fn non_numeric_growth_rate_is_a_validation_error() {
        let cli = parse(&["add", "Rose", "--growth-rate", "fast"]);
        let Commands::Add { name, fields } = cli.command else {
            panic!("expected add");
        };
        let err = fields.apply(Plant::new(name, "")).unwrap_err();
        assert!(err.is_validation());
    }

    #[test]
    fn global_options_follow_subcommands() {
        let cli = parse(&["list", "--status", "inactive", "--store", "sqlite", "-vv"]);
        assert_eq!(cli.store.as_deref(), Some("sqlite"));
        assert_eq!(cli.verbose, 2);
        assert!(matches!(
            cli.command,
            Commands::List {
                status: Some(StatusArg::Inactive),
                ..
            }
        ));
    }

    #[test]
    fn invalid_date_is_rejected_by_parser() {
        let result = Cli::try_parse_from(["plantcare", "water", "Rose", "--date", "yesterday"]);
        assert!(result.is_err());
    }
}
