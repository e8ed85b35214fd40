mod cli;
mod config;
mod db;
mod error;
mod logic;
mod models;
mod stores;

use anyhow::{bail, Context};
use chrono::{Local, NaiveDate};
use clap::Parser;
use cli::{Cli, Commands};
use config::{Config, StoreConfig};
use error::PlantCareError;
use logic::{diagnosis, Catalog, FanOutReport, PlantFilter, PlantService};
use models::{Plant, Season};
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {:#}", e);
        let invalid_input = e
            .downcast_ref::<PlantCareError>()
            .is_some_and(PlantCareError::is_validation);
        std::process::exit(if invalid_input { 2 } else { 1 });
    }
}

fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn today() -> NaiveDate {
    Local::now().date_naive()
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = match cli.command {
        Commands::Init => {
            Config::setup_interactive()?;
            return Ok(());
        }
        _ => Config::load_or_default(cli.config.clone()).map_err(|e| {
            anyhow::anyhow!(
                "{}\nCopy config/config.yaml.example to config/config.yaml or run `plantcare init`",
                e
            )
        })?,
    };

    if let Commands::Check = cli.command {
        return check(&cli, &config);
    }

    let mut service = build_service(&cli, &config)?;
    let today = today();

    match cli.command {
        Commands::List { status, search } => {
            let filter = PlantFilter::new(status.map(Into::into), search);
            let plants = filter.apply(service.list(today));
            print_table(&plants);
        }
        Commands::Show { name } => {
            let plant = find(&service, &name, today)?;
            print_detail(&service, &plant);
        }
        Commands::Add { name, fields } => {
            let plant = fields.apply(Plant::new(name.trim(), ""))?;
            let report = service.add(plant, today)?;
            print_report("Added", &name, &report);
        }
        Commands::Update {
            old_name,
            name,
            fields,
        } => {
            let mut plant = find(&service, &old_name, today)?;
            if let Some(new_name) = name {
                plant.name = new_name.trim().to_string();
            }
            let plant = fields.apply(plant)?;
            let label = plant.name.clone();
            let report = service.update(&old_name, plant, today)?;
            print_report("Updated", &label, &report);
        }
        Commands::Delete { name } => {
            find(&service, &name, today)?;
            let report = service.delete(&name)?;
            print_report("Deleted", &name, &report);
        }
        Commands::Water { name, date } => {
            let (plant, report) = service.water(&name, date.unwrap_or(today))?;
            print_report("Watered", &plant.name, &report);
            if let Some(next) = plant.next_watering {
                println!("Next watering: {}", next);
            }
        }
        Commands::History { name, clear } => {
            if clear {
                let report = service.clear_history(&name, today)?;
                print_report("Cleared history of", &name, &report);
            } else {
                let plant = find(&service, &name, today)?;
                if plant.watering_history().is_empty() {
                    println!("No watering history for {}", plant.name);
                }
                for date in plant.watering_history() {
                    println!("{}", date);
                }
            }
        }
        Commands::Diagnose { name } => {
            println!("{}", service.diagnose(&name, today)?);
        }
        Commands::Repot { name } => {
            println!("{}", service.next_repot(&name, today)?);
        }
        Commands::Catalog => print_catalog(service.catalog()),
        Commands::Watch { interval_secs } => {
            let secs = interval_secs.unwrap_or(config.refresh_interval_secs);
            if secs == 0 {
                bail!("--interval-secs must be greater than zero");
            }
            watch(&service, Duration::from_secs(secs)).await;
        }
        Commands::Init | Commands::Check => {}
    }

    Ok(())
}

/// Configured stores, narrowed to the one named by `--store` when given.
fn selected_stores<'a>(cli: &Cli, config: &'a Config) -> anyhow::Result<Vec<&'a StoreConfig>> {
    let Some(wanted) = cli.store.as_deref() else {
        return Ok(config.stores.iter().collect());
    };
    let selected: Vec<&StoreConfig> = config
        .stores
        .iter()
        .filter(|s| s.label().eq_ignore_ascii_case(wanted))
        .collect();
    if selected.is_empty() {
        let known: Vec<String> = config.stores.iter().map(|s| s.label()).collect();
        bail!(
            "No store named '{}' is configured (available: {})",
            wanted,
            known.join(", ")
        );
    }
    Ok(selected)
}

fn load_catalog(config: &Config) -> anyhow::Result<Catalog> {
    let catalog = match &config.catalog {
        Some(path) => Catalog::load_path(path)
            .with_context(|| format!("Failed to load catalog {}", path.display()))?,
        None => Catalog::builtin(),
    };
    if catalog.is_empty() {
        warn!("Plant catalog is empty, adding or updating plants will be rejected");
    }
    Ok(catalog)
}

fn build_service(cli: &Cli, config: &Config) -> anyhow::Result<PlantService> {
    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;
    let mut service = PlantService::new(load_catalog(config)?, config.fan_out);

    for store_config in selected_stores(cli, config)? {
        match stores::open_store(store_config, &data_dir) {
            Ok(store) => service.register_store(store),
            Err(e) => {
                warn!(store = %store_config.label(), error = %e, "Failed to open store, skipping");
            }
        }
    }

    if service.store_names().is_empty() {
        bail!("No plant store could be opened");
    }
    Ok(service)
}

fn find(service: &PlantService, name: &str, today: NaiveDate) -> anyhow::Result<Plant> {
    service
        .get(name, today)
        .ok_or_else(|| PlantCareError::NotFound(format!("plant '{}'", name)).into())
}

fn check(cli: &Cli, config: &Config) -> anyhow::Result<()> {
    println!("Config OK");
    println!("  fan-out policy: {}", config.fan_out.as_str());
    println!("  refresh interval: {}s", config.refresh_interval_secs);

    let catalog = load_catalog(config)?;
    println!("  catalog entries: {}", catalog.len());

    let data_dir = Config::data_dir(cli.data_dir.as_ref())?;
    println!("  data dir: {}", data_dir.display());
    println!();

    let mut failures = 0;
    for store_config in selected_stores(cli, config)? {
        let label = store_config.label();
        let outcome = stores::open_store(store_config, &data_dir).and_then(|s| s.get_all());
        match outcome {
            Ok(plants) => println!("{:<10} OK ({} plants)", label, plants.len()),
            Err(e) => {
                failures += 1;
                println!("{:<10} FAILED: {}", label, e);
            }
        }
    }

    if failures > 0 {
        bail!("{} store(s) failed", failures);
    }
    Ok(())
}

async fn watch(service: &PlantService, every: Duration) {
    info!(interval_secs = every.as_secs(), "Watching plants");
    println!("Refreshing every {}s, press Ctrl-C to stop", every.as_secs());

    let mut ticker = tokio::time::interval(every);
    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let today = today();
                let plants = service.list(today);
                let due: Vec<Plant> = plants
                    .into_iter()
                    .filter(|p| p.next_watering.is_some_and(|d| d <= today))
                    .collect();
                println!();
                println!("{} ({}): {} plant(s) due for watering", today, Season::of(today), due.len());
                print_table(&due);
            }
            _ = tokio::signal::ctrl_c() => {
                println!("Stopped");
                break;
            }
        }
    }
}

fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.to_string()).unwrap_or_else(|| "-".to_string())
}

fn print_table(plants: &[Plant]) {
    if plants.is_empty() {
        println!("No plants");
        return;
    }
    println!(
        "{:<20} {:<12} {:<12} {:<12} {:<8}",
        "NAME", "TYPE", "WATERED", "NEXT", "STATUS"
    );
    for plant in plants {
        println!(
            "{:<20} {:<12} {:<12} {:<12} {:<8}",
            plant.name,
            plant.plant_type,
            format_date(plant.last_watered()),
            format_date(plant.next_watering),
            plant.status
        );
    }
}

fn print_detail(service: &PlantService, plant: &Plant) {
    println!("{}", plant.name);
    println!("  type:          {}", plant.plant_type);
    println!("  status:        {}", plant.status);
    println!("  growth rate:   {}", plant.growth_rate);
    println!("  last watered:  {}", format_date(plant.last_watered()));
    println!("  next watering: {}", format_date(plant.next_watering));
    match service.scheduler().next_repot(plant) {
        Ok(date) => println!("  next repot:    {}", date),
        Err(_) => println!("  next repot:    - (never watered)"),
    }
    if !service.catalog().is_known_name(&plant.name) {
        println!("  (not in catalog, default watering rule applies)");
    }
    println!("  symptoms:      {}", plant.symptoms.join(", "));
    println!("  diagnosis:     {}", diagnosis::diagnose(&plant.symptoms));
    println!("  waterings:     {}", plant.watering_history().len());
}

fn print_catalog(catalog: &Catalog) {
    let season = Season::current();
    println!(
        "{:<20} {:<12} {:>6} {:>6} {:>6} {:>6} {:>6}",
        "NAME", "TYPE", "SPRING", "SUMMER", "AUTUMN", "WINTER", "REPOT"
    );
    for entry in catalog.entries() {
        let rule = entry.rule;
        println!(
            "{:<20} {:<12} {:>6} {:>6} {:>6} {:>6} {:>6}",
            entry.name,
            entry.plant_type,
            rule.spring_days,
            rule.summer_days,
            rule.autumn_days,
            rule.winter_days,
            rule.repot_weeks
        );
    }
    println!();
    println!("Current season: {}", season);
}

fn print_report(action: &str, name: &str, report: &FanOutReport) {
    println!("{} {} in {}", action, name.trim(), report.applied.join(", "));
    if report.is_complete() {
        return;
    }
    for failure in &report.failed {
        eprintln!("warning: {} failed: {}", failure.store, failure.message);
    }
}
