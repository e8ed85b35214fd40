use crate::error::{PlantCareError, Result};
use crate::logic::FanOutPolicy;
use dialoguer::{Confirm, Input, Select};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

const APP_DIR: &str = "plantcare";
const CONFIG_FILE: &str = "config.yaml";
const DATA_DIR_ENV: &str = "PLANTCARE_DATA_DIR";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    /// Catalog CSV. The built-in catalog is used when unset.
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default)]
    pub fan_out: FanOutPolicy,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_secs: u64,
    #[serde(default = "default_stores")]
    pub stores: Vec<StoreConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    Csv,
    Json,
    Sqlite,
}

impl StoreKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            StoreKind::Csv => "csv",
            StoreKind::Json => "json",
            StoreKind::Sqlite => "sqlite",
        }
    }

    pub fn all() -> &'static [StoreKind] {
        &[StoreKind::Csv, StoreKind::Json, StoreKind::Sqlite]
    }

    fn default_file(&self) -> &'static str {
        match self {
            StoreKind::Csv => "plants.csv",
            StoreKind::Json => "plants.json",
            StoreKind::Sqlite => "plants.db",
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub kind: StoreKind,
    pub path: PathBuf,
    /// Display name. Defaults to the kind.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl StoreConfig {
    pub fn new(kind: StoreKind) -> Self {
        Self {
            kind,
            path: PathBuf::from(kind.default_file()),
            name: None,
        }
    }

    pub fn label(&self) -> String {
        self.name
            .clone()
            .unwrap_or_else(|| self.kind.as_str().to_string())
    }
}

fn default_refresh_interval() -> u64 {
    3600
}

fn default_stores() -> Vec<StoreConfig> {
    StoreKind::all().iter().map(|k| StoreConfig::new(*k)).collect()
}

impl Config {
    pub fn load(config_override: Option<PathBuf>) -> Result<Self> {
        let config_path = match config_override {
            Some(p) => p,
            None => Self::find_config_path()?,
        };

        if !config_path.exists() {
            return Err(PlantCareError::Config(format!(
                "Config file not found at {:?}. Run `plantcare init` to set up.",
                config_path
            )));
        }

        let content = std::fs::read_to_string(&config_path).map_err(|e| {
            PlantCareError::Config(format!("Failed to read {}: {}", config_path.display(), e))
        })?;
        Self::from_yaml(&content)
    }

    /// Load the config file if one exists, otherwise fall back to defaults.
    /// An explicit override that does not exist is still an error.
    pub fn load_or_default(config_override: Option<PathBuf>) -> Result<Self> {
        if config_override.is_none() && !Self::exists(None) {
            tracing::info!("No config file found, using defaults");
            return Ok(Self::default());
        }
        Self::load(config_override)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Config = serde_yaml::from_str(&Self::substitute_env_vars(content))
            .map_err(|e| PlantCareError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_secs == 0 {
            return Err(PlantCareError::Config(
                "refresh_interval_secs must be greater than zero".into(),
            ));
        }
        let mut labels: Vec<String> = self.stores.iter().map(|s| s.label()).collect();
        labels.sort();
        if let Some(pair) = labels.windows(2).find(|w| w[0] == w[1]) {
            return Err(PlantCareError::Config(format!(
                "Store name '{}' is used more than once; set a distinct `name`",
                pair[0]
            )));
        }
        Ok(())
    }

    /// Candidate config locations, most specific first.
    fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from("config").join(CONFIG_FILE)];
        paths.extend(dirs::config_dir().map(|d| d.join(APP_DIR).join(CONFIG_FILE)));
        paths
    }

    /// First existing config file, or the default write location when none
    /// exists yet.
    fn find_config_path() -> Result<PathBuf> {
        match Self::search_paths().into_iter().find(|p| p.exists()) {
            Some(found) => Ok(found),
            None => Self::default_config_path(),
        }
    }

    pub fn exists(config_override: Option<&PathBuf>) -> bool {
        match config_override {
            Some(path) => path.exists(),
            None => Self::search_paths().iter().any(|p| p.exists()),
        }
    }

    /// Default path for writing new config files (~/.config/plantcare/config.yaml).
    pub fn default_config_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|d| d.join(APP_DIR).join(CONFIG_FILE))
            .ok_or_else(|| PlantCareError::Config("Cannot determine config directory".into()))
    }

    /// Run interactive setup prompts and write config to disk.
    /// Returns the loaded Config and the path it was written to.
    pub fn setup_interactive() -> Result<(Self, PathBuf)> {
        println!();
        println!("Let's set up plantcare!");
        println!();

        println!("Stores (records are merged in the order listed)");
        let mut stores = Vec::new();
        for kind in StoreKind::all() {
            let enabled = Confirm::new()
                .with_prompt(format!("  Enable {} store?", kind.as_str()))
                .default(true)
                .interact()
                .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;
            if !enabled {
                continue;
            }
            let path: String = Input::new()
                .with_prompt(format!("  {} path (relative to data dir)", kind.as_str()))
                .default(kind.default_file().to_string())
                .interact_text()
                .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;
            stores.push(StoreConfig {
                kind: *kind,
                path: PathBuf::from(path),
                name: None,
            });
        }

        println!();

        let policies = [FanOutPolicy::BestEffort, FanOutPolicy::Rollback];
        let labels: Vec<&str> = policies.iter().map(|p| p.as_str()).collect();
        let choice = Select::new()
            .with_prompt("When a store fails during a write")
            .items(&labels)
            .default(0)
            .interact()
            .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

        let catalog: String = Input::new()
            .with_prompt("Catalog CSV (leave blank for the built-in catalog)")
            .default(String::new())
            .allow_empty(true)
            .interact_text()
            .map_err(|e| PlantCareError::Config(format!("Input error: {}", e)))?;

        println!();

        let config = Config {
            catalog: (!catalog.is_empty()).then(|| PathBuf::from(catalog)),
            fan_out: policies[choice],
            refresh_interval_secs: default_refresh_interval(),
            stores,
        };

        let config_path = Self::default_config_path()?;
        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml::to_string(&config)
            .map_err(|e| PlantCareError::Config(format!("Failed to serialize config: {}", e)))?;

        let content = format!(
            "# plantcare configuration\n# Generated by `plantcare init`\n# Environment variable substitution (${{VAR}}) is supported.\n\n{}",
            yaml
        );
        std::fs::write(&config_path, content)?;

        println!("Configuration saved to {}", config_path.display());
        println!();

        Ok((config, config_path))
    }

    /// Replaces `${VAR}` with the variable's value. Unset variables are left
    /// as written.
    fn substitute_env_vars(content: &str) -> String {
        let Ok(re) = regex_lite::Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}") else {
            return content.to_string();
        };
        re.replace_all(content, |caps: &regex_lite::Captures| {
            std::env::var(&caps[1]).unwrap_or_else(|_| caps[0].to_string())
        })
        .into_owned()
    }

    /// Directory that relative store paths resolve against: the CLI
    /// override, then `PLANTCARE_DATA_DIR`, then the XDG data directory.
    pub fn data_dir(data_dir_override: Option<&PathBuf>) -> Result<PathBuf> {
        let dir = match data_dir_override {
            Some(dir) => dir.clone(),
            None => match std::env::var(DATA_DIR_ENV) {
                Ok(dir) => PathBuf::from(dir),
                Err(_) => dirs::data_dir()
                    .map(|d| d.join(APP_DIR))
                    .ok_or_else(|| {
                        PlantCareError::Config("Cannot determine data directory".into())
                    })?,
            },
        };
        std::fs::create_dir_all(&dir)?;
        Ok(dir)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            catalog: None,
            fan_out: FanOutPolicy::default(),
            refresh_interval_secs: default_refresh_interval(),
            stores: default_stores(),
        }
    }
}
