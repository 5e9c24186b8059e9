use std::path::PathBuf;
use std::time::Duration;

use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::application::use_cases::pacing::PacingPolicy;
use crate::domain::dataset::ColumnNames;
use crate::domain::error::{AppError, Result};

pub const DEFAULT_CONFIG_FILE: &str = "inferidor.toml";
pub const ENV_PREFIX: &str = "INFERIDOR_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub oracle: OracleConfig,
    pub pacing: PacingPolicy,
    pub progress: ProgressConfig,
    pub columns: ColumnNames,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            oracle: OracleConfig::default(),
            pacing: PacingPolicy::default(),
            progress: ProgressConfig::default(),
            columns: ColumnNames::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    pub base_url: Url,
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for OracleConfig {
    fn default() -> Self {
        Self {
            base_url: Url::parse("https://www.fueleconomy.gov")
                .expect("default oracle URL is valid"),
            timeout_secs: 30,
            user_agent: concat!("inferidor/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl OracleConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressConfig {
    /// How long the final message stays on disk before the side file is removed
    pub grace_period_ms: u64,
}

impl Default for ProgressConfig {
    fn default() -> Self {
        Self {
            grace_period_ms: 2000,
        }
    }
}

impl ProgressConfig {
    pub fn grace_period(&self) -> Duration {
        Duration::from_millis(self.grace_period_ms)
    }
}

/// Layers defaults, an optional TOML file and `INFERIDOR_*` env vars.
pub struct ConfigService {
    config_file: Option<PathBuf>,
}

impl ConfigService {
    pub fn new(config_file: Option<PathBuf>) -> Self {
        Self { config_file }
    }

    pub fn figment(&self) -> Result<Figment> {
        let mut figment = Figment::from(Serialized::defaults(AppConfig::default()));

        match &self.config_file {
            Some(path) => {
                if !path.exists() {
                    return Err(AppError::ConfigError(format!(
                        "config file not found: {}",
                        path.display()
                    )));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                figment = figment.merge(Toml::file(DEFAULT_CONFIG_FILE));
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    pub fn load(&self) -> Result<AppConfig> {
        let config: AppConfig = self.figment()?.extract()?;
        validate(&config)?;
        Ok(config)
    }
}

fn validate(config: &AppConfig) -> Result<()> {
    if config.oracle.timeout_secs == 0 {
        return Err(AppError::ConfigError(
            "oracle.timeout_secs must be greater than zero".to_string(),
        ));
    }
    let columns = &config.columns;
    for (key, value) in [
        ("columns.year", &columns.year),
        ("columns.make", &columns.make),
        ("columns.model", &columns.model),
        ("columns.classification", &columns.classification),
    ] {
        if value.trim().is_empty() {
            return Err(AppError::ConfigError(format!("{} must not be empty", key)));
        }
    }
    config.pacing.validate()
}
