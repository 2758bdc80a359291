use crate::core::i18n::Language;
use anyhow::{Context, Result, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct GoldApiConfig {
    pub base_url: String,
    pub api_key: String,
}

/// A page to scrape prices from. Built-in profiles can be overridden by id.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ScrapeProfile {
    pub id: String,
    pub url: String,
    pub label_24k: String,
    pub label_21k: String,
    #[serde(default = "default_thousands_separator")]
    pub thousands_separator: char,
}

fn default_thousands_separator() -> char {
    ','
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ScrapeConfig {
    /// Id of the profile to use.
    pub source: String,
    /// Replaces the profile's URL when set.
    pub url: Option<String>,
    #[serde(default)]
    pub profiles: Vec<ScrapeProfile>,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        ScrapeConfig {
            source: crate::providers::scrape::DEFAULT_PROFILE.to_string(),
            url: None,
            profiles: Vec::new(),
        }
    }
}

/// Inclusive range of whole per-gram prices.
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct PriceBand {
    pub min: u32,
    pub max: u32,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum K24Estimate {
    /// Independent draw in its own band.
    Band(PriceBand),
    /// Fixed multiple of the 21K draw.
    Multiplier(f64),
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq)]
pub struct EstimateConfig {
    pub k21: PriceBand,
    #[serde(with = "serde_yaml::with::singleton_map")]
    pub k24: K24Estimate,
}

impl Default for EstimateConfig {
    fn default() -> Self {
        EstimateConfig {
            k21: PriceBand {
                min: 3650,
                max: 3750,
            },
            k24: K24Estimate::Band(PriceBand {
                min: 4150,
                max: 4250,
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub gold_api: Option<GoldApiConfig>,
    #[serde(default = "default_scrape")]
    pub scrape: Option<ScrapeConfig>,
    #[serde(default)]
    pub estimate: EstimateConfig,
}

fn default_scrape() -> Option<ScrapeConfig> {
    Some(ScrapeConfig::default())
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            gold_api: None,
            scrape: default_scrape(),
            estimate: EstimateConfig::default(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct RemoteStoreConfig {
    pub base_url: String,
    pub api_key: String,
    pub access_token: Option<String>,
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "gold_records".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreConfig {
    #[default]
    Local,
    Remote(RemoteStoreConfig),
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default = "default_currency")]
    pub currency: String,
    #[serde(default = "default_refresh_interval")]
    pub refresh_interval_minutes: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub providers: ProvidersConfig,
    #[serde(default, with = "serde_yaml::with::singleton_map")]
    pub store: StoreConfig,
    /// Initial display language; a language chosen at runtime takes precedence.
    pub language: Option<Language>,
    pub data_path: Option<String>,
}

fn default_currency() -> String {
    "EGP".to_string()
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_request_timeout() -> u64 {
    30
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "goldtrack", "goldtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("io", "goldtrack", "goldtrack")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }

    pub fn refresh_interval(&self) -> Duration {
        Duration::from_secs(self.refresh_interval_minutes * 60)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config.validate()?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.refresh_interval_minutes == 0 {
            bail!("refresh_interval_minutes must be at least 1");
        }
        if self.request_timeout_secs == 0 {
            bail!("request_timeout_secs must be at least 1");
        }
        Ok(())
    }
}
