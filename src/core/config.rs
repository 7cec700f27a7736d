use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct LedgerConfig {
    pub path: PathBuf,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct TefasProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProvidersConfig {
    pub tefas: Option<TefasProviderConfig>,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        ProvidersConfig {
            tefas: Some(TefasProviderConfig {
                base_url: "https://www.tefas.gov.tr".to_string(),
            }),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub ledger: Option<LedgerConfig>,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fonfolio", "fonfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn default_ledger_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("dev", "fonfolio", "fonfolio")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().join("ledger.csv"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }

    /// Ledger path from config, falling back to the platform data directory.
    pub fn ledger_path(&self) -> Result<PathBuf> {
        match &self.ledger {
            Some(ledger) => Ok(ledger.path.clone()),
            None => Self::default_ledger_path(),
        }
    }

    pub fn tefas_base_url(&self) -> &str {
        self.providers
            .tefas
            .as_ref()
            .map_or("https://www.tefas.gov.tr", |p| &p.base_url)
    }
}
