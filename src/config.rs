use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

use crate::bubbles::{ContainmentMode, SimulationTuning};

pub const DEFAULT_CONFIG_FILE: &str = "gift-bubbles.toml";

#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub layout: LayoutConfig,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the pricing API. A trailing `/api` is tolerated.
    pub base_url: String,
    pub use_mock: bool,
    pub timeout_secs: u64,
    /// Zero disables background refresh.
    pub refresh_interval_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_owned(),
            use_mock: false,
            timeout_secs: 20,
            refresh_interval_secs: 300,
        }
    }
}

impl ApiConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn refresh_interval(&self) -> Option<Duration> {
        (self.refresh_interval_secs > 0).then(|| Duration::from_secs(self.refresh_interval_secs))
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub containment: ContainmentMode,
    /// Fraction of the canvas the bubbles should cover together.
    pub target_coverage: f64,
    pub tuning: SimulationTuning,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            containment: ContainmentMode::default(),
            target_coverage: 0.4,
            tuning: SimulationTuning::default(),
        }
    }
}

impl AppConfig {
    pub fn from_toml(raw: &str) -> Result<Self> {
        let mut config: Self = toml::from_str(raw).context("invalid configuration TOML")?;
        config.layout.target_coverage = config.layout.target_coverage.clamp(0.05, 0.9);
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::from_toml(&raw).with_context(|| format!("failed to parse {}", path.display()))
    }

    /// An explicit path must exist; otherwise `gift-bubbles.toml` in `dir` is optional.
    pub fn load(explicit: Option<&Path>, dir: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            let config = Self::from_file(path)?;
            info!(path = %path.display(), "loaded configuration");
            return Ok(config);
        }

        let implicit: PathBuf = dir.join(DEFAULT_CONFIG_FILE);
        if implicit.is_file() {
            let config = Self::from_file(&implicit)?;
            info!(path = %implicit.display(), "loaded configuration");
            return Ok(config);
        }

        debug!("no configuration file found, using defaults");
        Ok(Self::default())
    }
}
