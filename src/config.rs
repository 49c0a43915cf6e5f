use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::probe::PumpLimits;

const DEFAULT_CONFIG_PATH: &str = "vidstream.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("no sources configured")]
    NoSources,
    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectMode {
    Qmap,
    Frames,
    Gops,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceConfig {
    pub id: String,
    pub url: String,
    pub mode: CollectMode,
    pub count: usize,
}

fn default_ffprobe() -> PathBuf {
    PathBuf::from("ffprobe")
}

fn default_line_timeout_ms() -> u64 {
    3000
}

fn default_max_noise() -> u32 {
    100
}

fn default_join_grace_ms() -> u64 {
    1000
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    #[serde(default = "default_ffprobe")]
    pub ffprobe: PathBuf,
    #[serde(default = "default_line_timeout_ms")]
    pub line_timeout_ms: u64,
    /// Defaults to the number of records requested.
    #[serde(default)]
    pub max_timeouts: Option<u32>,
    #[serde(default = "default_max_noise")]
    pub max_noise: u32,
    #[serde(default = "default_join_grace_ms")]
    pub join_grace_ms: u64,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            ffprobe: default_ffprobe(),
            line_timeout_ms: default_line_timeout_ms(),
            max_timeouts: None,
            max_noise: default_max_noise(),
            join_grace_ms: default_join_grace_ms(),
        }
    }
}

impl ProbeConfig {
    pub fn limits(&self, count: usize) -> PumpLimits {
        PumpLimits {
            line_timeout: Duration::from_millis(self.line_timeout_ms),
            max_timeouts: self
                .max_timeouts
                .unwrap_or_else(|| u32::try_from(count).unwrap_or(u32::MAX)),
            max_noise: self.max_noise,
            join_grace: Duration::from_millis(self.join_grace_ms),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub probe: ProbeConfig,
    #[serde(default)]
    pub sources: Vec<SourceConfig>,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(DEFAULT_CONFIG_PATH)
    }

    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;

        if config.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        if config.probe.line_timeout_ms == 0 {
            return Err(ConfigError::Invalid(
                "line_timeout_ms must be greater than zero".to_string(),
            ));
        }

        Ok(config)
    }
}
