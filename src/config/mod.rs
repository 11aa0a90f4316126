// src/config/mod.rs
pub mod cli;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::feed::providers::hn_http::DEFAULT_API_BASE;
use crate::feed::DEFAULT_MAX_IN_FLIGHT;
use crate::refresh::DEFAULT_REFRESH_INTERVAL;
pub use cli::Cli;

pub const DEFAULT_CONFIG_PATH: &str = "config/quiet_news.toml";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_NUM_STORIES: usize = 30;
/// The top stories listing never holds more than 500 ids.
pub const MAX_NUM_STORIES: usize = 500;

/// Optional settings read from the TOML config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub port: Option<u16>,
    pub num_stories: Option<usize>,
    pub refresh_secs: Option<u64>,
    pub max_in_flight: Option<usize>,
    pub api_base: Option<String>,
}

impl FileConfig {
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("parsing config {}", path.display()))
    }
}

/// Fully resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub port: u16,
    pub num_stories: usize,
    pub refresh_interval: Duration,
    pub max_in_flight: usize,
    pub api_base: String,
}

impl AppConfig {
    /// Resolve config for the binary:
    /// 1) flags / env
    /// 2) --config (must exist) or config/quiet_news.toml (if present)
    /// 3) defaults
    pub fn load(cli: &Cli) -> Result<Self> {
        let file = match &cli.config {
            Some(p) => FileConfig::load_from(p)?,
            None => {
                let p = PathBuf::from(DEFAULT_CONFIG_PATH);
                if p.exists() {
                    FileConfig::load_from(&p)?
                } else {
                    FileConfig::default()
                }
            }
        };
        Self::resolve(cli, file)
    }

    pub fn resolve(cli: &Cli, file: FileConfig) -> Result<Self> {
        let cfg = Self {
            port: cli.port.or(file.port).unwrap_or(DEFAULT_PORT),
            num_stories: cli
                .num_stories
                .or(file.num_stories)
                .unwrap_or(DEFAULT_NUM_STORIES),
            refresh_interval: cli
                .refresh_secs
                .or(file.refresh_secs)
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_REFRESH_INTERVAL),
            max_in_flight: cli
                .max_in_flight
                .or(file.max_in_flight)
                .unwrap_or(DEFAULT_MAX_IN_FLIGHT),
            api_base: cli
                .api_base
                .clone()
                .or(file.api_base)
                .unwrap_or_else(|| DEFAULT_API_BASE.to_string()),
        };
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<()> {
        if self.num_stories == 0 {
            bail!("num_stories must be at least 1");
        }
        if self.num_stories > MAX_NUM_STORIES {
            bail!("num_stories must be at most {MAX_NUM_STORIES}");
        }
        if self.refresh_interval.is_zero() {
            bail!("refresh interval must be at least 1 second");
        }
        if self.max_in_flight == 0 {
            bail!("max_in_flight must be at least 1");
        }
        if self.api_base.trim().is_empty() {
            bail!("api_base must not be empty");
        }
        Ok(())
    }
}
