use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    error::{MonitorError, Result},
    modules::{network::PROC_NET_DEV, output::OutputFormat, speed::Precision, time},
};

/// Longest accepted refresh interval, one day.
pub const MAX_INTERVAL: u64 = 86_400;

#[derive(Default, Debug, Copy, Clone, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PrecisionMode {
    #[default]
    Fixed,
    Adaptive,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Seconds between samples.
    pub interval: u64,
    pub source: PathBuf,
    pub precision: PrecisionMode,
    /// Decimal places in `fixed` mode.
    pub decimals: u8,
    /// Extra interface globs to leave out of the totals.
    pub exclude: Vec<String>,
    pub output: OutputFormat,
    /// strftime format prefixed to every line.
    pub timestamp: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            interval: 1,
            source: PathBuf::from(PROC_NET_DEV),
            precision: PrecisionMode::Fixed,
            decimals: 2,
            exclude: Vec::new(),
            output: OutputFormat::Plain,
            timestamp: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|source| MonitorError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = toml::from_str(&content).map_err(|source| MonitorError::ConfigParse {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("loaded config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_INTERVAL).contains(&self.interval) {
            return Err(MonitorError::InvalidInterval);
        }
        if let Some(format) = &self.timestamp {
            if !time::is_valid_format(format) {
                return Err(MonitorError::InvalidTimestamp(format.clone()));
            }
        }
        Ok(())
    }

    pub fn period(&self) -> Duration {
        Duration::from_secs(self.interval)
    }

    pub fn precision(&self) -> Precision {
        match self.precision {
            PrecisionMode::Fixed => Precision::Fixed(usize::from(self.decimals)),
            PrecisionMode::Adaptive => Precision::Adaptive,
        }
    }
}
