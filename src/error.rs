use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("failed to read counter source {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("invalid interface pattern '{pattern}': {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    #[error("failed to read config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config file {}: {source}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("refresh interval must be between 1 and 86400 seconds")]
    InvalidInterval,
    #[error("invalid timestamp format '{0}'")]
    InvalidTimestamp(String),
    #[error("failed to write status line: {0}")]
    Sink(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, MonitorError>;
