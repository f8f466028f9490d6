use std::path::PathBuf;

use thiserror::Error;
use walkgain_log::LogError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config syntax: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Scheduling calls made outside their contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScheduleError {
    #[error("no trials remain; check trials_remain() before drawing")]
    NoTrialsRemain,
}

#[derive(Error, Debug)]
pub enum StudyError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Schedule(#[from] ScheduleError),
    #[error("session log failure: {0}")]
    Log(#[from] LogError),
}
