use std::path::PathBuf;

use thiserror::Error;

/// Failures that compromise log integrity. Sessions must stop on any of these.
#[derive(Error, Debug)]
pub enum LogError {
    #[error("cannot open log {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cannot write log {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("log {0} is already closed")]
    Closed(PathBuf),
    #[error("no application data directory available")]
    StorageDir,
}
