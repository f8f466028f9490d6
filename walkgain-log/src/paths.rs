use std::path::{Path, PathBuf};

use time::OffsetDateTime;
use walkgain_core::ParticipantId;

use crate::LogError;

/// File pair for one session. Both names share the session start stamp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFiles {
    pub trial: PathBuf,
    pub motion: PathBuf,
}

impl SessionFiles {
    pub fn new(dir: &Path, participant: &ParticipantId, stamp: &str) -> Self {
        Self {
            trial: dir.join(format!("{participant}_TrialLog_{stamp}.csv")),
            motion: dir.join(format!("{participant}_MotionLog_{stamp}.csv")),
        }
    }
}

pub fn timestamp_slug(at: OffsetDateTime) -> String {
    use time::macros::format_description;

    at.format(&format_description!(
        "[year][month][day]_[hour][minute][second]"
    ))
    .unwrap_or_else(|_| at.unix_timestamp().to_string())
}

/// Application-private persistent directory for session logs.
pub fn default_output_dir() -> Result<PathBuf, LogError> {
    let dirs = directories::ProjectDirs::from("org", "WalkGain", "walkgain")
        .ok_or(LogError::StorageDir)?;
    Ok(dirs.data_dir().join("logs"))
}
