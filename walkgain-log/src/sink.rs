use std::fs::{self, File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use walkgain_core::{MotionSample, TrialRecord};

use crate::csv::CsvRow;
use crate::paths::SessionFiles;
use crate::LogError;

/// Destination for the two per-session record streams.
pub trait RecordSink {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), LogError>;
    fn write_motion(&mut self, sample: &MotionSample) -> Result<(), LogError>;
    /// Idempotent. Skipping it loses nothing already written.
    fn close(&mut self) -> Result<(), LogError>;
}

/// One append-only CSV file. Every line reaches the disk before `append` returns.
#[derive(Debug)]
struct CsvStream {
    path: PathBuf,
    file: Option<File>,
}

impl CsvStream {
    fn open(path: PathBuf, header: &str) -> Result<Self, LogError> {
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?;
        let is_new = file
            .metadata()
            .map_err(|source| LogError::Open {
                path: path.clone(),
                source,
            })?
            .len()
            == 0;
        if is_new {
            write_durable(&mut file, &path, &format!("{header}\n"))?;
        }
        Ok(Self {
            path,
            file: Some(file),
        })
    }

    fn append(&mut self, line: &str) -> Result<(), LogError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| LogError::Closed(self.path.clone()))?;
        write_durable(file, &self.path, line)
    }

    fn close(&mut self) -> Result<(), LogError> {
        if let Some(file) = self.file.take() {
            file.sync_all().map_err(|source| LogError::Write {
                path: self.path.clone(),
                source,
            })?;
        }
        Ok(())
    }
}

fn write_durable(file: &mut File, path: &Path, line: &str) -> Result<(), LogError> {
    let to_err = |source| LogError::Write {
        path: path.to_path_buf(),
        source,
    };
    file.write_all(line.as_bytes()).map_err(to_err)?;
    file.flush().map_err(to_err)?;
    file.sync_data().map_err(to_err)
}

/// Trial summary and motion CSV files for one session.
#[derive(Debug)]
pub struct LogSink {
    trial: CsvStream,
    motion: CsvStream,
}

impl LogSink {
    pub fn open(dir: &Path, files: SessionFiles) -> Result<Self, LogError> {
        fs::create_dir_all(dir).map_err(|source| LogError::Open {
            path: dir.to_path_buf(),
            source,
        })?;
        let trial = CsvStream::open(files.trial, TrialRecord::HEADER)?;
        let motion = CsvStream::open(files.motion, MotionSample::HEADER)?;
        tracing::info!(
            trial = %trial.path.display(),
            motion = %motion.path.display(),
            "session logs opened"
        );
        Ok(Self { trial, motion })
    }

    pub fn trial_path(&self) -> &Path {
        &self.trial.path
    }

    pub fn motion_path(&self) -> &Path {
        &self.motion.path
    }

    pub fn is_closed(&self) -> bool {
        self.trial.file.is_none() && self.motion.file.is_none()
    }
}

impl RecordSink for LogSink {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), LogError> {
        self.trial.append(&record.to_line())
    }

    fn write_motion(&mut self, sample: &MotionSample) -> Result<(), LogError> {
        self.motion.append(&sample.to_line())
    }

    fn close(&mut self) -> Result<(), LogError> {
        if self.is_closed() {
            return Ok(());
        }
        let trial = self.trial.close();
        let motion = self.motion.close();
        tracing::info!("session logs closed");
        trial.and(motion)
    }
}

/// In-memory sink with the same closing rules as [`LogSink`].
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    pub trials: Vec<TrialRecord>,
    pub motion: Vec<MotionSample>,
    closed: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl RecordSink for MemorySink {
    fn write_trial(&mut self, record: &TrialRecord) -> Result<(), LogError> {
        if self.closed {
            return Err(LogError::Closed(PathBuf::from("<memory>")));
        }
        self.trials.push(record.clone());
        Ok(())
    }

    fn write_motion(&mut self, sample: &MotionSample) -> Result<(), LogError> {
        if self.closed {
            return Err(LogError::Closed(PathBuf::from("<memory>")));
        }
        self.motion.push(sample.clone());
        Ok(())
    }

    fn close(&mut self) -> Result<(), LogError> {
        self.closed = true;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use walkgain_core::{Direction, ParticipantId, Vec3};

    fn files(dir: &Path) -> SessionFiles {
        let pid = ParticipantId::parse("042", 3).unwrap();
        SessionFiles::new(dir, &pid, "20240101_000000")
    }

    fn record(n: u32) -> TrialRecord {
        TrialRecord {
            participant: "042".into(),
            training: true,
            trial_number: n,
            acceleration: 0.0,
            reported_gain: None,
            reported_time: None,
            total_time: 3.0,
            direction: Direction::Forward,
            peak_gain: 1.0,
            walk_start_time: None,
        }
    }

    fn sample() -> MotionSample {
        MotionSample {
            participant: "042".into(),
            training: true,
            trial_number: 1,
            gain: 1.0,
            elapsed: 0.1,
            real: Vec3::ZERO,
            virtual_pos: Vec3::ZERO,
            head_forward: Vec3::new(0.0, 0.0, 1.0),
        }
    }

    #[test]
    fn header_written_once_and_records_visible_without_close() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = LogSink::open(dir.path(), files(dir.path())).unwrap();
        sink.write_trial(&record(1)).unwrap();
        sink.write_motion(&sample()).unwrap();

        let trial = fs::read_to_string(sink.trial_path()).unwrap();
        let lines: Vec<&str> = trial.lines().collect();
        assert_eq!(lines[0], TrialRecord::HEADER);
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("042,1,1,0,"));

        let motion = fs::read_to_string(sink.motion_path()).unwrap();
        assert_eq!(motion.lines().next(), Some(MotionSample::HEADER));
        assert_eq!(motion.lines().count(), 2);
    }

    #[test]
    fn reopening_appends_without_second_header() {
        let dir = tempfile::tempdir().unwrap();
        {
            let mut sink = LogSink::open(dir.path(), files(dir.path())).unwrap();
            sink.write_trial(&record(1)).unwrap();
            // dropped without close, as after an abrupt exit
        }
        let mut sink = LogSink::open(dir.path(), files(dir.path())).unwrap();
        sink.write_trial(&record(2)).unwrap();
        sink.close().unwrap();

        let trial = fs::read_to_string(files(dir.path()).trial).unwrap();
        let headers = trial
            .lines()
            .filter(|l| *l == TrialRecord::HEADER)
            .count();
        assert_eq!(headers, 1);
        assert_eq!(trial.lines().count(), 3);
    }

    #[test]
    fn close_is_idempotent_and_blocks_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut sink = LogSink::open(dir.path(), files(dir.path())).unwrap();
        sink.close().unwrap();
        sink.close().unwrap();
        assert!(sink.is_closed());
        assert!(matches!(
            sink.write_trial(&record(1)),
            Err(LogError::Closed(_))
        ));
    }

    #[test]
    fn creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("a").join("b");
        let sink = LogSink::open(&nested, files(&nested)).unwrap();
        assert!(sink.trial_path().exists());
        assert!(sink.motion_path().exists());
    }

    #[test]
    fn memory_sink_rejects_after_close() {
        let mut sink = MemorySink::new();
        sink.write_motion(&sample()).unwrap();
        sink.close().unwrap();
        assert!(sink.write_motion(&sample()).is_err());
        assert_eq!(sink.motion.len(), 1);
    }
}
