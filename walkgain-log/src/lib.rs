//! Append-only study data streams: one trial summary and one motion log per session.

pub mod csv;
pub mod error;
pub mod paths;
pub mod sink;

pub use csv::CsvRow;
pub use error::LogError;
pub use paths::{SessionFiles, default_output_dir, timestamp_slug};
pub use sink::{LogSink, MemorySink, RecordSink};
