//! Append-only CSV log of environmental readings.
//!
//! One record per successful control cycle: `timestamp,temperature,
//! humidity,pressure`, with the header written exactly once when the file
//! is first created. The heater loop is the only writer, so no locking is
//! needed; concurrent readers (plots, report generators) must tolerate a
//! partial last line.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::sensors::EnvReading;

pub const CSV_HEADER: &str = "timestamp,temperature,humidity,pressure";

#[derive(Debug, Clone)]
pub struct SensorLog {
    path: PathBuf,
}

impl SensorLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one record, creating the file (and header) on first use.
    pub fn append(&self, reading: &EnvReading) -> std::io::Result<()> {
        self.append_at(unix_now(), reading)
    }

    fn append_at(&self, timestamp: f64, reading: &EnvReading) -> std::io::Result<()> {
        let fresh = !self.path.exists();
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        if fresh {
            writeln!(file, "{CSV_HEADER}")?;
        }
        writeln!(
            file,
            "{timestamp:.3},{:.3},{:.3},{:.3}",
            reading.temperature_c, reading.humidity_pct, reading.pressure_hpa
        )
    }
}

/// Unix timestamp in seconds with millisecond resolution.
pub fn unix_now() -> f64 {
    Utc::now().timestamp_millis() as f64 / 1000.0
}
