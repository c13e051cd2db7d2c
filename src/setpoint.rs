//! File-resident heater setpoint.
//!
//! The GUI (a separate process) publishes the target temperature by
//! writing a file; the heater loop polls it every control cycle. The
//! schema is deliberately minimal and explicit:
//!
//! - content: one ASCII decimal number (degrees Celsius), e.g. `42.5`,
//!   with an optional trailing newline and surrounding whitespace;
//! - a missing file, an empty file, or unparsable content all mean
//!   "no active setpoint" (measurement-only mode) — never an error;
//! - the file is re-read every cycle, so a new value takes effect within
//!   one control period and the last written value stays authoritative
//!   until replaced or removed (no age cutoff).

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Handle to the polled setpoint file.
#[derive(Debug, Clone)]
pub struct SetpointFile {
    path: PathBuf,
}

impl SetpointFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the current setpoint. Absence and malformed content are both
    /// normalised to `None`.
    pub fn poll(&self) -> Option<f32> {
        let text = fs::read_to_string(&self.path).ok()?;
        let line = text.trim();
        if line.is_empty() {
            return None;
        }
        line.parse::<f32>().ok()
    }

    /// Publish a new setpoint (writer side: GUI, tests).
    pub fn publish(&self, setpoint_c: f32) -> std::io::Result<()> {
        let mut file = fs::File::create(&self.path)?;
        writeln!(file, "{setpoint_c}")
    }

    /// Withdraw the setpoint: the heater loop drops to measurement-only.
    pub fn clear(&self) -> std::io::Result<()> {
        match fs::remove_file(&self.path) {
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            other => other,
        }
    }
}
