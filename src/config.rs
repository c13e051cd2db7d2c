//! System configuration parameters.
//!
//! All tunable parameters for the rig daemon. Defaults reproduce the
//! bench wiring (I2C bus 1, lock and setpoint files under `/tmp`); any
//! value can be overridden from a JSON file passed on the command line.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Core daemon configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SystemConfig {
    // --- Bus ---
    /// I2C character device carrying the multiplexer and all sensors.
    pub i2c_device: PathBuf,
    /// Lock file guarding the bus across independent OS processes.
    pub lock_path: PathBuf,
    /// Multiplexer settle delay after a channel switch (milliseconds).
    pub mux_settle_ms: u32,

    // --- Heater control ---
    /// File polled each cycle for the target temperature.
    pub setpoint_path: PathBuf,
    /// Append-only CSV log of environmental readings.
    pub sensor_log_path: PathBuf,
    /// Hysteresis half-band around the setpoint (degrees C).
    pub hysteresis_c: f32,
    /// Control cycle period (milliseconds). ~5 Hz by default.
    pub control_interval_ms: u64,
    /// Heater PWM duty requested when heating (0-255).
    pub heater_duty_on: u8,

    // --- BME280 init ---
    /// Chip-id probe attempts before the device is declared failed.
    pub bme280_init_retries: u32,
    /// Fixed backoff between probe attempts (milliseconds).
    pub bme280_init_backoff_ms: u64,
}

impl Default for SystemConfig {
    fn default() -> Self {
        Self {
            i2c_device: PathBuf::from("/dev/i2c-1"),
            lock_path: PathBuf::from("/tmp/airbench-i2c.lock"),
            mux_settle_ms: 50,

            setpoint_path: PathBuf::from("/tmp/airbench-setpoint.txt"),
            sensor_log_path: PathBuf::from("/tmp/airbench-env.csv"),
            hysteresis_c: 1.0,
            control_interval_ms: 200,
            heater_duty_on: 255,

            bme280_init_retries: 3,
            bme280_init_backoff_ms: 1000,
        }
    }
}

impl SystemConfig {
    /// Load configuration from a JSON file. Unspecified fields keep their
    /// defaults.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&text)
            .map_err(|e| Error::Config(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations that would make the loop misbehave.
    pub fn validate(&self) -> Result<()> {
        if self.hysteresis_c <= 0.0 {
            return Err(Error::Config(
                "hysteresis_c must be positive to prevent actuator chatter".into(),
            ));
        }
        if self.control_interval_ms == 0 {
            return Err(Error::Config("control_interval_ms must be non-zero".into()));
        }
        Ok(())
    }
}
