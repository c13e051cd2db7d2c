//! Sensor subsystem — per-device drivers and the aggregating [`SensorHub`].
//!
//! The hub owns every driver plus the shared bus, and runs each device
//! transaction through the lock/select/transact critical section. One
//! sensor failing never prevents the others from being attempted in the
//! same pass; each reading carries its own validity (`Option`).

pub mod bme280;
pub mod mcp9600;
pub mod sdp810;

use chrono::Utc;
use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::warn;
use serde::Serialize;

use crate::bus::mux::sensor;
use crate::bus::SharedBus;
use crate::config::SystemConfig;
use crate::control::airflow::estimate_airflow;
use crate::error::{Error, SensorError};

pub use bme280::{Bme280, EnvReading};
pub use mcp9600::Mcp9600;
pub use sdp810::{MeasureType, Sdp810};

/// Temperatures outside this band are physically implausible on the bench
/// (a common bus-glitch pattern is 0x7FFF) and are treated as no reading.
pub const PLAUSIBLE_TEMP_C: std::ops::RangeInclusive<f32> = -50.0..=150.0;

fn plausible(t: f32) -> Option<f32> {
    if PLAUSIBLE_TEMP_C.contains(&t) {
        Some(t)
    } else {
        warn!("{t:.1} degC discarded: {}", SensorError::OutOfRange);
        None
    }
}

// ---------------------------------------------------------------------------
// Aggregated readings
// ---------------------------------------------------------------------------

/// One airflow estimate with the temperature pair it came from.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct AirflowReading {
    pub ambient_c: f32,
    pub thermocouple_c: f32,
    pub speed_m_s: f32,
}

/// One multiplexed pass over every sensor. Per-sensor validity: a `None`
/// field means that device failed (or was filtered) this pass.
#[derive(Debug, Clone, Serialize)]
pub struct SensorSnapshot {
    /// Unix timestamp, seconds.
    pub timestamp: f64,
    pub airflow: Option<AirflowReading>,
    pub differential_pa: Option<f32>,
    pub env_ambient_c: Option<f32>,
    pub env: Option<EnvReading>,
}

// ---------------------------------------------------------------------------
// Hub
// ---------------------------------------------------------------------------

/// Aggregates all sensor drivers behind the shared bus.
pub struct SensorHub<I2C, D> {
    bus: SharedBus<I2C, D>,
    mcp9600: Mcp9600,
    sdp810: Sdp810,
    bme280: Bme280,
    /// Set once BME280 init exhausts its retries: fatal for this device
    /// only, the rest of the rig keeps running.
    env_failed: bool,
}

impl<I2C, D> SensorHub<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(bus: SharedBus<I2C, D>) -> Self {
        Self {
            bus,
            mcp9600: Mcp9600::new(),
            sdp810: Sdp810::new(),
            bme280: Bme280::new(),
            env_failed: false,
        }
    }

    /// Surrender the hub and reclaim the bus (used by diagnostics).
    pub fn into_bus(self) -> SharedBus<I2C, D> {
        self.bus
    }

    /// Initialise the BME280 with bounded retries. On permanent failure
    /// the device is marked dead and later env reads return `None`.
    pub fn init_env(&mut self, config: &SystemConfig) -> Result<(), Error> {
        let bme280 = &self.bme280;
        let (retries, backoff) = (config.bme280_init_retries, config.bme280_init_backoff_ms);
        let res = self
            .bus
            .with_sensor(sensor::BME280, |i2c, delay| {
                bme280.init(i2c, delay, retries, backoff)
            });
        if res.is_err() {
            self.env_failed = true;
        }
        res
    }

    /// Ambient/thermocouple pair plus the derived airflow estimate.
    pub fn read_airflow(&mut self) -> Option<AirflowReading> {
        let mcp9600 = &self.mcp9600;
        let res: Result<(f32, f32), Error> = self
            .bus
            .with_sensor(sensor::MCP9600_AIRFLOW, |i2c, _| {
                mcp9600.read_pair(i2c).map_err(Error::from)
            });
        match res {
            Ok((ambient, thermocouple)) => {
                let ambient = plausible(ambient)?;
                let thermocouple = plausible(thermocouple)?;
                Some(AirflowReading {
                    ambient_c: ambient,
                    thermocouple_c: thermocouple,
                    speed_m_s: estimate_airflow(f64::from(ambient), f64::from(thermocouple))
                        as f32,
                })
            }
            Err(e) => {
                warn!("airflow MCP9600 read failed: {e}");
                None
            }
        }
    }

    /// Ambient temperature from the environment-channel MCP9600.
    pub fn read_env_temperature(&mut self) -> Option<f32> {
        let mcp9600 = &self.mcp9600;
        let res: Result<f32, Error> = self.bus.with_sensor(sensor::MCP9600_ENV, |i2c, _| {
            mcp9600
                .read_register(i2c, mcp9600::REG_AMBIENT)
                .map_err(Error::from)
        });
        match res {
            Ok(t) => plausible(t),
            Err(e) => {
                warn!("environment MCP9600 read failed: {e}");
                None
            }
        }
    }

    /// One SDP810 measurement (pressure or SDP-internal temperature).
    pub fn read_sdp810(&mut self, measure: MeasureType) -> Option<f32> {
        let sdp810 = &self.sdp810;
        let res: Result<f32, Error> = self
            .bus
            .with_sensor(sensor::SDP810, |i2c, delay| sdp810.read(i2c, delay, measure));
        match res {
            Ok(v) => Some(v),
            Err(e) => {
                warn!("SDP810 {measure:?} read failed: {e}");
                None
            }
        }
    }

    /// Environmental reading from the BME280 (if it initialised).
    pub fn read_env(&mut self) -> Option<EnvReading> {
        if self.env_failed {
            return None;
        }
        let bme280 = &self.bme280;
        let res: Result<EnvReading, Error> = self
            .bus
            .with_sensor(sensor::BME280, |i2c, _| bme280.read(i2c));
        match res {
            Ok(r) => Some(r),
            Err(e) => {
                warn!("BME280 read failed: {e}");
                None
            }
        }
    }

    /// Full multiplexed pass: every sensor is attempted; a failure on one
    /// never aborts the rest of the pass.
    pub fn read_all(&mut self) -> SensorSnapshot {
        SensorSnapshot {
            timestamp: Utc::now().timestamp_millis() as f64 / 1000.0,
            airflow: self.read_airflow(),
            differential_pa: self.read_sdp810(MeasureType::Pressure),
            env_ambient_c: self.read_env_temperature(),
            env: self.read_env(),
        }
    }
}
