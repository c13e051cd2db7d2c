//! Unified error types for the airbench daemon.
//!
//! A single `Error` enum that every subsystem converts into, keeping the
//! control loop's error handling uniform. Bus and sensor failures are
//! recovered locally (the reading is simply absent for that cycle); only
//! configuration and device-init failures escape to the caller.

use thiserror::Error;

/// Every fallible operation in the daemon funnels into this type.
#[derive(Debug, Error)]
pub enum Error {
    /// A bus-level failure (lock, channel select, or raw transaction).
    #[error("bus: {0}")]
    Bus(#[from] BusError),
    /// A sensor returned bytes that do not decode to a usable value.
    #[error("sensor: {0}")]
    Sensor(#[from] SensorError),
    /// Device initialisation failed after bounded retries.
    #[error("init: {0}")]
    Init(&'static str),
    /// Configuration is invalid or could not be loaded.
    #[error("config: {0}")]
    Config(String),
    /// Sensor log or setpoint file I/O failed.
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Bus errors
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum BusError {
    /// Channel lookup miss — a programming/config error, never retried.
    #[error("sensor '{0}' has no multiplexer channel mapping")]
    UnknownSensor(String),
    /// I/O failure during an I2C read or write. Recovered locally: the
    /// reading is treated as absent for the cycle.
    #[error("I2C transaction failed: {0}")]
    Transaction(String),
    /// The cross-process lock file could not be opened or locked.
    #[error("bus lock: {0}")]
    Lock(#[source] std::io::Error),
}

impl BusError {
    /// Wrap a bus-implementation error. The concrete error type varies per
    /// `embedded_hal::i2c::I2c` implementation and is only guaranteed
    /// `Debug`, so that is the bound here.
    pub fn transaction(err: impl std::fmt::Debug) -> Self {
        Self::Transaction(format!("{err:?}"))
    }
}

// ---------------------------------------------------------------------------
// Sensor errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SensorError {
    /// SDP810 pressure frame decoded to exactly 128 — the device's
    /// overflow sentinel, not a physical reading.
    #[error("differential pressure overflow (sentinel frame)")]
    PressureOverflow,
    /// SDP810 temperature frame fell in the undefined (100, 200) band.
    #[error("reading in undefined encoding range")]
    UndefinedRange,
    /// Reading is outside the physically plausible band.
    #[error("reading outside plausible range")]
    OutOfRange,
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, Error>;
