//! Bus arbitration — the critical-section protocol for the shared bus.
//!
//! One physical I2C bus carries the TCA9548A multiplexer and every sensor
//! behind it, and several uncoordinated OS processes read it. The protocol
//! that keeps them from corrupting each other:
//!
//! 1. acquire the exclusive cross-process [`BusLock`],
//! 2. select the sensor's multiplexer channel (plus settle delay),
//! 3. run the device transaction,
//! 4. release the lock (RAII, on every exit path).
//!
//! Channel select and the device transaction happen under **one** lock
//! acquisition. Splitting them into separately-locked calls reintroduces
//! the race where two processes interleave channel switches between each
//! other's transactions.

pub mod lock;
pub mod mux;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::debug;

pub use lock::{BusGuard, BusLock};
pub use mux::{ChannelMap, Tca9548a, MUX_ADDR};

use crate::config::SystemConfig;
use crate::error::BusError;

/// The shared bus: lock + multiplexer + the underlying I2C peripheral.
///
/// Generic over the `embedded-hal` traits so the Linux character device
/// and the in-memory test bus both plug in.
pub struct SharedBus<I2C, D> {
    lock: BusLock,
    mux: Tca9548a,
    i2c: I2C,
    delay: D,
}

impl<I2C, D> SharedBus<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(lock: BusLock, mux: Tca9548a, i2c: I2C, delay: D) -> Self {
        Self {
            lock,
            mux,
            i2c,
            delay,
        }
    }

    /// Surrender the bus and reclaim the raw peripheral (tests,
    /// diagnostics).
    pub fn into_i2c(self) -> I2C {
        self.i2c
    }

    /// Run one device transaction against `sensor_id` as a single locked
    /// critical section (lock → channel select → transaction → unlock).
    ///
    /// Blocks until the lock is obtained. The closure gets the raw bus and
    /// a delay source for in-transaction settle waits.
    pub fn with_sensor<T, E>(
        &mut self,
        sensor_id: &str,
        f: impl FnOnce(&mut I2C, &mut D) -> Result<T, E>,
    ) -> Result<T, E>
    where
        E: From<BusError>,
    {
        let _guard = self.lock.acquire()?;
        debug!("bus lock held, selecting channel for {sensor_id}");
        self.mux.select(&mut self.i2c, &mut self.delay, sensor_id)?;
        f(&mut self.i2c, &mut self.delay)
        // _guard drops here: lock released on success and error alike.
    }
}

/// The production bus: `/dev/i2c-*` through `linux-embedded-hal`.
pub type LinuxBus = SharedBus<linux_embedded_hal::I2cdev, linux_embedded_hal::Delay>;

impl LinuxBus {
    /// Open the configured I2C character device with the bench channel map.
    pub fn open(config: &SystemConfig) -> Result<Self, BusError> {
        let i2c = linux_embedded_hal::I2cdev::new(&config.i2c_device)
            .map_err(BusError::transaction)?;
        Ok(Self::new(
            BusLock::new(&config.lock_path),
            Tca9548a::new(ChannelMap::bench_default(), config.mux_settle_ms),
            i2c,
            linux_embedded_hal::Delay,
        ))
    }
}
