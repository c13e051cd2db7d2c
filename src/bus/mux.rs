//! TCA9548A channel multiplexer driver and the sensor→channel map.
//!
//! The multiplexer forwards the upstream bus to exactly one of eight
//! downstream channels at a time. Selecting writes a single control byte
//! with exactly one bit set (`1 << channel` — fan-out to multiple
//! channels is not used on this rig), then waits for the switch to latch
//! before any device on the channel is addressed.
//!
//! The selected channel persists after the caller releases the bus lock,
//! but nothing may rely on that: another process can switch channels
//! between any two critical sections, so every section re-selects.

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::BusError;

/// 7-bit address of the TCA9548A on this rig.
pub const MUX_ADDR: u8 = 0x70;

/// Sensor identifiers as they appear in the channel map.
pub mod sensor {
    pub const SDP810: &str = "SDP810";
    pub const MCP9600_ENV: &str = "MCP9600_ENV";
    pub const MCP9600_AIRFLOW: &str = "MCP9600_AIRFLOW";
    pub const BME280: &str = "BME280";
}

// ---------------------------------------------------------------------------
// Channel map
// ---------------------------------------------------------------------------

/// Immutable mapping from sensor identifier to multiplexer channel (0-7).
///
/// Lookup of an unmapped name is an error, never a default — a miss is a
/// programming/wiring mistake that must fail fast.
#[derive(Debug, Clone)]
pub struct ChannelMap {
    entries: Vec<(String, u8)>,
}

impl ChannelMap {
    /// Build a map, rejecting out-of-range channels and duplicate names.
    pub fn new(entries: impl IntoIterator<Item = (String, u8)>) -> Result<Self, BusError> {
        let entries: Vec<(String, u8)> = entries.into_iter().collect();
        for (name, channel) in &entries {
            if *channel > 7 {
                return Err(BusError::Transaction(format!(
                    "channel {channel} for '{name}' outside 0-7"
                )));
            }
            if entries.iter().filter(|(n, _)| n == name).count() > 1 {
                return Err(BusError::Transaction(format!(
                    "duplicate channel mapping for '{name}'"
                )));
            }
        }
        Ok(Self { entries })
    }

    /// The bench wiring: SDP810 on channel 2, airflow MCP9600 on 1,
    /// environment MCP9600 and the BME280 sharing channel 0.
    pub fn bench_default() -> Self {
        Self {
            entries: vec![
                (sensor::SDP810.into(), 2),
                (sensor::MCP9600_ENV.into(), 0),
                (sensor::MCP9600_AIRFLOW.into(), 1),
                (sensor::BME280.into(), 0),
            ],
        }
    }

    pub fn channel_for(&self, sensor_id: &str) -> Result<u8, BusError> {
        self.entries
            .iter()
            .find(|(name, _)| name == sensor_id)
            .map(|(_, channel)| *channel)
            .ok_or_else(|| BusError::UnknownSensor(sensor_id.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Multiplexer driver
// ---------------------------------------------------------------------------

/// TCA9548A driver. Assumes it runs inside an active bus-lock section.
#[derive(Debug, Clone)]
pub struct Tca9548a {
    address: u8,
    map: ChannelMap,
    settle_ms: u32,
}

impl Tca9548a {
    pub fn new(map: ChannelMap, settle_ms: u32) -> Self {
        Self {
            address: MUX_ADDR,
            map,
            settle_ms,
        }
    }

    pub fn map(&self) -> &ChannelMap {
        &self.map
    }

    /// Activate the channel mapped to `sensor_id` and wait for the switch
    /// to latch.
    pub fn select<I2C, D>(&self, i2c: &mut I2C, delay: &mut D, sensor_id: &str) -> Result<(), BusError>
    where
        I2C: I2c,
        D: DelayNs,
    {
        let channel = self.map.channel_for(sensor_id)?;
        i2c.write(self.address, &[1u8 << channel])
            .map_err(BusError::transaction)?;
        delay.delay_ms(self.settle_ms);
        Ok(())
    }
}
