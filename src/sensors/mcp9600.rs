//! MCP9600 thermocouple amplifier driver.
//!
//! Two registers matter here: hot-junction (thermocouple) temperature at
//! 0x01 and the cold-junction (ambient) temperature at 0x00. Both read as
//! 2 bytes big-endian, two's-complement, 0.0625 degC per LSB.
//!
//! Assumes it executes inside an active bus-lock section with the correct
//! multiplexer channel already selected.

use embedded_hal::i2c::I2c;

use crate::error::BusError;

/// 7-bit device address on this rig.
pub const MCP9600_ADDR: u8 = 0x67;
/// Cold-junction (ambient) temperature register.
pub const REG_AMBIENT: u8 = 0x00;
/// Hot-junction (thermocouple) temperature register.
pub const REG_THERMOCOUPLE: u8 = 0x01;

/// Convert a raw 16-bit register value to degrees Celsius.
///
/// Bit 15 is the sign; the scale is 1/16 degC per count.
pub fn decode_temperature(raw: u16) -> f32 {
    f32::from(raw as i16) / 16.0
}

#[derive(Debug, Clone)]
pub struct Mcp9600 {
    address: u8,
}

impl Mcp9600 {
    pub fn new() -> Self {
        Self {
            address: MCP9600_ADDR,
        }
    }

    /// Read one temperature register (big-endian, 2 bytes).
    pub fn read_register<I2C: I2c>(&self, i2c: &mut I2C, register: u8) -> Result<f32, BusError> {
        let mut buf = [0u8; 2];
        i2c.write_read(self.address, &[register], &mut buf)
            .map_err(BusError::transaction)?;
        Ok(decode_temperature(u16::from_be_bytes(buf)))
    }

    /// Read the ambient/thermocouple pair used by the airflow estimate.
    pub fn read_pair<I2C: I2c>(&self, i2c: &mut I2C) -> Result<(f32, f32), BusError> {
        let ambient = self.read_register(i2c, REG_AMBIENT)?;
        let thermocouple = self.read_register(i2c, REG_THERMOCOUPLE)?;
        Ok((ambient, thermocouple))
    }
}

impl Default for Mcp9600 {
    fn default() -> Self {
        Self::new()
    }
}
