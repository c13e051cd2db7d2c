//! SDP810 differential-pressure sensor driver.
//!
//! Command/response protocol: a configuration command, a long settle, a
//! trigger command selecting pressure or temperature mode, another settle,
//! then a 9-byte response frame. The frame uses a piecewise fractional
//! encoding (integer byte plus a /255 fraction) with a fold-over at 256
//! for negative values.
//!
//! Assumes it executes inside an active bus-lock section with the correct
//! multiplexer channel already selected. The two settle waits make this
//! the slowest transaction on the bus (~1.3 s with the lock held).

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;

use crate::error::{BusError, Error, SensorError};

/// 7-bit device address on this rig.
pub const SDP810_ADDR: u8 = 0x25;

const CMD_CONFIGURE: [u8; 2] = [0x3F, 0xF9];
const CMD_TRIGGER_PRESSURE: [u8; 2] = [0x36, 0x15];
const CMD_TRIGGER_TEMPERATURE: [u8; 2] = [0x36, 0x1E];

/// Settle after the configuration command.
pub const CONFIGURE_SETTLE_MS: u32 = 800;
/// Settle after a trigger command, before the frame read.
pub const TRIGGER_SETTLE_MS: u32 = 500;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MeasureType {
    Pressure,
    Temperature,
}

// ---------------------------------------------------------------------------
// Frame decoding (pure)
// ---------------------------------------------------------------------------

/// Decode differential pressure (Pa) from a response frame.
///
/// `val = frame[0] + frame[1]/255` lies in [0, 256]. Values below 128 map
/// positively, values above 128 fold to negative, and exactly 128 is the
/// device's overflow sentinel — surfaced as a tagged error, never as a
/// number.
pub fn decode_pressure(frame: &[u8; 9]) -> Result<f32, SensorError> {
    let val = f32::from(frame[0]) + f32::from(frame[1]) / 255.0;
    if val == 128.0 {
        Err(SensorError::PressureOverflow)
    } else if val < 128.0 {
        Ok(val * 240.0 / 256.0)
    } else {
        Ok(-(256.0 - val) * 240.0 / 256.0)
    }
}

/// Decode temperature (degC) from a response frame.
///
/// `val = frame[3] + frame[4]/255`; [0, 100] maps positively, [200, 256]
/// folds to negative. The encoding never produces values in (100, 200),
/// so anything landing there is treated as "no reading".
pub fn decode_temperature(frame: &[u8; 9]) -> Result<f32, SensorError> {
    let val = f32::from(frame[3]) + f32::from(frame[4]) / 255.0;
    if (0.0..=100.0).contains(&val) {
        Ok(val * 255.0 / 200.0)
    } else if val >= 200.0 {
        Ok(-(256.0 - val) * 255.0 / 200.0)
    } else {
        Err(SensorError::UndefinedRange)
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct Sdp810 {
    address: u8,
}

impl Sdp810 {
    pub fn new() -> Self {
        Self {
            address: SDP810_ADDR,
        }
    }

    /// Run the full configure/trigger/read sequence and decode one value.
    pub fn read<I2C, D>(&self, i2c: &mut I2C, delay: &mut D, measure: MeasureType) -> Result<f32, Error>
    where
        I2C: I2c,
        D: DelayNs,
    {
        i2c.write(self.address, &CMD_CONFIGURE)
            .map_err(BusError::transaction)?;
        delay.delay_ms(CONFIGURE_SETTLE_MS);

        let trigger = match measure {
            MeasureType::Pressure => &CMD_TRIGGER_PRESSURE,
            MeasureType::Temperature => &CMD_TRIGGER_TEMPERATURE,
        };
        i2c.write(self.address, trigger)
            .map_err(BusError::transaction)?;
        delay.delay_ms(TRIGGER_SETTLE_MS);

        let mut frame = [0u8; 9];
        i2c.read(self.address, &mut frame)
            .map_err(BusError::transaction)?;

        let value = match measure {
            MeasureType::Pressure => decode_pressure(&frame)?,
            MeasureType::Temperature => decode_temperature(&frame)?,
        };
        Ok(value)
    }
}

impl Default for Sdp810 {
    fn default() -> Self {
        Self::new()
    }
}
