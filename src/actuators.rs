//! Actuator port — the boundary between the controller and the PWM/GPIO
//! collaborator.
//!
//! The control core decides *what* duty to request; applying it to real
//! hardware (pigpio, sysfs PWM, a relay board) is an adapter concern
//! outside this crate. [`LoggingActuator`] is the shipped adapter: it
//! records and logs the requested duties so the external driver (or an
//! operator) can act on them.

use log::info;

use crate::control::heater::HeaterCommands;

/// Full-scale PWM duty, matching the external driver's 8-bit range.
pub const DUTY_FULL: u8 = 255;

/// Write-side port: the controller commands actuators through this.
pub trait ActuatorPort {
    /// Request a heater PWM duty (0-255).
    fn set_heater_duty(&mut self, duty: u8);

    /// Request a fan PWM duty (0-255).
    fn set_fan_duty(&mut self, duty: u8);

    /// Force heater and fan off — the guaranteed-cleanup path.
    fn all_off(&mut self) {
        self.set_heater_duty(0);
        self.set_fan_duty(0);
    }

    /// Apply a full command set from the controller.
    fn apply(&mut self, commands: &HeaterCommands) {
        self.set_heater_duty(commands.heater_duty);
        self.set_fan_duty(commands.fan_duty);
    }
}

/// Adapter that logs duty requests on change. Stands in for the external
/// PWM/GPIO driver.
#[derive(Debug, Default)]
pub struct LoggingActuator {
    heater_duty: u8,
    fan_duty: u8,
}

impl LoggingActuator {
    pub fn new() -> Self {
        Self {
            heater_duty: 0,
            fan_duty: 0,
        }
    }

    pub fn heater_duty(&self) -> u8 {
        self.heater_duty
    }

    pub fn fan_duty(&self) -> u8 {
        self.fan_duty
    }
}

impl ActuatorPort for LoggingActuator {
    fn set_heater_duty(&mut self, duty: u8) {
        if duty != self.heater_duty {
            info!("heater duty -> {duty}");
        }
        self.heater_duty = duty;
    }

    fn set_fan_duty(&mut self, duty: u8) {
        if duty != self.fan_duty {
            info!("fan duty -> {duty}");
        }
        self.fan_duty = duty;
    }
}
