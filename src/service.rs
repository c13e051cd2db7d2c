//! The heater control loop.
//!
//! Cooperative polling at a fixed period (~5 Hz): poll the setpoint file,
//! read the environmental sensor through the shared bus, append the log
//! record, evaluate the hysteresis state machine, apply the actuator
//! commands, sleep. A failed sensor read skips logging for that cycle but
//! never stops the loop; every cycle is independent (no retry queue).
//!
//! The loop is the only cancellable unit. On exit — shutdown flag or
//! signal — the actuators are forced off as a guaranteed cleanup step.

use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::i2c::I2c;
use log::{info, warn};

use crate::actuators::ActuatorPort;
use crate::config::SystemConfig;
use crate::control::heater::{HeaterContext, HeaterFsm, HeaterStateId};
use crate::sensors::{EnvReading, SensorHub};
use crate::setpoint::SetpointFile;
use crate::telemetry::SensorLog;

/// Read-side port for the control loop's environmental reading. Lets
/// tests drive the loop without a bus.
pub trait EnvSource {
    fn read_env(&mut self) -> Option<EnvReading>;
}

impl<I2C, D> EnvSource for SensorHub<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    fn read_env(&mut self) -> Option<EnvReading> {
        SensorHub::read_env(self)
    }
}

/// The controller instance: owns its state explicitly — no ambient
/// globals, everything flows through the context struct.
pub struct HeaterService<E, A> {
    env: E,
    actuators: A,
    setpoint: SetpointFile,
    log: SensorLog,
    fsm: HeaterFsm,
    ctx: HeaterContext,
    interval: Duration,
    started: bool,
}

impl<E, A> HeaterService<E, A>
where
    E: EnvSource,
    A: ActuatorPort,
{
    pub fn new(config: &SystemConfig, env: E, actuators: A) -> Self {
        Self {
            env,
            actuators,
            setpoint: SetpointFile::new(&config.setpoint_path),
            log: SensorLog::new(&config.sensor_log_path),
            fsm: HeaterFsm::new(),
            ctx: HeaterContext::new(config.hysteresis_c, config.heater_duty_on),
            interval: Duration::from_millis(config.control_interval_ms),
            started: false,
        }
    }

    /// Run one control cycle. Exposed separately so tests can step the
    /// loop without sleeping.
    pub fn cycle(&mut self) {
        if !self.started {
            self.fsm.start(&mut self.ctx);
            self.started = true;
        }

        self.ctx.setpoint_c = self.setpoint.poll();

        match self.env.read_env() {
            Some(reading) => {
                self.ctx.temperature_c = Some(reading.temperature_c);
                if let Err(e) = self.log.append(&reading) {
                    warn!("sensor log append failed: {e}");
                }
            }
            None => {
                // No reading this cycle: skip the log record, hold the
                // controller's view of temperature at "unknown".
                self.ctx.temperature_c = None;
            }
        }

        self.fsm.tick(&mut self.ctx);
        self.actuators.apply(&self.ctx.commands);
    }

    /// Run until `shutdown` is raised, then force actuators off.
    pub fn run(&mut self, shutdown: &AtomicBool) {
        info!(
            "heater loop running at {:?} period, setpoint file {}",
            self.interval,
            self.setpoint.path().display()
        );
        while !shutdown.load(Ordering::SeqCst) {
            self.cycle();
            thread::sleep(self.interval);
        }
        self.shutdown();
    }

    /// Force all actuators to the safe state. Idempotent.
    pub fn shutdown(&mut self) {
        self.actuators.all_off();
        self.ctx.commands.heater_duty = 0;
        info!("heater loop stopped, actuators forced off");
    }

    pub fn state(&self) -> HeaterStateId {
        self.fsm.current_state()
    }

    pub fn actuators(&self) -> &A {
        &self.actuators
    }
}
