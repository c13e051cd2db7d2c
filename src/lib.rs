//! airbench — shared-I2C sensor rig and heater control for the benchtop
//! airflow tunnel.
//!
//! Several uncoordinated OS processes (sensor one-shots, GUI pollers, the
//! heater loop) share one physical I2C bus through a TCA9548A channel
//! multiplexer. This crate provides the arbitration protocol that keeps
//! them safe (cross-process lock enclosing channel-select and the device
//! transaction), the per-sensor wire decoding, and the hysteresis heater
//! controller driven by a polled file-resident setpoint.

#![deny(unused_must_use)]

pub mod actuators;
pub mod bus;
pub mod config;
pub mod control;
pub mod error;
pub mod sensors;
pub mod service;
pub mod setpoint;
pub mod telemetry;

pub use config::SystemConfig;
pub use error::{BusError, Error, Result, SensorError};
