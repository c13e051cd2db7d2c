//! Control algorithms: the pure airflow estimator and the hysteresis
//! heater state machine.

pub mod airflow;
pub mod heater;
