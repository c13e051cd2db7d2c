//! Heater loop end-to-end: setpoint polling, hysteresis, logging, and the
//! guaranteed off-on-exit cleanup, driven cycle by cycle with mocks.

use std::sync::atomic::AtomicBool;

use crate::mock_hw::{test_config, ActuatorCall, FakeEnv, RecordingActuator};
use airbench::config::SystemConfig;
use airbench::control::heater::HeaterStateId;
use airbench::service::HeaterService;
use airbench::setpoint::SetpointFile;
use airbench::telemetry::CSV_HEADER;

fn make_service(
    config: &SystemConfig,
    env: FakeEnv,
) -> HeaterService<FakeEnv, RecordingActuator> {
    HeaterService::new(config, env, RecordingActuator::new())
}

#[test]
fn no_setpoint_file_means_measurement_only() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let env = FakeEnv::new(Some(5.0)); // freezing, but no setpoint
    let mut service = make_service(&config, env);

    for _ in 0..5 {
        service.cycle();
    }
    assert_eq!(service.state(), HeaterStateId::Idle);
    assert!(!service.actuators().heater_on());

    // Measurement-only still logs every successful cycle.
    let text = std::fs::read_to_string(&config.sensor_log_path).unwrap();
    assert_eq!(text.lines().count(), 6); // header + 5 records
    assert_eq!(text.lines().next().unwrap(), CSV_HEADER);
}

#[test]
fn hysteresis_cycle_through_the_band() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let setpoint = SetpointFile::new(&config.setpoint_path);
    setpoint.publish(30.0).unwrap();

    let env = FakeEnv::new(Some(25.0));
    let mut service = make_service(&config, env.clone());

    service.cycle(); // Idle -> HeatingOff (setpoint present)
    service.cycle(); // HeatingOff -> HeatingOn (25.0 <= 29.0)
    assert_eq!(service.state(), HeaterStateId::HeatingOn);
    assert!(service.actuators().heater_on());

    // Rising through the band: stays on until the upper rail.
    for t in [29.0, 30.0, 30.9] {
        env.set(Some(t));
        service.cycle();
        assert!(service.actuators().heater_on(), "dropped out at {t}");
    }

    env.set(Some(31.0)); // == S + 1.0
    service.cycle();
    assert_eq!(service.state(), HeaterStateId::HeatingOff);
    assert!(!service.actuators().heater_on());

    // Falling back through the band: stays off until the lower rail.
    for t in [30.5, 29.5, 29.1] {
        env.set(Some(t));
        service.cycle();
        assert!(!service.actuators().heater_on(), "re-lit at {t}");
    }

    env.set(Some(29.0)); // == S - 1.0
    service.cycle();
    assert!(service.actuators().heater_on());
}

#[test]
fn setpoint_removal_forces_heater_off_immediately() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let setpoint = SetpointFile::new(&config.setpoint_path);
    setpoint.publish(40.0).unwrap();

    let env = FakeEnv::new(Some(20.0));
    let mut service = make_service(&config, env);
    service.cycle();
    service.cycle();
    assert!(service.actuators().heater_on());

    setpoint.clear().unwrap();
    service.cycle();
    assert_eq!(service.state(), HeaterStateId::Idle);
    assert!(!service.actuators().heater_on());
}

#[test]
fn garbage_setpoint_is_treated_as_absent() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    std::fs::write(&config.setpoint_path, "not a number").unwrap();

    let env = FakeEnv::new(Some(-10.0));
    let mut service = make_service(&config, env);
    service.cycle();
    assert_eq!(service.state(), HeaterStateId::Idle);
    assert!(!service.actuators().heater_on());
}

#[test]
fn failed_read_skips_logging_but_keeps_running() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let setpoint = SetpointFile::new(&config.setpoint_path);
    setpoint.publish(30.0).unwrap();

    let env = FakeEnv::new(Some(25.0));
    let mut service = make_service(&config, env.clone());
    service.cycle();
    service.cycle();
    assert_eq!(service.state(), HeaterStateId::HeatingOn);

    env.set(None); // sensor drops out
    for _ in 0..3 {
        service.cycle();
    }
    // State held, loop alive, no extra log records for the dead cycles.
    assert_eq!(service.state(), HeaterStateId::HeatingOn);
    let text = std::fs::read_to_string(&config.sensor_log_path).unwrap();
    assert_eq!(text.lines().count(), 3); // header + the 2 good cycles

    env.set(Some(25.0)); // sensor back
    service.cycle();
    let text = std::fs::read_to_string(&config.sensor_log_path).unwrap();
    assert_eq!(text.lines().count(), 4);
}

#[test]
fn run_with_raised_flag_forces_actuators_off() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let env = FakeEnv::new(Some(25.0));
    let mut service = make_service(&config, env);

    let shutdown = AtomicBool::new(true);
    service.run(&shutdown);

    // The guaranteed cleanup: both channels commanded to zero last.
    let calls = &service.actuators().calls;
    assert!(calls.ends_with(&[ActuatorCall::Heater(0), ActuatorCall::Fan(0)]));
}

#[test]
fn shutdown_after_heating_turns_everything_off() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    SetpointFile::new(&config.setpoint_path).publish(50.0).unwrap();

    let env = FakeEnv::new(Some(10.0));
    let mut service = make_service(&config, env);
    service.cycle();
    service.cycle();
    assert!(service.actuators().heater_on());

    service.shutdown();
    assert!(!service.actuators().heater_on());
}
