//! Aggregator behavior over the mock bus: partial results, channel
//! re-selection, fail-fast on unmapped sensors.

use crate::mock_hw::{test_bus, test_config, MockBus, MockDelay};
use airbench::bus::mux::sensor;
use airbench::error::BusError;
use airbench::sensors::SensorHub;

fn sdp_frame(b0: u8, b1: u8) -> [u8; 9] {
    let mut f = [0u8; 9];
    f[0] = b0;
    f[1] = b1;
    f
}

/// Queue one full happy pass: MCP9600 pair + env register, SDP810 frame,
/// BME280 chip-id probes for init and one read.
fn queue_happy_pass(mock: &mut MockBus) {
    mock.queue_read(0x67, &[0x01, 0x90]); // airflow ambient: 25.0
    mock.queue_read(0x67, &[0x01, 0xB2]); // airflow thermocouple: 27.125
    mock.queue_read(0x67, &[0x01, 0x40]); // env ambient: 20.0
    mock.queue_read(0x25, &sdp_frame(50, 128)); // 47.3456 Pa
    mock.queue_read(0x77, &[0x60]); // init probe
    mock.queue_read(0x77, &[0x60]); // read probe
}

#[test]
fn full_pass_reads_every_sensor() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut mock = MockBus::new();
    queue_happy_pass(&mut mock);

    let mut hub = SensorHub::new(test_bus(&config, mock, MockDelay::new()));
    hub.init_env(&config).unwrap();
    let snapshot = hub.read_all();

    let airflow = snapshot.airflow.expect("airflow");
    assert!((airflow.ambient_c - 25.0).abs() < 1e-4);
    assert!((airflow.thermocouple_c - 27.125).abs() < 1e-4);
    let expected = (2.5 * (27.125f64 - 25.0 - 0.2).sqrt()) as f32;
    assert!((airflow.speed_m_s - expected).abs() < 1e-4);

    let pressure = snapshot.differential_pa.expect("pressure");
    assert!((pressure - 47.3456).abs() < 1e-3, "got {pressure}");

    assert!((snapshot.env_ambient_c.expect("env ambient") - 20.0).abs() < 1e-4);
    let env = snapshot.env.expect("env");
    assert!((env.temperature_c - 25.0).abs() < 1e-4);
    assert!(snapshot.timestamp > 0.0);
}

#[test]
fn sdp810_failure_does_not_abort_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut mock = MockBus::new();
    queue_happy_pass(&mut mock);
    mock.fail_address(0x25);

    let mut hub = SensorHub::new(test_bus(&config, mock, MockDelay::new()));
    hub.init_env(&config).unwrap();
    let snapshot = hub.read_all();

    assert!(snapshot.differential_pa.is_none());
    assert!(snapshot.airflow.is_some());
    assert!(snapshot.env_ambient_c.is_some());
    assert!(snapshot.env.is_some());
}

#[test]
fn mcp9600_failure_does_not_abort_the_pass() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut mock = MockBus::new();
    queue_happy_pass(&mut mock);
    mock.fail_address(0x67);

    let mut hub = SensorHub::new(test_bus(&config, mock, MockDelay::new()));
    hub.init_env(&config).unwrap();
    let snapshot = hub.read_all();

    assert!(snapshot.airflow.is_none());
    assert!(snapshot.env_ambient_c.is_none());
    assert!(snapshot.differential_pa.is_some());
    assert!(snapshot.env.is_some());
}

#[test]
fn every_critical_section_reselects_its_channel() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut mock = MockBus::new();
    queue_happy_pass(&mut mock);

    let mut hub = SensorHub::new(test_bus(&config, mock, MockDelay::new()));
    hub.init_env(&config).unwrap();
    let _ = hub.read_all();

    // init (BME ch0), then airflow ch1, SDP ch2, env MCP ch0, BME ch0.
    let bus = hub.into_bus();
    // Reclaim the mock to inspect the write history.
    let selections = bus_into_mock(bus).mux_selections();
    assert_eq!(selections, vec![0b0001, 0b0010, 0b0100, 0b0001, 0b0001]);
    for byte in selections {
        assert_eq!(byte.count_ones(), 1, "exactly one channel bit");
    }
}

#[test]
fn implausible_temperature_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut mock = MockBus::new();
    mock.queue_read(0x67, &[0x7F, 0xFF]); // 2047.9 degC: bus glitch
    mock.queue_read(0x67, &[0x01, 0x90]);

    let mut hub = SensorHub::new(test_bus(&config, mock, MockDelay::new()));
    assert!(hub.read_airflow().is_none());
}

#[test]
fn unmapped_sensor_fails_fast() {
    let dir = tempfile::tempdir().unwrap();
    let config = test_config(&dir);
    let mut bus = test_bus(&config, MockBus::new(), MockDelay::new());

    let res: Result<(), BusError> = bus.with_sensor("SHT35", |_, _| Ok(()));
    match res {
        Err(BusError::UnknownSensor(name)) => assert_eq!(name, "SHT35"),
        other => panic!("expected UnknownSensor, got {other:?}"),
    }
}

#[test]
fn mapped_names_match_the_bench_wiring() {
    // Guard against drift between the map and the drivers' expectations.
    assert_eq!(sensor::SDP810, "SDP810");
    assert_eq!(sensor::MCP9600_AIRFLOW, "MCP9600_AIRFLOW");
    assert_eq!(sensor::MCP9600_ENV, "MCP9600_ENV");
    assert_eq!(sensor::BME280, "BME280");
}

/// Helper: tear the SharedBus apart to reach the mock's history.
fn bus_into_mock(bus: airbench::bus::SharedBus<MockBus, MockDelay>) -> MockBus {
    bus.into_i2c()
}
