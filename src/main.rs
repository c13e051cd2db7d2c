//! airbench CLI — one binary replacing the rig's per-sensor scripts.
//!
//! Every subcommand goes through the same arbitration chain (lock →
//! channel select → transaction), so they can run concurrently with each
//! other and with the GUI's pollers on one bus.

use std::path::PathBuf;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::info;

use airbench::actuators::LoggingActuator;
use airbench::bus::LinuxBus;
use airbench::config::SystemConfig;
use airbench::sensors::{MeasureType, SensorHub};
use airbench::service::HeaterService;

#[derive(Parser)]
#[command(name = "airbench", version, about = "Airflow-tunnel sensor rig daemon")]
struct Cli {
    /// JSON config file; unspecified fields keep their defaults.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// One multiplexed pass over every sensor, JSON on stdout.
    Aggregate,
    /// One airflow estimate from the MCP9600 pair.
    Airflow,
    /// One SDP810 differential-pressure reading (Pa).
    Pressure,
    /// One SDP810 internal-temperature reading (degC).
    SdpTemperature,
    /// Run the heater control loop until SIGINT/SIGTERM.
    Heat,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => SystemConfig::load(path)?,
        None => SystemConfig::default(),
    };

    let bus = LinuxBus::open(&config)
        .with_context(|| format!("opening {}", config.i2c_device.display()))?;
    let mut hub = SensorHub::new(bus);

    match cli.command {
        Command::Aggregate => {
            if let Err(e) = hub.init_env(&config) {
                log::warn!("continuing without BME280: {e}");
            }
            let snapshot = hub.read_all();
            println!("{}", serde_json::to_string(&snapshot)?);
        }
        Command::Airflow => match hub.read_airflow() {
            Some(r) => println!(
                "ambient {:.2} degC, thermocouple {:.2} degC, flow {:.2} m/s",
                r.ambient_c, r.thermocouple_c, r.speed_m_s
            ),
            None => anyhow::bail!("airflow reading unavailable"),
        },
        Command::Pressure => match hub.read_sdp810(MeasureType::Pressure) {
            Some(p) => println!("{p:.2}"),
            None => anyhow::bail!("pressure reading unavailable"),
        },
        Command::SdpTemperature => match hub.read_sdp810(MeasureType::Temperature) {
            Some(t) => println!("{t:.2}"),
            None => anyhow::bail!("temperature reading unavailable"),
        },
        Command::Heat => {
            hub.init_env(&config)
                .context("BME280 required for the heater loop")?;

            let shutdown = Arc::new(AtomicBool::new(false));
            for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
                signal_hook::flag::register(signal, Arc::clone(&shutdown))?;
            }

            info!("heater loop starting (Ctrl-C to stop)");
            let mut service = HeaterService::new(&config, hub, LoggingActuator::new());
            service.run(&shutdown);
        }
    }

    Ok(())
}
