use clap::Parser;
use embassy_executor::Spawner;
use log::*;
use pillow_partner::command::write_enable_mask;
use pillow_partner::command_interface::{command_task, status_task};
use pillow_partner::temperature_sensor::ThermalModel;
use pillow_partner::{heater::heater_task, motor::motor_task, CONFIG, DEVICE_NAME, VERSION};

/// Runs the pillow firmware against simulated hardware. Commands are read
/// from stdin as JSON lines, e.g. {"endpoint":"enable","value":3}
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Log level filter (error, warn, info, debug, trace)
    #[arg(long, default_value = "info")]
    log_level: LevelFilter,

    /// Ambient temperature of the simulated pillow in degrees Celsius
    #[arg(long, default_value_t = 22.0)]
    ambient: f32,

    /// Degrees per second the simulated heater adds at full duty
    #[arg(long, default_value_t = 0.5)]
    heating_rate: f32,

    /// Enable mask applied at start-up (bit 0 vibration, bit 1 heating)
    #[arg(long, default_value_t = 0)]
    enable: u8,
}

#[embassy_executor::main]
async fn main(spawner: Spawner) {
    let args = Args::parse();

    env_logger::builder()
        .filter_level(args.log_level)
        .format_timestamp_millis()
        .init();

    info!("{} {} (simulated)", DEVICE_NAME, VERSION);
    write_enable_mask(&CONFIG, args.enable);

    let model = ThermalModel {
        ambient_c: args.ambient,
        max_heating_rate: args.heating_rate,
        ..ThermalModel::default()
    };

    spawner.spawn(motor_task().unwrap());
    spawner.spawn(heater_task(model).unwrap());
    spawner.spawn(command_task().unwrap());
    spawner.spawn(status_task().unwrap());
}
