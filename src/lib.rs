#![cfg_attr(not(test), no_std)]

#[cfg(feature = "rp2040")]
pub use defmt as log;

#[cfg(not(feature = "rp2040"))]
pub use log;

pub mod command;
pub mod config;
pub mod scheduler;
pub mod telemetry;
pub mod thermal;
pub mod vibration;

#[cfg(test)]
pub(crate) mod testing;

#[cfg(feature = "rp2040")]
pub mod outputs_rp2040;
#[cfg(feature = "rp2040")]
pub use outputs_rp2040 as outputs;

#[cfg(feature = "std")]
pub mod outputs_std;
#[cfg(feature = "std")]
pub use outputs_std as outputs;

#[cfg(feature = "rp2040")]
pub mod temperature_sensor_rp2040;
#[cfg(feature = "rp2040")]
pub use temperature_sensor_rp2040 as temperature_sensor;

#[cfg(feature = "std")]
pub mod temperature_sensor_mock;
#[cfg(feature = "std")]
pub use temperature_sensor_mock as temperature_sensor;

#[cfg(feature = "rp2040")]
pub mod motor_rp2040;
#[cfg(feature = "rp2040")]
pub use motor_rp2040 as motor;

#[cfg(feature = "std")]
pub mod motor_std;
#[cfg(feature = "std")]
pub use motor_std as motor;

#[cfg(feature = "rp2040")]
pub mod heater_rp2040;
#[cfg(feature = "rp2040")]
pub use heater_rp2040 as heater;

#[cfg(feature = "std")]
pub mod heater_std;
#[cfg(feature = "std")]
pub use heater_std as heater;

#[cfg(feature = "rp2040")]
pub mod command_interface_rp2040;
#[cfg(feature = "rp2040")]
pub use command_interface_rp2040 as command_interface;

#[cfg(feature = "std")]
pub mod command_interface_std;
#[cfg(feature = "std")]
pub use command_interface_std as command_interface;

pub static VERSION: &str = "v0.1";
pub static DEVICE_NAME: &str = "PillowPartner-Pillow";
pub static SYSTEM_TICK_MILLIS: u32 = 100;

/// Duty levels are expressed against this scale; `DUTY_SCALE` itself means fully on.
pub const DUTY_SCALE: u16 = 256;

pub use config::CONFIG;
