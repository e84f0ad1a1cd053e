use embassy_rp::pwm::PwmOutput;

use crate::config::Calibration;
use crate::log::*;
use crate::temperature_sensor::AdcSensor;
use crate::thermal::ThermalController;
use crate::CONFIG;

#[embassy_executor::task]
pub async fn heater_task(sensor: AdcSensor, heater: PwmOutput<'static>) -> ! {
    info!("Starting heater task");
    ThermalController::new(sensor, heater, Calibration::DEFAULT)
        .run(&CONFIG)
        .await
}
