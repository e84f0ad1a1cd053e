use crate::config::Calibration;
use crate::log::*;
use crate::temperature_sensor::{SimulatedHeater, SimulatedSensor, ThermalModel};
use crate::thermal::ThermalController;
use crate::CONFIG;

#[embassy_executor::task]
pub async fn heater_task(model: ThermalModel) -> ! {
    info!("Starting heater task");
    let sensor = SimulatedSensor::new(model, Calibration::DEFAULT);
    ThermalController::new(sensor, SimulatedHeater, Calibration::DEFAULT)
        .run(&CONFIG)
        .await
}
