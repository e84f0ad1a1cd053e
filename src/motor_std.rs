use embassy_time::Delay;

use crate::log::*;
use crate::outputs::motor_bridge;
use crate::vibration::VibrationController;
use crate::CONFIG;

#[embassy_executor::task]
pub async fn motor_task() -> ! {
    info!("Starting motor task");
    VibrationController::new(motor_bridge(), Delay)
        .run(&CONFIG)
        .await
}
