use embassy_rp::pwm::PwmOutput;
use embassy_time::Delay;

use crate::log::*;
use crate::vibration::{MotorBridge, VibrationController};
use crate::CONFIG;

#[embassy_executor::task]
pub async fn motor_task(bridge: MotorBridge<PwmOutput<'static>>) -> ! {
    info!("Starting motor task");
    VibrationController::new(bridge, Delay).run(&CONFIG).await
}
