use embassy_rp::clocks::clk_sys_freq;
use embassy_rp::pwm::{Config, Pwm, PwmOutput};

use crate::vibration::MotorBridge;

pub const MOTOR_PWM_HZ: u32 = 50_000;
pub const HEATER_PWM_HZ: u32 = 5_000;

/// Free-running PWM at `frequency_hz`, both outputs low.
pub fn pwm_config(frequency_hz: u32) -> Config {
    let mut config = Config::default();
    config.top = (clk_sys_freq() / frequency_hz - 1) as u16;
    config.compare_a = 0;
    config.compare_b = 0;
    config
}

/// Each slice carries one motor: channel A forward, channel B reverse.
pub fn motor_bridge(
    motor_one: Pwm<'static>,
    motor_two: Pwm<'static>,
) -> Option<MotorBridge<PwmOutput<'static>>> {
    let (m1_forward, m1_reverse) = motor_one.split();
    let (m2_forward, m2_reverse) = motor_two.split();
    Some(MotorBridge::new(
        [m1_forward?, m2_forward?],
        [m1_reverse?, m2_reverse?],
    ))
}
