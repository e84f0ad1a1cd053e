use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};

use crate::log::*;
use crate::vibration::MotorBridge;
use crate::DUTY_SCALE;

/// Simulated PWM line that traces every duty change.
pub struct LoggedPwm {
    name: &'static str,
    duty: u16,
}

impl LoggedPwm {
    pub fn new(name: &'static str) -> Self {
        Self { name, duty: 0 }
    }
}

impl ErrorType for LoggedPwm {
    type Error = Infallible;
}

impl SetDutyCycle for LoggedPwm {
    fn max_duty_cycle(&self) -> u16 {
        DUTY_SCALE
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        if duty != self.duty {
            trace!("{} duty {} -> {}", self.name, self.duty, duty);
            self.duty = duty;
        }
        Ok(())
    }
}

pub fn motor_bridge() -> MotorBridge<LoggedPwm> {
    MotorBridge::new(
        [LoggedPwm::new("M1+"), LoggedPwm::new("M2+")],
        [LoggedPwm::new("M1-"), LoggedPwm::new("M2-")],
    )
}
