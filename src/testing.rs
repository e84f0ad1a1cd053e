//! Recording doubles for the hardware seams.

use core::convert::Infallible;

use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use embedded_hal_async::delay::DelayNs;

use crate::thermal::SampleSource;
use crate::DUTY_SCALE;

/// PWM channel that remembers every duty it was given.
#[derive(Debug, Default)]
pub struct RecordingPwm {
    pub history: Vec<u16>,
}

impl RecordingPwm {
    pub fn last(&self) -> Option<u16> {
        self.history.last().copied()
    }
}

impl ErrorType for RecordingPwm {
    type Error = Infallible;
}

impl SetDutyCycle for RecordingPwm {
    fn max_duty_cycle(&self) -> u16 {
        DUTY_SCALE
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        self.history.push(duty);
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PwmFault;

impl embedded_hal::pwm::Error for PwmFault {
    fn kind(&self) -> embedded_hal::pwm::ErrorKind {
        embedded_hal::pwm::ErrorKind::Other
    }
}

/// PWM channel whose write number `fail_at` (counting from 0) fails. Every
/// other write succeeds and is recorded.
#[derive(Debug, Default)]
pub struct FlakyPwm {
    pub fail_at: Option<usize>,
    pub writes: usize,
    pub history: Vec<u16>,
}

impl FlakyPwm {
    pub fn failing_at(write: usize) -> Self {
        Self {
            fail_at: Some(write),
            ..Self::default()
        }
    }

    pub fn last(&self) -> Option<u16> {
        self.history.last().copied()
    }
}

impl ErrorType for FlakyPwm {
    type Error = PwmFault;
}

impl SetDutyCycle for FlakyPwm {
    fn max_duty_cycle(&self) -> u16 {
        DUTY_SCALE
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let write = self.writes;
        self.writes += 1;
        if self.fail_at == Some(write) {
            return Err(PwmFault);
        }
        self.history.push(duty);
        Ok(())
    }
}

/// Delay that returns immediately and adds up what it was asked to wait.
#[derive(Debug, Default)]
pub struct RecordingDelay {
    pub total_ns: u64,
    pub calls: usize,
}

impl DelayNs for RecordingDelay {
    async fn delay_ns(&mut self, ns: u32) {
        self.total_ns += u64::from(ns);
        self.calls += 1;
    }
}

/// Sensor returning a fixed raw sample, or an error when `raw` is `None`.
#[derive(Debug, Default)]
pub struct FixedSensor {
    pub raw: Option<u16>,
    pub reads: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SensorFault;

impl SampleSource for FixedSensor {
    type Error = SensorFault;

    async fn read_sample(&mut self) -> Result<u16, Self::Error> {
        self.reads += 1;
        self.raw.ok_or(SensorFault)
    }
}
