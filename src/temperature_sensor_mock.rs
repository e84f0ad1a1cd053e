//! Thermal simulation of the pillow for host builds.
//!
//! The simulated heater publishes its duty, the simulated sensor integrates
//! heater power against Newton cooling towards ambient every time it is read
//! and answers with the raw ADC sample the real sensor would produce.

use core::convert::Infallible;
use core::sync::atomic::Ordering;

use embassy_time::Instant;
use embedded_hal::pwm::{ErrorType, SetDutyCycle};
use portable_atomic::AtomicU16;

use crate::config::Calibration;
use crate::log::*;
use crate::thermal::SampleSource;
use crate::DUTY_SCALE;

static HEATER_DUTY: AtomicU16 = AtomicU16::new(0);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalModel {
    pub ambient_c: f32,
    /// Degrees per second gained at full duty.
    pub max_heating_rate: f32,
    /// Fraction of the temperature difference to ambient lost per second.
    pub heat_loss_coefficient: f32,
    /// Factor affecting heat retention (0-1).
    pub thermal_mass: f32,
}

impl Default for ThermalModel {
    fn default() -> Self {
        Self {
            ambient_c: 22.0,
            max_heating_rate: 0.5,
            heat_loss_coefficient: 0.02,
            thermal_mass: 0.8,
        }
    }
}

impl ThermalModel {
    /// Advance `temperature_c` by `dt_s` seconds at `power` (0..=1).
    pub fn step(&self, temperature_c: f32, power: f32, dt_s: f32) -> f32 {
        let heat_input = self.max_heating_rate * power;
        let heat_loss = self.heat_loss_coefficient * (temperature_c - self.ambient_c);
        let next = temperature_c + (heat_input - heat_loss) * self.thermal_mass * dt_s;
        next.max(self.ambient_c)
    }
}

/// Heater output feeding the simulation.
pub struct SimulatedHeater;

impl ErrorType for SimulatedHeater {
    type Error = Infallible;
}

impl SetDutyCycle for SimulatedHeater {
    fn max_duty_cycle(&self) -> u16 {
        DUTY_SCALE
    }

    fn set_duty_cycle(&mut self, duty: u16) -> Result<(), Self::Error> {
        let previous = HEATER_DUTY.swap(duty, Ordering::AcqRel);
        if previous != duty {
            debug!("Heater duty {} -> {}", previous, duty);
        }
        Ok(())
    }
}

pub struct SimulatedSensor {
    model: ThermalModel,
    calibration: Calibration,
    temperature_c: f32,
    last_update: Option<Instant>,
}

impl SimulatedSensor {
    pub fn new(model: ThermalModel, calibration: Calibration) -> Self {
        info!(
            "Thermal simulation: ambient={} C, max_rate={} C/s, loss={}",
            model.ambient_c, model.max_heating_rate, model.heat_loss_coefficient
        );
        Self {
            temperature_c: model.ambient_c,
            model,
            calibration,
            last_update: None,
        }
    }
}

impl SampleSource for SimulatedSensor {
    type Error = Infallible;

    async fn read_sample(&mut self) -> Result<u16, Self::Error> {
        let now = Instant::now();
        if let Some(last) = self.last_update {
            let dt_s = (now - last).as_millis() as f32 / 1000.0;
            let power = HEATER_DUTY.load(Ordering::Acquire) as f32 / DUTY_SCALE as f32;
            self.temperature_c = self.model.step(self.temperature_c, power, dt_s);
        }
        self.last_update = Some(now);
        Ok(self.calibration.to_raw(self.temperature_c))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_heats_and_cools() {
        let model = ThermalModel::default();
        let heated = model.step(25.0, 1.0, 1.0);
        assert!(heated > 25.0);
        let cooled = model.step(30.0, 0.0, 1.0);
        assert!(cooled < 30.0 && cooled > model.ambient_c);
    }

    #[test]
    fn test_model_settles_at_equilibrium() {
        let model = ThermalModel::default();
        let mut temperature = model.ambient_c;
        for _ in 0..20_000 {
            temperature = model.step(temperature, 1.0, 0.5);
        }
        // ambient + rate / loss
        assert!((temperature - 47.0).abs() < 0.1);
    }
}
