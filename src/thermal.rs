//! Thermal controller.
//!
//! Every 500 ms, when heating is enabled, read the sensor and pick one of four
//! heater duty levels from the temperature deficit. There is no hysteresis, so
//! a deficit sitting on a band edge moves between adjacent levels from one
//! tick to the next.

use embassy_time::Duration;
use embedded_hal::pwm::SetDutyCycle;
use serde::Serialize;

use crate::config::{Calibration, ConfigStore, Settings, THERMAL_PERIOD_MILLIS};
use crate::log::*;
use crate::scheduler::PeriodicWait;
use crate::telemetry::{ThermalReport, THERMAL_REPORT};
use crate::DUTY_SCALE;

pub const THERMAL_PERIOD: Duration = Duration::from_millis(THERMAL_PERIOD_MILLIS);

/// Source of raw analog samples.
#[allow(async_fn_in_trait)]
pub trait SampleSource {
    type Error;

    async fn read_sample(&mut self) -> Result<u16, Self::Error>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[cfg_attr(feature = "rp2040", derive(defmt::Format))]
pub enum HeaterLevel {
    Off,
    Low,
    Medium,
    Full,
}

impl HeaterLevel {
    /// Smallest satisfied threshold wins; NaN falls through to `Full`.
    pub fn for_deficit(deficit: f32) -> Self {
        if deficit < 1.0 {
            HeaterLevel::Off
        } else if deficit < 3.0 {
            HeaterLevel::Low
        } else if deficit < 5.0 {
            HeaterLevel::Medium
        } else {
            HeaterLevel::Full
        }
    }

    /// Duty out of [`DUTY_SCALE`].
    pub const fn duty(self) -> u16 {
        match self {
            HeaterLevel::Off => 0,
            HeaterLevel::Low => 64,
            HeaterLevel::Medium => 128,
            HeaterLevel::Full => DUTY_SCALE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ThermalReading {
    pub temperature_c: f32,
    pub deficit_c: f32,
    pub level: HeaterLevel,
}

#[derive(Debug)]
pub enum ThermalError<SE, HE> {
    Sensor(SE),
    Heater(HE),
}

pub struct ThermalController<S, H> {
    sensor: S,
    heater: H,
    calibration: Calibration,
    scheduler: PeriodicWait,
    level: HeaterLevel,
}

impl<S: SampleSource, H: SetDutyCycle> ThermalController<S, H> {
    pub fn new(sensor: S, heater: H, calibration: Calibration) -> Self {
        Self {
            sensor,
            heater,
            calibration,
            scheduler: PeriodicWait::new(),
            level: HeaterLevel::Off,
        }
    }

    pub fn sensor(&self) -> &S {
        &self.sensor
    }

    pub fn heater(&self) -> &H {
        &self.heater
    }

    pub fn level(&self) -> HeaterLevel {
        self.level
    }

    fn drive(&mut self, level: HeaterLevel) -> Result<(), H::Error> {
        self.level = level;
        self.heater.set_duty_cycle_fraction(level.duty(), DUTY_SCALE)
    }

    /// One control step. Returns `None` when heating is disabled.
    pub async fn tick(
        &mut self,
        settings: &Settings,
    ) -> Result<Option<ThermalReading>, ThermalError<S::Error, H::Error>> {
        if !settings.heating_enabled {
            self.drive(HeaterLevel::Off).map_err(ThermalError::Heater)?;
            return Ok(None);
        }

        let raw = self
            .sensor
            .read_sample()
            .await
            .map_err(ThermalError::Sensor)?;
        let temperature_c = self.calibration.to_celsius(raw);
        let deficit_c = settings.target_temperature_c - temperature_c;
        let level = HeaterLevel::for_deficit(deficit_c);
        self.drive(level).map_err(ThermalError::Heater)?;

        Ok(Some(ThermalReading {
            temperature_c,
            deficit_c,
            level,
        }))
    }

    /// One loop iteration against the current store contents. A failed read
    /// or PWM write switches the heater off; the report is `None` then.
    pub async fn step(&mut self, store: &ConfigStore) -> Option<ThermalReport> {
        let settings = store.get();
        let previous = self.level;

        let fault = match self.tick(&settings).await {
            Ok(Some(reading)) => {
                if reading.level != previous {
                    debug!(
                        "Heater level changed: {} C, deficit {} C, duty {}",
                        reading.temperature_c,
                        reading.deficit_c,
                        reading.level.duty()
                    );
                }
                return Some(ThermalReport {
                    temperature_c: reading.temperature_c,
                    target_temperature_c: settings.target_temperature_c,
                    level: reading.level,
                    duty: reading.level.duty(),
                });
            }
            Ok(None) => return None,
            Err(fault) => fault,
        };

        match fault {
            ThermalError::Sensor(_) => warn!("Temperature read failed, heater off for this tick"),
            ThermalError::Heater(_) => error!("Heater PWM write failed, heater off for this tick"),
        }
        if self.drive(HeaterLevel::Off).is_err() {
            error!("Failed to switch heater off");
        }
        None
    }

    pub async fn run(mut self, store: &ConfigStore) -> ! {
        if self.drive(HeaterLevel::Off).is_err() {
            error!("Failed to switch heater off at start-up");
        }

        loop {
            self.scheduler.wait_until_next(THERMAL_PERIOD).await;
            if let Some(report) = self.step(store).await {
                THERMAL_REPORT.sender().send(report);
            }
        }
    }
}
