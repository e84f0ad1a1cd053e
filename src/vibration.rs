//! Vibration controller.
//!
//! Once per beat (`60000 / rate` ms) the forward line of both motor bridges is
//! ramped up through 26 duty levels and back down again, giving one
//! triangular pulse per beat. The ramp takes real time (2 ms per step); when it
//! outlasts a short beat period the scheduler catches up instead of dropping
//! beats.

use core::num::NonZeroU8;

use embassy_time::{Duration, Instant};
use embedded_hal::pwm::SetDutyCycle;
use embedded_hal_async::delay::DelayNs;

use crate::config::{ConfigStore, Settings};
use crate::log::*;
use crate::scheduler::PeriodicWait;
use crate::telemetry::{BeatReport, BEAT_REPORT};
use crate::DUTY_SCALE;

/// Length of one minute in scheduler ticks.
pub const BEAT_WINDOW_MILLIS: u32 = 60_000;
/// Levels in each half of the ramp, 0 included.
pub const RAMP_LEVELS: u16 = 26;
pub const RAMP_INCREMENT: u16 = 8;
pub const RAMP_STEP_DELAY_MILLIS: u32 = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "rp2040", derive(defmt::Format))]
pub enum VibrationState {
    Idle,
    Ramping,
}

pub fn beat_period(rate_bpm: NonZeroU8) -> Duration {
    Duration::from_millis(u64::from(BEAT_WINDOW_MILLIS / u32::from(rate_bpm.get())))
}

/// Duty sequence for one beat: up from 0, then back down to 0.
pub fn ramp() -> impl Iterator<Item = u16> {
    (0..RAMP_LEVELS)
        .chain((0..RAMP_LEVELS).rev())
        .map(|step| step * RAMP_INCREMENT)
}

/// Two H-bridge polarity pairs. Only the forward lines carry the ramp.
pub struct MotorBridge<P> {
    forward: [P; 2],
    reverse: [P; 2],
}

impl<P: SetDutyCycle> MotorBridge<P> {
    pub fn new(forward: [P; 2], reverse: [P; 2]) -> Self {
        Self { forward, reverse }
    }

    pub fn forward(&self) -> &[P; 2] {
        &self.forward
    }

    pub fn reverse(&self) -> &[P; 2] {
        &self.reverse
    }

    pub fn set_forward(&mut self, level: u16) -> Result<(), P::Error> {
        for channel in self.forward.iter_mut() {
            channel.set_duty_cycle_fraction(level, DUTY_SCALE)?;
        }
        Ok(())
    }

    /// Drive every line to zero. A failing line does not stop the others;
    /// the last error is returned.
    pub fn release(&mut self) -> Result<(), P::Error> {
        let mut result = Ok(());
        for channel in self.forward.iter_mut().chain(self.reverse.iter_mut()) {
            if let Err(e) = channel.set_duty_cycle_fully_off() {
                result = Err(e);
            }
        }
        result
    }
}

pub struct VibrationController<P, D> {
    bridge: MotorBridge<P>,
    delay: D,
    scheduler: PeriodicWait,
    state: VibrationState,
}

impl<P: SetDutyCycle, D: DelayNs> VibrationController<P, D> {
    pub fn new(bridge: MotorBridge<P>, delay: D) -> Self {
        Self {
            bridge,
            delay,
            scheduler: PeriodicWait::new(),
            state: VibrationState::Idle,
        }
    }

    pub fn bridge(&self) -> &MotorBridge<P> {
        &self.bridge
    }

    pub fn delay(&self) -> &D {
        &self.delay
    }

    pub fn state(&self) -> VibrationState {
        self.state
    }

    /// One beat. Disabled ticks leave the outputs alone.
    pub async fn tick(&mut self, settings: &Settings) -> Result<VibrationState, P::Error> {
        if !settings.vibration_enabled {
            self.state = VibrationState::Idle;
            return Ok(self.state);
        }

        self.state = VibrationState::Ramping;
        for level in ramp() {
            self.bridge.set_forward(level)?;
            self.delay.delay_ms(RAMP_STEP_DELAY_MILLIS).await;
        }
        Ok(self.state)
    }

    /// One beat at `rate` against the current store contents, `wake` being the
    /// scheduled wake point. A PWM failure releases the bridge.
    pub async fn step(
        &mut self,
        store: &ConfigStore,
        rate: NonZeroU8,
        wake: Instant,
    ) -> Option<BeatReport> {
        let settings = store.get();

        match self.tick(&settings).await {
            Ok(VibrationState::Ramping) => {
                let report = BeatReport::new(rate, beat_period(rate), Instant::now() - wake);
                if report.overran {
                    trace!(
                        "Beat took {} ms, longer than the {} ms period",
                        report.elapsed_ms,
                        report.period_ms
                    );
                }
                Some(report)
            }
            Ok(VibrationState::Idle) => None,
            Err(_) => {
                error!("Motor PWM write failed, releasing bridge");
                self.state = VibrationState::Idle;
                if self.bridge.release().is_err() {
                    error!("Failed to release motor bridge");
                }
                None
            }
        }
    }

    pub async fn run(mut self, store: &ConfigStore) -> ! {
        if self.bridge.release().is_err() {
            error!("Failed to release motor bridge at start-up");
        }

        loop {
            let rate = store.rate();
            let wake = self.scheduler.wait_until_next(beat_period(rate)).await;
            if let Some(report) = self.step(store, rate, wake).await {
                BEAT_REPORT.sender().send(report);
            }
        }
    }
}
