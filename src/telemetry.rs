//! Per-tick reports from both controllers and the status line built from them.

use core::num::NonZeroU8;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::watch::{Receiver, Watch};
use embassy_time::Duration;
use heapless::String;
use serde::Serialize;

use crate::command::SERVICE_UUID;
use crate::config::{ConfigStore, Settings};
use crate::thermal::HeaterLevel;

pub const STATUS_JSON_CAPACITY: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BeatReport {
    pub rate_bpm: u8,
    pub period_ms: u32,
    /// From the scheduled wake to the end of the ramp.
    pub elapsed_ms: u32,
    pub overran: bool,
}

impl BeatReport {
    pub fn new(rate: NonZeroU8, period: Duration, elapsed: Duration) -> Self {
        let period_ms = period.as_millis() as u32;
        let elapsed_ms = elapsed.as_millis() as u32;
        Self {
            rate_bpm: rate.get(),
            period_ms,
            elapsed_ms,
            overran: elapsed_ms >= period_ms,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ThermalReport {
    pub temperature_c: f32,
    pub target_temperature_c: f32,
    pub level: HeaterLevel,
    pub duty: u16,
}

pub static BEAT_REPORT: Watch<CriticalSectionRawMutex, BeatReport, 2> = Watch::new();
pub static THERMAL_REPORT: Watch<CriticalSectionRawMutex, ThermalReport, 2> = Watch::new();

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeviceStatus {
    pub version: &'static str,
    /// Service the command endpoints belong to.
    pub service: &'static str,
    pub settings: Settings,
    pub beat: Option<BeatReport>,
    pub thermal: Option<ThermalReport>,
}

impl DeviceStatus {
    pub fn new(
        settings: Settings,
        beat: Option<BeatReport>,
        thermal: Option<ThermalReport>,
    ) -> Self {
        Self {
            version: crate::VERSION,
            service: SERVICE_UUID,
            // stale reports from a loop that has since been disabled are dropped
            beat: beat.filter(|_| settings.vibration_enabled),
            thermal: thermal.filter(|_| settings.heating_enabled),
            settings,
        }
    }

    pub fn to_json(&self) -> Result<String<STATUS_JSON_CAPACITY>, serde_json_core::ser::Error> {
        serde_json_core::to_string(self)
    }
}

/// Collects the latest report of each loop for periodic status output.
pub struct StatusMonitor {
    beat: Receiver<'static, CriticalSectionRawMutex, BeatReport, 2>,
    thermal: Receiver<'static, CriticalSectionRawMutex, ThermalReport, 2>,
}

impl StatusMonitor {
    /// `None` once every receiver slot of a report channel is taken.
    pub fn new() -> Option<Self> {
        Some(Self {
            beat: BEAT_REPORT.receiver()?,
            thermal: THERMAL_REPORT.receiver()?,
        })
    }

    pub fn snapshot(&mut self, store: &ConfigStore) -> DeviceStatus {
        DeviceStatus::new(store.get(), self.beat.try_get(), self.thermal.try_get())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_beat_report_overrun() {
        let rate = NonZeroU8::new(255).unwrap();
        let period = Duration::from_millis(235);

        let report = BeatReport::new(rate, period, Duration::from_millis(120));
        assert!(!report.overran);

        let report = BeatReport::new(rate, period, Duration::from_millis(240));
        assert!(report.overran);
        assert_eq!(report.rate_bpm, 255);
        assert_eq!(report.elapsed_ms, 240);
    }

    #[test]
    fn test_status_drops_reports_of_disabled_loops() {
        let beat = BeatReport::new(
            NonZeroU8::new(80).unwrap(),
            Duration::from_millis(750),
            Duration::from_millis(110),
        );
        let status = DeviceStatus::new(Settings::default(), Some(beat), None);
        assert_eq!(status.beat, None);

        let settings = Settings {
            vibration_enabled: true,
            ..Settings::default()
        };
        let status = DeviceStatus::new(settings, Some(beat), None);
        assert_eq!(status.beat, Some(beat));
    }

    #[test]
    fn test_monitor_sees_latest_report() {
        let store = ConfigStore::new();
        store.set_vibration_enabled(true);
        let mut monitor = StatusMonitor::new().unwrap();
        assert_eq!(monitor.snapshot(&store).beat, None);

        let rate = NonZeroU8::new(60).unwrap();
        let period = Duration::from_millis(1_000);
        BEAT_REPORT
            .sender()
            .send(BeatReport::new(rate, period, Duration::from_millis(100)));
        BEAT_REPORT
            .sender()
            .send(BeatReport::new(rate, period, Duration::from_millis(104)));

        let status = monitor.snapshot(&store);
        assert_eq!(status.beat.map(|beat| beat.elapsed_ms), Some(104));
        assert_eq!(status.thermal, None);
    }

    #[test]
    fn test_status_json() {
        let settings = Settings {
            heating_enabled: true,
            ..Settings::default()
        };
        let thermal = ThermalReport {
            temperature_c: 31.5,
            target_temperature_c: 35.0,
            level: HeaterLevel::Medium,
            duty: HeaterLevel::Medium.duty(),
        };
        let json = DeviceStatus::new(settings, None, Some(thermal))
            .to_json()
            .unwrap();

        assert!(json.starts_with("{\"version\":\"v0.1\""));
        assert!(json.contains("\"service\":\"61535c46-202a-4859-a213-520ef987c606\""));
        assert!(json.contains("\"rate_bpm\":80"));
        assert!(json.contains("\"heating_enabled\":true"));
        assert!(json.contains("\"beat\":null"));
        assert!(json.contains("\"level\":\"Medium\""));
        assert!(json.contains("\"duty\":128"));
    }
}
