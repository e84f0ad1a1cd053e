//! Shared configuration store.
//!
//! One process-wide [`ConfigStore`] holds the four control parameters. The
//! command context writes it, both controllers read a [`Settings`] snapshot
//! once per tick. Every field is its own atomic, so a reader never sees a torn
//! value; the four fields are not updated together.

use core::num::NonZeroU8;
use core::sync::atomic::Ordering;

use bitflags::bitflags;
use portable_atomic::{AtomicBool, AtomicF32, AtomicU8};
use serde::Serialize;

pub const DEFAULT_RATE_BPM: NonZeroU8 = match NonZeroU8::new(80) {
    Some(rate) => rate,
    None => panic!("default rate must be non-zero"),
};
pub const DEFAULT_TARGET_TEMPERATURE_C: f32 = 35.0;

/// Thermal controller tick period.
pub const THERMAL_PERIOD_MILLIS: u64 = 500;

bitflags! {
    /// Actuator enable bits as written by the command channel.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct EnableMask: u8 {
        const VIBRATION = 1 << 0;
        const HEATING = 1 << 1;
    }
}

/// Linear conversion from a raw sensor sample to degrees Celsius.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub scale: f32,
    pub offset: f32,
}

impl Calibration {
    /// 10 mV/°C sensor on a 12-bit, 3.3 V ADC.
    pub const DEFAULT: Self = Self {
        scale: 330.0 / 4096.0,
        offset: 0.0,
    };

    pub fn to_celsius(&self, raw: u16) -> f32 {
        raw as f32 * self.scale + self.offset
    }

    /// Inverse of [`to_celsius`](Self::to_celsius), saturating at the sample range.
    pub fn to_raw(&self, celsius: f32) -> u16 {
        let raw = (celsius - self.offset) / self.scale;
        if raw <= 0.0 {
            0
        } else if raw >= u16::MAX as f32 {
            u16::MAX
        } else {
            raw as u16
        }
    }
}

impl Default for Calibration {
    fn default() -> Self {
        Self::DEFAULT
    }
}

/// Point-in-time copy of the configuration, taken once per tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Settings {
    pub rate_bpm: NonZeroU8,
    pub target_temperature_c: f32,
    pub vibration_enabled: bool,
    pub heating_enabled: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            rate_bpm: DEFAULT_RATE_BPM,
            target_temperature_c: DEFAULT_TARGET_TEMPERATURE_C,
            vibration_enabled: false,
            heating_enabled: false,
        }
    }
}

pub struct ConfigStore {
    rate_bpm: AtomicU8,
    target_temperature_c: AtomicF32,
    vibration_enabled: AtomicBool,
    heating_enabled: AtomicBool,
}

pub static CONFIG: ConfigStore = ConfigStore::new();

impl ConfigStore {
    pub const fn new() -> Self {
        Self {
            rate_bpm: AtomicU8::new(DEFAULT_RATE_BPM.get()),
            target_temperature_c: AtomicF32::new(DEFAULT_TARGET_TEMPERATURE_C),
            vibration_enabled: AtomicBool::new(false),
            heating_enabled: AtomicBool::new(false),
        }
    }

    pub fn get(&self) -> Settings {
        Settings {
            rate_bpm: self.rate(),
            target_temperature_c: self.target_temperature_c.load(Ordering::Acquire),
            vibration_enabled: self.vibration_enabled.load(Ordering::Acquire),
            heating_enabled: self.heating_enabled.load(Ordering::Acquire),
        }
    }

    pub fn rate(&self) -> NonZeroU8 {
        // set_rate never stores zero
        NonZeroU8::new(self.rate_bpm.load(Ordering::Acquire)).unwrap_or(DEFAULT_RATE_BPM)
    }

    /// Stores `bpm` unless it is zero. Returns whether the write was applied.
    pub fn set_rate(&self, bpm: u8) -> bool {
        match NonZeroU8::new(bpm) {
            Some(bpm) => {
                self.rate_bpm.store(bpm.get(), Ordering::Release);
                true
            }
            None => false,
        }
    }

    pub fn set_temperature(&self, celsius: f32) {
        self.target_temperature_c.store(celsius, Ordering::Release);
    }

    pub fn set_vibration_enabled(&self, enabled: bool) {
        self.vibration_enabled.store(enabled, Ordering::Release);
    }

    pub fn set_heating_enabled(&self, enabled: bool) {
        self.heating_enabled.store(enabled, Ordering::Release);
    }

    /// Sets both enable flags from `mask`; each flag is stored separately.
    pub fn set_enable_mask(&self, mask: EnableMask) {
        self.set_vibration_enabled(mask.contains(EnableMask::VIBRATION));
        self.set_heating_enabled(mask.contains(EnableMask::HEATING));
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let store = ConfigStore::new();
        let settings = store.get();
        assert_eq!(settings.rate_bpm.get(), 80);
        assert_eq!(settings.target_temperature_c, 35.0);
        assert!(!settings.vibration_enabled);
        assert!(!settings.heating_enabled);
        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_zero_rate_is_rejected() {
        let store = ConfigStore::new();
        assert!(store.set_rate(120));
        assert!(!store.set_rate(0));
        assert_eq!(store.rate().get(), 120);
    }

    #[test]
    fn test_setters_are_independent() {
        let store = ConfigStore::new();
        store.set_heating_enabled(true);
        store.set_temperature(38.5);

        let settings = store.get();
        assert!(settings.heating_enabled);
        assert!(!settings.vibration_enabled);
        assert_eq!(settings.target_temperature_c, 38.5);
        assert_eq!(settings.rate_bpm, DEFAULT_RATE_BPM);
    }

    #[test]
    fn test_enable_mask() {
        let store = ConfigStore::new();
        store.set_enable_mask(EnableMask::all());
        assert!(store.get().vibration_enabled && store.get().heating_enabled);
        store.set_enable_mask(EnableMask::HEATING);
        assert!(!store.get().vibration_enabled && store.get().heating_enabled);
        store.set_enable_mask(EnableMask::empty());
        assert!(!store.get().vibration_enabled && !store.get().heating_enabled);
    }

    #[test]
    fn test_calibration_conversion() {
        let cal = Calibration::DEFAULT;
        assert_eq!(cal.to_celsius(0), 0.0);
        assert!((cal.to_celsius(4096) - 330.0).abs() < 1e-3);
        // 35 °C sits at raw 434.4
        assert_eq!(cal.to_raw(35.0), 434);
        assert_eq!(cal.to_raw(-5.0), 0);
    }

    #[test]
    fn test_concurrent_writes_are_never_torn() {
        use std::sync::Arc;
        use std::thread;

        let store = Arc::new(ConfigStore::new());
        let writer = {
            let store = store.clone();
            thread::spawn(move || {
                for i in 0..10_000u32 {
                    store.set_rate(if i % 2 == 0 { 1 } else { 255 });
                    store.set_temperature(if i % 2 == 0 { 20.0 } else { 40.0 });
                }
            })
        };

        for _ in 0..10_000 {
            let settings = store.get();
            assert!(matches!(settings.rate_bpm.get(), 1 | 80 | 255));
            assert!([20.0, 35.0, 40.0].contains(&settings.target_temperature_c));
        }
        writer.join().unwrap();
    }
}
