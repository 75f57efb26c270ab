use bevy::prelude::*;
use rand::Rng;
use serde::Deserialize;
use std::{fs, path::Path};

use crate::core::angle::POINTER_UP;

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ValueRange<T> {
    pub min: T,
    pub max: T,
}
impl<T: Default> Default for ValueRange<T> {
    fn default() -> Self {
        Self {
            min: Default::default(),
            max: Default::default(),
        }
    }
}
impl ValueRange<f64> {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }
    /// Uniform in `[min, max)`; degenerate or inverted ranges yield `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f64 {
        if self.max > self.min {
            self.min + rng.gen::<f64>() * (self.max - self.min)
        } else {
            self.min
        }
    }
}
impl ValueRange<u32> {
    /// Uniform in `[min, max]` (inclusive); inverted ranges yield `min`.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> u32 {
        if self.max > self.min {
            rng.gen_range(self.min..=self.max)
        } else {
            self.min
        }
    }
}

/// Deceleration phase tuning.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SpinConfig {
    /// Whole extra turns added on top of the landing angle (inclusive).
    pub extra_turns: ValueRange<u32>,
    pub duration_ms: ValueRange<f64>,
    /// Fraction of a segment kept clear on each side of the landing point.
    pub landing_margin: f64,
}
impl Default for SpinConfig {
    fn default() -> Self {
        Self {
            extra_turns: ValueRange { min: 9, max: 14 },
            duration_ms: ValueRange::new(5200.0, 6400.0),
            landing_margin: 0.30,
        }
    }
}

/// Damped wobble after the wheel reaches its end angle.
#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct SettleConfig {
    pub duration_ms: ValueRange<f64>,
    /// Fraction of the maximum safe amplitude actually used.
    pub amplitude_fraction: ValueRange<f64>,
    /// Exponential decay rate `k` (1/s).
    pub damping: ValueRange<f64>,
    /// Oscillation `ω` (rad/s).
    pub angular_frequency: ValueRange<f64>,
    /// Fraction of a segment subtracted from the amplitude cap.
    pub boundary_pad: f64,
}
impl Default for SettleConfig {
    fn default() -> Self {
        Self {
            duration_ms: ValueRange::new(520.0, 700.0),
            amplitude_fraction: ValueRange::new(0.55, 0.95),
            damping: ValueRange::new(7.0, 10.0),
            angular_frequency: ValueRange::new(22.0, 28.0),
            boundary_pad: 0.03,
        }
    }
}

#[derive(Debug, Deserialize, Resource, Clone, PartialEq)]
#[serde(default)]
pub struct WheelConfig {
    /// Pointer position in the wheel frame (radians). Fixed for the session.
    pub pointer_angle: f64,
    /// Delete the winning segment after the result is acknowledged.
    pub auto_remove: bool,
    /// JSON file used by the binary's segment store.
    pub store_path: String,
    /// Frame rate of the headless driver.
    pub frame_hz: f64,
    /// Seconds between debug rotation log lines (`debug` feature).
    pub debug_log_interval: f32,
    pub spin: SpinConfig,
    pub settle: SettleConfig,
}
impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            pointer_angle: POINTER_UP,
            auto_remove: false,
            store_path: "wheel.json".into(),
            frame_hz: 60.0,
            debug_log_interval: 0.5,
            spin: Default::default(),
            settle: Default::default(),
        }
    }
}

impl WheelConfig {
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, String> {
        let data = fs::read_to_string(&path).map_err(|e| format!("read config: {e}"))?;
        ron::from_str(&data).map_err(|e| format!("parse RON: {e}"))
    }
    pub fn load_or_default(path: impl AsRef<Path>) -> (Self, Option<String>) {
        match Self::load_from_file(&path) {
            Ok(cfg) => (cfg, None),
            Err(e) => (Self::default(), Some(e)),
        }
    }
    /// Loads every readable file in order, deep-merging later maps over earlier
    /// ones. Returns the config, the files actually used, and any errors.
    pub fn load_layered<P, I>(paths: I) -> (Self, Vec<String>, Vec<String>)
    where
        P: AsRef<Path>,
        I: IntoIterator<Item = P>,
    {
        use ron::value::Value;
        let mut merged: Option<Value> = None;
        let mut used = Vec::new();
        let mut errors = Vec::new();
        fn merge_value(base: &mut Value, overlay: Value) {
            match (base, overlay) {
                (Value::Map(bm), Value::Map(om)) => {
                    for (k, v) in om.into_iter() {
                        let mut incoming = Some(v);
                        for (ek, ev) in bm.iter_mut() {
                            if *ek == k {
                                if let Some(val) = incoming.take() {
                                    merge_value(ev, val);
                                }
                                break;
                            }
                        }
                        if let Some(val) = incoming {
                            bm.insert(k, val);
                        }
                    }
                }
                (b, o) => *b = o,
            }
        }
        for p in paths {
            let path_ref = p.as_ref();
            match fs::read_to_string(path_ref) {
                Ok(txt) => match ron::from_str::<Value>(&txt) {
                    Ok(val) => {
                        if let Some(cur) = &mut merged {
                            merge_value(cur, val);
                        } else {
                            merged = Some(val);
                        }
                        used.push(path_ref.as_os_str().to_string_lossy().to_string());
                    }
                    Err(e) => errors.push(format!("{}: parse error: {e}", path_ref.display())),
                },
                Err(e) => errors.push(format!("{}: read error: {e}", path_ref.display())),
            }
        }
        match merged {
            Some(val) => match val.into_rust::<WheelConfig>() {
                Ok(cfg) => (cfg, used, errors),
                Err(e) => {
                    errors.push(format!(
                        "failed to deserialize merged config; using defaults: {e}"
                    ));
                    (WheelConfig::default(), used, errors)
                }
            },
            None => (WheelConfig::default(), used, errors),
        }
    }
    pub fn validate(&self) -> Vec<String> {
        let mut w = Vec::new();
        if !self.pointer_angle.is_finite() {
            w.push(format!("pointer_angle {} is not finite", self.pointer_angle));
        }
        if self.frame_hz <= 0.0 {
            w.push(format!("frame_hz {} must be > 0", self.frame_hz));
        } else if self.frame_hz < 20.0 {
            w.push(format!(
                "frame_hz {} very low; the spin will look choppy",
                self.frame_hz
            ));
        }
        if self.store_path.trim().is_empty() {
            w.push("store_path is empty".into());
        }
        if self.debug_log_interval <= 0.0 {
            w.push("debug_log_interval must be > 0".into());
        }
        fn check_range(w: &mut Vec<String>, label: &str, r: &ValueRange<f64>) {
            if r.min > r.max {
                w.push(format!(
                    "{label} min ({}) greater than max ({})",
                    r.min, r.max
                ));
            }
            if (r.max - r.min).abs() < f64::EPSILON {
                w.push(format!("{label} min == max ({}) -> zero variation", r.min));
            }
        }
        let spin = &self.spin;
        if spin.extra_turns.min > spin.extra_turns.max {
            w.push(format!(
                "spin.extra_turns min ({}) greater than max ({})",
                spin.extra_turns.min, spin.extra_turns.max
            ));
        }
        if spin.extra_turns.min == 0 {
            w.push("spin.extra_turns.min is 0; short spins may barely move".into());
        }
        check_range(&mut w, "spin.duration_ms", &spin.duration_ms);
        if spin.duration_ms.min <= 0.0 {
            w.push("spin.duration_ms.min must be > 0".into());
        }
        if !(0.0..0.5).contains(&spin.landing_margin) {
            w.push(format!(
                "spin.landing_margin {} outside 0..0.5 (landing arc would be empty)",
                spin.landing_margin
            ));
        } else if spin.landing_margin <= self.settle.boundary_pad {
            w.push(format!(
                "spin.landing_margin {} not above settle.boundary_pad {}; settle wobble disabled",
                spin.landing_margin, self.settle.boundary_pad
            ));
        }
        let settle = &self.settle;
        check_range(&mut w, "settle.duration_ms", &settle.duration_ms);
        check_range(&mut w, "settle.amplitude_fraction", &settle.amplitude_fraction);
        if settle.amplitude_fraction.min < 0.0 || settle.amplitude_fraction.max > 1.0 {
            w.push(format!(
                "settle.amplitude_fraction {}..{} outside 0..1 (wobble could cross a boundary)",
                settle.amplitude_fraction.min, settle.amplitude_fraction.max
            ));
        }
        check_range(&mut w, "settle.damping", &settle.damping);
        if settle.damping.min <= 0.0 {
            w.push("settle.damping.min must be > 0 (wobble never dies out)".into());
        }
        check_range(&mut w, "settle.angular_frequency", &settle.angular_frequency);
        if !(0.0..0.5).contains(&settle.boundary_pad) {
            w.push(format!(
                "settle.boundary_pad {} outside 0..0.5",
                settle.boundary_pad
            ));
        }
        w
    }
}
