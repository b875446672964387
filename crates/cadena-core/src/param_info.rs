//! Parameter metadata for discoverable stage parameters.
//!
//! Each host-visible parameter is described by a [`ParamDescriptor`]: a
//! stable string id used for persistence, a display name, a unit and the
//! plain-value range. Descriptors are `const`-constructible so the chain's
//! parameter layout can live in statics.
//!
//! # Example
//!
//! ```rust
//! use cadena_core::{ParamDescriptor, ParamUnit};
//!
//! const CUTOFF: ParamDescriptor =
//!     ParamDescriptor::new("cutoff_hz", "Cutoff", ParamUnit::Hertz, 20.0, 2000.0, 2000.0);
//!
//! assert_eq!(CUTOFF.clamp(5000.0), 2000.0);
//! assert_eq!(CUTOFF.normalize(20.0), 0.0);
//! ```

/// Range and display metadata for one parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParamDescriptor {
    /// Stable identifier used by persisted state and the command line.
    ///
    /// Convention: `"stage_param"` (e.g., `"phaser_rate_hz"`). Once
    /// published an id must never change.
    pub id: &'static str,

    /// Full parameter name for display.
    pub name: &'static str,

    /// Unit type for formatting the value.
    pub unit: ParamUnit,

    /// Minimum allowed value.
    pub min: f32,

    /// Maximum allowed value.
    pub max: f32,

    /// Value on construction and after a reset to defaults.
    pub default: f32,

    /// Recommended step increment (1.0 for choices and toggles).
    pub step: f32,
}

impl ParamDescriptor {
    /// Continuous parameter with a 0.01 step.
    pub const fn new(
        id: &'static str,
        name: &'static str,
        unit: ParamUnit,
        min: f32,
        max: f32,
        default: f32,
    ) -> Self {
        Self {
            id,
            name,
            unit,
            min,
            max,
            default,
            step: 0.01,
        }
    }

    /// Stepped parameter selecting one of `count` choices.
    pub const fn choice(
        id: &'static str,
        name: &'static str,
        count: usize,
        default: usize,
    ) -> Self {
        Self {
            id,
            name,
            unit: ParamUnit::None,
            min: 0.0,
            max: (count - 1) as f32,
            default: default as f32,
            step: 1.0,
        }
    }

    /// On/off parameter stored as 0.0 / 1.0.
    pub const fn toggle(id: &'static str, name: &'static str, default: bool) -> Self {
        Self {
            id,
            name,
            unit: ParamUnit::None,
            min: 0.0,
            max: 1.0,
            default: if default { 1.0 } else { 0.0 },
            step: 1.0,
        }
    }

    /// Clamp a plain value to `[min, max]`. NaN maps to the default.
    #[inline]
    pub fn clamp(&self, value: f32) -> f32 {
        if value.is_nan() {
            self.default
        } else if value < self.min {
            self.min
        } else if value > self.max {
            self.max
        } else {
            value
        }
    }

    /// Map a plain value to `0.0..=1.0` linearly.
    #[inline]
    pub fn normalize(&self, value: f32) -> f32 {
        let range = self.max - self.min;
        if range == 0.0 {
            return 0.0;
        }
        (self.clamp(value) - self.min) / range
    }

    /// Inverse of [`normalize`](Self::normalize).
    #[inline]
    pub fn denormalize(&self, normalized: f32) -> f32 {
        self.min + normalized.clamp(0.0, 1.0) * (self.max - self.min)
    }
}

/// Unit type for parameter display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParamUnit {
    /// Decibels (dB)
    Decibels,
    /// Hertz (Hz)
    Hertz,
    /// Milliseconds (ms)
    Milliseconds,
    /// Dimensionless fraction, usually 0..1
    Ratio,
    /// No unit
    None,
}

impl ParamUnit {
    /// Unit suffix for display.
    ///
    /// ```rust
    /// use cadena_core::ParamUnit;
    ///
    /// assert_eq!(ParamUnit::Hertz.suffix(), " Hz");
    /// assert_eq!(ParamUnit::None.suffix(), "");
    /// ```
    pub const fn suffix(&self) -> &'static str {
        match self {
            ParamUnit::Decibels => " dB",
            ParamUnit::Hertz => " Hz",
            ParamUnit::Milliseconds => " ms",
            ParamUnit::Ratio | ParamUnit::None => "",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DEPTH: ParamDescriptor =
        ParamDescriptor::new("depth", "Depth", ParamUnit::Ratio, 0.01, 1.0, 0.05);

    #[test]
    fn test_clamp() {
        assert_eq!(DEPTH.clamp(0.5), 0.5);
        assert_eq!(DEPTH.clamp(-3.0), 0.01);
        assert_eq!(DEPTH.clamp(3.0), 1.0);
        assert_eq!(DEPTH.clamp(f32::NAN), 0.05);
    }

    #[test]
    fn test_normalize_roundtrip() {
        let desc = ParamDescriptor::new("f", "F", ParamUnit::Hertz, 20.0, 2020.0, 1000.0);
        assert_eq!(desc.normalize(1020.0), 0.5);
        assert_eq!(desc.denormalize(0.5), 1020.0);
        assert_eq!(desc.denormalize(2.0), 2020.0);
    }

    #[test]
    fn test_choice_descriptor() {
        let mode = ParamDescriptor::choice("mode", "Mode", 6, 0);
        assert_eq!(mode.max, 5.0);
        assert_eq!(mode.step, 1.0);
        assert_eq!(mode.default, 0.0);
    }

    #[test]
    fn test_toggle_descriptor() {
        let bypass = ParamDescriptor::toggle("bypass", "Bypass", false);
        assert_eq!(bypass.default, 0.0);
        assert_eq!(bypass.clamp(7.0), 1.0);
    }
}
