//! Mathematical utility functions for DSP.
//!
//! All functions are allocation-free and suitable for `no_std`.
//!
//! # Level Conversions
//!
//! - [`db_to_linear`] - Convert decibels to linear gain
//!
//! # Saturation
//!
//! - [`soft_clip`] - tanh saturation
//! - [`drive_compensation`] - output gain that keeps driven saturators near unity
//!
//! # Utilities
//!
//! - [`wet_dry_mix`] - Linear crossfade
//! - [`ms_to_samples`] - Time conversion
//! - [`flush_denormal`] - Zero tiny values in feedback paths

use libm::{expf, powf, tanhf};

/// Convert decibels to linear gain.
///
/// ```rust
/// use cadena_core::db_to_linear;
///
/// assert!((db_to_linear(0.0) - 1.0).abs() < 0.001);
/// assert!((db_to_linear(-6.02) - 0.5).abs() < 0.01);
/// ```
#[inline]
pub fn db_to_linear(db: f32) -> f32 {
    const FACTOR: f32 = core::f32::consts::LN_10 / 20.0;
    expf(db * FACTOR)
}

/// Soft clip using hyperbolic tangent. Output lies in (-1, 1).
#[inline]
pub fn soft_clip(x: f32) -> f32 {
    tanhf(x)
}

/// Output gain for a saturator driven by `drive` (>= 1).
///
/// Empirical curve fitted so that `drive_compensation(drive) * tanh(drive * x)`
/// stays close to unity loudness across the drive range. Equals 1.0 at
/// `drive == 1.0` and settles near 0.39 at high drive.
///
/// ```rust
/// use cadena_core::drive_compensation;
///
/// assert!((drive_compensation(1.0) - 1.0).abs() < 1e-3);
/// assert!(drive_compensation(100.0) < 0.4);
/// ```
#[inline]
pub fn drive_compensation(drive: f32) -> f32 {
    powf(drive.max(1.0), -2.642) * 0.6103 + 0.3903
}

/// Linear crossfade: `mix == 0` is fully dry, `mix == 1` fully wet.
#[inline]
pub fn wet_dry_mix(dry: f32, wet: f32, mix: f32) -> f32 {
    dry + (wet - dry) * mix
}

/// Convert milliseconds to samples.
#[inline]
pub fn ms_to_samples(ms: f32, sample_rate: f32) -> f32 {
    ms * sample_rate / 1000.0
}

/// Flush values below 1e-20 to zero.
///
/// Keeps recursive filters and feedback loops out of denormal territory
/// when the input decays to silence.
#[inline]
pub fn flush_denormal(x: f32) -> f32 {
    if x.abs() < 1e-20 { 0.0 } else { x }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_db_to_linear_known_points() {
        assert!((db_to_linear(20.0) - 10.0).abs() < 1e-3);
        assert!((db_to_linear(-20.0) - 0.1).abs() < 1e-5);
        assert!((db_to_linear(6.0) * db_to_linear(-6.0) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn test_soft_clip_bounded() {
        assert!(soft_clip(100.0) <= 1.0);
        assert!(soft_clip(-100.0) >= -1.0);
        assert_eq!(soft_clip(0.0), 0.0);
    }

    #[test]
    fn test_drive_compensation_monotonic() {
        let mut prev = drive_compensation(1.0);
        for drive in [2.0, 5.0, 10.0, 50.0, 100.0] {
            let next = drive_compensation(drive);
            assert!(next < prev);
            prev = next;
        }
    }

    #[test]
    fn test_wet_dry_mix() {
        assert_eq!(wet_dry_mix(1.0, 0.0, 0.0), 1.0);
        assert_eq!(wet_dry_mix(1.0, 0.0, 1.0), 0.0);
        assert_eq!(wet_dry_mix(1.0, 0.0, 0.5), 0.5);
    }

    #[test]
    fn test_ms_to_samples() {
        assert_eq!(ms_to_samples(10.0, 48000.0), 480.0);
    }

    #[test]
    fn test_flush_denormal() {
        assert_eq!(flush_denormal(1e-25), 0.0);
        assert_eq!(flush_denormal(0.5), 0.5);
    }
}
