//! Biquad (bi-quadratic) filter structure.
//!
//! Provides a generic second-order IIR filter plus the RBJ Audio EQ Cookbook
//! coefficient formulas the parametric stage selects between.

use core::f32::consts::PI;
use libm::{cosf, sinf};

use crate::math::db_to_linear;

/// Un-normalized `(b0, b1, b2, a0, a1, a2)` coefficients.
pub type BiquadCoefficients = (f32, f32, f32, f32, f32, f32);

/// Direct Form I biquad.
///
/// ```text
/// y[n] = b0*x[n] + b1*x[n-1] + b2*x[n-2]
///                - a1*y[n-1] - a2*y[n-2]
/// ```
#[derive(Debug, Clone)]
pub struct Biquad {
    b0: f32,
    b1: f32,
    b2: f32,
    a1: f32,
    a2: f32,

    x1: f32,
    x2: f32,
    y1: f32,
    y2: f32,
}

impl Biquad {
    /// Creates a passthrough biquad.
    pub fn new() -> Self {
        Self {
            b0: 1.0,
            b1: 0.0,
            b2: 0.0,
            a1: 0.0,
            a2: 0.0,
            x1: 0.0,
            x2: 0.0,
            y1: 0.0,
            y2: 0.0,
        }
    }

    /// Sets coefficients, normalizing by `a0`.
    pub fn set_coefficients(&mut self, coefficients: BiquadCoefficients) {
        let (b0, b1, b2, a0, a1, a2) = coefficients;
        let a0_inv = 1.0 / a0;
        self.b0 = b0 * a0_inv;
        self.b1 = b1 * a0_inv;
        self.b2 = b2 * a0_inv;
        self.a1 = a1 * a0_inv;
        self.a2 = a2 * a0_inv;
    }

    /// Processes a single sample.
    #[inline]
    pub fn process(&mut self, input: f32) -> f32 {
        let output = self.b0 * input + self.b1 * self.x1 + self.b2 * self.x2
            - self.a1 * self.y1
            - self.a2 * self.y2;

        self.x2 = self.x1;
        self.x1 = input;
        self.y2 = self.y1;
        self.y1 = crate::flush_denormal(output);

        output
    }

    /// Clears the filter history without touching coefficients.
    pub fn clear(&mut self) {
        self.x1 = 0.0;
        self.x2 = 0.0;
        self.y1 = 0.0;
        self.y2 = 0.0;
    }
}

impl Default for Biquad {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared RBJ intermediates: `(cos(w0), alpha)`.
#[inline]
fn omega_terms(frequency: f32, q: f32, sample_rate: f32) -> (f32, f32) {
    let omega = 2.0 * PI * frequency / sample_rate;
    (cosf(omega), sinf(omega) / (2.0 * q))
}

/// Band-pass with constant 0 dB peak gain.
pub fn bandpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (
        alpha,
        0.0,
        -alpha,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Notch (band-reject).
pub fn notch_coefficients(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (
        1.0,
        -2.0 * cos_omega,
        1.0,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}

/// Peaking EQ boosting or cutting `gain_db` around `frequency`.
pub fn peaking_eq_coefficients(
    frequency: f32,
    q: f32,
    gain_db: f32,
    sample_rate: f32,
) -> BiquadCoefficients {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    // Amplitude term of the cookbook formula is the square root of the linear gain
    let a = db_to_linear(gain_db * 0.5);
    (
        1.0 + alpha * a,
        -2.0 * cos_omega,
        1.0 - alpha * a,
        1.0 + alpha / a,
        -2.0 * cos_omega,
        1.0 - alpha / a,
    )
}

/// Second-order all-pass (flat magnitude, phase turns through `frequency`).
pub fn allpass_coefficients(frequency: f32, q: f32, sample_rate: f32) -> BiquadCoefficients {
    let (cos_omega, alpha) = omega_terms(frequency, q, sample_rate);
    (
        1.0 - alpha,
        -2.0 * cos_omega,
        1.0 + alpha,
        1.0 + alpha,
        -2.0 * cos_omega,
        1.0 - alpha,
    )
}
