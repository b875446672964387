//! Property-based tests for cadena-core DSP primitives.
//!
//! Covers filter stability, parameter convergence and delay line reads
//! with proptest-generated inputs.

use cadena_core::{
    Biquad, FirstOrderAllpass, InterpolatedDelay, SmoothedParam, allpass_coefficients,
    bandpass_coefficients, db_to_linear, notch_coefficients, peaking_eq_coefficients,
};
use proptest::prelude::*;

/// Biquad coefficient generators indexed 0..4 (BP, Notch, Allpass, Peaking).
fn configure_biquad(biquad: &mut Biquad, variant: usize, freq: f32, q: f32, gain_db: f32) {
    let sr = 48000.0;
    let coefficients = match variant % 4 {
        0 => bandpass_coefficients(freq, q, sr),
        1 => notch_coefficients(freq, q, sr),
        2 => allpass_coefficients(freq, q, sr),
        3 => peaking_eq_coefficients(freq, q, gain_db, sr),
        _ => unreachable!(),
    };
    biquad.set_coefficients(coefficients);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    /// For any cutoff (20-20000 Hz), Q (0.1-10.0) and gain (-24..24 dB), the
    /// RBJ biquads the parametric stage selects between stay finite.
    #[test]
    fn biquad_stability(
        freq in 20.0f32..20000.0f32,
        q in 0.1f32..10.0f32,
        gain_db in -24.0f32..24.0f32,
        variant in 0usize..4,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut biquad = Biquad::new();
        configure_biquad(&mut biquad, variant, freq, q, gain_db);

        // 32 random samples followed by a long tail of silence
        for sample in input.iter().copied().chain(std::iter::repeat_n(0.0, 4096)) {
            let out = biquad.process(sample);
            prop_assert!(
                out.is_finite() && out.abs() < 1.0e3,
                "Biquad variant {} (freq={}, q={}, gain={}) produced {} for input {}",
                variant % 4, freq, q, gain_db, out, sample
            );
        }
    }

    /// A first-order allpass section stays within its impulse-response bound:
    /// `|a| + (1 + |a|) <= 3` for the clamped coefficient range.
    #[test]
    fn allpass_stability(
        freq in 1.0f32..30000.0f32,
        sample_rate in 8000.0f32..192000.0f32,
        input in prop::array::uniform32(-1.0f32..=1.0f32),
    ) {
        let mut section = FirstOrderAllpass::new();
        section.set_frequency(freq, sample_rate);

        for &sample in &input {
            let out = section.process(sample);
            prop_assert!(out.is_finite() && out.abs() <= 3.0 + 1e-3, "allpass produced {}", out);
        }
    }

    /// SmoothedParam converges toward its target value.
    ///
    /// The one-pole step `current += coeff * (target - current)` stalls once it
    /// rounds to zero in f32, so convergence is checked against that floor:
    /// roughly `ULP(target) / coeff` with coeff ≈ 0.00208 for 10 ms at 48 kHz.
    #[test]
    fn smoothed_param_convergence(
        initial in -100.0f32..100.0f32,
        target in -100.0f32..100.0f32,
    ) {
        let mut param = SmoothedParam::with_config(initial, 48000.0, 10.0);
        param.set_target(target);

        for _ in 0..10000 {
            param.advance();
        }

        let precision_floor = target.abs() * f32::EPSILON / 0.002 + 1e-4;
        let diff = (param.get() - target).abs();
        prop_assert!(
            diff < precision_floor,
            "SmoothedParam did not converge: initial={}, target={}, got={}, diff={}",
            initial, target, param.get(), diff
        );
    }

    /// Write N random samples, read them back at integer delays: no
    /// interpolation happens, so they must match exactly.
    #[test]
    fn delay_line_integrity(
        samples in prop::collection::vec(-1.0f32..=1.0f32, 1..=64),
    ) {
        let n = samples.len();
        let mut delay = InterpolatedDelay::new(n + 1);

        for &s in &samples {
            delay.write(s);
        }

        // delay=0 is the last written sample
        for (i, &expected) in samples.iter().rev().enumerate() {
            let got = delay.read(i as f32);
            prop_assert!(
                (got - expected).abs() < 1e-6,
                "Delay mismatch at delay={}: expected {}, got {}",
                i, expected, got
            );
        }
    }

    /// Any requested delay, including negative, fractional and far beyond
    /// capacity, reads a finite value bounded by the written samples.
    #[test]
    fn delay_read_any_delay(
        capacity in 2usize..512,
        samples in prop::collection::vec(-1.0f32..=1.0f32, 0..1024),
        delay_samples in -1.0e6f32..1.0e6f32,
    ) {
        let mut delay = InterpolatedDelay::new(capacity);
        for &s in &samples {
            delay.write(s);
        }

        let got = delay.read(delay_samples);
        prop_assert!(got.is_finite() && got.abs() <= 1.0, "read({}) = {}", delay_samples, got);
    }

    /// dB to linear conversion is strictly increasing and positive.
    #[test]
    fn db_to_linear_monotonic(a in -60.0f32..60.0f32, step in 0.01f32..10.0f32) {
        let low = db_to_linear(a);
        let high = db_to_linear(a + step);
        prop_assert!(low > 0.0);
        prop_assert!(high > low, "db_to_linear({}) = {} not above {}", a + step, high, low);
    }
}
