//! Fractional delay line for modulated effects.
//!
//! [`InterpolatedDelay`] is a circular buffer read at a fractional distance
//! behind the write head with linear interpolation. The buffer is sized once
//! (construction or [`InterpolatedDelay::ensure_capacity`], both control
//! context); reads and writes never allocate.

#[cfg(not(feature = "std"))]
use alloc::{vec, vec::Vec};

/// Variable-length delay line with linear interpolation.
///
/// # Example
///
/// ```rust
/// use cadena_core::InterpolatedDelay;
///
/// let mut delay = InterpolatedDelay::new(16);
/// delay.write(1.0);
/// delay.write(0.0);
/// assert_eq!(delay.read(1.0), 1.0);
/// assert_eq!(delay.read(0.5), 0.5);
/// ```
#[derive(Debug, Clone)]
pub struct InterpolatedDelay {
    buffer: Vec<f32>,
    write_pos: usize,
}

impl InterpolatedDelay {
    /// Create a delay line holding `max_delay_samples` samples (at least 2).
    pub fn new(max_delay_samples: usize) -> Self {
        Self {
            buffer: vec![0.0; max_delay_samples.max(2)],
            write_pos: 0,
        }
    }

    /// Create a delay line from a sample rate and maximum delay in milliseconds.
    pub fn from_time_ms(sample_rate: f32, max_ms: f32) -> Self {
        Self::new(Self::samples_for(sample_rate, max_ms))
    }

    /// Grow the buffer so it holds `max_ms` at `sample_rate`. Clears content.
    ///
    /// Allocates only when the buffer is too small.
    pub fn ensure_capacity(&mut self, sample_rate: f32, max_ms: f32) {
        let needed = Self::samples_for(sample_rate, max_ms);
        if needed > self.buffer.len() {
            self.buffer = vec![0.0; needed];
        }
        self.clear();
    }

    fn samples_for(sample_rate: f32, max_ms: f32) -> usize {
        ((sample_rate * max_ms / 1000.0) as usize).saturating_add(2)
    }

    /// Read `delay_samples` behind the most recently written sample.
    ///
    /// The delay is clamped to the buffer capacity.
    #[inline]
    pub fn read(&self, delay_samples: f32) -> f32 {
        let len = self.buffer.len();
        let delay = delay_samples.clamp(0.0, (len - 2) as f32);

        let delay_int = delay as usize;
        let frac = delay - delay_int as f32;

        // Sample written `delay_int` writes ago
        let read_pos = (self.write_pos + len - delay_int - 1) % len;
        let older_pos = (read_pos + len - 1) % len;

        let a = self.buffer[read_pos];
        let b = self.buffer[older_pos];
        a + (b - a) * frac
    }

    /// Write a sample and advance the write head.
    #[inline]
    pub fn write(&mut self, sample: f32) {
        self.buffer[self.write_pos] = sample;
        self.write_pos = (self.write_pos + 1) % self.buffer.len();
    }

    /// Zero the buffer.
    pub fn clear(&mut self) {
        self.buffer.fill(0.0);
        self.write_pos = 0;
    }

    /// Buffer length in samples.
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }
}
