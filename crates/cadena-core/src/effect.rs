//! The processing-stage capability and its preparation spec.
//!
//! Every stage in a cadena chain implements [`Effect`]. The chain drives its
//! stages exclusively through `&mut dyn Effect`, so the trait stays
//! object-safe.
//!
//! ## Design Decisions
//!
//! - **Mono processing**: one stage instance per channel. Channels never
//!   share a stage, so stage state stays independent per channel.
//!
//! - **Bypass is a mode, not an absence**: [`Effect::process`] receives the
//!   bypass flag. A bypassed stage keeps running its kernel so filter and
//!   delay state stay warm, but leaves the buffer untouched. Toggling bypass
//!   therefore never produces a cold-start transient.
//!
//! - **No allocations**: `process`, `process_sample` and `reset` are called
//!   from the audio thread. Only `prepare` may allocate.

/// Processing context handed to [`Effect::prepare`].
///
/// Mirrors what a plugin host announces before playback starts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSpec {
    /// Sample rate in Hz.
    pub sample_rate: f32,
    /// Largest block the stage will ever be asked to process.
    pub max_block_size: usize,
    /// Channel count of the instance (always 1 for per-channel stages).
    pub channels: usize,
}

impl ProcessSpec {
    /// Create a spec for a single-channel stage.
    pub const fn mono(sample_rate: f32, max_block_size: usize) -> Self {
        Self {
            sample_rate,
            max_block_size,
            channels: 1,
        }
    }
}

impl Default for ProcessSpec {
    fn default() -> Self {
        Self::mono(48000.0, 512)
    }
}

/// Core trait for chain stages.
///
/// # Example
///
/// ```rust
/// use cadena_core::{Effect, ProcessSpec};
///
/// struct Gain {
///     gain: f32,
/// }
///
/// impl Effect for Gain {
///     fn prepare(&mut self, _spec: &ProcessSpec) {}
///
///     fn reset(&mut self) {}
///
///     fn process_sample(&mut self, input: f32) -> f32 {
///         input * self.gain
///     }
/// }
///
/// let mut gain = Gain { gain: 0.5 };
/// let mut block = [1.0_f32; 4];
///
/// gain.process(&mut block, true);
/// assert_eq!(block, [1.0; 4]);
///
/// gain.process(&mut block, false);
/// assert_eq!(block, [0.5; 4]);
/// ```
pub trait Effect {
    /// Configure the stage for a sample rate and block size.
    ///
    /// Called from the control context before the first block and whenever
    /// the host changes its configuration. May allocate.
    fn prepare(&mut self, spec: &ProcessSpec);

    /// Clear internal state (delay lines, filter history, LFO phase)
    /// without changing settings.
    fn reset(&mut self);

    /// Process a single sample and advance internal state by one sample.
    fn process_sample(&mut self, input: f32) -> f32;

    /// Process a block in place.
    ///
    /// When `bypassed` is true the kernel still runs for every sample, so
    /// internal state evolves exactly as if the stage were active, but the
    /// buffer is left unchanged.
    fn process(&mut self, block: &mut [f32], bypassed: bool) {
        if bypassed {
            for &sample in block.iter() {
                let _ = self.process_sample(sample);
            }
        } else {
            for sample in block.iter_mut() {
                *sample = self.process_sample(*sample);
            }
        }
    }

    /// Processing latency in samples. Default returns 0.
    fn latency_samples(&self) -> usize {
        0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Accumulator {
        sum: f32,
    }

    impl Effect for Accumulator {
        fn prepare(&mut self, _spec: &ProcessSpec) {}

        fn reset(&mut self) {
            self.sum = 0.0;
        }

        fn process_sample(&mut self, input: f32) -> f32 {
            self.sum += input;
            self.sum
        }
    }

    #[test]
    fn test_process_active_replaces_samples() {
        let mut acc = Accumulator { sum: 0.0 };
        let mut block = [1.0, 1.0, 1.0];
        acc.process(&mut block, false);
        assert_eq!(block, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn test_bypassed_block_still_advances_state() {
        let mut acc = Accumulator { sum: 0.0 };
        let mut block = [1.0, 1.0, 1.0];
        acc.process(&mut block, true);
        assert_eq!(block, [1.0, 1.0, 1.0]);
        assert_eq!(acc.sum, 3.0);

        acc.process(&mut block, false);
        assert_eq!(block, [4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_object_safe() {
        let mut acc = Accumulator { sum: 0.0 };
        let stage: &mut dyn Effect = &mut acc;
        stage.prepare(&ProcessSpec::default());
        assert_eq!(stage.process_sample(2.0), 2.0);
        stage.reset();
        assert_eq!(stage.latency_samples(), 0);
        assert_eq!(acc.sum, 0.0);
    }

    #[test]
    fn test_default_spec_is_mono() {
        let spec = ProcessSpec::default();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 48000.0);
    }
}
