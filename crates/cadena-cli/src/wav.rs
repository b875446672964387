//! WAV file reading and writing, one buffer per channel.

use std::path::Path;

use hound::{SampleFormat, WavReader, WavWriter};

/// WAV file specification.
#[derive(Debug, Clone, Copy)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 is written as float).
    pub bits_per_sample: u16,
}

impl From<hound::WavSpec> for WavSpec {
    fn from(spec: hound::WavSpec) -> Self {
        Self {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
        }
    }
}

impl From<WavSpec> for hound::WavSpec {
    fn from(spec: WavSpec) -> Self {
        hound::WavSpec {
            channels: spec.channels,
            sample_rate: spec.sample_rate,
            bits_per_sample: spec.bits_per_sample,
            sample_format: if spec.bits_per_sample == 32 {
                SampleFormat::Float
            } else {
                SampleFormat::Int
            },
        }
    }
}

/// Read a WAV file into planar f32 buffers, one per channel.
pub fn read_wav<P: AsRef<Path>>(path: P) -> anyhow::Result<(Vec<Vec<f32>>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let interleaved: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / max_val))
                .collect::<Result<Vec<_>, _>>()?
        }
    };

    let frames = interleaved.len() / channels;
    let mut planar: Vec<Vec<f32>> = (0..channels).map(|_| Vec::with_capacity(frames)).collect();
    for frame in interleaved.chunks_exact(channels) {
        for (buffer, &sample) in planar.iter_mut().zip(frame) {
            buffer.push(sample);
        }
    }
    Ok((planar, spec))
}

/// Write planar buffers as an interleaved WAV file.
///
/// All buffers must have the same length; `spec.channels` is taken from
/// the number of buffers.
pub fn write_wav<P: AsRef<Path>>(
    path: P,
    channels: &[Vec<f32>],
    spec: WavSpec,
) -> anyhow::Result<()> {
    let frames = channels.first().map_or(0, Vec::len);
    anyhow::ensure!(
        channels.iter().all(|c| c.len() == frames),
        "channel buffers differ in length"
    );

    let spec = WavSpec {
        channels: u16::try_from(channels.len())?,
        ..spec
    };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
    for frame in 0..frames {
        for buffer in channels {
            let sample = buffer[frame];
            if spec.bits_per_sample == 32 {
                writer.write_sample(sample)?;
            } else {
                let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
                writer.write_sample(int_sample)?;
            }
        }
    }

    writer.finalize()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn planar_roundtrip_float() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("stereo.wav");
        let left: Vec<f32> = (0..100).map(|i| i as f32 / 200.0).collect();
        let right: Vec<f32> = left.iter().map(|s| -s).collect();
        let spec = WavSpec {
            channels: 2,
            sample_rate: 44100,
            bits_per_sample: 32,
        };

        write_wav(&path, &[left.clone(), right.clone()], spec).unwrap();
        let (planar, read_spec) = read_wav(&path).unwrap();

        assert_eq!(read_spec.channels, 2);
        assert_eq!(read_spec.sample_rate, 44100);
        assert_eq!(planar, vec![left, right]);
    }

    #[test]
    fn sixteen_bit_is_close() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("mono16.wav");
        let mono: Vec<f32> = (0..64).map(|i| (i as f32 * 0.1).sin() * 0.5).collect();
        let spec = WavSpec {
            channels: 1,
            sample_rate: 48000,
            bits_per_sample: 16,
        };

        write_wav(&path, &[mono.clone()], spec).unwrap();
        let (planar, _) = read_wav(&path).unwrap();
        for (a, b) in planar[0].iter().zip(&mono) {
            assert!((a - b).abs() < 1e-3);
        }
    }

    #[test]
    fn mismatched_lengths_are_rejected() {
        let dir = TempDir::new().unwrap();
        let spec = WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 32,
        };
        let result = write_wav(dir.path().join("bad.wav"), &[vec![0.0; 4], vec![0.0; 3]], spec);
        assert!(result.is_err());
    }
}
