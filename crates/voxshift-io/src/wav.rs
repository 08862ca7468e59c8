//! WAV file reading and writing.
//!
//! The voice graph is mono, so files are mixed down on read and written as a
//! single channel.

use crate::Result;
use hound::{SampleFormat, WavReader, WavWriter};
use std::path::Path;

/// WAV file specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavSpec {
    /// Number of audio channels.
    pub channels: u16,
    /// Sample rate in Hz.
    pub sample_rate: u32,
    /// Bit depth per sample (16, 24 or 32; 32 is written as float).
    pub bits_per_sample: u16,
}

impl Default for WavSpec {
    fn default() -> Self {
        Self {
            channels: 1,
            sample_rate: 44100,
            bits_per_sample: 32,
        }
    }
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

/// Read a WAV file as mono f32 samples.
///
/// Multi-channel files are averaged per frame. The returned spec describes
/// the file as stored.
pub fn read_wav<P: AsRef<Path>>(path: P) -> Result<(Vec<f32>, WavSpec)> {
    let reader = WavReader::open(path)?;
    let spec = WavSpec::from(reader.spec());
    let channels = usize::from(spec.channels.max(1));

    let samples: Vec<f32> = match reader.spec().sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<Vec<_>, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|v| v as f32 / scale))
                .collect::<std::result::Result<Vec<_>, _>>()?
        }
    };

    if channels == 1 {
        return Ok((samples, spec));
    }
    let mono = samples
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect();
    Ok((mono, spec))
}

/// Write mono samples to a WAV file.
///
/// `spec.channels` is ignored; the file always has one channel. Integer
/// formats are clipped to full scale.
pub fn write_wav<P: AsRef<Path>>(path: P, samples: &[f32], spec: WavSpec) -> Result<()> {
    let spec = WavSpec { channels: 1, ..spec };
    let mut writer = WavWriter::create(path, hound::WavSpec::from(spec))?;

    if spec.bits_per_sample == 32 {
        for &sample in samples {
            writer.write_sample(sample)?;
        }
    } else {
        let max_val = (1i64 << (spec.bits_per_sample - 1)) as f32;
        for &sample in samples {
            let int_sample = (sample * max_val).clamp(-max_val, max_val - 1.0) as i32;
            writer.write_sample(int_sample)?;
        }
    }

    writer.finalize()?;
    tracing::debug!(frames = samples.len(), sample_rate = spec.sample_rate, "wrote wav");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn float_file_survives_write_and_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("voice.wav");
        let samples: Vec<f32> = (0..64).map(|i| (i as f32 / 64.0) - 0.5).collect();
        write_wav(&path, &samples, WavSpec::default()).unwrap();

        let (read, spec) = read_wav(&path).unwrap();
        assert_eq!(spec.sample_rate, 44100);
        assert_eq!(spec.channels, 1);
        assert_eq!(read, samples);
    }

    #[test]
    fn stereo_file_is_mixed_down() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stereo.wav");
        let spec = hound::WavSpec {
            channels: 2,
            sample_rate: 48000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut writer = WavWriter::create(&path, spec).unwrap();
        for _ in 0..10 {
            writer.write_sample(16384i16).unwrap();
            writer.write_sample(0i16).unwrap();
        }
        writer.finalize().unwrap();

        let (mono, read_spec) = read_wav(&path).unwrap();
        assert_eq!(read_spec.channels, 2);
        assert_eq!(mono.len(), 10);
        assert!(mono.iter().all(|&s| (s - 0.25).abs() < 1e-4));
    }

    #[test]
    fn sixteen_bit_output_clips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("clip.wav");
        let spec = WavSpec {
            bits_per_sample: 16,
            ..WavSpec::default()
        };
        write_wav(&path, &[2.0, -2.0], spec).unwrap();
        let (read, _) = read_wav(&path).unwrap();
        assert!(read[0] <= 1.0 && read[0] > 0.99);
        assert_eq!(read[1], -1.0);
    }
}
