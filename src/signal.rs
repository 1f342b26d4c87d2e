// Signal module - time-domain inputs for tooling and tests
//
// Deterministic synthetic signals (seeded noise, so runs are reproducible) and
// mono WAV loading via hound.

use anyhow::{anyhow, Context, Result};
use rand::{rngs::StdRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::f32::consts::PI;
use std::path::Path;

/// Seed used for white noise so every run sees the same samples
const NOISE_SEED: u64 = 0x5EC7_0A11;

/// Supported deterministic waveform patterns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SyntheticPattern {
    Sine,
    Noise,
    Impulse,
}

/// Configuration for a synthetic signal
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSpec {
    pub pattern: SyntheticPattern,
    #[serde(default = "default_frequency_hz")]
    pub frequency_hz: f32,
    #[serde(default = "default_amplitude")]
    pub amplitude: f32,
}

fn default_frequency_hz() -> f32 {
    440.0
}

fn default_amplitude() -> f32 {
    0.5
}

impl SyntheticSpec {
    pub fn new(pattern: SyntheticPattern) -> Self {
        Self {
            pattern,
            frequency_hz: default_frequency_hz(),
            amplitude: default_amplitude(),
        }
    }

    pub fn with_frequency(mut self, frequency_hz: f32) -> Self {
        self.frequency_hz = frequency_hz;
        self
    }

    /// Render `len` samples at `sample_rate`
    ///
    /// The frequency sets the pitch of the sine and the repetition rate of the
    /// impulse train; white noise ignores it.
    pub fn render(&self, sample_rate: u32, len: usize) -> Vec<f32> {
        let amplitude = self.amplitude;
        let frequency_hz = self.frequency_hz.max(1.0);

        match self.pattern {
            SyntheticPattern::Sine => {
                let step = frequency_hz / sample_rate as f32;
                let mut phase = 0.0f32;
                (0..len)
                    .map(|_| {
                        let value = (2.0 * PI * phase).sin() * amplitude;
                        phase += step;
                        if phase >= 1.0 {
                            phase -= 1.0;
                        }
                        value
                    })
                    .collect()
            }
            SyntheticPattern::Noise => {
                let mut rng = StdRng::seed_from_u64(NOISE_SEED);
                if amplitude > 0.0 {
                    (0..len).map(|_| rng.gen_range(-amplitude..amplitude)).collect()
                } else {
                    vec![0.0; len]
                }
            }
            SyntheticPattern::Impulse => {
                let interval = ((sample_rate as f32 / frequency_hz) as usize).max(1);
                (0..len)
                    .map(|i| if i % interval == 0 { amplitude } else { 0.0 })
                    .collect()
            }
        }
    }
}

/// Read a mono WAV file as f32 samples in [-1, 1]
pub fn read_wav(path: &Path) -> Result<(Vec<f32>, u32)> {
    let mut reader =
        hound::WavReader::open(path).with_context(|| format!("opening {}", path.display()))?;
    let spec = reader.spec();
    if spec.channels != 1 {
        return Err(anyhow!(
            "Input {} must be mono (found {} channels)",
            path.display(),
            spec.channels
        ));
    }

    let samples = match spec.sample_format {
        hound::SampleFormat::Float => reader
            .samples::<f32>()
            .map(|sample| sample.map_err(|err| anyhow!(err)))
            .collect::<Result<Vec<f32>>>()?,
        hound::SampleFormat::Int => {
            let scale = ((1i64 << (spec.bits_per_sample - 1)) - 1) as f32;
            match spec.bits_per_sample {
                16 => reader
                    .samples::<i16>()
                    .map(|sample| sample.map(|v| v as f32 / scale).map_err(|err| anyhow!(err)))
                    .collect::<Result<Vec<f32>>>()?,
                24 | 32 => reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|v| v as f32 / scale).map_err(|err| anyhow!(err)))
                    .collect::<Result<Vec<f32>>>()?,
                other => {
                    return Err(anyhow!(
                        "Unsupported bits per sample {} in {}",
                        other,
                        path.display()
                    ))
                }
            }
        }
    };

    Ok((samples, spec.sample_rate))
}

/// Write mono f32 samples as a 16-bit WAV file
pub fn write_wav(path: &Path, samples: &[f32], sample_rate: u32) -> Result<()> {
    let spec = hound::WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer =
        hound::WavWriter::create(path, spec).with_context(|| format!("creating {}", path.display()))?;
    for &sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(value)?;
    }
    writer
        .finalize()
        .with_context(|| format!("finalising {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sine_amplitude_and_period() {
        let signal = SyntheticSpec::new(SyntheticPattern::Sine)
            .with_frequency(1000.0)
            .render(48000, 480);
        let peak = signal.iter().fold(0.0f32, |acc, v| acc.max(v.abs()));
        assert!((peak - 0.5).abs() < 1e-3, "peak {}", peak);
        // 48 samples per period
        assert!(signal[0].abs() < 1e-6);
        assert!(signal[48].abs() < 1e-3);
    }

    #[test]
    fn test_noise_is_deterministic_and_bounded() {
        let spec = SyntheticSpec::new(SyntheticPattern::Noise);
        let a = spec.render(48000, 1024);
        let b = spec.render(48000, 1024);
        assert_eq!(a, b);
        assert!(a.iter().all(|v| v.abs() <= 0.5));
        assert!(a.iter().any(|v| *v != 0.0));
    }

    #[test]
    fn test_impulse_interval() {
        let signal = SyntheticSpec::new(SyntheticPattern::Impulse)
            .with_frequency(100.0)
            .render(1000, 35);
        let hits: Vec<usize> = signal
            .iter()
            .enumerate()
            .filter(|(_, v)| **v != 0.0)
            .map(|(i, _)| i)
            .collect();
        assert_eq!(hits, vec![0, 10, 20, 30]);
    }

    #[test]
    fn test_spec_deserialises_with_defaults() {
        let spec: SyntheticSpec = serde_json::from_str(r#"{"pattern":"noise"}"#).unwrap();
        assert_eq!(spec, SyntheticSpec::new(SyntheticPattern::Noise));
    }

    #[test]
    fn test_wav_round_trip_through_hound() {
        let path = std::env::temp_dir().join(format!("spectral_signal_{}.wav", std::process::id()));
        let signal = SyntheticSpec::new(SyntheticPattern::Sine).render(16000, 256);
        write_wav(&path, &signal, 16000).unwrap();

        let (read, sample_rate) = read_wav(&path).unwrap();
        assert_eq!(sample_rate, 16000);
        assert_eq!(read.len(), 256);
        assert!(read
            .iter()
            .zip(signal.iter())
            .all(|(a, b)| (a - b).abs() < 1e-3));
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_missing_wav_is_an_error() {
        assert!(read_wav(Path::new("/nonexistent/input.wav")).is_err());
    }
}
