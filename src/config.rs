//! Configuration for the analysis pipeline
//!
//! Loaded from JSON so frame geometry, percentile fractions and sub-band
//! layout can be changed without recompiling. Every section has defaults and
//! missing fields fall back to them.

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub frame: FrameConfig,
    pub percentile: PercentileConfig,
    pub flux: FluxConfig,
    pub subbands: SubbandConfig,
}

/// FFT framing of the time-domain input
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    /// FFT size in samples (also the frame's sample count)
    pub fft_size: usize,
    /// Samples between successive frames
    pub hop_size: usize,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            fft_size: 1024,
            hop_size: 512,
        }
    }
}

/// Fractions for the percentile-family analyzers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PercentileConfig {
    /// Median-style spectral centroid
    pub centroid_fraction: f32,
    /// Spectral rolloff
    pub rolloff_fraction: f32,
    /// Split point for the lower/upper flatness pair
    pub split_fraction: f32,
}

impl Default for PercentileConfig {
    fn default() -> Self {
        Self {
            centroid_fraction: 0.5,
            rolloff_fraction: 0.9,
            split_fraction: 0.5,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FluxConfig {
    /// Normalise each frame by its total energy before differencing
    pub normalise: bool,
}

impl Default for FluxConfig {
    fn default() -> Self {
        Self { normalise: true }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubbandConfig {
    /// Band edges in Hz, ascending
    pub cutoffs_hz: Vec<f32>,
    /// Count DC towards the lowest band
    pub include_dc: bool,
}

impl Default for SubbandConfig {
    fn default() -> Self {
        Self {
            cutoffs_hz: vec![300.0, 2000.0, 6000.0],
            include_dc: true,
        }
    }
}

impl AppConfig {
    /// Load configuration from JSON file
    ///
    /// A missing, unreadable, malformed or invalid file logs a warning and
    /// yields the defaults.
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Self {
        match fs::read_to_string(&path) {
            Ok(contents) => match Self::from_json_str(&contents) {
                Ok(config) => {
                    log::info!("[Config] Loaded configuration from {:?}", path.as_ref());
                    config
                }
                Err(err) => {
                    log::warn!(
                        "[Config] Rejected config {:?}: {}. Using defaults.",
                        path.as_ref(),
                        err
                    );
                    Self::default()
                }
            },
            Err(err) => {
                log::warn!(
                    "[Config] Failed to read config file {:?}: {}. Using defaults.",
                    path.as_ref(),
                    err
                );
                Self::default()
            }
        }
    }

    /// Parse and validate a JSON document
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let frame = &self.frame;
        if frame.fft_size < 4 || frame.fft_size % 2 != 0 {
            return Err(ConfigError::InvalidFrame {
                details: format!("fft_size must be even and at least 4, got {}", frame.fft_size),
            });
        }
        if frame.hop_size == 0 {
            return Err(ConfigError::InvalidFrame {
                details: "hop_size must be at least 1".to_string(),
            });
        }

        let fractions = [
            ("percentile.centroid_fraction", self.percentile.centroid_fraction),
            ("percentile.rolloff_fraction", self.percentile.rolloff_fraction),
            ("percentile.split_fraction", self.percentile.split_fraction),
        ];
        for (name, value) in fractions {
            if !value.is_finite() {
                return Err(ConfigError::InvalidParameter {
                    name: name.to_string(),
                    details: format!("fraction must be finite, got {}", value),
                });
            }
        }

        let cutoffs = &self.subbands.cutoffs_hz;
        if let Some(bad) = cutoffs.iter().find(|hz| !hz.is_finite() || **hz < 0.0) {
            return Err(ConfigError::InvalidParameter {
                name: "subbands.cutoffs_hz".to_string(),
                details: format!("{} is not a finite, non-negative frequency", bad),
            });
        }
        if cutoffs.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(ConfigError::InvalidParameter {
                name: "subbands.cutoffs_hz".to_string(),
                details: format!("cutoffs must be ascending, got {:?}", cutoffs),
            });
        }

        Ok(())
    }
}
