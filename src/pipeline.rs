// Pipeline module - every analyzer over a stream of time-domain frames
//
// Per hop:
// 1. Swap bank slots so the last spectrum becomes "previous"
// 2. FFT the new window into the "current" slot
// 3. Run each analyzer unit against the current slot; DiffMags compares
//    current with previous
// 4. Collect the output bus into a FrameFeatures record
//
// Analyzers that need rectangular bins run before the flux pair, which leaves
// the current frame polar.

use crate::analysis::{
    AnalysisContext, DiffMags, FlatnessSplitPercentile, SpectralFlatness, SpectralFlux,
    SpectralPercentile, SpectralPower, SubbandPower,
};
use crate::config::AppConfig;
use crate::error::AnalysisError;
use crate::host::{AnalyzerUnit, FrameBank, FrameSelector, PairUnit};
use crate::spectrum::SpectrumWriter;
use serde::{Deserialize, Serialize};

/// Bank slot holding the spectrum of the newest window
pub const CURRENT_SLOT: usize = 0;
/// Bank slot holding the spectrum of the window before it
pub const PREVIOUS_SLOT: usize = 1;

// Output bus layout
const POWER: usize = 0;
const FLATNESS: usize = 1;
const CENTROID: usize = 2;
const ROLLOFF: usize = 3;
const SPLIT_LOWER: usize = 4;
const SPLIT_UPPER: usize = 5;
const FLUX: usize = 6;
const FLUX_POSITIVE: usize = 7;
const DIFF_MAGS: usize = 8;
const SUBBANDS: usize = 9;

/// Every descriptor computed for one frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameFeatures {
    pub index: usize,
    /// Start of the analysis window in seconds
    pub time_s: f32,
    pub power: f32,
    pub flatness: f32,
    pub centroid_hz: f32,
    pub rolloff_hz: f32,
    pub flatness_lower: f32,
    pub flatness_upper: f32,
    pub flux: f32,
    pub flux_positive: f32,
    /// Mean magnitude difference from the previous frame
    pub diff_mags: f32,
    pub subband_power: Vec<f32>,
}

/// Per-field means over a run of frames
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSummary {
    pub frame_count: usize,
    pub power: f32,
    pub flatness: f32,
    pub centroid_hz: f32,
    pub rolloff_hz: f32,
    pub flux: f32,
    pub flux_positive: f32,
    pub subband_power: Vec<f32>,
}

impl FeatureSummary {
    pub fn from_frames(frames: &[FrameFeatures]) -> Self {
        let Some(first) = frames.first() else {
            return Self::default();
        };
        let count = frames.len() as f32;
        let mean = |field: fn(&FrameFeatures) -> f32| frames.iter().map(field).sum::<f32>() / count;

        let mut subband_power = vec![0.0; first.subband_power.len()];
        for frame in frames {
            for (total, value) in subband_power.iter_mut().zip(frame.subband_power.iter()) {
                *total += value;
            }
        }
        subband_power.iter_mut().for_each(|total| *total /= count);

        Self {
            frame_count: frames.len(),
            power: mean(|f| f.power),
            flatness: mean(|f| f.flatness),
            centroid_hz: mean(|f| f.centroid_hz),
            rolloff_hz: mean(|f| f.rolloff_hz),
            flux: mean(|f| f.flux),
            flux_positive: mean(|f| f.flux_positive),
            subband_power,
        }
    }
}

pub struct FeaturePipeline {
    config: AppConfig,
    sample_rate: u32,
    writer: SpectrumWriter,
    bank: FrameBank,
    power: AnalyzerUnit<SpectralPower>,
    flatness: AnalyzerUnit<SpectralFlatness>,
    centroid: AnalyzerUnit<SpectralPercentile>,
    rolloff: AnalyzerUnit<SpectralPercentile>,
    split: AnalyzerUnit<FlatnessSplitPercentile>,
    subbands: AnalyzerUnit<SubbandPower>,
    flux: AnalyzerUnit<SpectralFlux>,
    flux_positive: AnalyzerUnit<SpectralFlux>,
    diff_mags: PairUnit<DiffMags>,
    bus: Vec<f32>,
    frames_processed: usize,
}

impl FeaturePipeline {
    /// Build a pipeline for a validated config
    pub fn new(config: &AppConfig, sample_rate: u32) -> anyhow::Result<Self> {
        config.validate()?;
        let context = AnalysisContext::new(sample_rate as f32)?;
        let fft_size = config.frame.fft_size;
        let normalise = config.flux.normalise;
        let subband = SubbandPower::new(
            config.subbands.cutoffs_hz.clone(),
            config.subbands.include_dc,
        )?;
        let bus = vec![0.0; SUBBANDS + subband.num_bands()];

        tracing::info!(
            fft_size,
            hop_size = config.frame.hop_size,
            sample_rate,
            bands = subband.num_bands(),
            "Feature pipeline ready"
        );

        Ok(Self {
            config: config.clone(),
            sample_rate,
            writer: SpectrumWriter::new(fft_size)?,
            bank: FrameBank::new(2, fft_size),
            power: AnalyzerUnit::new("power", SpectralPower::new(), context),
            flatness: AnalyzerUnit::new("flatness", SpectralFlatness::new(), context),
            centroid: AnalyzerUnit::new("centroid", SpectralPercentile::new(), context),
            rolloff: AnalyzerUnit::new("rolloff", SpectralPercentile::new(), context),
            split: AnalyzerUnit::new("split_flatness", FlatnessSplitPercentile::new(), context),
            subbands: AnalyzerUnit::new("subband_power", subband, context),
            flux: AnalyzerUnit::new("flux", SpectralFlux::new(normalise), context),
            flux_positive: AnalyzerUnit::new(
                "flux_positive",
                SpectralFlux::positive(normalise),
                context,
            ),
            diff_mags: PairUnit::new("diff_mags", DiffMags::new()),
            bus,
            frames_processed: 0,
        })
    }

    /// Total skipped analyzer calls across all units
    pub fn skipped_calls(&self) -> u64 {
        self.power.skipped()
            + self.flatness.skipped()
            + self.centroid.skipped()
            + self.rolloff.skipped()
            + self.split.skipped()
            + self.subbands.skipped()
            + self.flux.skipped()
            + self.flux_positive.skipped()
            + self.diff_mags.skipped()
    }

    /// Analyse one window of `fft_size` samples (shorter windows are zero-padded)
    pub fn process_window(&mut self, window: &[f32]) -> Result<FrameFeatures, AnalysisError> {
        self.bank.swap(CURRENT_SLOT, PREVIOUS_SLOT);
        let frame = self
            .bank
            .frame_mut(CURRENT_SLOT)
            .ok_or(AnalysisError::EmptyBank)?;
        self.writer.write(window, frame)?;

        let current = FrameSelector::Index(CURRENT_SLOT);
        let previous = if self.frames_processed == 0 {
            FrameSelector::Hold
        } else {
            FrameSelector::Index(PREVIOUS_SLOT)
        };
        let percentile = &self.config.percentile;
        let bank = &mut self.bank;
        let bus = &mut self.bus;

        self.power.next(bank, current, (), &mut bus[POWER..=POWER]);
        self.flatness.next(bank, current, (), &mut bus[FLATNESS..=FLATNESS]);
        self.centroid.next(
            bank,
            current,
            percentile.centroid_fraction,
            &mut bus[CENTROID..=CENTROID],
        );
        self.rolloff.next(
            bank,
            current,
            percentile.rolloff_fraction,
            &mut bus[ROLLOFF..=ROLLOFF],
        );
        self.split.next(
            bank,
            current,
            percentile.split_fraction,
            &mut bus[SPLIT_LOWER..=SPLIT_UPPER],
        );
        self.subbands.next(bank, current, (), &mut bus[SUBBANDS..]);
        self.diff_mags
            .next(bank, current, previous, &mut bus[DIFF_MAGS..=DIFF_MAGS]);
        self.flux.next(bank, current, (), &mut bus[FLUX..=FLUX]);
        self.flux_positive
            .next(bank, current, (), &mut bus[FLUX_POSITIVE..=FLUX_POSITIVE]);

        let index = self.frames_processed;
        self.frames_processed += 1;

        let bus = &self.bus;
        Ok(FrameFeatures {
            index,
            time_s: (index * self.config.frame.hop_size) as f32 / self.sample_rate as f32,
            power: bus[POWER],
            flatness: bus[FLATNESS],
            centroid_hz: bus[CENTROID],
            rolloff_hz: bus[ROLLOFF],
            flatness_lower: bus[SPLIT_LOWER],
            flatness_upper: bus[SPLIT_UPPER],
            flux: bus[FLUX],
            flux_positive: bus[FLUX_POSITIVE],
            diff_mags: bus[DIFF_MAGS],
            subband_power: bus[SUBBANDS..].to_vec(),
        })
    }

    /// Hop through a whole signal
    ///
    /// A signal shorter than one FFT still yields a single zero-padded frame;
    /// an empty signal yields none.
    pub fn process_signal(&mut self, samples: &[f32]) -> Result<Vec<FrameFeatures>, AnalysisError> {
        if samples.is_empty() {
            return Ok(Vec::new());
        }
        let fft_size = self.config.frame.fft_size;
        let hop_size = self.config.frame.hop_size;
        let count = samples.len().saturating_sub(fft_size) / hop_size + 1;

        (0..count)
            .map(|i| {
                let start = i * hop_size;
                let end = (start + fft_size).min(samples.len());
                self.process_window(&samples[start..end])
            })
            .collect()
    }
}
