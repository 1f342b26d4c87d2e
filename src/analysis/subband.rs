// Subband module - mean magnitude per configured frequency band
//
// N cutoff frequencies split the spectrum into N + 1 contiguous bands. The
// cutoffs are turned into bin indices once, on the first frame, using that
// frame's sample count:
//
//   cutoff_bin = floor(samples * cutoff_hz / sample_rate)
//
// Band k collects bins [cutoff_bin[k-1], cutoff_bin[k]); the lowest band
// optionally starts with DC and the highest band always ends with Nyquist.
// A band with no contributing values reports 0, as does every band above the
// last cutoff the scan reaches.

use super::{AnalysisContext, FrameAnalyzer};
use crate::error::AnalysisError;
use crate::frame::FrequencyFrame;

#[derive(Debug, Clone)]
pub struct SubbandPower {
    cutoffs_hz: Vec<f32>,
    include_dc: bool,
    cutoff_bins: Vec<usize>,
    cutoffs_ready: bool,
    outputs: Vec<f32>,
}

impl SubbandPower {
    /// Create an analyzer for the given ascending cutoff frequencies (Hz)
    ///
    /// The cutoff table and output slots are allocated here so the first
    /// frame only has to fill them in.
    ///
    /// # Arguments
    /// * `cutoffs_hz` - Band edges; N cutoffs give N + 1 bands
    /// * `include_dc` - Count DC towards the lowest band
    ///
    /// # Returns
    /// `InvalidCutoffs` for non-finite, negative or descending cutoffs
    pub fn new(cutoffs_hz: Vec<f32>, include_dc: bool) -> Result<Self, AnalysisError> {
        if let Some(bad) = cutoffs_hz.iter().find(|hz| !hz.is_finite() || **hz < 0.0) {
            return Err(AnalysisError::InvalidCutoffs {
                details: format!("cutoff {} Hz is not a finite, non-negative frequency", bad),
            });
        }
        if cutoffs_hz.windows(2).any(|pair| pair[1] < pair[0]) {
            return Err(AnalysisError::InvalidCutoffs {
                details: format!("cutoffs must be ascending, got {:?}", cutoffs_hz),
            });
        }

        let num_bands = cutoffs_hz.len() + 1;
        Ok(Self {
            cutoff_bins: vec![0; cutoffs_hz.len()],
            cutoffs_hz,
            include_dc,
            cutoffs_ready: false,
            outputs: vec![0.0; num_bands],
        })
    }

    pub fn num_bands(&self) -> usize {
        self.outputs.len()
    }

    /// Cutoff bin indices, once the first frame has fixed them
    pub fn cutoff_bins(&self) -> Option<&[usize]> {
        self.cutoffs_ready.then_some(self.cutoff_bins.as_slice())
    }

    fn init_cutoffs(&mut self, samples: usize, sample_rate: f32) {
        for (bin, hz) in self.cutoff_bins.iter_mut().zip(self.cutoffs_hz.iter()) {
            *bin = (samples as f32 * hz / sample_rate) as usize;
        }
        self.cutoffs_ready = true;
        tracing::debug!(
            samples,
            sample_rate,
            cutoff_bins = ?self.cutoff_bins,
            "Subband cutoff table initialised"
        );
    }
}

#[inline]
fn band_mean(total: f32, count: usize) -> f32 {
    if count == 0 {
        0.0
    } else {
        total / count as f32
    }
}

impl FrameAnalyzer for SubbandPower {
    type Params = ();

    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        _params: (),
        context: &AnalysisContext,
    ) -> Result<(), AnalysisError> {
        if !self.cutoffs_ready {
            self.init_cutoffs(frame.samples(), context.sample_rate());
        }

        let spectrum = frame.to_complex();
        let cutoffs = &self.cutoff_bins;
        let outputs = &mut self.outputs;

        let (mut total, mut count) = if self.include_dc {
            (spectrum.dc.abs(), 1usize)
        } else {
            (0.0, 0)
        };
        let mut band = 0;

        for (index, bin) in spectrum.bins.iter().enumerate() {
            while band < cutoffs.len() && cutoffs[band] == index {
                outputs[band] = band_mean(total, count);
                band += 1;
                total = 0.0;
                count = 0;
            }
            total += bin.norm();
            count += 1;
        }

        total += spectrum.nyquist.abs();
        outputs[band] = total / (count + 1) as f32;
        for unreached in outputs[band + 1..].iter_mut() {
            *unreached = 0.0;
        }
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.outputs
    }
}
