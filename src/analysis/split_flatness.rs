// Split flatness module - flatness below and above a percentile split
//
// Pass 1 fills the scratch buffer with (cumulative sum, magnitude) per bin,
// exactly like the percentile analyzer. Pass 2 walks the bins downwards from
// Nyquist: bins whose cumulative sum is still above the target belong to the
// upper region; the first bin at or below the target, and everything under
// it, belongs to the lower region.
//
// Region membership of the edge values: DC is always lower, Nyquist is always
// upper. When no bin crosses the target every bin is upper and the lower
// region is DC alone.

use super::flatness::FlatnessAccumulator;
use super::{AnalysisContext, FrameAnalyzer};
use crate::error::AnalysisError;
use crate::frame::FrequencyFrame;
use crate::scratch::ScratchBuffer;

/// Per-bin scratch entry: running sum and the bin's own magnitude
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct CumulativeBin {
    pub cumulative: f32,
    pub magnitude: f32,
}

/// Two-output analyzer: `[lower_flatness, upper_flatness]`
#[derive(Debug, Clone, Default)]
pub struct FlatnessSplitPercentile {
    scratch: ScratchBuffer<CumulativeBin>,
    outputs: [f32; 2],
}

impl FlatnessSplitPercentile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Flatness of the region below the split (DC included)
    pub fn lower(&self) -> f32 {
        self.outputs[0]
    }

    /// Flatness of the region above the split (Nyquist included)
    pub fn upper(&self) -> f32 {
        self.outputs[1]
    }
}

impl FrameAnalyzer for FlatnessSplitPercentile {
    /// Split point as a fraction of the total magnitude
    type Params = f32;

    fn analyze(
        &mut self,
        frame: &mut FrequencyFrame,
        fraction: f32,
        _context: &AnalysisContext,
    ) -> Result<(), AnalysisError> {
        let bin_count = frame.bin_count();
        let scratch = self.scratch.acquire(bin_count)?;
        let spectrum = frame.to_complex();

        let mut total = spectrum.dc.abs();
        for (slot, bin) in scratch.iter_mut().zip(spectrum.bins.iter()) {
            let magnitude = bin.norm();
            total += magnitude;
            *slot = CumulativeBin {
                cumulative: total,
                magnitude,
            };
        }
        total += spectrum.nyquist.abs();
        let target = total * fraction;

        let mut lower = FlatnessAccumulator::default();
        let mut upper = FlatnessAccumulator::default();
        lower.push(*spectrum.dc);
        upper.push(*spectrum.nyquist);

        let mut split = None;
        for (index, entry) in scratch.iter().enumerate().rev() {
            // NaN targets never count as reached
            let reached = entry.cumulative <= target;
            if split.is_none() && !reached {
                upper.push(entry.magnitude);
            } else {
                if split.is_none() {
                    split = Some(index);
                }
                lower.push(entry.magnitude);
            }
        }

        let (num_upper, num_lower) = match split {
            Some(index) => (bin_count - index, index + 2),
            None => (bin_count + 1, 1),
        };

        self.outputs = [lower.ratio(num_lower), upper.ratio(num_upper)];
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.outputs
    }
}
