// DiffMags module - differences between two frames
//
// DiffMags: mean Euclidean distance between corresponding values of two
// rectangular frames, (|dc1 - dc2| + |nyq1 - nyq2| + Σ |p_i - q_i|) / (n + 2).
//
// PolarDiffMags: subtracts the second frame's magnitudes (and DC / Nyquist)
// from the first frame in place. Phases of the first frame are kept. Emits no
// scalar; the modified frame is the output.

use super::PairAnalyzer;
use crate::error::AnalysisError;
use crate::frame::FramePair;

#[derive(Debug, Clone, Default)]
pub struct DiffMags {
    output: [f32; 1],
}

impl DiffMags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn value(&self) -> f32 {
        self.output[0]
    }
}

impl PairAnalyzer for DiffMags {
    fn analyze_pair(&mut self, pair: FramePair<'_>) -> Result<(), AnalysisError> {
        let bin_count = pair.ensure_same_size()?;

        let diff_sum = match pair {
            FramePair::Aliased(frame) => {
                frame.to_complex();
                0.0
            }
            FramePair::Distinct(first, second) => {
                let p = first.to_complex();
                let q = second.to_complex();
                let mut sum = (*p.dc - *q.dc).abs() + (*p.nyquist - *q.nyquist).abs();
                for (a, b) in p.bins.iter().zip(q.bins.iter()) {
                    let real = a.real - b.real;
                    let imag = a.imag - b.imag;
                    sum += (real * real + imag * imag).sqrt();
                }
                sum
            }
        };

        self.output[0] = diff_sum / (bin_count + 2) as f32;
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &self.output
    }
}

/// In-place magnitude subtraction, first frame minus second frame
#[derive(Debug, Clone, Copy, Default)]
pub struct PolarDiffMags;

impl PolarDiffMags {
    pub fn new() -> Self {
        Self
    }
}

impl PairAnalyzer for PolarDiffMags {
    fn analyze_pair(&mut self, pair: FramePair<'_>) -> Result<(), AnalysisError> {
        pair.ensure_same_size()?;

        match pair {
            FramePair::Aliased(frame) => {
                let p = frame.to_polar();
                *p.dc = 0.0;
                *p.nyquist = 0.0;
                for bin in p.bins.iter_mut() {
                    bin.mag = 0.0;
                }
            }
            FramePair::Distinct(first, second) => {
                let p = first.to_polar();
                let q = second.to_polar();
                *p.dc -= *q.dc;
                *p.nyquist -= *q.nyquist;
                for (a, b) in p.bins.iter_mut().zip(q.bins.iter()) {
                    a.mag -= b.mag;
                }
            }
        }
        Ok(())
    }

    fn outputs(&self) -> &[f32] {
        &[]
    }
}
