// Analyzer units - the per-call contract between host and analyzer
//
// One unit wraps one analyzer instance. Every control block the host calls
// `next` with its selector(s) and a slice of output slots:
//
//   Hold selector / empty bank -> Held:    cached outputs re-written
//   analyzer succeeded         -> Fresh:   new outputs written
//   analyzer skipped the call  -> Skipped: slots left as they were
//
// Skips (frame resize, two-buffer size mismatch) are logged once per unit and
// counted afterwards.

use crate::analysis::{AnalysisContext, FrameAnalyzer, PairAnalyzer, PolarDiffMags};
use crate::error::{log_analysis_error, AnalysisError};
use crate::host::{FrameBank, FrameSelector};

/// What a unit did with its output slots this call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Emission {
    Fresh,
    Held,
    Skipped,
}

impl Emission {
    pub fn wrote_outputs(self) -> bool {
        !matches!(self, Emission::Skipped)
    }

    /// Control value handed to a downstream in-place stage: the first
    /// buffer's selector, or -1 when there was no frame to pass on
    pub fn chained(self, first: FrameSelector) -> f32 {
        match self {
            Emission::Held => -1.0,
            Emission::Fresh | Emission::Skipped => first.to_control(),
        }
    }
}

/// Skip bookkeeping shared by both unit kinds
#[derive(Debug, Clone, Default)]
struct SkipLog {
    skipped: u64,
}

impl SkipLog {
    fn record(&mut self, err: &AnalysisError, name: &str) -> Emission {
        match err {
            AnalysisError::EmptyBank => Emission::Held,
            _ => {
                if self.skipped == 0 {
                    log_analysis_error(err, name);
                }
                self.skipped += 1;
                Emission::Skipped
            }
        }
    }
}

fn write_outputs(values: &[f32], out: &mut [f32]) {
    for (slot, value) in out.iter_mut().zip(values) {
        *slot = *value;
    }
}

/// Host wrapper around a single-frame analyzer
#[derive(Debug, Clone)]
pub struct AnalyzerUnit<A> {
    name: &'static str,
    analyzer: A,
    context: AnalysisContext,
    skips: SkipLog,
}

impl<A: FrameAnalyzer> AnalyzerUnit<A> {
    pub fn new(name: &'static str, analyzer: A, context: AnalysisContext) -> Self {
        Self {
            name,
            analyzer,
            context,
            skips: SkipLog::default(),
        }
    }

    /// Run one control block
    pub fn next(
        &mut self,
        bank: &mut FrameBank,
        selector: FrameSelector,
        params: A::Params,
        out: &mut [f32],
    ) -> Emission {
        let emission = match selector {
            FrameSelector::Hold => Emission::Held,
            FrameSelector::Index(index) => {
                let result = bank
                    .resolve(index)
                    .and_then(|frame| self.analyzer.analyze(frame, params, &self.context));
                match result {
                    Ok(()) => Emission::Fresh,
                    Err(err) => self.skips.record(&err, self.name),
                }
            }
        };

        if emission.wrote_outputs() {
            write_outputs(self.analyzer.outputs(), out);
        }
        emission
    }

    pub fn outputs(&self) -> &[f32] {
        self.analyzer.outputs()
    }

    /// Number of calls skipped since construction
    pub fn skipped(&self) -> u64 {
        self.skips.skipped
    }
}

/// Host wrapper around a two-frame analyzer
#[derive(Debug, Clone)]
pub struct PairUnit<A> {
    name: &'static str,
    analyzer: A,
    skips: SkipLog,
}

impl<A: PairAnalyzer> PairUnit<A> {
    pub fn new(name: &'static str, analyzer: A) -> Self {
        Self {
            name,
            analyzer,
            skips: SkipLog::default(),
        }
    }

    /// Run one control block; Hold on either input re-emits
    pub fn next(
        &mut self,
        bank: &mut FrameBank,
        first: FrameSelector,
        second: FrameSelector,
        out: &mut [f32],
    ) -> Emission {
        let emission = match (first, second) {
            (FrameSelector::Index(a), FrameSelector::Index(b)) => {
                let result = bank
                    .resolve_pair(a, b)
                    .and_then(|pair| self.analyzer.analyze_pair(pair));
                match result {
                    Ok(()) => Emission::Fresh,
                    Err(err) => self.skips.record(&err, self.name),
                }
            }
            _ => Emission::Held,
        };

        if emission.wrote_outputs() {
            write_outputs(self.analyzer.outputs(), out);
        }
        emission
    }

    pub fn outputs(&self) -> &[f32] {
        self.analyzer.outputs()
    }

    pub fn skipped(&self) -> u64 {
        self.skips.skipped
    }
}

/// In-place magnitude subtraction unit with a chained buffer output
pub type PolarDiffMagsUnit = PairUnit<PolarDiffMags>;

impl PairUnit<PolarDiffMags> {
    /// Subtract `second` from `first` in place and return the selector value
    /// for the next stage in the chain
    pub fn chain(&mut self, bank: &mut FrameBank, first: FrameSelector, second: FrameSelector) -> f32 {
        self.next(bank, first, second, &mut []).chained(first)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{DiffMags, SpectralFlux, SpectralPower};
    use crate::frame::{FrequencyFrame, RectBin};

    fn context() -> AnalysisContext {
        AnalysisContext::new(48000.0).unwrap()
    }

    fn bank_with(frames: Vec<FrequencyFrame>) -> FrameBank {
        FrameBank::from_frames(frames)
    }

    fn flat(level: f32, bins: usize) -> FrequencyFrame {
        FrequencyFrame::from_rectangular(level, level, &vec![RectBin::new(level, 0.0); bins])
    }

    #[test]
    fn test_fresh_then_held() {
        let mut bank = bank_with(vec![flat(2.0, 4)]);
        let mut unit = AnalyzerUnit::new("power", SpectralPower::new(), context());
        let mut out = [0.0f32];

        assert_eq!(unit.next(&mut bank, FrameSelector::Index(0), (), &mut out), Emission::Fresh);
        assert_eq!(out[0], 2.0);

        out[0] = -99.0;
        assert_eq!(unit.next(&mut bank, FrameSelector::Hold, (), &mut out), Emission::Held);
        assert_eq!(out[0], 2.0, "Hold re-emits the cached value");
        assert_eq!(unit.outputs(), &[2.0]);
    }

    #[test]
    fn test_out_of_range_selector_reads_slot_zero() {
        let mut bank = bank_with(vec![flat(3.0, 4), flat(1.0, 4)]);
        let mut unit = AnalyzerUnit::new("power", SpectralPower::new(), context());
        let mut out = [0.0f32];
        unit.next(&mut bank, FrameSelector::Index(42), (), &mut out);
        assert_eq!(out[0], 3.0);
    }

    #[test]
    fn test_empty_bank_holds() {
        let mut bank = FrameBank::new(0, 16);
        let mut unit = AnalyzerUnit::new("power", SpectralPower::new(), context());
        let mut out = [5.0f32];
        assert_eq!(unit.next(&mut bank, FrameSelector::Index(0), (), &mut out), Emission::Held);
        assert_eq!(out[0], 0.0);
        assert_eq!(unit.skipped(), 0);
    }

    #[test]
    fn test_resize_skips_and_leaves_slots() {
        let mut bank = bank_with(vec![flat(1.0, 4), flat(1.0, 8)]);
        let mut unit = AnalyzerUnit::new("flux", SpectralFlux::new(false), context());
        let mut out = [0.0f32];

        assert_eq!(unit.next(&mut bank, FrameSelector::Index(0), (), &mut out), Emission::Fresh);
        out[0] = 123.0;
        assert_eq!(unit.next(&mut bank, FrameSelector::Index(1), (), &mut out), Emission::Skipped);
        assert_eq!(out[0], 123.0);
        unit.next(&mut bank, FrameSelector::Index(1), (), &mut out);
        assert_eq!(unit.skipped(), 2);
    }

    #[test]
    fn test_pair_unit_hold_and_mismatch() {
        let mut bank = bank_with(vec![flat(1.0, 4), flat(3.0, 4), flat(1.0, 8)]);
        let mut unit = PairUnit::new("diff_mags", DiffMags::new());
        let mut out = [0.0f32];

        let emission = unit.next(&mut bank, FrameSelector::Index(0), FrameSelector::Index(1), &mut out);
        assert_eq!(emission, Emission::Fresh);
        assert_eq!(out[0], 2.0);

        out[0] = 0.0;
        let emission = unit.next(&mut bank, FrameSelector::Hold, FrameSelector::Index(1), &mut out);
        assert_eq!(emission, Emission::Held);
        assert_eq!(out[0], 2.0);

        out[0] = 7.0;
        let emission = unit.next(&mut bank, FrameSelector::Index(0), FrameSelector::Index(2), &mut out);
        assert_eq!(emission, Emission::Skipped);
        assert_eq!(out[0], 7.0);
        assert_eq!(unit.skipped(), 1);
        assert_eq!(unit.outputs(), &[2.0], "skip keeps the cached value");
    }

    #[test]
    fn test_polar_diff_chain_value() {
        let mut bank = bank_with(vec![flat(3.0, 4), flat(1.0, 4), flat(1.0, 8)]);
        let mut unit = PolarDiffMagsUnit::new("pv_diff_mags", PolarDiffMags::new());

        let chained = unit.chain(&mut bank, FrameSelector::Index(0), FrameSelector::Index(1));
        assert_eq!(chained, 0.0);
        assert_eq!(bank.frame(0).map(FrequencyFrame::dc), Some(2.0));

        assert_eq!(unit.chain(&mut bank, FrameSelector::Hold, FrameSelector::Index(1)), -1.0);
        // Mismatch still passes the first buffer on, unmodified
        assert_eq!(unit.chain(&mut bank, FrameSelector::Index(1), FrameSelector::Index(2)), 1.0);
        assert_eq!(bank.frame(1).map(FrequencyFrame::dc), Some(1.0));
    }

    #[test]
    fn test_emission_chained() {
        assert_eq!(Emission::Held.chained(FrameSelector::Index(3)), -1.0);
        assert_eq!(Emission::Fresh.chained(FrameSelector::Index(3)), 3.0);
        assert!(!Emission::Skipped.wrote_outputs());
    }
}
