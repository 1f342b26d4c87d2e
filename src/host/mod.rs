// Host module - the boundary between an audio graph and the analyzers
//
// - bank: frame storage addressed by control-rate selectors
// - unit: per-call contract (hold / fresh / skipped) around each analyzer

mod bank;
mod unit;

pub use bank::{FrameBank, FrameSelector};
pub use unit::{AnalyzerUnit, Emission, PairUnit, PolarDiffMagsUnit};
