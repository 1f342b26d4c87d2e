// Spectral Engine - streaming spectral feature extraction
// Analyzers over frequency-domain frames with a real-time host contract

// Module declarations
pub mod analysis;
pub mod config;
pub mod error;
pub mod frame;
pub mod host;
pub mod pipeline;
pub mod scratch;
pub mod signal;
pub mod spectrum;

// Re-exports for convenience
pub use analysis::{AnalysisContext, FrameAnalyzer, PairAnalyzer};
pub use config::AppConfig;
pub use error::{AnalysisError, ConfigError, ErrorCode};
pub use frame::{Coord, FramePair, FrequencyFrame, PolarBin, RectBin};
pub use host::{AnalyzerUnit, Emission, FrameBank, FrameSelector, PairUnit};
pub use pipeline::{FeaturePipeline, FeatureSummary, FrameFeatures};

use tracing::Level;

/// Install a stderr `tracing` subscriber (also receiving `log` records)
///
/// Later calls are no-ops, so tests and binaries can both call it.
pub fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let installed = tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init()
        .is_ok();
    if installed {
        log::debug!("Logging initialised at {}", level);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_twice() {
        init_logging(false);
        init_logging(true);
    }
}
