//! Integration tests for the host-facing analyzer contract
//!
//! These drive the analyzers the way an audio graph does: frames live in a
//! bank, units are called once per control block with control-rate selectors,
//! and outputs land in a shared slot array. Covered:
//! - Fresh / Held / Skipped emissions and what they do to the output slots
//! - Lazy coordinate conversion on frames shared between units
//! - Two-buffer units, including in-place chaining
//! - The FFT-to-features pipeline over synthetic input

use spectral_engine::analysis::{
    AnalysisContext, DiffMags, PolarDiffMags, SpectralFlatness, SpectralFlux, SpectralPercentile,
    SpectralPower, SubbandPower,
};
use spectral_engine::host::{AnalyzerUnit, Emission, FrameBank, FrameSelector, PairUnit, PolarDiffMagsUnit};
use spectral_engine::signal::{SyntheticPattern, SyntheticSpec};
use spectral_engine::spectrum::SpectrumWriter;
use spectral_engine::{AppConfig, Coord, FeaturePipeline, FrequencyFrame, RectBin};

const SAMPLE_RATE: f32 = 48000.0;

fn context() -> AnalysisContext {
    AnalysisContext::new(SAMPLE_RATE).expect("valid sample rate")
}

fn alternating_frame() -> FrequencyFrame {
    let bins: Vec<RectBin> = (0..8)
        .map(|i| if i % 2 == 0 { RectBin::new(1.0, 0.0) } else { RectBin::new(0.0, 1.0) })
        .collect();
    FrequencyFrame::from_rectangular(1.0, 1.0, &bins)
}

/// The 8-bin scenario through host units sharing one frame
#[test]
fn test_alternating_frame_through_units() {
    let mut bank = FrameBank::from_frames(vec![alternating_frame()]);
    let mut power = AnalyzerUnit::new("power", SpectralPower::new(), context());
    let mut flatness = AnalyzerUnit::new("flatness", SpectralFlatness::new(), context());
    let mut percentile = AnalyzerUnit::new("percentile", SpectralPercentile::new(), context());
    let mut flux = AnalyzerUnit::new("flux", SpectralFlux::new(false), context());

    let mut slots = [0.0f32; 4];
    let selector = FrameSelector::from_control(0.0);

    assert_eq!(power.next(&mut bank, selector, (), &mut slots[0..1]), Emission::Fresh);
    assert_eq!(percentile.next(&mut bank, selector, 0.5, &mut slots[2..3]), Emission::Fresh);
    assert_eq!(flux.next(&mut bank, selector, (), &mut slots[3..4]), Emission::Fresh);
    assert_eq!(bank.frame(0).map(FrequencyFrame::coord), Some(Coord::Polar));
    // Converts the now-polar frame back
    assert_eq!(flatness.next(&mut bank, selector, (), &mut slots[1..2]), Emission::Fresh);

    assert!((slots[0] - 1.0).abs() < 1e-6, "power {}", slots[0]);
    assert!((slots[1] - 1.0).abs() < 1e-4, "flatness {}", slots[1]);
    assert!((slots[2] - SAMPLE_RATE * 0.5 * 0.4).abs() < 1e-2, "percentile {}", slots[2]);
    // First flux is the frame against silence: sqrt(10)
    assert!((slots[3] - 10.0f32.sqrt()).abs() < 1e-4, "flux {}", slots[3]);
}

#[test]
fn test_hold_reemits_every_slot() {
    let mut bank = FrameBank::from_frames(vec![alternating_frame()]);
    let mut subband = AnalyzerUnit::new(
        "subband",
        SubbandPower::new(vec![6000.0], true).expect("valid cutoffs"),
        context(),
    );
    let mut slots = [0.0f32; 2];
    subband.next(&mut bank, FrameSelector::Index(0), (), &mut slots);
    let fresh = slots;

    slots = [-1.0, -1.0];
    let emission = subband.next(&mut bank, FrameSelector::from_control(-1.0), (), &mut slots);
    assert_eq!(emission, Emission::Held);
    assert_eq!(slots, fresh);
}

#[test]
fn test_frame_size_change_is_skipped_not_fatal() {
    let mut bank = FrameBank::new(2, 1024);
    *bank.frame_mut(1).expect("slot 1") = FrequencyFrame::new(2048);

    let mut percentile = AnalyzerUnit::new("percentile", SpectralPercentile::new(), context());
    let mut slot = [0.0f32];
    assert_eq!(percentile.next(&mut bank, FrameSelector::Index(0), 0.5, &mut slot), Emission::Fresh);
    slot[0] = 42.0;
    for _ in 0..5 {
        assert_eq!(
            percentile.next(&mut bank, FrameSelector::Index(1), 0.5, &mut slot),
            Emission::Skipped
        );
    }
    assert_eq!(slot[0], 42.0);
    assert_eq!(percentile.skipped(), 5);
    // Back to the original size resumes normally
    assert_eq!(percentile.next(&mut bank, FrameSelector::Index(0), 0.5, &mut slot), Emission::Fresh);
}

#[test]
fn test_diff_and_in_place_chain() {
    let mut writer = SpectrumWriter::new(256).expect("valid fft size");
    let mut bank = FrameBank::new(3, 256);
    let tone = SyntheticSpec::new(SyntheticPattern::Sine).render(48000, 256);
    let noise = SyntheticSpec::new(SyntheticPattern::Noise).render(48000, 256);
    writer.write(&tone, bank.frame_mut(0).expect("slot 0")).expect("fft");
    writer.write(&tone, bank.frame_mut(1).expect("slot 1")).expect("fft");
    writer.write(&noise, bank.frame_mut(2).expect("slot 2")).expect("fft");

    let mut diff = PairUnit::new("diff_mags", DiffMags::new());
    let mut slot = [0.0f32];
    diff.next(&mut bank, FrameSelector::Index(0), FrameSelector::Index(1), &mut slot);
    assert_eq!(slot[0], 0.0, "identical spectra");
    diff.next(&mut bank, FrameSelector::Index(0), FrameSelector::Index(2), &mut slot);
    assert!(slot[0] > 0.0);

    // Tone minus tone leaves silence in slot 0, and the chain passes slot 0 on
    let mut pv_diff: PolarDiffMagsUnit = PairUnit::new("pv_diff_mags", PolarDiffMags::new());
    let chained = pv_diff.chain(&mut bank, FrameSelector::Index(0), FrameSelector::Index(1));
    assert_eq!(chained, 0.0);

    let mut power = AnalyzerUnit::new("power", SpectralPower::new(), context());
    let selector = FrameSelector::from_control(chained);
    power.next(&mut bank, selector, (), &mut slot);
    assert!(slot[0].abs() < 1e-3, "residual power {}", slot[0]);
}

#[test]
fn test_pipeline_onset_shows_in_positive_flux() {
    let mut config = AppConfig::default();
    config.frame.fft_size = 512;
    config.frame.hop_size = 512;
    let mut pipeline = FeaturePipeline::new(&config, 48000).expect("pipeline");

    // Silence, then a burst of noise starting on a frame boundary
    let mut signal = vec![0.0f32; 2048];
    signal.extend(SyntheticSpec::new(SyntheticPattern::Noise).render(48000, 2048));
    let frames = pipeline.process_signal(&signal).expect("features");
    assert_eq!(frames.len(), 8);

    let onset = &frames[4];
    assert!(onset.flux_positive > 0.0);
    let quiet_max = frames[1..4]
        .iter()
        .map(|f| f.flux_positive)
        .fold(0.0f32, f32::max);
    assert!(
        onset.flux_positive > quiet_max,
        "onset {} vs silence {}",
        onset.flux_positive,
        quiet_max
    );
    assert!(onset.diff_mags > frames[3].diff_mags);
    assert_eq!(pipeline.skipped_calls(), 0);
}
