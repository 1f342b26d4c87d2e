use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use spectral_engine::config::AppConfig;
use spectral_engine::pipeline::{FeaturePipeline, FeatureSummary, FrameFeatures};
use spectral_engine::signal::{read_wav, SyntheticPattern, SyntheticSpec};

#[derive(Parser, Debug)]
#[command(
    name = "spectral_cli",
    about = "Offline harness for the streaming spectral analyzers"
)]
struct Cli {
    /// JSON config file (defaults are used when omitted or unreadable)
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Debug-level logging on stderr
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Analyse a whole input and print a JSON report
    Analyze {
        #[command(flatten)]
        input: InputArgs,
        #[arg(long)]
        output: Option<PathBuf>,
        /// Leave per-frame features out of the report
        #[arg(long)]
        summary_only: bool,
    },
    /// Print one JSON line of features per frame
    Stream {
        #[command(flatten)]
        input: InputArgs,
    },
    /// Print the effective configuration as JSON
    DumpConfig,
}

#[derive(Args, Debug)]
struct InputArgs {
    /// Mono WAV file to analyse
    #[arg(long, conflicts_with = "synth", required_unless_present = "synth")]
    input: Option<PathBuf>,
    /// Generate a synthetic signal instead of reading a file
    #[arg(long, value_enum)]
    synth: Option<SyntheticPattern>,
    /// Synthetic tone / impulse rate in Hz
    #[arg(long, default_value_t = 440.0)]
    frequency: f32,
    /// Synthetic signal length in milliseconds
    #[arg(long, default_value_t = 500)]
    duration_ms: u32,
    /// Synthetic signal sample rate in Hz
    #[arg(long, default_value_t = 48000)]
    sample_rate: u32,
}

/// Samples plus where they came from
struct LoadedInput {
    source: String,
    samples: Vec<f32>,
    sample_rate: u32,
}

impl InputArgs {
    fn load(&self) -> Result<LoadedInput> {
        if let Some(pattern) = self.synth {
            let len = (self.duration_ms as u64 * self.sample_rate as u64 / 1000) as usize;
            let samples = SyntheticSpec::new(pattern)
                .with_frequency(self.frequency)
                .render(self.sample_rate, len);
            return Ok(LoadedInput {
                source: format!("synth:{:?}", pattern).to_lowercase(),
                samples,
                sample_rate: self.sample_rate,
            });
        }

        let path = self
            .input
            .as_deref()
            .context("either --input or --synth is required")?;
        let (samples, sample_rate) =
            read_wav(path).with_context(|| format!("loading input {}", path.display()))?;
        Ok(LoadedInput {
            source: path.display().to_string(),
            samples,
            sample_rate,
        })
    }
}

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn run() -> Result<ExitCode> {
    let cli = Cli::parse();
    spectral_engine::init_logging(cli.verbose);
    let config = load_config(cli.config.as_deref());

    match cli.command {
        Commands::Analyze {
            input,
            output,
            summary_only,
        } => run_analyze(&config, &input, output, summary_only),
        Commands::Stream { input } => run_stream(&config, &input),
        Commands::DumpConfig => run_dump_config(&config),
    }
}

fn load_config(path: Option<&Path>) -> AppConfig {
    match path {
        Some(path) => AppConfig::load_from_file(path),
        None => AppConfig::default(),
    }
}

fn analyse(config: &AppConfig, input: &LoadedInput) -> Result<Vec<FrameFeatures>> {
    let mut pipeline = FeaturePipeline::new(config, input.sample_rate)
        .with_context(|| format!("building pipeline for {}", input.source))?;
    let frames = pipeline
        .process_signal(&input.samples)
        .with_context(|| format!("analysing {}", input.source))?;
    if pipeline.skipped_calls() > 0 {
        log::warn!("{} analyzer calls were skipped", pipeline.skipped_calls());
    }
    Ok(frames)
}

fn run_analyze(
    config: &AppConfig,
    input: &InputArgs,
    output_path: Option<PathBuf>,
    summary_only: bool,
) -> Result<ExitCode> {
    let loaded = input.load()?;
    let frames = analyse(config, &loaded)?;

    let report = AnalysisReportPayload {
        source: &loaded.source,
        sample_rate: loaded.sample_rate,
        config,
        frame_count: frames.len(),
        summary: FeatureSummary::from_frames(&frames),
        frames: if summary_only { &[] } else { frames.as_slice() },
    };
    let json = serde_json::to_string_pretty(&report)?;

    if let Some(path) = output_path {
        fs::write(&path, json).with_context(|| format!("writing {}", path.display()))?;
    } else {
        println!("{json}");
    }

    Ok(ExitCode::from(0))
}

fn run_stream(config: &AppConfig, input: &InputArgs) -> Result<ExitCode> {
    let loaded = input.load()?;
    for features in analyse(config, &loaded)? {
        println!("{}", serde_json::to_string(&features)?);
    }
    Ok(ExitCode::from(0))
}

fn run_dump_config(config: &AppConfig) -> Result<ExitCode> {
    println!("{}", config.to_json_pretty()?);
    Ok(ExitCode::from(0))
}

#[derive(Serialize)]
struct AnalysisReportPayload<'a> {
    source: &'a str,
    sample_rate: u32,
    config: &'a AppConfig,
    frame_count: usize,
    summary: FeatureSummary,
    #[serde(skip_serializing_if = "slice_empty")]
    frames: &'a [FrameFeatures],
}

fn slice_empty(frames: &&[FrameFeatures]) -> bool {
    frames.is_empty()
}
