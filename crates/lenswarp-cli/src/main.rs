//! lenswarp CLI — apply or correct radial lens distortion on an image file.

use clap::{Parser, ValueEnum};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use lenswarp::{DistortionConfig, DistortionEngine, Extrapolation, OutputFormat};

type CliError = Box<dyn std::error::Error>;
type CliResult<T> = Result<T, CliError>;

#[derive(Parser)]
#[command(name = "lenswarp")]
#[command(about = "Simulate or correct cubic radial lens distortion on an image")]
#[command(version)]
struct Cli {
    /// Path to the input image.
    input: PathBuf,

    /// Path to write the processed image; the extension picks the format.
    output: PathBuf,

    /// Operation to run.
    #[arg(value_enum)]
    mode: ModeArg,

    /// JSON configuration file (model coefficients, fit and resampling settings).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Path to write the operation report (JSON).
    #[arg(long)]
    report: Option<PathBuf>,

    /// Out-of-range behavior of the interpolation passes.
    #[arg(long, value_enum)]
    extrapolation: Option<ExtrapolationArg>,

    /// Number of correction resampling passes.
    #[arg(long)]
    passes: Option<usize>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Distortion,
    Correction,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ExtrapolationArg {
    Clamp,
    Linear,
    Zero,
}

impl ExtrapolationArg {
    fn to_core(self) -> Extrapolation {
        match self {
            Self::Clamp => Extrapolation::Clamp,
            Self::Linear => Extrapolation::Linear,
            Self::Zero => Extrapolation::Constant(0.0),
        }
    }
}

impl Cli {
    fn to_config(&self) -> CliResult<DistortionConfig> {
        let mut config = match &self.config {
            Some(path) => {
                tracing::info!("Loading config: {}", path.display());
                DistortionConfig::from_json_file(path)?
            }
            None => DistortionConfig::default(),
        };
        if let Some(ex) = self.extrapolation {
            config.extrapolation = ex.to_core();
        }
        if let Some(passes) = self.passes {
            config.refinement_passes = passes;
        }
        config.validate().map_err(|msg| -> CliError {
            format!("Invalid configuration: {msg}").into()
        })?;
        Ok(config)
    }
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> CliResult<()> {
    // Fail on an unwritable output format before decoding anything.
    let format = OutputFormat::from_path(&cli.output)?;
    tracing::debug!("Output format: {:?}", format);

    let config = cli.to_config()?;
    if !config.model.is_monotonic_on(500.0, 1.0) {
        tracing::warn!("Radial model is not monotonic on [0, 500]; results may fold");
    }

    let mut engine = DistortionEngine::new(config);
    engine.load_file(&cli.input)?;

    let report_json = match cli.mode {
        ModeArg::Distortion => {
            let report = engine.add_distortion()?;
            serde_json::to_string_pretty(&report)?
        }
        ModeArg::Correction => {
            let report = engine.correct_distortion()?;
            if report.fit.used_model_fallback {
                tracing::info!("Image too small for the sample grid; inverse fitted to the model");
            }
            serde_json::to_string_pretty(&report)?
        }
    };

    engine.save_file(&cli.output)?;
    tracing::info!("Image written to {}", cli.output.display());

    if let Some(path) = &cli.report {
        write_report(path, &report_json)?;
    }
    Ok(())
}

fn write_report(path: &Path, json: &str) -> CliResult<()> {
    std::fs::write(path, json)?;
    tracing::info!("Report written to {}", path.display());
    Ok(())
}
