//! Crop Trainer - offline training for the crop recommendation model
//!
//! Loads a labeled CSV, fits a random forest on a seeded 80/20 split,
//! reports held-out metrics and writes the model artifact read by
//! `crop-server`.

mod output;
mod report;

use anyhow::{Context, Result};
use clap::Parser;
use crop_lib::{
    artifact::{ModelArtifact, DEFAULT_MODEL_PATH},
    dataset::{Dataset, DEFAULT_SEED, DEFAULT_TEST_SIZE},
    forest::{ForestConfig, DEFAULT_MAX_DEPTH, DEFAULT_N_TREES},
    predictor::{ForestPredictor, Predictor},
    training::{train, TrainingConfig},
    CropPrediction, StructuredLogger, SAMPLE_FEATURES,
};
use output::{print_error, OutputFormat};
use report::TrainingSummary;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// Crop recommendation model trainer
#[derive(Parser)]
#[command(name = "crop-trainer")]
#[command(author, version, about = "Train the crop recommendation model", long_about = None)]
pub struct Cli {
    /// Labeled CSV with N, P, K, temperature, humidity, ph, rainfall, label
    #[arg(long, short, env = "CROP_DATA", default_value = "crop_data.csv")]
    pub data: PathBuf,

    /// Where to write the trained model (overwritten if present)
    #[arg(long, short, env = "CROP_MODEL_PATH", default_value = DEFAULT_MODEL_PATH)]
    pub output: PathBuf,

    /// Number of trees in the forest
    #[arg(long, default_value_t = DEFAULT_N_TREES)]
    pub trees: usize,

    /// Maximum tree depth (0 for unlimited)
    #[arg(long, default_value_t = DEFAULT_MAX_DEPTH)]
    pub max_depth: usize,

    /// Seed for the train/test split and bootstrap sampling
    #[arg(long, default_value_t = DEFAULT_SEED)]
    pub seed: u64,

    /// Fraction of rows held out for evaluation
    #[arg(long, default_value_t = DEFAULT_TEST_SIZE)]
    pub test_size: f64,

    /// Output format
    #[arg(long, short, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(long, short)]
    pub verbose: bool,
}

impl Cli {
    fn training_config(&self) -> TrainingConfig {
        TrainingConfig {
            test_size: self.test_size,
            split_seed: self.seed,
            forest: ForestConfig {
                n_trees: self.trees,
                max_depth: (self.max_depth > 0).then_some(self.max_depth),
                seed: self.seed,
            },
        }
    }
}

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .compact()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    if let Err(e) = run(&cli) {
        print_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> Result<()> {
    let logger = StructuredLogger::new("crop-trainer");

    let dataset = Dataset::load(&cli.data)
        .with_context(|| format!("Failed to load training data from {}", cli.data.display()))?;

    let config = cli.training_config();
    let outcome = train(&dataset, &config).context("Training failed")?;

    let (predictor, sample_prediction, artifact_bytes) =
        predict_then_save(outcome.artifact, &cli.output)?;

    let artifact_path = cli.output.display().to_string();
    logger.log_training_complete(
        dataset.len(),
        predictor.classes().len(),
        outcome.report.accuracy,
        &artifact_path,
        artifact_bytes,
    );

    let summary = TrainingSummary {
        dataset: cli.data.display().to_string(),
        total_samples: dataset.len(),
        train_samples: outcome.split.train.len(),
        test_samples: outcome.split.test.len(),
        trees: config.forest.n_trees,
        max_depth: config.forest.max_depth,
        seed: cli.seed,
        fit_seconds: outcome.fit_duration.as_secs_f64(),
        artifact_path,
        artifact_bytes,
        report: outcome.report,
        sample_input: SAMPLE_FEATURES,
        sample_prediction,
    };
    summary.print(cli.format)
}

/// Run the sample prediction, then write the artifact. A model that cannot
/// predict is never written.
fn predict_then_save(
    artifact: ModelArtifact,
    path: &Path,
) -> Result<(ForestPredictor, CropPrediction, u64)> {
    let predictor = ForestPredictor::new(artifact);
    let sample_prediction = predictor
        .predict(&SAMPLE_FEATURES)
        .context("Sample prediction failed")?;

    let artifact_bytes = predictor
        .artifact()
        .save(path)
        .with_context(|| format!("Failed to write model to {}", path.display()))?;

    Ok((predictor, sample_prediction, artifact_bytes))
}
