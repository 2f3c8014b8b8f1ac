//! Training pipeline: split, fit, evaluate
//!
//! The outcome carries everything the trainer reports, including the split,
//! so the held-out evaluation can be repeated against a reloaded artifact.

use crate::artifact::ModelArtifact;
use crate::dataset::{Dataset, DatasetSplit, DEFAULT_SEED, DEFAULT_TEST_SIZE};
use crate::error::{CropError, Result};
use crate::evaluation::ClassificationReport;
use crate::forest::{ForestConfig, RandomForest};
use std::time::{Duration, Instant};
use tracing::info;

/// Configuration for a training run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TrainingConfig {
    /// Fraction of rows held out for evaluation
    pub test_size: f64,
    /// Seed for the split; the forest carries its own seed
    pub split_seed: u64,
    pub forest: ForestConfig,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: DEFAULT_TEST_SIZE,
            split_seed: DEFAULT_SEED,
            forest: ForestConfig::default(),
        }
    }
}

/// Result of a training run
#[derive(Debug)]
pub struct TrainingOutcome {
    pub artifact: ModelArtifact,
    pub report: ClassificationReport,
    pub split: DatasetSplit,
    pub fit_duration: Duration,
}

impl TrainingOutcome {
    pub fn accuracy(&self) -> f64 {
        self.report.accuracy
    }
}

/// Evaluate a forest against a labeled dataset
pub fn evaluate(forest: &RandomForest, dataset: &Dataset) -> Result<ClassificationReport> {
    if dataset.is_empty() {
        return Err(CropError::EmptyDataset);
    }
    let predictions = forest.predict(dataset.feature_matrix().view())?;
    Ok(ClassificationReport::new(&dataset.labels(), &predictions))
}

/// Split the dataset, fit the forest on the training partition and evaluate
/// it on the held-out partition. Nothing is written to disk.
pub fn train(dataset: &Dataset, config: &TrainingConfig) -> Result<TrainingOutcome> {
    let split = dataset.split(config.test_size, config.split_seed)?;
    if split.train.is_empty() {
        return Err(CropError::Training(
            "training partition is empty; dataset too small for the test size".to_string(),
        ));
    }

    info!(
        train_samples = split.train.len(),
        test_samples = split.test.len(),
        trees = config.forest.n_trees,
        max_depth = ?config.forest.max_depth,
        "Fitting random forest"
    );

    let start = Instant::now();
    let forest = RandomForest::fit(
        &split.train.feature_matrix(),
        &split.train.labels(),
        config.forest,
    )?;
    let fit_duration = start.elapsed();

    let report = evaluate(&forest, &split.test)?;
    let artifact = ModelArtifact::new(forest, report.accuracy);

    Ok(TrainingOutcome {
        artifact,
        report,
        split,
        fit_duration,
    })
}
