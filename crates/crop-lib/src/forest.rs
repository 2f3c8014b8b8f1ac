//! Random forest classifier built from `linfa-trees` decision trees
//!
//! Each tree is fitted on a bootstrap sample of the training rows. The
//! class-probability distribution for an input is the share of trees voting
//! for each class; the predicted label is its argmax.

use crate::error::{CropError, Result};
use crate::models::NUM_FEATURES;
use linfa::prelude::*;
use linfa_trees::{DecisionTree, SplitQuality};
use ndarray::{Array1, Array2, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Default number of trees
pub const DEFAULT_N_TREES: usize = 100;

/// Default maximum depth per tree
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Forest hyperparameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees in the ensemble
    pub n_trees: usize,
    /// Maximum depth of each tree
    pub max_depth: Option<usize>,
    /// Base seed; tree `i` draws its bootstrap sample from `seed + i`
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: DEFAULT_N_TREES,
            max_depth: Some(DEFAULT_MAX_DEPTH),
            seed: crate::dataset::DEFAULT_SEED,
        }
    }
}

/// Fitted random forest
#[derive(Debug, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    classes: Vec<String>,
    trees: Vec<DecisionTree<f64, usize>>,
}

impl RandomForest {
    /// Fit a forest on `records` (rows x [`NUM_FEATURES`]) and string labels.
    ///
    /// Class indices refer to the sorted, de-duplicated label set.
    pub fn fit(records: &Array2<f64>, labels: &[&str], config: ForestConfig) -> Result<Self> {
        let n_samples = records.nrows();
        if n_samples == 0 {
            return Err(CropError::EmptyDataset);
        }
        if records.ncols() != NUM_FEATURES {
            return Err(CropError::Training(format!(
                "expected {} feature columns, got {}",
                NUM_FEATURES,
                records.ncols()
            )));
        }
        if labels.len() != n_samples {
            return Err(CropError::Training(format!(
                "{} labels for {} rows",
                labels.len(),
                n_samples
            )));
        }
        if config.n_trees == 0 {
            return Err(CropError::Training("forest needs at least one tree".to_string()));
        }

        if records.iter().any(|v| !v.is_finite()) {
            return Err(CropError::Training(
                "feature values must be finite numbers".to_string(),
            ));
        }

        let mut classes: Vec<String> = labels.iter().map(|l| l.to_string()).collect();
        classes.sort();
        classes.dedup();
        if classes.len() < 2 {
            return Err(CropError::Training(format!(
                "need at least two distinct crops to train, found {}",
                classes.len()
            )));
        }

        let index: HashMap<&str, usize> = classes
            .iter()
            .enumerate()
            .map(|(i, c)| (c.as_str(), i))
            .collect();
        let targets: Array1<usize> = labels.iter().map(|l| index[l]).collect();

        let params = DecisionTree::<f64, usize>::params()
            .split_quality(SplitQuality::Gini)
            .max_depth(config.max_depth);

        let trees = (0..config.n_trees)
            .into_par_iter()
            .map(|tree_idx| {
                let mut rng = ChaCha8Rng::seed_from_u64(config.seed.wrapping_add(tree_idx as u64));
                let sample: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();

                let dataset = DatasetBase::new(
                    records.select(Axis(0), &sample),
                    targets.select(Axis(0), &sample),
                );
                params
                    .fit(&dataset)
                    .map_err(|e| CropError::Training(format!("tree {}: {}", tree_idx, e)))
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(
            trees = trees.len(),
            classes = classes.len(),
            samples = n_samples,
            "Fitted random forest"
        );

        Ok(Self {
            config,
            classes,
            trees,
        })
    }

    /// Class labels the forest can emit, sorted and de-duplicated
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Per-row class probabilities (rows x classes), each row summing to 1
    pub fn predict_proba(&self, records: ArrayView2<f64>) -> Result<Array2<f64>> {
        if records.ncols() != NUM_FEATURES {
            return Err(CropError::Inference(format!(
                "expected {} features, got {}",
                NUM_FEATURES,
                records.ncols()
            )));
        }
        if self.trees.is_empty() {
            return Err(CropError::Inference("forest has no trees".to_string()));
        }

        let n_classes = self.classes.len();
        let mut votes = Array2::<f64>::zeros((records.nrows(), n_classes));
        for tree in &self.trees {
            let predictions: Array1<usize> = tree.predict(&records);
            for (row, class_idx) in predictions.iter().enumerate() {
                if *class_idx >= n_classes {
                    return Err(CropError::Inference(format!(
                        "tree voted for unknown class index {}",
                        class_idx
                    )));
                }
                votes[[row, *class_idx]] += 1.0;
            }
        }

        votes /= self.trees.len() as f64;
        Ok(votes)
    }

    /// Predicted label per row: the class with the highest probability,
    /// ties resolved towards the first class in sorted order
    pub fn predict(&self, records: ArrayView2<f64>) -> Result<Vec<String>> {
        let proba = self.predict_proba(records)?;
        Ok(proba
            .rows()
            .into_iter()
            .map(|row| self.classes[argmax(row.iter().copied())].clone())
            .collect())
    }
}

/// Index of the first maximum
pub(crate) fn argmax(values: impl IntoIterator<Item = f64>) -> usize {
    let mut best_idx = 0;
    let mut best = f64::NEG_INFINITY;
    for (idx, value) in values.into_iter().enumerate() {
        if value > best {
            best = value;
            best_idx = idx;
        }
    }
    best_idx
}
