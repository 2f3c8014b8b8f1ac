//! Held-out evaluation: accuracy and per-class precision/recall

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Metrics for a single crop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub label: String,
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    /// Number of held-out samples whose true label is this crop
    pub support: usize,
}

/// Averaged precision/recall/F1
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AverageMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
}

/// Classification report over the union of true and predicted labels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub accuracy: f64,
    pub classes: Vec<ClassMetrics>,
    pub macro_avg: AverageMetrics,
    pub weighted_avg: AverageMetrics,
    pub total_support: usize,
}

/// Fraction of predictions equal to the true label (0 for empty input)
pub fn accuracy<T: AsRef<str>, P: AsRef<str>>(y_true: &[T], y_pred: &[P]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred)
        .filter(|(t, p)| t.as_ref() == p.as_ref())
        .count();
    correct as f64 / y_true.len() as f64
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

impl ClassificationReport {
    /// Build the report; undefined precision/recall/F1 are reported as 0
    pub fn new<T: AsRef<str>, P: AsRef<str>>(y_true: &[T], y_pred: &[P]) -> Self {
        let labels: BTreeSet<&str> = y_true
            .iter()
            .map(AsRef::as_ref)
            .chain(y_pred.iter().map(AsRef::as_ref))
            .collect();

        let classes: Vec<ClassMetrics> = labels
            .into_iter()
            .map(|label| {
                let mut true_positive = 0;
                let mut predicted = 0;
                let mut support = 0;
                for (t, p) in y_true.iter().zip(y_pred) {
                    let is_true = t.as_ref() == label;
                    let is_pred = p.as_ref() == label;
                    if is_true {
                        support += 1;
                    }
                    if is_pred {
                        predicted += 1;
                    }
                    if is_true && is_pred {
                        true_positive += 1;
                    }
                }

                let precision = ratio(true_positive, predicted);
                let recall = ratio(true_positive, support);
                let f1_score = if precision + recall > 0.0 {
                    2.0 * precision * recall / (precision + recall)
                } else {
                    0.0
                };

                ClassMetrics {
                    label: label.to_string(),
                    precision,
                    recall,
                    f1_score,
                    support,
                }
            })
            .collect();

        let total_support: usize = classes.iter().map(|c| c.support).sum();
        let n_classes = classes.len().max(1) as f64;

        let macro_avg = AverageMetrics {
            precision: classes.iter().map(|c| c.precision).sum::<f64>() / n_classes,
            recall: classes.iter().map(|c| c.recall).sum::<f64>() / n_classes,
            f1_score: classes.iter().map(|c| c.f1_score).sum::<f64>() / n_classes,
        };

        let weight = |f: fn(&ClassMetrics) -> f64| {
            if total_support == 0 {
                0.0
            } else {
                classes.iter().map(|c| f(c) * c.support as f64).sum::<f64>()
                    / total_support as f64
            }
        };
        let weighted_avg = AverageMetrics {
            precision: weight(|c| c.precision),
            recall: weight(|c| c.recall),
            f1_score: weight(|c| c.f1_score),
        };

        Self {
            accuracy: accuracy(y_true, y_pred),
            classes,
            macro_avg,
            weighted_avg,
            total_support,
        }
    }

    /// Metrics for one crop, if it appeared in the evaluation
    pub fn class(&self, label: &str) -> Option<&ClassMetrics> {
        self.classes.iter().find(|c| c.label == label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accuracy() {
        assert_eq!(accuracy(&["a", "b", "c", "d"], &["a", "b", "x", "d"]), 0.75);
        assert_eq!(accuracy::<&str, &str>(&[], &[]), 0.0);
    }

    #[test]
    fn test_report_precision_recall() {
        let y_true = ["rice", "rice", "maize", "maize", "jute"];
        let y_pred = ["rice", "maize", "maize", "maize", "rice"];
        let report = ClassificationReport::new(&y_true, &y_pred);

        let rice = report.class("rice").unwrap();
        assert_eq!(rice.support, 2);
        assert!((rice.precision - 0.5).abs() < 1e-9);
        assert!((rice.recall - 0.5).abs() < 1e-9);

        let maize = report.class("maize").unwrap();
        assert!((maize.precision - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(maize.recall, 1.0);
        assert!((maize.f1_score - 0.8).abs() < 1e-9);

        // Never predicted: precision is undefined and reported as zero
        let jute = report.class("jute").unwrap();
        assert_eq!(jute.precision, 0.0);
        assert_eq!(jute.recall, 0.0);
        assert_eq!(jute.f1_score, 0.0);

        assert_eq!(report.total_support, 5);
        assert!((report.accuracy - 0.6).abs() < 1e-9);
    }

    #[test]
    fn test_report_includes_predicted_only_labels() {
        let report = ClassificationReport::new(&["rice"], &["coffee"]);
        let labels: Vec<&str> = report.classes.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["coffee", "rice"]);
        assert_eq!(report.class("coffee").unwrap().support, 0);
    }

    #[test]
    fn test_weighted_average_uses_support() {
        let y_true = ["a", "a", "a", "b"];
        let y_pred = ["a", "a", "a", "a"];
        let report = ClassificationReport::new(&y_true, &y_pred);
        assert!((report.weighted_avg.recall - 0.75).abs() < 1e-9);
        assert!((report.macro_avg.recall - 0.5).abs() < 1e-9);
    }
}
