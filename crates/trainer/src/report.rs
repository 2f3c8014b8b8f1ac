//! Training report rendering

use crate::output::{
    color_accuracy, format_bytes, print_info, print_success, print_warning, OutputFormat,
};
use colored::Colorize;
use crop_lib::evaluation::{AverageMetrics, ClassificationReport};
use crop_lib::{CropPrediction, SoilFeatures};
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

/// Below this the trainer warns but still writes the model
const LOW_ACCURACY: f64 = 0.8;

/// Everything printed after a successful training run
#[derive(Debug, Serialize)]
pub struct TrainingSummary {
    pub dataset: String,
    pub total_samples: usize,
    pub train_samples: usize,
    pub test_samples: usize,
    pub trees: usize,
    pub max_depth: Option<usize>,
    pub seed: u64,
    pub fit_seconds: f64,
    pub artifact_path: String,
    pub artifact_bytes: u64,
    pub report: ClassificationReport,
    pub sample_input: SoilFeatures,
    pub sample_prediction: CropPrediction,
}

#[derive(Tabled)]
struct ClassRow {
    #[tabled(rename = "Crop")]
    crop: String,
    #[tabled(rename = "Precision")]
    precision: String,
    #[tabled(rename = "Recall")]
    recall: String,
    #[tabled(rename = "F1")]
    f1_score: String,
    #[tabled(rename = "Support")]
    support: usize,
}

impl ClassRow {
    fn average(name: &str, avg: &AverageMetrics, support: usize) -> Self {
        Self {
            crop: name.to_string(),
            precision: format!("{:.2}", avg.precision),
            recall: format!("{:.2}", avg.recall),
            f1_score: format!("{:.2}", avg.f1_score),
            support,
        }
    }
}

fn class_rows(report: &ClassificationReport) -> Vec<ClassRow> {
    let mut rows: Vec<ClassRow> = report
        .classes
        .iter()
        .map(|c| ClassRow {
            crop: c.label.clone(),
            precision: format!("{:.2}", c.precision),
            recall: format!("{:.2}", c.recall),
            f1_score: format!("{:.2}", c.f1_score),
            support: c.support,
        })
        .collect();
    rows.push(ClassRow::average("macro avg", &report.macro_avg, report.total_support));
    rows.push(ClassRow::average(
        "weighted avg",
        &report.weighted_avg,
        report.total_support,
    ));
    rows
}

impl TrainingSummary {
    pub fn print(&self, format: OutputFormat) -> anyhow::Result<()> {
        match format {
            OutputFormat::Json => {
                println!("{}", serde_json::to_string_pretty(self)?);
            }
            OutputFormat::Table => self.print_table(),
        }
        Ok(())
    }

    fn print_table(&self) {
        print_info(&format!(
            "Dataset {}: {} samples ({} train / {} test)",
            self.dataset, self.total_samples, self.train_samples, self.test_samples
        ));
        print_info(&format!(
            "Forest: {} trees, max depth {}, seed {}, fitted in {:.2}s",
            self.trees,
            self.max_depth
                .map_or_else(|| "unlimited".to_string(), |d| d.to_string()),
            self.seed,
            self.fit_seconds
        ));

        println!();
        println!(
            "{} {}",
            "Model Accuracy:".bold(),
            color_accuracy(self.report.accuracy)
        );
        if self.report.accuracy < LOW_ACCURACY {
            print_warning("Held-out accuracy is low; check the dataset before deploying");
        }

        println!();
        println!("{}", "Classification Report:".bold());
        let table = Table::new(class_rows(&self.report))
            .with(Style::rounded())
            .to_string();
        println!("{}", table);

        println!();
        print_success(&format!(
            "Model saved to {} ({})",
            self.artifact_path,
            format_bytes(self.artifact_bytes)
        ));
        print_info(&format!(
            "Sample prediction: {} ({:.2}% confidence)",
            self.sample_prediction.crop.green().bold(),
            self.sample_prediction.confidence
        ));
    }
}
