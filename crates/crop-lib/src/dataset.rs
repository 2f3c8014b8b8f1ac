//! Labeled soil/climate dataset
//!
//! Loads training samples from CSV and produces the deterministic
//! train/test split used by the trainer.

use crate::error::{CropError, Result};
use crate::models::{CropRecord, FEATURE_COLUMNS, NUM_FEATURES};
use ndarray::Array2;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

/// Default fraction of rows held out for evaluation
pub const DEFAULT_TEST_SIZE: f64 = 0.2;

/// Default seed for the split and the forest
pub const DEFAULT_SEED: u64 = 42;

/// Ordered collection of labeled samples
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    records: Vec<CropRecord>,
}

/// Result of splitting a dataset into training and held-out partitions
#[derive(Debug, Clone)]
pub struct DatasetSplit {
    pub train: Dataset,
    pub test: Dataset,
}

impl Dataset {
    pub fn from_records(records: Vec<CropRecord>) -> Self {
        Self { records }
    }

    /// Load a dataset from a CSV file with a header row.
    ///
    /// Columns are matched by name; extra columns are ignored. Non-finite
    /// feature values (`NaN`, `inf`) are rejected with their line number.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(CropError::DatasetNotFound(path.to_path_buf()));
        }

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)?;

        let mut records = Vec::new();
        for (idx, row) in reader.deserialize::<CropRecord>().enumerate() {
            let record = row?;
            // Line 1 is the header
            check_finite(&record, idx + 2)?;
            records.push(record);
        }

        debug!(path = %path.display(), rows = records.len(), "Loaded dataset");
        Ok(Self { records })
    }

    pub fn records(&self) -> &[CropRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Sorted, de-duplicated label vocabulary
    pub fn class_names(&self) -> Vec<String> {
        self.records
            .iter()
            .map(|r| r.label.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Labels in row order
    pub fn labels(&self) -> Vec<&str> {
        self.records.iter().map(|r| r.label.as_str()).collect()
    }

    /// Feature matrix (rows x [`NUM_FEATURES`]) in column order
    pub fn feature_matrix(&self) -> Array2<f64> {
        let mut matrix = Array2::zeros((self.records.len(), NUM_FEATURES));
        for (mut row, record) in matrix.rows_mut().into_iter().zip(&self.records) {
            for (cell, value) in row.iter_mut().zip(record.features().to_array()) {
                *cell = value;
            }
        }
        matrix
    }

    /// Shuffle row indices with a seeded RNG and hold out `ceil(n * test_size)`
    /// rows for evaluation. The same dataset and seed always give the same split.
    pub fn split(&self, test_size: f64, seed: u64) -> Result<DatasetSplit> {
        if self.records.is_empty() {
            return Err(CropError::EmptyDataset);
        }
        if !(test_size > 0.0 && test_size < 1.0) {
            return Err(CropError::Training(format!(
                "test size must be between 0 and 1, got {}",
                test_size
            )));
        }

        let n_samples = self.records.len();
        let n_test = (n_samples as f64 * test_size).ceil() as usize;

        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let (test_idx, train_idx) = indices.split_at(n_test.min(n_samples));
        let pick = |idx: &[usize]| Dataset {
            records: idx.iter().map(|&i| self.records[i].clone()).collect(),
        };

        Ok(DatasetSplit {
            train: pick(train_idx),
            test: pick(test_idx),
        })
    }
}

fn check_finite(record: &CropRecord, line: usize) -> Result<()> {
    let values = record.features().to_array();
    match values.iter().position(|v| !v.is_finite()) {
        Some(col) => Err(CropError::InvalidRecord {
            line,
            column: FEATURE_COLUMNS[col],
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SoilFeatures;
    use std::io::Write;

    fn records(count: usize) -> Vec<CropRecord> {
        (0..count)
            .map(|i| {
                let v = i as f64;
                CropRecord::new(
                    SoilFeatures::from_array([v, v + 1.0, v + 2.0, 20.0, 80.0, 6.5, 200.0]),
                    if i % 2 == 0 { "rice" } else { "maize" },
                )
            })
            .collect()
    }

    #[test]
    fn test_load_missing_file() {
        let err = Dataset::load("/nonexistent/crop_data.csv").unwrap_err();
        assert!(matches!(err, CropError::DatasetNotFound(_)));
    }

    #[test]
    fn test_load_csv_by_header_name() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "label,rainfall,ph,humidity,temperature,K,P,N,extra").unwrap();
        writeln!(file, "rice,202.9,6.5,82.0,20.8,43,42,90,x").unwrap();
        writeln!(file, " maize , 65.1 , 6.1 , 60.2 , 22.6 , 20 , 48 , 71 ,y").unwrap();

        let dataset = Dataset::load(file.path()).unwrap();
        assert_eq!(dataset.len(), 2);
        assert_eq!(dataset.records()[0].nitrogen, 90.0);
        assert_eq!(dataset.records()[0].rainfall, 202.9);
        assert_eq!(dataset.records()[1].label, "maize");
    }

    #[test]
    fn test_load_missing_column_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "N,P,K,temperature,humidity,ph,label").unwrap();
        writeln!(file, "90,42,43,20.8,82.0,6.5,rice").unwrap();

        let err = Dataset::load(file.path()).unwrap_err();
        assert!(matches!(err, CropError::Csv(_)));
    }

    #[test]
    fn test_load_non_numeric_value_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "N,P,K,temperature,humidity,ph,rainfall,label").unwrap();
        writeln!(file, "lots,42,43,20.8,82.0,6.5,202.9,rice").unwrap();

        assert!(Dataset::load(file.path()).is_err());
    }

    #[test]
    fn test_load_non_finite_value_fails() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "N,P,K,temperature,humidity,ph,rainfall,label").unwrap();
        writeln!(file, "90,42,43,20.8,82.0,6.5,202.9,rice").unwrap();
        writeln!(file, "85,58,41,21.7,80.3,7.0,226.6,rice").unwrap();
        writeln!(file, "60,55,44,23.0,82.3,7.8,inf,rice").unwrap();
        writeln!(file, "NaN,35,40,26.4,80.1,6.9,242.8,rice").unwrap();

        let err = Dataset::load(file.path()).unwrap_err();
        match err {
            CropError::InvalidRecord { line, column } => {
                assert_eq!(line, 4);
                assert_eq!(column, "rainfall");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_split_sizes() {
        let dataset = Dataset::from_records(records(101));
        let split = dataset.split(0.2, DEFAULT_SEED).unwrap();
        assert_eq!(split.test.len(), 21);
        assert_eq!(split.train.len(), 80);
    }

    #[test]
    fn test_split_is_deterministic() {
        let dataset = Dataset::from_records(records(50));
        let a = dataset.split(0.2, 7).unwrap();
        let b = dataset.split(0.2, 7).unwrap();
        assert_eq!(a.test.records(), b.test.records());
        assert_eq!(a.train.records(), b.train.records());

        let c = dataset.split(0.2, 8).unwrap();
        assert_ne!(a.test.records(), c.test.records());
    }

    #[test]
    fn test_split_rejects_bad_test_size() {
        let dataset = Dataset::from_records(records(10));
        assert!(dataset.split(0.0, 1).is_err());
        assert!(dataset.split(1.0, 1).is_err());
        assert!(matches!(
            Dataset::default().split(0.2, 1),
            Err(CropError::EmptyDataset)
        ));
    }

    #[test]
    fn test_feature_matrix_column_order() {
        let dataset = Dataset::from_records(records(3));
        let matrix = dataset.feature_matrix();
        assert_eq!(matrix.dim(), (3, NUM_FEATURES));
        assert_eq!(matrix[[2, 0]], 2.0);
        assert_eq!(matrix[[2, 2]], 4.0);
        assert_eq!(matrix[[2, 6]], 200.0);
    }

    #[test]
    fn test_class_names_sorted_unique() {
        let dataset = Dataset::from_records(records(6));
        assert_eq!(dataset.class_names(), vec!["maize", "rice"]);
    }
}
