//! Error types for dataset loading, training and inference

use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CropError {
    #[error("dataset not found at {}", .0.display())]
    DatasetNotFound(PathBuf),

    #[error("dataset is empty")]
    EmptyDataset,

    #[error("invalid value in column {column} at line {line}: features must be finite numbers")]
    InvalidRecord { line: usize, column: &'static str },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("training failed: {0}")]
    Training(String),

    #[error("failed to encode model artifact: {0}")]
    ArtifactEncode(#[from] rmp_serde::encode::Error),

    #[error("failed to decode model artifact: {0}")]
    ArtifactDecode(#[from] rmp_serde::decode::Error),

    #[error("unsupported model artifact format version {found} (expected {expected})")]
    UnsupportedArtifactVersion { found: u32, expected: u32 },

    #[error("inference failed: {0}")]
    Inference(String),
}

pub type Result<T> = std::result::Result<T, CropError>;
