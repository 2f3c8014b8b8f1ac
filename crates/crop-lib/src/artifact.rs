//! Persisted model artifact
//!
//! The fitted forest is written as MessagePack together with a small
//! header. The trainer writes it once; the service reads it once at startup.

use crate::error::{CropError, Result};
use crate::forest::RandomForest;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{debug, info};

/// Current artifact layout version
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Default artifact file name
pub const DEFAULT_MODEL_PATH: &str = "crop_model.msgpack";

/// Trained model plus metadata recorded at training time
#[derive(Debug, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub format_version: u32,
    /// Unix timestamp of training
    pub trained_at: i64,
    /// Accuracy on the held-out split, in [0, 1]
    pub held_out_accuracy: f64,
    pub forest: RandomForest,
}

impl ModelArtifact {
    pub fn new(forest: RandomForest, held_out_accuracy: f64) -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            trained_at: chrono::Utc::now().timestamp(),
            held_out_accuracy,
            forest,
        }
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(rmp_serde::to_vec_named(self)?)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let artifact: ModelArtifact = rmp_serde::from_slice(bytes)?;
        if artifact.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CropError::UnsupportedArtifactVersion {
                found: artifact.format_version,
                expected: ARTIFACT_FORMAT_VERSION,
            });
        }
        Ok(artifact)
    }

    /// Write the artifact, replacing any existing file at `path`.
    ///
    /// Returns the number of bytes written.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<u64> {
        let path = path.as_ref();
        let bytes = self.to_bytes()?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        // Readers never observe a partially written artifact
        let tmp = path.with_extension("tmp");
        fs::write(&tmp, &bytes)?;
        fs::rename(&tmp, path)?;

        info!(path = %path.display(), size_bytes = bytes.len(), "Saved model artifact");
        Ok(bytes.len() as u64)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = fs::read(path)?;
        let artifact = Self::from_bytes(&bytes)?;
        debug!(
            path = %path.display(),
            classes = artifact.forest.classes().len(),
            trees = artifact.forest.n_trees(),
            "Loaded model artifact"
        );
        Ok(artifact)
    }
}
