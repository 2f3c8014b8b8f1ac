//! Server configuration

use anyhow::Result;
use crop_lib::artifact::DEFAULT_MODEL_PATH;
use serde::Deserialize;
use std::path::PathBuf;

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path of the artifact written by crop-trainer
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Restrict CORS to a single origin; any origin is allowed when unset
    #[serde(default)]
    pub cors_origin: Option<String>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5001
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            model_path: default_model_path(),
            cors_origin: None,
        }
    }
}

impl ServerConfig {
    /// Load configuration from an optional `crop-server` file and `CROP_*`
    /// environment variables (environment wins)
    pub fn load() -> Result<Self> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("crop-server").required(false))
            .add_source(config::Environment::with_prefix("CROP"))
            .build()?;

        Ok(config.try_deserialize()?)
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
