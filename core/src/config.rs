use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::DashResult;

/// Tunables for the CSV upload pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    /// Rows per database round-trip.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Upload size ceiling in bytes.
    #[serde(default = "default_max_file_bytes")]
    pub max_file_bytes: u64,
    /// Accepted file extension (lowercase, no dot).
    #[serde(default = "default_extension")]
    pub allowed_extension: String,
}

fn default_batch_size() -> usize {
    5_000
}

fn default_max_file_bytes() -> u64 {
    100 * 1024 * 1024
}

fn default_extension() -> String {
    "csv".into()
}

impl Default for UploadConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            max_file_bytes: default_max_file_bytes(),
            allowed_extension: default_extension(),
        }
    }
}

impl UploadConfig {
    pub fn from_file(path: &Path) -> DashResult<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {e}", path.display()))?;
        Ok(serde_json::from_str(&raw)?)
    }
}
