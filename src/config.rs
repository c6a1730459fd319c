use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_CACHE_CAPACITY;
use crate::error::{Result, ToolError};

/// Rows handed to the worker pool at a time.
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// Worker threads owned by a reconciler.
pub const DEFAULT_WORKERS: usize = 4;
/// Rows inspected when looking for the header row.
pub const DEFAULT_HEADER_SCAN_DEPTH: usize = 20;

/// Tunables of a reconciliation run. None of them change the output, only
/// how it is computed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconcileConfig {
    pub batch_size: usize,
    pub workers: usize,
    /// Entries per cache table; `0` disables caching.
    pub cache_capacity: usize,
    /// Emit the word-level `Differences` column.
    pub include_diff: bool,
    pub read: ReadOptions,
}

impl Default for ReconcileConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            workers: DEFAULT_WORKERS,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            include_diff: true,
            read: ReadOptions::default(),
        }
    }
}

impl ReconcileConfig {
    /// Loads a configuration from a JSON file. Missing keys keep their
    /// defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let data = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&data)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(ToolError::InvalidConfig(
                "batch_size must be greater than zero".into(),
            ));
        }
        if self.workers == 0 {
            return Err(ToolError::InvalidConfig(
                "workers must be greater than zero".into(),
            ));
        }
        Ok(())
    }
}

/// How input files are located and sliced before reconciliation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReadOptions {
    /// Header names that must all appear in the markup file's header row.
    pub markup_headers: Vec<String>,
    /// Header names that must all appear in the description file's header row.
    pub description_headers: Vec<String>,
    pub header_scan_depth: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            markup_headers: vec!["Product ID".to_string()],
            description_headers: vec![
                "Product ID".to_string(),
                "Product Description".to_string(),
            ],
            header_scan_depth: DEFAULT_HEADER_SCAN_DEPTH,
        }
    }
}
