//! Run configuration for a screening run.
//!
//! A [`ScreenConfig`] can be loaded from a JSON file; every field is optional
//! and falls back to its default:
//!
//! ```json
//! {
//!   "oligo_length": 18,
//!   "tile_size": 1024,
//!   "memory_budget_bytes": 268435456,
//!   "top_k": 1,
//!   "score_threshold": 0.9,
//!   "offset_search": false,
//!   "length_mismatch": "abort",
//!   "max_tile_retries": 8,
//!   "threads": 0
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::matching::engine::{
    MatchingConfig, DEFAULT_MAX_TILE_RETRIES, DEFAULT_MEMORY_BUDGET_BYTES, DEFAULT_TILE_SIZE,
};
use crate::matching::filter::DEFAULT_SCORE_THRESHOLD;
use crate::store::LengthMismatchPolicy;
use crate::utils::validation::{check_oligo_length, is_valid_threshold};

/// Default query oligo length
pub const DEFAULT_OLIGO_LENGTH: usize = 18;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Everything a screening run is parameterized by.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreenConfig {
    /// Length of every query oligo
    pub oligo_length: usize,
    /// Oligos per tile side
    pub tile_size: usize,
    /// Score buffer budget per tile, in bytes
    pub memory_budget_bytes: usize,
    /// Best masters kept per query
    pub top_k: usize,
    /// Minimum score for a hit to be reported
    pub score_threshold: f64,
    /// Allow masters longer than queries and search every offset
    pub offset_search: bool,
    pub length_mismatch: LengthMismatchPolicy,
    pub max_tile_retries: u32,
    /// Worker threads (0 = all cores)
    pub threads: usize,
}

impl Default for ScreenConfig {
    fn default() -> Self {
        Self {
            oligo_length: DEFAULT_OLIGO_LENGTH,
            tile_size: DEFAULT_TILE_SIZE,
            memory_budget_bytes: DEFAULT_MEMORY_BUDGET_BYTES,
            top_k: 1,
            score_threshold: DEFAULT_SCORE_THRESHOLD,
            offset_search: false,
            length_mismatch: LengthMismatchPolicy::Abort,
            max_tile_retries: DEFAULT_MAX_TILE_RETRIES,
            threads: 0,
        }
    }
}

impl ScreenConfig {
    /// Load a configuration from a JSON file.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Read` if the file cannot be read,
    /// `ConfigError::Parse` if it is not valid JSON for this type, and
    /// `ConfigError::Invalid` if the values fail [`validate`](Self::validate).
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` naming the first offending field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if let Some(msg) = check_oligo_length(self.oligo_length) {
            return Err(ConfigError::Invalid(msg));
        }
        if self.tile_size == 0 {
            return Err(ConfigError::Invalid("tile_size must be positive".to_string()));
        }
        if self.memory_budget_bytes == 0 {
            return Err(ConfigError::Invalid(
                "memory_budget_bytes must be positive".to_string(),
            ));
        }
        if self.top_k == 0 {
            return Err(ConfigError::Invalid("top_k must be positive".to_string()));
        }
        if !is_valid_threshold(self.score_threshold) {
            return Err(ConfigError::Invalid(format!(
                "score_threshold must be within [0, 1], got {}",
                self.score_threshold
            )));
        }
        Ok(())
    }

    /// The engine-facing subset of this configuration
    #[must_use]
    pub fn matching_config(&self) -> MatchingConfig {
        MatchingConfig {
            tile_size: self.tile_size,
            memory_budget_bytes: self.memory_budget_bytes,
            top_k: self.top_k,
            offset_search: self.offset_search,
            max_tile_retries: self.max_tile_retries,
            threads: self.threads,
        }
    }
}
