//! Tunables for index construction and search.
//!
//! All fields have defaults, so a config file only needs to name the values
//! it overrides.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SearchError};

/// Files larger than this (in bytes) are never indexed (1 GiB).
pub const MAX_READABLE_FILE_SIZE: u64 = 1 << 30;

/// Streaming granularity used while building trigram sets.
pub const READ_CHUNK_SIZE: usize = 1000;

/// Per-file trigram cap; files above it drop out of the pre-filter.
pub const MAX_TRIGRAM_SET_SIZE: usize = 20_000;

/// Buffer size for confirmation scans (64KB).
pub const SCAN_CHUNK_SIZE: usize = 64 * 1024;

pub const MIN_PATTERN_LEN: usize = 3;
pub const MAX_PATTERN_LEN: usize = 1000;

/// Index and search configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Hard ceiling for indexable files, in bytes.
    pub max_readable_file_size: u64,
    /// Chunk size used while streaming a file into its trigram set.
    pub read_chunk_size: usize,
    /// Maximum number of distinct trigrams a single file may hold.
    pub max_trigram_set_size: usize,
    /// Chunk size used by confirmation scans.
    pub scan_chunk_size: usize,
    /// Shortest pattern a session accepts.
    pub min_pattern_len: usize,
    /// Longest pattern a session accepts.
    pub max_pattern_len: usize,
    /// Index files on the rayon pool instead of the worker thread alone.
    pub parallel_indexing: bool,
    /// Descend into hidden files and directories.
    pub include_hidden: bool,
    /// Honor `.gitignore` / `.ignore` files while walking roots.
    pub respect_ignore_files: bool,
    /// Follow symbolic links while walking roots.
    pub follow_links: bool,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            max_readable_file_size: MAX_READABLE_FILE_SIZE,
            read_chunk_size: READ_CHUNK_SIZE,
            max_trigram_set_size: MAX_TRIGRAM_SET_SIZE,
            scan_chunk_size: SCAN_CHUNK_SIZE,
            min_pattern_len: MIN_PATTERN_LEN,
            max_pattern_len: MAX_PATTERN_LEN,
            parallel_indexing: false,
            include_hidden: true,
            respect_ignore_files: false,
            follow_links: false,
        }
    }
}

impl IndexConfig {
    /// Loads a config from a JSON file and validates it.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw).map_err(|error| SearchError::Config {
            path: path.to_path_buf(),
            message: error.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the builder and engine cannot work with.
    pub fn validate(&self) -> Result<()> {
        if self.read_chunk_size == 0 {
            return Err(SearchError::InvalidConfig(
                "read_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.scan_chunk_size == 0 {
            return Err(SearchError::InvalidConfig(
                "scan_chunk_size must be greater than zero".to_string(),
            ));
        }
        if self.min_pattern_len > self.max_pattern_len {
            return Err(SearchError::InvalidConfig(format!(
                "min_pattern_len ({}) exceeds max_pattern_len ({})",
                self.min_pattern_len, self.max_pattern_len
            )));
        }
        Ok(())
    }

    /// Checks a pattern against the configured length bounds.
    ///
    /// Length is measured in bytes, the unit the index works in.
    pub fn validate_pattern(&self, pattern: &str) -> Result<()> {
        let len = pattern.len();
        if len < self.min_pattern_len {
            return Err(SearchError::InvalidPattern(format!(
                "pattern must be at least {} bytes long, got {len}",
                self.min_pattern_len
            )));
        }
        if len > self.max_pattern_len {
            return Err(SearchError::InvalidPattern(format!(
                "pattern must be at most {} bytes long, got {len}",
                self.max_pattern_len
            )));
        }
        Ok(())
    }
}
