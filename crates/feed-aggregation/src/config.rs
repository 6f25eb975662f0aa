//! # Feed Configuration
//!
//! Configuration for the pagination controller and its pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::domain::{
    FeedError, BROKEN_IMAGE_SENTINEL, DEFAULT_GATEWAY_PREFIX, DEFAULT_PAGE_SIZE,
    DEFAULT_RESOLVE_TIMEOUT_MS,
};

/// Feed pipeline configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct FeedConfig {
    /// Entries per page; the unit of windowing.
    pub page_size: usize,

    /// Upper bound on concurrent resolutions within a page.
    /// Clamped to `1..=page_size`.
    pub max_concurrent_resolutions: usize,

    /// Per-resolution time limit in milliseconds.
    pub resolve_timeout_ms: u64,

    /// Prefix stripped from ledger pointers before resolution.
    pub gateway_prefix: String,

    /// Image values that mark a record as broken.
    pub sentinel_images: Vec<String>,

    /// Treat a page with fewer than `page_size` raw entries as the end of data.
    pub end_on_short_page: bool,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_concurrent_resolutions: DEFAULT_PAGE_SIZE,
            resolve_timeout_ms: DEFAULT_RESOLVE_TIMEOUT_MS,
            gateway_prefix: DEFAULT_GATEWAY_PREFIX.to_string(),
            sentinel_images: vec![BROKEN_IMAGE_SENTINEL.to_string()],
            end_on_short_page: true,
        }
    }
}

impl FeedConfig {
    /// Create a config for testing (short timeouts).
    pub fn for_testing() -> Self {
        Self {
            resolve_timeout_ms: 500,
            ..Self::default()
        }
    }

    /// Load a JSON config file; missing fields take their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self, FeedError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| FeedError::InvalidConfig(format!("{}: {e}", path.display())))?;
        let config: Self = serde_json::from_str(&raw)
            .map_err(|e| FeedError::InvalidConfig(format!("{}: {e}", path.display())))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the pipeline cannot run with.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.page_size == 0 {
            return Err(FeedError::InvalidConfig(
                "page_size must be at least 1".to_string(),
            ));
        }
        if self.resolve_timeout_ms == 0 {
            return Err(FeedError::InvalidConfig(
                "resolve_timeout_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Effective fan-out bound.
    pub fn concurrency(&self) -> usize {
        self.max_concurrent_resolutions.clamp(1, self.page_size.max(1))
    }

    /// Per-resolution time limit.
    pub fn resolve_timeout(&self) -> Duration {
        Duration::from_millis(self.resolve_timeout_ms)
    }
}
