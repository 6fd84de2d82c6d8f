//! Configuration resolution from command-line flags.

use std::path::{Path, PathBuf};

use datamirror::crawler::DEFAULT_CONCURRENCY;
use datamirror::fetch::{DEFAULT_MAX_RETRIES, DEFAULT_TIMEOUT_MS};
use datamirror::{FetchConfig, DEFAULT_BASE_URL};

/// Default log filter when neither `--log-level` nor `RUST_LOG` is given.
pub const DEFAULT_LOG_LEVEL: &str = "warn";

/// Settings shared by every command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    pub base_url: String,
    pub concurrency: usize,
    pub timeout_ms: u64,
    pub max_retries: u32,
    pub json: bool,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            concurrency: DEFAULT_CONCURRENCY,
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_retries: DEFAULT_MAX_RETRIES,
            json: false,
        }
    }
}

impl CliConfig {
    /// Build from optional flag values, falling back to defaults.
    pub fn resolve(
        base_url: Option<String>,
        concurrency: Option<usize>,
        timeout_ms: Option<u64>,
        max_retries: Option<u32>,
        json: bool,
    ) -> Self {
        let defaults = Self::default();
        Self {
            base_url: base_url.unwrap_or(defaults.base_url),
            concurrency: concurrency.unwrap_or(defaults.concurrency).max(1),
            timeout_ms: timeout_ms.unwrap_or(defaults.timeout_ms),
            max_retries: max_retries.unwrap_or(defaults.max_retries),
            json,
        }
    }

    pub fn fetch_config(&self) -> FetchConfig {
        FetchConfig {
            timeout_ms: self.timeout_ms,
            max_retries: self.max_retries,
            ..FetchConfig::default()
        }
    }
}

/// Resolve the directory datasets are mirrored into.
pub fn resolve_output_dir(explicit: Option<&Path>) -> PathBuf {
    match explicit {
        Some(path) if !path.as_os_str().is_empty() => path.to_path_buf(),
        _ => PathBuf::from("."),
    }
}
