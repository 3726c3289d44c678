// src/config.rs
//! Configuration file parsing
//!
//! Supports an optional TOML file with the following sections:
//! - [metalink] - Hash algorithms and alternate limits for generation
//! - [probe] - HTTP timeout, concurrency bound and user agent for checks
//! - [report] - Home domain and cell width for aggregated reports
//!
//! Every setting has a default, so an empty file (or no file) is valid.
//! Command-line flags override values from the file.

use crate::error::{Error, Result};
use crate::hash::HashAlgorithm;
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// TOML configuration file structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RepomirrorConfig {
    /// Metalink generation settings
    #[serde(default)]
    pub metalink: MetalinkSection,

    /// Mirror probe settings
    #[serde(default)]
    pub probe: ProbeConfig,

    /// Report settings
    #[serde(default)]
    pub report: ReportSection,
}

impl RepomirrorConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            Error::ConfigError(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        Self::parse(&text)
            .map_err(|e| Error::ConfigError(format!("{}: {e}", path.display())))
    }

    /// Parse configuration from TOML text
    pub fn parse(text: &str) -> Result<Self> {
        let config: Self =
            toml::from_str(text).map_err(|e| Error::ConfigError(format!("invalid TOML: {e}")))?;
        config.metalink.hash_algorithms()?;
        Ok(config)
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }
}

/// Metalink configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MetalinkSection {
    /// Hash algorithms listed in `<verification>`
    #[serde(default = "default_hashes")]
    pub hashes: Vec<String>,

    /// Maximum count of alternates, not including the main file (0 = no limit)
    #[serde(default)]
    pub alt_max_count: usize,

    /// Maximum age of alternates in seconds, relative to the main file (0 = no limit)
    #[serde(default = "default_alt_max_age")]
    pub alt_max_age: u64,
}

impl Default for MetalinkSection {
    fn default() -> Self {
        Self {
            hashes: default_hashes(),
            alt_max_count: 0,
            alt_max_age: default_alt_max_age(),
        }
    }
}

impl MetalinkSection {
    /// Parsed hash algorithms
    pub fn hash_algorithms(&self) -> Result<Vec<HashAlgorithm>> {
        self.hashes.iter().map(|name| name.parse()).collect()
    }
}

fn default_hashes() -> Vec<String> {
    HashAlgorithm::ALL.iter().map(|a| a.name().to_string()).collect()
}

fn default_alt_max_age() -> u64 {
    2 * 24 * 3600
}

/// Probe configuration section
///
/// The defaults reproduce an unbounded fan-out with no request timeout.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ProbeConfig {
    /// Per-request timeout in seconds (0 = none)
    #[serde(default)]
    pub timeout_secs: u64,

    /// Maximum probes in flight at once (0 = one per mirror)
    #[serde(default)]
    pub max_concurrent: usize,

    /// Maximum redirects followed per probe
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,

    /// User-Agent header sent to mirrors
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 0,
            max_concurrent: 0,
            max_redirects: default_max_redirects(),
            user_agent: default_user_agent(),
        }
    }
}

impl ProbeConfig {
    /// Request timeout, if one is configured
    pub fn timeout(&self) -> Option<Duration> {
        (self.timeout_secs > 0).then(|| Duration::from_secs(self.timeout_secs))
    }
}

fn default_max_redirects() -> usize {
    10
}

fn default_user_agent() -> String {
    crate::repository::GENERATOR.to_string()
}

/// Report configuration section
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ReportSection {
    /// Mirrors under this domain are listed first
    #[serde(default = "default_home_domain")]
    pub home_domain: String,

    /// Width of a report cell; also how much of a hash is shown
    #[serde(default = "default_cell_width")]
    pub cell_width: usize,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            home_domain: default_home_domain(),
            cell_width: default_cell_width(),
        }
    }
}

fn default_home_domain() -> String {
    "qubes-os.org".to_string()
}

fn default_cell_width() -> usize {
    7
}
