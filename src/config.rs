use std::fs;
use std::path::Path;

use glob::Pattern;
use serde::Deserialize;

use crate::errors::{PinError, Result};

/// Conventional name for a configuration file passed via `--config`.
pub const CONFIG_FILENAME: &str = "actionpin.json";

/// Default base URL of the reference lookup API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Configuration for a pinning run.
///
/// Controls where references are looked up and which files in a directory
/// are treated as workflow files.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct PinConfig {
    /// Base URL of the GitHub REST API (override for GitHub Enterprise).
    pub api_base_url: String,
    /// `User-Agent` header sent with every lookup request.
    pub user_agent: String,
    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
    /// Glob patterns a file name must match to be processed.
    pub include: Vec<String>,
    /// Glob patterns that exclude a file name from processing.
    pub exclude: Vec<String>,
}

impl Default for PinConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            user_agent: concat!("actionpin/", env!("CARGO_PKG_VERSION")).to_string(),
            timeout_secs: 30,
            include: vec!["*.yml".to_string(), "*.yaml".to_string()],
            exclude: Vec::new(),
        }
    }
}

/// Loads the configuration from `path`.
///
/// With no path the defaults are returned. Missing fields in the file fall
/// back to their default values.
pub fn load_config(path: Option<&Path>) -> Result<PinConfig> {
    let Some(config_path) = path else {
        return Ok(PinConfig::default());
    };

    let contents = fs::read_to_string(config_path).map_err(|e| PinError::Config {
        message: format!(
            "failed to read config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    let config: PinConfig = serde_json::from_str(&contents).map_err(|e| PinError::Config {
        message: format!(
            "failed to parse config file '{}': {}",
            config_path.display(),
            e
        ),
    })?;

    if config.include.is_empty() {
        return Err(PinError::Config {
            message: format!(
                "config file '{}' has an empty include list",
                config_path.display()
            ),
        });
    }

    Ok(config)
}

/// Determines whether a workflow file should be processed based on the
/// configuration's include and exclude glob patterns.
///
/// Patterns are matched against the bare file name. Exclude patterns take
/// precedence.
pub fn should_include_file(file_name: &str, config: &PinConfig) -> bool {
    let match_opts = glob::MatchOptions {
        case_sensitive: true,
        require_literal_separator: true,
        require_literal_leading_dot: false,
    };

    for pattern_str in &config.exclude {
        if let Ok(pattern) = Pattern::new(pattern_str) {
            if pattern.matches_with(file_name, match_opts) {
                return false;
            }
        }
    }

    config.include.iter().any(|pattern_str| {
        Pattern::new(pattern_str)
            .map(|pattern| pattern.matches_with(file_name, match_opts))
            .unwrap_or(false)
    })
}
