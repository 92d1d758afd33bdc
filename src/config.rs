use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ReleaseError, Result};

/// File name looked up in the working directory and the user config directory
pub const CONFIG_FILE_NAME: &str = "release-validator.toml";

/// Represents the complete configuration for release-validator.
///
/// Contains the release marker location, git remote and CI settings.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub release: ReleaseConfig,

    #[serde(default)]
    pub ci: CiConfig,
}

fn default_version_file() -> String {
    "VERSION.txt".to_string()
}

fn default_remote() -> String {
    "origin".to_string()
}

/// Where release-train state lives in git.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ReleaseConfig {
    /// Marker file holding "MAJOR.MINOR.0-rc0" before a minor line's first RC
    #[serde(default = "default_version_file")]
    pub version_file: String,

    /// Remote that release branches are checked on
    #[serde(default = "default_remote")]
    pub remote: String,
}

impl Default for ReleaseConfig {
    fn default() -> Self {
        ReleaseConfig {
            version_file: default_version_file(),
            remote: default_remote(),
        }
    }
}

fn default_job_name() -> String {
    "Tests".to_string()
}

fn default_api_url() -> String {
    crate::ci::github::GITHUB_API.to_string()
}

fn default_token_env() -> String {
    "GITHUB_TOKEN".to_string()
}

fn default_timeout_secs() -> u64 {
    crate::ci::github::DEFAULT_TIMEOUT_SECS
}

fn default_poll_interval_secs() -> u64 {
    30
}

fn default_wait_timeout_secs() -> u64 {
    30 * 60
}

/// CI platform settings.
///
/// The CI check runs only when the variable named by `token_env` is set.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct CiConfig {
    /// Workflow whose success gates a final release
    #[serde(default = "default_job_name")]
    pub job_name: String,

    #[serde(default = "default_api_url")]
    pub api_url: String,

    /// "owner/name"; derived from the environment or remote URL when unset
    #[serde(default)]
    pub repository: Option<String>,

    #[serde(default = "default_token_env")]
    pub token_env: String,

    /// Per-request HTTP timeout
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    #[serde(default = "default_wait_timeout_secs")]
    pub wait_timeout_secs: u64,
}

impl Default for CiConfig {
    fn default() -> Self {
        CiConfig {
            job_name: default_job_name(),
            api_url: default_api_url(),
            repository: None,
            token_env: default_token_env(),
            timeout_secs: default_timeout_secs(),
            poll_interval_secs: default_poll_interval_secs(),
            wait_timeout_secs: default_wait_timeout_secs(),
        }
    }
}

/// Locate the configuration file to use, if any.
///
/// Search order:
/// 1. Custom path provided as parameter
/// 2. `release-validator.toml` in `base_dir`
/// 3. `release-validator.toml` in the user config directory
pub fn find_config(config_path: Option<&Path>, base_dir: &Path) -> Option<PathBuf> {
    if let Some(path) = config_path {
        return Some(path.to_path_buf());
    }

    let local = base_dir.join(CONFIG_FILE_NAME);
    if local.exists() {
        return Some(local);
    }

    dirs::config_dir()
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .filter(|path| path.exists())
}

/// Loads configuration from file or returns defaults.
///
/// # Arguments
/// * `config_path` - Optional path to custom configuration file
/// * `base_dir` - Directory searched for a local configuration file
///
/// # Returns
/// * `Ok(Config)` - Loaded or default configuration
/// * `Err` - If a file exists but cannot be read or parsed
pub fn load_config(config_path: Option<&Path>, base_dir: &Path) -> Result<Config> {
    let Some(path) = find_config(config_path, base_dir) else {
        return Ok(Config::default());
    };

    let config_str = fs::read_to_string(&path).map_err(|e| {
        ReleaseError::config(format!("Cannot read {}: {}", path.display(), e))
    })?;

    let config: Config = toml::from_str(&config_str)
        .map_err(|e| ReleaseError::config(format!("Cannot parse {}: {}", path.display(), e)))?;

    tracing::debug!(path = %path.display(), "loaded configuration");
    Ok(config)
}
