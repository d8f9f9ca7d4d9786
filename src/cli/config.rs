//! CLI profile configuration
//!
//! A profile is a small YAML file holding the server URL and local paths.
//! Resolution order for the server URL: `--server` flag, `TASKDECK_SERVER`
//! environment variable, profile file.

use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable overriding the server URL
pub const SERVER_ENV: &str = "TASKDECK_SERVER";

/// Profile file contents
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Profile {
    /// Base URL of the Taskdeck API
    #[serde(default)]
    pub server_url: Option<String>,

    /// Request timeout in seconds
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Where session credentials are persisted
    #[serde(default)]
    pub credentials_path: Option<PathBuf>,
}

impl Profile {
    /// Load a profile from a YAML file
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(serde_yaml::from_str(&contents)?)
    }

    /// Load the default profile if one exists, otherwise an empty profile
    pub fn load_default() -> Result<Self> {
        match default_config_path() {
            Some(path) if path.exists() => Self::load(&path),
            _ => Ok(Self::default()),
        }
    }
}

/// Default profile location: `~/.config/taskdeck/config.yaml`
pub fn default_config_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("taskdeck")
            .join("config.yaml"),
    )
}

/// Default credentials location: `~/.config/taskdeck/credentials.json`
pub fn default_credentials_path() -> Option<PathBuf> {
    let home = std::env::var_os("HOME")?;
    Some(
        PathBuf::from(home)
            .join(".config")
            .join("taskdeck")
            .join("credentials.json"),
    )
}
