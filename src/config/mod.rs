//! Host configuration

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings of the simulated device. Nothing here changes what is validated.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Delay between the verdict and the restart
    pub restart_delay_ms: u64,
    /// Name of the test task
    pub task_name: String,
    /// Stack size of the test task in bytes
    pub task_stack_size: usize,
    /// Filter directive used when RUST_LOG is unset
    pub log_level: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            restart_delay_ms: 60_000,
            task_name: "srtp_test_task".to_string(),
            task_stack_size: 256 * 1024,
            log_level: None,
        }
    }
}

impl Config {
    /// Get config file path
    fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("com", "srtp-selftest", "srtp-selftest")
            .context("Could not determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Load configuration from `path`, or from the default location.
    ///
    /// A missing file yields the defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => Self::config_path()?,
        };

        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::parse(&content)
    }

    fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    pub fn restart_delay(&self) -> Duration {
        Duration::from_millis(self.restart_delay_ms)
    }
}
