use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

use crate::{Error, Result};

/// Engine configuration, loaded from `~/.conductor/conductor.toml`.
///
/// Every field has a default, so a missing or partial file works.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Name of the channel tasks are dispatched on.
    pub dispatch_queue: String,
    /// Name of the channel completions arrive on.
    pub completion_queue: String,
    /// Buffer capacity for the in-process channels.
    pub channel_capacity: usize,
    /// Retry bound for optimistic version conflicts.
    pub max_version_retries: u32,
    /// Simulated work duration per task, in milliseconds.
    pub task_duration_ms: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            dispatch_queue: "task_queue".to_string(),
            completion_queue: "task_completion_queue".to_string(),
            channel_capacity: 64,
            max_version_retries: 3,
            task_duration_ms: 50,
        }
    }
}

impl Config {
    pub fn conductor_dir() -> Result<PathBuf> {
        Ok(dirs::home_dir().ok_or(Error::NoHomeDir)?.join(".conductor"))
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::conductor_dir()?.join("conductor.toml"))
    }

    /// Simulated work duration as a [`Duration`].
    pub fn work_duration(&self) -> Duration {
        Duration::from_millis(self.task_duration_ms)
    }

    /// Load the config from the default path, falling back to defaults
    /// when no file exists.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            debug!(path = %path.display(), "config file not found, using defaults");
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load the config from an explicit path.
    pub fn load_from(path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(&fs::read_to_string(path)?)?;
        debug!(
            path = %path.display(),
            dispatch_queue = %config.dispatch_queue,
            completion_queue = %config.completion_queue,
            "config loaded"
        );
        Ok(config)
    }

    pub fn save(&self) -> Result<()> {
        let dir = Self::conductor_dir()?;
        if !dir.exists() {
            fs::create_dir_all(&dir)?;
        }
        let path = Self::config_path()?;
        fs::write(&path, toml::to_string_pretty(self)?)?;
        debug!(path = %path.display(), "config saved");
        Ok(())
    }
}
