//! Client configuration
//!
//! Defaults, then `config.toml` from the platform config directory, then
//! `GOBARBER_*` environment variables.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::CoreError;
use crate::Result;

const DEFAULT_API_URL: &str = "http://localhost:3333";
const DEFAULT_TIMEOUT_SECS: u64 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the booking API
    pub api_url: String,
    /// Path to the local storage database
    pub database_path: PathBuf,
    pub request_timeout_secs: u64,
}

impl Config {
    pub fn new(data_dir: PathBuf) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            database_path: data_dir.join("gobarber.db"),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    pub fn data_dir() -> PathBuf {
        project_dirs()
            .map(|dirs| dirs.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from(".gobarber"))
    }

    pub fn config_file() -> Option<PathBuf> {
        project_dirs().map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Load from the default config file (if present) and the environment.
    pub fn load() -> Result<Self> {
        let mut config = match Self::config_file() {
            Some(path) if path.exists() => Self::from_file(&path)?,
            _ => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_toml(&raw)
            .map_err(|e| CoreError::Config(format!("{}: {}", path.display(), e)))
    }

    pub fn from_toml(raw: &str) -> Result<Self> {
        toml::from_str(raw).map_err(|e| CoreError::Config(e.to_string()))
    }

    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("GOBARBER_API_URL").filter(|v| !v.is_empty()) {
            self.api_url = url;
        }
        if let Some(path) = lookup("GOBARBER_DATABASE").filter(|v| !v.is_empty()) {
            self.database_path = PathBuf::from(path);
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Self::data_dir())
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("com", "GoBarber", "GoBarber")
}
