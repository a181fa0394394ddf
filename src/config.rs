//! Configuration loading and management.
//!
//! Lookup order (first found wins, then environment overrides apply):
//! 1. Explicit `--config` path
//! 2. `./task-board.yaml`
//! 3. `~/.task-board/config.yaml`
//! 4. Built-in defaults
//!
//! ## Environment Variables
//! - `TASK_BOARD_DB_PATH` - Database path
//! - `TASK_BOARD_HOST` - Listen address
//! - `TASK_BOARD_PORT` - Listen port

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::warn;

/// Default port for the web UI.
pub const DEFAULT_PORT: u16 = 31995;

/// Project-level config file name.
pub const PROJECT_CONFIG_FILE: &str = "task-board.yaml";

/// Application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
}

/// HTTP server and storage settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Address to listen on.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the SQLite database file.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            db_path: default_db_path(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_db_path() -> PathBuf {
    PathBuf::from(".task-board/tasks.db")
}

impl Config {
    /// Load configuration from file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config file {}", path.display()))?;
        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("parsing config file {}", path.display()))?;
        Ok(config)
    }

    /// Candidate config files, highest priority first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = vec![PathBuf::from(PROJECT_CONFIG_FILE)];
        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".task-board").join("config.yaml"));
        }
        paths
    }

    /// Resolve configuration: an explicit path must load; otherwise the first
    /// existing search path is used, falling back to defaults. Environment
    /// overrides are applied last.
    pub fn discover(explicit: Option<&Path>) -> Result<Self> {
        let mut config = match explicit {
            Some(path) => Self::load(path)?,
            None => Self::first_existing(&Self::search_paths())?,
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    fn first_existing(paths: &[PathBuf]) -> Result<Self> {
        for path in paths {
            if path.is_file() {
                return Self::load(path);
            }
        }
        Ok(Self::default())
    }

    /// Apply `TASK_BOARD_*` overrides read through `lookup`.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db_path) = lookup("TASK_BOARD_DB_PATH") {
            self.server.db_path = PathBuf::from(db_path);
        }

        if let Some(host) = lookup("TASK_BOARD_HOST") {
            self.server.host = host;
        }

        if let Some(port) = lookup("TASK_BOARD_PORT") {
            match port.parse() {
                Ok(port) => self.server.port = port,
                Err(_) => warn!(value = %port, "Ignoring invalid TASK_BOARD_PORT"),
            }
        }
    }

    /// Ensure the database directory exists.
    pub fn ensure_db_dir(&self) -> Result<()> {
        if let Some(parent) = self.server.db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        Ok(())
    }

    /// `host:port` string for binding the listener.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}
