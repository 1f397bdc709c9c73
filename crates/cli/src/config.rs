// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Client configuration.
//!
//! Configuration is stored in `<data dir>/config.toml` and includes:
//! - `api_url`: Base URL of the LearnMate API
//! - `token`: Optional bearer token
//! - `[sync]`: Drain interval and retry bound
//! - `[cache]`: Default and content cache lifetimes
//!
//! Every key is optional; a missing file yields the defaults.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::env;
use crate::error::{Error, Result};
use crate::sync::{SyncConfig, DEFAULT_API_URL};

const APP_DIR_NAME: &str = "learnmate";
const CONFIG_FILE_NAME: &str = "config.toml";
const DB_FILE_NAME: &str = "learnmate.db";

/// Client configuration stored in `config.toml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the LearnMate API.
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Bearer token sent with every request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
    /// Per-request timeout in seconds (default: 30).
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default)]
    pub sync: SyncSection,
    #[serde(default)]
    pub cache: CacheSection,
}

/// `[sync]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncSection {
    /// Seconds between periodic drains (default: 30).
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Failed deliveries tolerated before an item is dropped (default: 3).
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

/// `[cache]` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheSection {
    /// Lifetime of cache entries written without an explicit TTL (default: 24h).
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
    /// Lifetime of cached content reads (default: 30 minutes).
    #[serde(default = "default_content_ttl_secs")]
    pub content_ttl_secs: u64,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_interval_secs() -> u64 {
    30
}

fn default_max_retries() -> u32 {
    3
}

fn default_ttl_secs() -> u64 {
    24 * 60 * 60
}

fn default_content_ttl_secs() -> u64 {
    30 * 60
}

impl Default for SyncSection {
    fn default() -> Self {
        SyncSection {
            interval_secs: default_interval_secs(),
            max_retries: default_max_retries(),
        }
    }
}

impl Default for CacheSection {
    fn default() -> Self {
        CacheSection {
            ttl_secs: default_ttl_secs(),
            content_ttl_secs: default_content_ttl_secs(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_url: default_api_url(),
            token: None,
            request_timeout_secs: default_request_timeout_secs(),
            sync: SyncSection::default(),
            cache: CacheSection::default(),
        }
    }
}

impl Config {
    /// Loads configuration from `data_dir`, falling back to defaults when
    /// the file does not exist.
    pub fn load(data_dir: &Path) -> Result<Self> {
        let config_path = config_path(data_dir);
        if !config_path.exists() {
            return Ok(Config::default());
        }
        let content = fs::read_to_string(&config_path)
            .map_err(|e| Error::Config(format!("failed to read config: {}", e)))?;
        let config: Config = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("failed to parse config: {}", e)))?;
        Ok(config)
    }

    /// Saves configuration to `data_dir`, creating the directory if needed.
    pub fn save(&self, data_dir: &Path) -> Result<()> {
        fs::create_dir_all(data_dir)?;
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("failed to serialize config: {}", e)))?;
        fs::write(config_path(data_dir), content)?;
        Ok(())
    }

    /// Apply `LEARNMATE_API_URL` and `LEARNMATE_TOKEN` overrides.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(env::api_url(), env::token())
    }

    fn with_overrides(mut self, api_url: Option<String>, token: Option<String>) -> Self {
        if let Some(url) = api_url {
            self.api_url = url;
        }
        if token.is_some() {
            self.token = token;
        }
        self
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.ttl_secs)
    }

    pub fn content_ttl(&self) -> Duration {
        Duration::from_secs(self.cache.content_ttl_secs)
    }

    /// Engine settings derived from the `[sync]` table.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig {
            interval: Duration::from_secs(self.sync.interval_secs.max(1)),
            max_retries: self.sync.max_retries,
        }
    }
}

/// Path of the config file inside `data_dir`.
pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE_NAME)
}

/// Path of the SQLite database inside `data_dir`.
pub fn db_path(data_dir: &Path) -> PathBuf {
    data_dir.join(DB_FILE_NAME)
}

/// Find the data directory from the `--data-dir` flag and the environment.
pub fn find_data_dir(flag: Option<PathBuf>) -> Result<PathBuf> {
    resolve_data_dir(flag, env::data_dir(), env::xdg_data_home(), dirs::data_dir())
        .ok_or(Error::NoDataDir)
}

/// Data directory precedence: flag, `LEARNMATE_DATA_DIR`, `$XDG_DATA_HOME`,
/// then the platform data directory.
pub fn resolve_data_dir(
    flag: Option<PathBuf>,
    env_dir: Option<PathBuf>,
    xdg_data_home: Option<PathBuf>,
    platform_dir: Option<PathBuf>,
) -> Option<PathBuf> {
    flag.or(env_dir)
        .or_else(|| xdg_data_home.map(|d| d.join(APP_DIR_NAME)))
        .or_else(|| platform_dir.map(|d| d.join(APP_DIR_NAME)))
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
