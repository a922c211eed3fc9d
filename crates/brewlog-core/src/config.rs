//! Application configuration management.
//!
//! This module handles loading and saving the application configuration:
//! the backend URL, which credential store to use, and the last email used
//! to log in.
//!
//! Configuration is stored at `~/.config/brewlog/config.json`. Environment
//! variables override the file for the current process only.

use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Application name used for config/cache directory paths
const APP_NAME: &str = "brewlog";

/// Config file name
const CONFIG_FILE: &str = "config.json";

/// Backend address when nothing else is configured
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Overrides `api_url`
pub const ENV_API_URL: &str = "BREWLOG_API_URL";

/// Overrides `credential_store`
pub const ENV_CREDENTIAL_STORE: &str = "BREWLOG_CREDENTIAL_STORE";

/// Prefills the login email
pub const ENV_EMAIL: &str = "BREWLOG_EMAIL";

/// Prefills the login password. Never written to disk.
pub const ENV_PASSWORD: &str = "BREWLOG_PASSWORD";

/// Where the access token is kept between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreKind {
    /// OS keychain
    #[default]
    Keyring,
    /// JSON file in the cache directory
    File,
    /// Nothing survives the process
    Memory,
}

impl StoreKind {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "keyring" | "keychain" => Some(StoreKind::Keyring),
            "file" => Some(StoreKind::File),
            "memory" | "ephemeral" => Some(StoreKind::Memory),
            _ => None,
        }
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub credential_store: StoreKind,
    #[serde(default)]
    pub last_email: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: default_api_url(),
            credential_store: StoreKind::default(),
            last_email: None,
        }
    }
}

impl Config {
    /// Load the config file (or defaults) and apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        let mut config = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            serde_json::from_str(&contents).context("Failed to parse config file")?
        } else {
            Self::default()
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from `lookup`, normally the process environment.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(ENV_API_URL).filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(raw) = lookup(ENV_CREDENTIAL_STORE) {
            match StoreKind::parse(&raw) {
                Some(kind) => self.credential_store = kind,
                None => warn!(value = %raw, "Unknown credential store, keeping configured one"),
            }
        }
    }

    pub fn save(&self) -> Result<()> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let contents = serde_json::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    fn config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find config directory"))?;
        Ok(config_dir.join(APP_NAME).join(CONFIG_FILE))
    }

    /// Directory for the token file and logs
    pub fn cache_dir(&self) -> Result<PathBuf> {
        let cache_dir = dirs::cache_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not find cache directory"))?;
        Ok(cache_dir.join(APP_NAME))
    }
}
