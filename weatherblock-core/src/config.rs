use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// OpenWeatherMap API key. Absent until the operator configures one;
    /// fetches fail fast with `MissingCredential` while it is unset.
    pub api_key: Option<String>,

    /// Lifetime of a cached snapshot, in seconds.
    pub cache_ttl_secs: u64,

    /// Requests allowed per client per window.
    pub rate_limit: u32,

    /// Rate-limit window, in seconds.
    pub rate_window_secs: u64,

    /// Provider API base URL.
    pub api_base: String,

    /// CDN base for condition icons.
    pub icon_base: String,

    /// Bind address for the HTTP server.
    pub listen_addr: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            cache_ttl_secs: Self::DEFAULT_CACHE_TTL_SECS,
            rate_limit: Self::DEFAULT_RATE_LIMIT,
            rate_window_secs: Self::DEFAULT_RATE_WINDOW_SECS,
            api_base: "https://api.openweathermap.org/data/2.5".to_string(),
            icon_base: "https://openweathermap.org".to_string(),
            listen_addr: "0.0.0.0:8080".to_string(),
        }
    }
}

impl Config {
    pub const DEFAULT_CACHE_TTL_SECS: u64 = 900;
    pub const DEFAULT_RATE_LIMIT: u32 = 30;
    pub const DEFAULT_RATE_WINDOW_SECS: u64 = 3600;

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weatherblock", "weatherblock")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply environment overrides on top of the file values.
    ///
    /// `WEATHERBLOCK_API_KEY` and `WEATHERBLOCK_LISTEN_ADDR` win over the
    /// config file so deployments can inject the secret without writing it
    /// to disk.
    pub fn apply_env(&mut self) {
        if let Ok(key) = std::env::var("WEATHERBLOCK_API_KEY") {
            if !key.trim().is_empty() {
                self.api_key = Some(key.trim().to_string());
            }
        }
        if let Ok(addr) = std::env::var("WEATHERBLOCK_LISTEN_ADDR") {
            if !addr.trim().is_empty() {
                self.listen_addr = addr.trim().to_string();
            }
        }
    }

    /// Set or replace the provider API key.
    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// Remove the provider API key.
    pub fn clear_api_key(&mut self) {
        self.api_key = None;
    }

    /// Returns the API key, if present.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_secs)
    }

    pub fn rate_window(&self) -> Duration {
        Duration::from_secs(self.rate_window_secs)
    }
}
