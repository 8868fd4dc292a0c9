//! Configuration management for Marketeer
//!
//! Loads and saves completion, search and profile settings as JSON.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, info, warn};

pub mod paths;

pub use paths::{config_path, data_dir, profile_path};

/// Environment fallback for the completion API key
pub const COMPLETION_KEY_ENV: &str = "QWEN_API_KEY";
/// Environment fallback for the search API key
pub const SEARCH_KEY_ENV: &str = "TAVILY_API_KEY";

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config not found: {0}")]
    NotFound(PathBuf),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Completion service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_api_base(),
            model: default_model(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

fn default_api_base() -> String {
    "https://dashscope-intl.aliyuncs.com/compatible-mode/v1".to_string()
}

fn default_model() -> String {
    "qwen-max".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

/// Trend search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default)]
    pub api_key: String,
    #[serde(default = "default_search_base")]
    pub api_base: String,
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            api_base: default_search_base(),
            search_depth: default_search_depth(),
        }
    }
}

fn default_search_base() -> String {
    "https://api.tavily.com".to_string()
}

fn default_search_depth() -> String {
    "basic".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ToolkitConfig {
    #[serde(default)]
    pub search: SearchConfig,
}

/// Business profile location
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProfileConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

/// Root configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub provider: ProviderConfig,
    #[serde(default)]
    pub toolkit: ToolkitConfig,
    #[serde(default)]
    pub profile: ProfileConfig,
}

impl Config {
    /// Load from the default location
    pub async fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path).await
    }

    /// Load from a specific location, falling back to defaults when absent
    pub async fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            info!("no config at {:?}, using defaults", path);
            return Ok(Config::default());
        }

        debug!("loading config from {:?}", path);
        let content = tokio::fs::read_to_string(path).await?;
        let config: Config = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save to the default location
    pub async fn save(&self) -> Result<()> {
        let path = config_path();
        self.save_to(&path).await
    }

    /// Save to a specific location
    pub async fn save_to(&self, path: &Path) -> Result<()> {
        debug!("writing config to {:?}", path);

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let content = serde_json::to_string_pretty(self)?;
        tokio::fs::write(path, content).await?;
        Ok(())
    }

    /// Completion API key, from config or `QWEN_API_KEY`
    pub fn api_key(&self) -> Option<String> {
        non_empty(self.provider.api_key.clone()).or_else(|| env_key(COMPLETION_KEY_ENV))
    }

    pub fn has_api_key(&self) -> bool {
        self.api_key().is_some()
    }

    pub fn api_base(&self) -> Option<String> {
        non_empty(self.provider.api_base.clone())
    }

    pub fn default_model(&self) -> String {
        self.provider.model.clone()
    }

    /// Search API key, from config or `TAVILY_API_KEY`
    pub fn search_api_key(&self) -> Option<String> {
        non_empty(self.toolkit.search.api_key.clone()).or_else(|| env_key(SEARCH_KEY_ENV))
    }

    /// Business profile path, `~` expanded
    pub fn profile_path(&self) -> PathBuf {
        match &self.profile.path {
            Some(path) if !path.is_empty() => paths::expand_home(path),
            _ => profile_path(),
        }
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

fn env_key(var: &str) -> Option<String> {
    std::env::var(var).ok().and_then(non_empty)
}

/// Initialize the data directory and default config
pub async fn init() -> Result<Config> {
    init_in(&data_dir()).await
}

/// Initialize a data directory rooted at `dir`
pub async fn init_in(dir: &Path) -> Result<Config> {
    let config_path = dir.join("config.json");

    if config_path.exists() {
        warn!("config already exists at {:?}", config_path);
    } else {
        Config::default().save_to(&config_path).await?;
        info!("config written to {:?}", config_path);
    }

    paths::ensure_dir(dir).await?;
    Config::load_from(&config_path).await
}
