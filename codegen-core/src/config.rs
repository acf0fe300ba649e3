//! Service configuration
//!
//! Built once at startup from defaults, an optional TOML file and a few
//! environment overrides, then handed to the components that need it.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default Gemini `generateContent` endpoint
pub const DEFAULT_GEMINI_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent";

/// Main configuration for the service
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Generation endpoint and credential
    pub gemini: GeminiConfig,

    /// History ledger backend
    pub storage: StorageConfig,

    /// Statistics cache
    pub cache: CacheConfig,

    /// HTTP listener
    pub server: ServerConfig,
}

impl ServiceConfig {
    /// Load configuration from file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config: Self = toml::from_str(&content).context("Failed to parse config file")?;

        Ok(config)
    }

    /// Resolve the effective configuration: file (if any), then environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        Ok(config.with_env_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply `GEMINI_API_KEY`, `GEMINI_API_URL`, `CODEGEN_DB_PATH` and
    /// `CODEGEN_PORT` from `lookup`
    pub fn with_env_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("GEMINI_API_KEY") {
            self.gemini.api_key = Some(key);
        }
        if let Some(url) = lookup("GEMINI_API_URL").filter(|u| !u.trim().is_empty()) {
            self.gemini.api_url = url;
        }
        if let Some(path) = lookup("CODEGEN_DB_PATH").filter(|p| !p.trim().is_empty()) {
            self.storage.path = PathBuf::from(path);
        }
        if let Some(port) = lookup("CODEGEN_PORT").and_then(|p| p.parse().ok()) {
            self.server.port = port;
        }
        self
    }
}

/// Generation endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeminiConfig {
    /// Full `generateContent` URL; the key is appended as a query parameter
    pub api_url: String,

    /// API key; `None` or a placeholder means "not configured"
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self { api_url: DEFAULT_GEMINI_URL.to_string(), api_key: None, timeout_secs: 30 }
    }
}

/// Which ledger implementation to open
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

/// History storage configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub backend: StorageBackend,

    /// SQLite database file
    pub path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self { backend: StorageBackend::Sqlite, path: PathBuf::from("data/code_history.db") }
    }
}

/// Statistics cache configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Lifetime of a cached aggregate in seconds
    pub ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 5 }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 8080 }
    }
}
