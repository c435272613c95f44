//! Configuration management
//!
//! This module handles loading and parsing configuration for the storefront.
//! Configuration can be loaded from:
//! - config.yml file
//! - Environment variables (override file settings)
//!
//! Missing optional values are filled with sensible defaults.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Database configuration
    #[serde(default)]
    pub database: DatabaseConfig,
    /// Session cookie configuration
    #[serde(default)]
    pub session: SessionConfig,
    /// Remote asset store configuration
    #[serde(default)]
    pub assets: AssetConfig,
    /// Template configuration
    #[serde(default)]
    pub templates: TemplateConfig,
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind to
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// SQLite database path or `:memory:`
    #[serde(default = "default_database_url")]
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: default_database_url(),
        }
    }
}

fn default_database_url() -> String {
    "data/storefront.db".to_string()
}

/// Session cookie configuration
///
/// Sessions are entirely client-held: the cookie carries the signed session
/// payload and the server keeps no session state. `duration_secs` is the
/// inactivity timeout applied at issue time; `active_duration_secs` is the
/// sliding extension applied on every request that carries a valid session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Cookie name
    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,
    /// HMAC signing secret
    #[serde(default = "default_session_secret")]
    pub secret: String,
    /// Base session duration in seconds
    #[serde(default = "default_session_duration")]
    pub duration_secs: u64,
    /// Sliding extension in seconds
    #[serde(default = "default_active_duration")]
    pub active_duration_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: default_cookie_name(),
            secret: default_session_secret(),
            duration_secs: default_session_duration(),
            active_duration_secs: default_active_duration(),
        }
    }
}

fn default_cookie_name() -> String {
    "session".to_string()
}

fn default_session_secret() -> String {
    // Development fallback; deployments override via config.yml or
    // STOREFRONT_SESSION_SECRET.
    "storefront-dev-secret-change-me".to_string()
}

fn default_session_duration() -> u64 {
    120
}

fn default_active_duration() -> u64 {
    60
}

/// Remote asset store configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetConfig {
    /// Ingest endpoint the upload pipeline POSTs image bytes to
    #[serde(default = "default_ingest_url")]
    pub ingest_url: String,
    /// Directory served under /public
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            ingest_url: default_ingest_url(),
            public_dir: default_public_dir(),
        }
    }
}

fn default_ingest_url() -> String {
    "http://localhost:9600/ingest".to_string()
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

/// Template configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory containing the .html templates
    #[serde(default = "default_template_path")]
    pub path: PathBuf,
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            path: default_template_path(),
        }
    }
}

fn default_template_path() -> PathBuf {
    PathBuf::from("templates")
}

impl Config {
    /// Load configuration from file.
    ///
    /// If the file doesn't exist or is empty, returns default configuration.
    /// If the file exists but is invalid YAML, returns an error with details.
    pub fn load(path: &std::path::Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("Failed to read config file {:?}: {}", path, e))?;

        if content.trim().is_empty() {
            return Ok(Self::default());
        }

        let config: Config = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Failed to parse config file {:?}: {}", path, e))?;

        Ok(config)
    }

    /// Load configuration from file with environment variable overrides.
    ///
    /// Recognized variables:
    /// - PORT (listen port)
    /// - STOREFRONT_DATABASE_URL
    /// - STOREFRONT_SESSION_SECRET
    /// - STOREFRONT_ASSET_INGEST_URL
    pub fn load_with_env(path: &std::path::Path) -> anyhow::Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(port) = std::env::var("PORT") {
            if let Ok(port) = port.parse::<u16>() {
                self.server.port = port;
            }
        }
        if let Ok(url) = std::env::var("STOREFRONT_DATABASE_URL") {
            self.database.url = url;
        }
        if let Ok(secret) = std::env::var("STOREFRONT_SESSION_SECRET") {
            self.session.secret = secret;
        }
        if let Ok(url) = std::env::var("STOREFRONT_ASSET_INGEST_URL") {
            self.assets.ingest_url = url;
        }
    }
}
