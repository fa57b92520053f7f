//! Configuration management for the portal client
//!
//! This module handles loading, parsing, and validation of configuration files.

use crate::constants::{
    CONFIG_DIR_NAME, CONFIG_FILE_NAME, CONFIG_GENERATED, COOKIE_ENV_DEFAULT, CSRF_COOKIE, DEFAULT_PAGE_SIZE,
    MAX_PAGE_SIZE,
};
use crate::cookies::CookieJar;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub session: SessionConfig,
    pub files: FilesConfig,
    pub logging: LoggingConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Portal origin, optionally with a path prefix
    pub base_url: String,
    /// Transport timeout in seconds (0 = no timeout)
    pub request_timeout_secs: u64,
}

/// Session cookie settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Raw `Cookie` header value, e.g. "sessionid=...; csrftoken=..."
    pub cookie: String,
    /// Environment variable consulted when `cookie` is empty
    pub cookie_env: String,
    /// Name of the cookie holding the CSRF token
    pub csrf_cookie_name: String,
}

/// Data files defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FilesConfig {
    pub default_api: String,
    pub default_scheme: String,
    pub default_system: String,
    /// Entries fetched per listing page
    pub page_size: u32,
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Write logs to a file in the data directory
    pub enabled: bool,
    /// One of "error", "warn", "info", "debug", "trace"
    pub level: String,
    /// Explicit log file path, overrides the data directory default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie: String::new(),
            cookie_env: COOKIE_ENV_DEFAULT.to_string(),
            csrf_cookie_name: CSRF_COOKIE.to_string(),
        }
    }
}

impl Default for FilesConfig {
    fn default() -> Self {
        Self {
            default_api: "tapis".to_string(),
            default_scheme: "private".to_string(),
            default_system: String::new(),
            page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            level: "info".to_string(),
            file: None,
        }
    }
}

impl SessionConfig {
    /// Build the cookie jar from the configured header or its environment variable.
    pub fn cookie_jar(&self) -> CookieJar {
        if !self.cookie.is_empty() {
            return CookieJar::parse(&self.cookie);
        }
        match std::env::var(&self.cookie_env) {
            Ok(header) => CookieJar::parse(&header),
            Err(_) => CookieJar::new(),
        }
    }
}

impl LoggingConfig {
    pub fn level_filter(&self) -> Result<log::LevelFilter> {
        self.level
            .parse::<log::LevelFilter>()
            .map_err(|_| anyhow::anyhow!("Invalid log level '{}'", self.level))
    }
}

impl Config {
    /// Load configuration from file or return defaults
    pub fn load() -> Result<Self> {
        let config_path = Self::find_config_file()?;

        if let Some(path) = config_path {
            Self::load_from_file(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Find configuration file in order of precedence
    fn find_config_file() -> Result<Option<PathBuf>> {
        // 1. Check current directory
        let current_dir_config = PathBuf::from(CONFIG_FILE_NAME);
        if current_dir_config.exists() {
            return Ok(Some(current_dir_config));
        }

        // 2. Check XDG config directory
        if let Some(config_dir) = dirs::config_dir() {
            let xdg_config = config_dir.join(CONFIG_DIR_NAME).join("config.toml");
            if xdg_config.exists() {
                return Ok(Some(xdg_config));
            }
        }

        Ok(None)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        let url = reqwest::Url::parse(&self.api.base_url)
            .with_context(|| format!("Invalid base_url '{}'", self.api.base_url))?;
        if url.scheme() != "http" && url.scheme() != "https" {
            anyhow::bail!("base_url must use http or https, got '{}'", url.scheme());
        }

        if self.api.request_timeout_secs > 3600 {
            anyhow::bail!("request_timeout_secs cannot exceed 3600 (1 hour)");
        }

        if self.session.csrf_cookie_name.is_empty() {
            anyhow::bail!("csrf_cookie_name cannot be empty");
        }

        if self.files.page_size == 0 || self.files.page_size > MAX_PAGE_SIZE {
            anyhow::bail!(
                "page_size must be between 1 and {}, got {}",
                MAX_PAGE_SIZE,
                self.files.page_size
            );
        }

        self.logging.level_filter()?;

        Ok(())
    }

    /// Generate default configuration file
    pub fn generate_default_config<P: AsRef<Path>>(path: P) -> Result<()> {
        let config = Self::default();
        let toml_content = toml::to_string_pretty(&config).context("Failed to serialize default config")?;

        // Add header comment
        let header = format!(
            "# Portal Configuration File\n# Generated on {}\n\n",
            chrono::Local::now().format("%Y-%m-%d")
        );

        let full_content = header + &toml_content;

        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create config directory: {}", parent.display()))?;
        }

        std::fs::write(&path, full_content)
            .with_context(|| format!("Failed to write config file: {}", path.as_ref().display()))?;

        println!("{}: {}", CONFIG_GENERATED, path.as_ref().display());
        Ok(())
    }

    /// Get the XDG config directory path
    pub fn get_xdg_config_dir() -> Result<PathBuf> {
        dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))
            .map(|dir| dir.join(CONFIG_DIR_NAME))
    }

    /// Get the default config file path
    pub fn get_default_config_path() -> Result<PathBuf> {
        Ok(Self::get_xdg_config_dir()?.join("config.toml"))
    }
}
