//! Configuration management
//!
//! This module handles loading and validation of the roleplay configuration.
//! Configuration is stored in TOML format, by default at ~/.roleplay/config.toml.
//! When that file does not exist the built-in defaults are used; nothing is
//! written to disk.
//!
//! # Configuration Sections
//!
//! - **core**: Log level
//! - **server**: Bind host and port for the HTTP endpoint layer
//! - **llm**: Text-generation provider settings
//! - **data**: Catalog and role script locations
//! - **transcript**: Whether the chat transcript is shared or per session
//!
//! # Credentials
//!
//! The Gemini API key is never stored in the config file. The config only names
//! the environment variable that holds it (`GEMINI_API_KEY` by default). A
//! missing key is not an error at load time; calls to the provider fail later
//! and are recovered by the engine.
//!
//! # Examples
//!
//! ```no_run
//! use roleplay_engine::config::Config;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::load_or_default()?;
//! println!("Listening on {}:{}", config.server.host, config.server.port);
//! println!("Model: {}", config.llm.gemini.model);
//! # Ok(())
//! # }
//! ```

use crate::secrets::SecretString;
use sdk::errors::EngineError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure
///
/// Every section is optional in the file and falls back to its defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Core settings
    #[serde(default)]
    pub core: CoreConfig,

    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// LLM provider configuration
    #[serde(default)]
    pub llm: LLMConfig,

    /// Catalog and script sources
    #[serde(default)]
    pub data: DataConfig,

    /// Chat transcript partitioning
    #[serde(default)]
    pub transcript: TranscriptConfig,
}

/// Core configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Log level (error, warn, info, debug, trace)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Interface to bind
    #[serde(default = "default_host")]
    pub host: String,

    /// TCP port
    #[serde(default = "default_port")]
    pub port: u16,
}

/// LLM provider configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LLMConfig {
    /// Gemini provider settings
    #[serde(default)]
    pub gemini: GeminiConfig,
}

/// Gemini provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// Base URL for Gemini API
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,

    /// Model name
    #[serde(default = "default_gemini_model")]
    pub model: String,

    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
}

/// Catalog and role script locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// JSON array of product records; preferred when present
    #[serde(default = "default_products_json")]
    pub products_json: PathBuf,

    /// CSV product table with a header row; used when the JSON file is absent
    #[serde(default = "default_products_csv")]
    pub products_csv: PathBuf,

    /// Directory holding `seller_script.txt` and `buyer_script.txt`
    #[serde(default = "default_script_dir")]
    pub script_dir: PathBuf,

    /// Number of catalog entries included in each composed prompt
    #[serde(default = "default_catalog_excerpt")]
    pub catalog_excerpt: usize,
}

/// How the chat transcript is partitioned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TranscriptScope {
    /// One transcript for every session
    #[default]
    Shared,

    /// One transcript per session identifier
    Session,
}

/// Transcript configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TranscriptConfig {
    #[serde(default)]
    pub scope: TranscriptScope,
}

// Default value functions
fn default_log_level() -> String {
    "info".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com/v1beta".to_string()
}

fn default_gemini_model() -> String {
    "gemini-1.5-pro-latest".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_products_json() -> PathBuf {
    PathBuf::from("products.json")
}

fn default_products_csv() -> PathBuf {
    PathBuf::from("products.csv")
}

fn default_script_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_catalog_excerpt() -> usize {
    5
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            base_url: default_gemini_base_url(),
            model: default_gemini_model(),
            api_key_env: default_api_key_env(),
        }
    }
}

impl GeminiConfig {
    /// Read the API key from the configured environment variable
    ///
    /// Returns `None` when the variable is unset or blank.
    pub fn api_key(&self) -> Option<SecretString> {
        std::env::var(&self.api_key_env)
            .ok()
            .filter(|key| !key.trim().is_empty())
            .map(SecretString::new)
    }
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            products_json: default_products_json(),
            products_csv: default_products_csv(),
            script_dir: default_script_dir(),
            catalog_excerpt: default_catalog_excerpt(),
        }
    }
}

impl Config {
    /// Load configuration from the default location (~/.roleplay/config.toml)
    ///
    /// Falls back to the built-in defaults when the file doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read, parsed or
    /// validated.
    pub fn load_or_default() -> Result<Self, EngineError> {
        match Self::default_config_path() {
            Some(path) if path.exists() => Self::load_from_path(&path),
            _ => {
                let mut config = Self::default();
                config.validate_and_process()?;
                Ok(config)
            }
        }
    }

    /// Load configuration from a specific path
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - File cannot be read
    /// - TOML parsing fails
    /// - Validation fails
    pub fn load_from_path(path: &Path) -> Result<Self, EngineError> {
        let contents = fs::read_to_string(path)
            .map_err(|e| EngineError::Config(format!("Failed to read config file: {}", e)))?;

        Self::from_toml_str(&contents)
    }

    /// Parse and validate configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self, EngineError> {
        let mut config: Config = toml::from_str(contents)
            .map_err(|e| EngineError::Config(format!("Failed to parse config: {}", e)))?;

        config.validate_and_process()?;

        Ok(config)
    }

    /// Get the default configuration file path (~/.roleplay/config.toml)
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".roleplay").join("config.toml"))
    }

    /// Address string for the HTTP listener
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    /// Validate and process configuration
    ///
    /// Expands ~ in data paths and checks value ranges.
    fn validate_and_process(&mut self) -> Result<(), EngineError> {
        let valid_log_levels = ["error", "warn", "info", "debug", "trace"];
        if !valid_log_levels.contains(&self.core.log_level.as_str()) {
            return Err(EngineError::Config(format!(
                "Invalid log level '{}'. Must be one of: {}",
                self.core.log_level,
                valid_log_levels.join(", ")
            )));
        }

        if self.server.port == 0 {
            return Err(EngineError::Config("server.port must not be 0".to_string()));
        }

        if self.llm.gemini.model.trim().is_empty() {
            return Err(EngineError::Config(
                "llm.gemini.model must not be empty".to_string(),
            ));
        }

        if self.llm.gemini.api_key_env.trim().is_empty() {
            return Err(EngineError::Config(
                "llm.gemini.api_key_env must not be empty".to_string(),
            ));
        }

        if self.data.catalog_excerpt == 0 {
            return Err(EngineError::Config(
                "data.catalog_excerpt must be at least 1".to_string(),
            ));
        }

        self.data.products_json = expand_path(&self.data.products_json)?;
        self.data.products_csv = expand_path(&self.data.products_csv)?;
        self.data.script_dir = expand_path(&self.data.script_dir)?;

        Ok(())
    }
}

/// Expand ~ in path to user's home directory
fn expand_path(path: &Path) -> Result<PathBuf, EngineError> {
    let path_str = path
        .to_str()
        .ok_or_else(|| EngineError::Config("Invalid UTF-8 in path".to_string()))?;

    if let Some(rest) = path_str.strip_prefix("~/") {
        let home = dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))?;

        Ok(home.join(rest))
    } else if path_str == "~" {
        dirs::home_dir()
            .ok_or_else(|| EngineError::Config("Could not determine home directory".to_string()))
    } else {
        Ok(path.to_path_buf())
    }
}
