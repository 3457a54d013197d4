//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SCRIBE_OFFLINE_*)
//! 2. TOML config file (if SCRIBE_OFFLINE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SCRIBE_OFFLINE_*)
/// 2. TOML config file (if SCRIBE_OFFLINE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Origin the coordinator serves and caches for.
    ///
    /// Set via SCRIBE_OFFLINE_ORIGIN environment variable.
    #[serde(default = "default_origin")]
    pub origin: String,

    /// Cache generation identifier. Must change whenever cached asset semantics change.
    ///
    /// Set via SCRIBE_OFFLINE_GENERATION environment variable.
    #[serde(default = "default_generation")]
    pub generation: String,

    /// Origin-relative paths stored before a generation may serve traffic.
    ///
    /// Set via SCRIBE_OFFLINE_PRECACHE environment variable (TOML array syntax).
    #[serde(default = "default_precache")]
    pub precache: Vec<String>,

    /// Path prefix of the remote backend. Never intercepted or cached.
    ///
    /// Set via SCRIBE_OFFLINE_BYPASS_PREFIX environment variable.
    #[serde(default = "default_bypass_prefix")]
    pub bypass_prefix: String,

    /// Path to SQLite cache database.
    ///
    /// Set via SCRIBE_OFFLINE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SCRIBE_OFFLINE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SCRIBE_OFFLINE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SCRIBE_OFFLINE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,
}

fn default_origin() -> String {
    "http://localhost:3000".into()
}

fn default_generation() -> String {
    "scribe-static-v1".into()
}

fn default_precache() -> Vec<String> {
    vec!["/".into(), "/manifest.webmanifest".into(), "/icon.svg".into()]
}

fn default_bypass_prefix() -> String {
    "/api/".into()
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./scribe-offline-cache.sqlite")
}

fn default_user_agent() -> String {
    "scribe-offline/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            origin: default_origin(),
            generation: default_generation(),
            precache: default_precache(),
            bypass_prefix: default_bypass_prefix(),
            db_path: default_db_path(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// Priority (highest wins):
    /// 1. Environment variables prefixed with `SCRIBE_OFFLINE_`
    /// 2. TOML file from `SCRIBE_OFFLINE_CONFIG_FILE` (if set)
    /// 3. Built-in defaults via `Default::default()`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if:
    /// - Configuration file cannot be read
    /// - Environment variables cannot be parsed
    /// - Validation fails after loading
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SCRIBE_OFFLINE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SCRIBE_OFFLINE_")
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
