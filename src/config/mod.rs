//! Configuration loading and validation.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use url::Url;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Which record store backend to read from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// JSON-lines files under `data_dir`
    #[default]
    Jsonl,
    /// Firestore REST API
    Firestore,
}

/// Record store configuration.
///
/// Credentials are optional here; a backend that needs them reports
/// "not configured" when it is built.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,

    /// Directory holding `<collection>.jsonl` files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Firestore project id
    #[serde(default)]
    pub project_id: Option<String>,

    /// Firestore database id
    #[serde(default = "default_database")]
    pub database: String,

    /// Web API key, sent as the `key` query parameter
    #[serde(default)]
    pub api_key: Option<String>,

    /// OAuth/ID token, sent as a bearer token
    #[serde(default)]
    pub auth_token: Option<String>,

    #[serde(default = "default_firestore_url")]
    pub base_url: String,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,

    /// Documents per page for full collection scans
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./data")
}

fn default_database() -> String {
    "(default)".to_string()
}

fn default_firestore_url() -> String {
    "https://firestore.googleapis.com/v1".to_string()
}

fn default_timeout() -> u64 {
    30
}

fn default_page_size() -> u32 {
    300
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: StoreBackend::default(),
            data_dir: default_data_dir(),
            project_id: None,
            database: default_database(),
            api_key: None,
            auth_token: None,
            base_url: default_firestore_url(),
            timeout_seconds: default_timeout(),
            page_size: default_page_size(),
        }
    }
}

/// Remote scoring-formula service (PostgREST RPC endpoint).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaConfig {
    /// Project URL, e.g. `https://xyz.supabase.co`
    #[serde(default)]
    pub url: Option<String>,

    /// Anonymous API key
    #[serde(default)]
    pub anon_key: Option<String>,

    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

impl Default for FormulaConfig {
    fn default() -> Self {
        Self {
            url: None,
            anon_key: None,
            timeout_seconds: default_timeout(),
        }
    }
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_cors_origin")]
    pub cors_origin: String,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_cors_origin() -> String {
    "*".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origin: default_cors_origin(),
        }
    }
}

/// Main application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub store: StoreConfig,

    #[serde(default)]
    pub formula: FormulaConfig,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            server: ServerConfig::default(),
            store: StoreConfig::default(),
            formula: FormulaConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load from `path` if it exists (defaults otherwise), apply secrets from
    /// the environment, then validate.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let mut config = if path.exists() {
            Self::from_file(path)?
        } else {
            Self::default()
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Override credentials from a key lookup (the process environment in
    /// production). Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("FIRESTORE_PROJECT_ID") {
            self.store.project_id = Some(v);
        }
        if let Some(v) = get("FIRESTORE_API_KEY") {
            self.store.api_key = Some(v);
        }
        if let Some(v) = get("FIRESTORE_AUTH_TOKEN") {
            self.store.auth_token = Some(v);
        }
        if let Some(v) = get("SUPABASE_URL") {
            self.formula.url = Some(v);
        }
        if let Some(v) = get("SUPABASE_ANON_KEY") {
            self.formula.anon_key = Some(v);
        }
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::ValidationError(
                "Server port must be greater than 0".to_string(),
            ));
        }

        if self.store.timeout_seconds == 0 || self.formula.timeout_seconds == 0 {
            return Err(ConfigError::ValidationError(
                "Timeouts must be greater than 0".to_string(),
            ));
        }

        if self.store.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "Store page size must be greater than 0".to_string(),
            ));
        }

        Url::parse(&self.store.base_url).map_err(|e| {
            ConfigError::ValidationError(format!("Invalid store base_url: {}", e))
        })?;

        if let Some(url) = self.formula.url.as_deref() {
            Url::parse(url).map_err(|e| {
                ConfigError::ValidationError(format!("Invalid formula url: {}", e))
            })?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_default_config() {
        let config: AppConfig = toml::from_str("").unwrap();

        assert_eq!(config.log_level, "info");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.store.backend, StoreBackend::Jsonl);
        assert_eq!(config.store.data_dir, PathBuf::from("./data"));
        assert_eq!(config.store.database, "(default)");
        assert!(config.formula.url.is_none());
    }

    #[test]
    fn test_parse_firestore_config() {
        let config: AppConfig = toml::from_str(
            r#"
            log_level = "debug"

            [store]
            backend = "firestore"
            project_id = "battle-of-platoons"
            api_key = "abc"

            [formula]
            url = "https://xyz.supabase.co"
            "#,
        )
        .unwrap();

        assert_eq!(config.log_level, "debug");
        assert_eq!(config.store.backend, StoreBackend::Firestore);
        assert_eq!(config.store.project_id.as_deref(), Some("battle-of-platoons"));
        assert_eq!(config.store.page_size, 300);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_backend_rejected() {
        let result: Result<AppConfig, _> = toml::from_str("[store]\nbackend = \"mongo\"\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_config_validation_ok() {
        let config = AppConfig::load(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation_bad_port() {
        let mut config = AppConfig::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_timeout() {
        let mut config = AppConfig::default();
        config.formula.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_bad_urls() {
        let mut config = AppConfig::default();
        config.formula.url = Some("not a url".to_string());
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.store.base_url = "::".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("FIRESTORE_PROJECT_ID", "proj"),
            ("FIRESTORE_API_KEY", ""),
            ("SUPABASE_URL", "https://xyz.supabase.co"),
            ("SUPABASE_ANON_KEY", "anon"),
        ]
        .into_iter()
        .collect();

        let mut config = AppConfig::default();
        config.store.api_key = Some("from-file".to_string());
        config.apply_overrides(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(config.store.project_id.as_deref(), Some("proj"));
        assert_eq!(config.store.api_key.as_deref(), Some("from-file"));
        assert_eq!(config.formula.url.as_deref(), Some("https://xyz.supabase.co"));
        assert_eq!(config.formula.anon_key.as_deref(), Some("anon"));
    }

    #[test]
    fn test_config_serialization() {
        let mut config = AppConfig::default();
        config.log_level = "warn".to_string();
        let toml_str = toml::to_string(&config).unwrap();

        let parsed: AppConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.log_level, "warn");
        assert_eq!(parsed.store.data_dir, config.store.data_dir);
    }
}
