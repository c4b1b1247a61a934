//! Configuration System
//!
//! Handles loading configuration from files and environment variables.
//! Supports TOML config files and environment variable overrides.

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub api: ApiConfig,

    #[serde(default)]
    pub bus: BusConfig,

    #[serde(default)]
    pub auth: AuthConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// API server configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ApiConfig {
    /// Get the socket address string
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Message bus (MQTT broker) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct BusConfig {
    #[serde(default = "default_bus_host")]
    pub host: String,

    #[serde(default = "default_bus_port")]
    pub port: u16,

    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// Topic prefix shared with device firmware.
    /// Inbound telemetry arrives on `<prefix>/<deviceId>/telemetry`,
    /// outbound commands go to `<prefix>/<deviceId>/cmd`.
    #[serde(default = "default_topic_prefix")]
    pub topic_prefix: String,

    #[serde(default = "default_keep_alive")]
    pub keep_alive_secs: u64,

    #[serde(default = "default_reconnect_delay")]
    pub reconnect_delay_secs: u64,

    pub username: Option<String>,
    pub password: Option<String>,
}

fn default_bus_host() -> String {
    "localhost".to_string()
}

fn default_bus_port() -> u16 {
    1883
}

fn default_client_id() -> String {
    "telebridge".to_string()
}

fn default_topic_prefix() -> String {
    "embarcatech".to_string()
}

fn default_keep_alive() -> u64 {
    30
}

fn default_reconnect_delay() -> u64 {
    2
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            host: default_bus_host(),
            port: default_bus_port(),
            client_id: default_client_id(),
            topic_prefix: default_topic_prefix(),
            keep_alive_secs: default_keep_alive(),
            reconnect_delay_secs: default_reconnect_delay(),
            username: None,
            password: None,
        }
    }
}

/// Authentication configuration
///
/// A single shared operator identity guards the bridge; there is no
/// multi-tenant authorization.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    #[serde(default = "default_operator")]
    pub username: String,

    #[serde(default = "default_operator_password")]
    pub password: String,

    /// Shared secret for signing session tokens. Override in production.
    #[serde(default = "default_secret")]
    pub secret: String,

    #[serde(default = "default_cookie_name")]
    pub cookie_name: String,

    #[serde(default = "default_session_ttl")]
    pub session_ttl_hours: i64,

    /// Where browser callers are redirected when unauthenticated.
    #[serde(default = "default_login_path")]
    pub login_path: String,
}

fn default_operator() -> String {
    "operator".to_string()
}

fn default_operator_password() -> String {
    "operator".to_string()
}

fn default_secret() -> String {
    "change-me".to_string()
}

fn default_cookie_name() -> String {
    "bridge_session".to_string()
}

fn default_session_ttl() -> i64 {
    12
}

fn default_login_path() -> String {
    "/login".to_string()
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            username: default_operator(),
            password: default_operator_password(),
            secret: default_secret(),
            cookie_name: default_cookie_name(),
            session_ttl_hours: default_session_ttl(),
            login_path: default_login_path(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        let config: Config = toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;

        Ok(config)
    }

    /// Load configuration from environment variables only
    pub fn from_env() -> Self {
        let mut config = Config::default();
        config.apply_env_overrides();
        config
    }

    /// Load configuration with environment variable overrides
    pub fn load_with_env(path: &Path) -> Result<Self, ConfigError> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Load from default locations or environment
    pub fn load_default() -> Self {
        let config_paths = [
            dirs::config_dir().map(|p| p.join("telebridge").join("config.toml")),
            Some(PathBuf::from("/etc/telebridge/config.toml")),
            Some(PathBuf::from("./config.toml")),
        ];

        for path in config_paths.iter().flatten() {
            if path.exists() {
                match Self::load_with_env(path) {
                    Ok(config) => {
                        tracing::info!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to load config from {:?}: {}", path, e);
                    }
                }
            }
        }

        tracing::info!("Using default config with environment overrides");
        Self::from_env()
    }

    /// Apply environment variable overrides to an existing config
    fn apply_env_overrides(&mut self) {
        // API overrides
        if let Ok(host) = std::env::var("TELEBRIDGE_API_HOST") {
            self.api.host = host;
        }
        if let Ok(port) = std::env::var("TELEBRIDGE_API_PORT") {
            if let Ok(p) = port.parse() {
                self.api.port = p;
            }
        }

        // Bus overrides
        if let Ok(host) = std::env::var("TELEBRIDGE_MQTT_HOST") {
            self.bus.host = host;
        }
        if let Ok(port) = std::env::var("TELEBRIDGE_MQTT_PORT") {
            if let Ok(p) = port.parse() {
                self.bus.port = p;
            }
        }
        if let Ok(prefix) = std::env::var("TELEBRIDGE_TOPIC_PREFIX") {
            self.bus.topic_prefix = prefix;
        }
        if let Ok(username) = std::env::var("TELEBRIDGE_MQTT_USERNAME") {
            self.bus.username = Some(username);
        }
        if let Ok(password) = std::env::var("TELEBRIDGE_MQTT_PASSWORD") {
            self.bus.password = Some(password);
        }

        // Auth overrides
        if let Ok(username) = std::env::var("TELEBRIDGE_AUTH_USERNAME") {
            self.auth.username = username;
        }
        if let Ok(password) = std::env::var("TELEBRIDGE_AUTH_PASSWORD") {
            self.auth.password = password;
        }
        if let Ok(secret) = std::env::var("TELEBRIDGE_SESSION_SECRET") {
            self.auth.secret = secret;
        }

        // Logging overrides
        if let Ok(level) = std::env::var("TELEBRIDGE_LOG_LEVEL") {
            self.logging.level = level;
        }
        if let Ok(format) = std::env::var("TELEBRIDGE_LOG_FORMAT") {
            self.logging.format = format;
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path:?}: {error}")]
    Io { path: PathBuf, error: String },

    #[error("Failed to parse config file {path:?}: {error}")]
    Parse { path: PathBuf, error: String },
}
