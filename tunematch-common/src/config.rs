//! Bootstrap configuration loading and credential resolution
//!
//! Settings sources priority (highest first):
//! 1. Command-line arguments (handled by the binary)
//! 2. Environment variables
//! 3. TOML configuration file
//! 4. Built-in defaults (code constants)
//!
//! A missing TOML file is not an error: a warning is logged and the
//! built-in defaults are used. Missing catalog credentials ARE an error,
//! reported once at startup.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Environment variable holding the catalog client identifier
pub const CLIENT_ID_ENV: &str = "SPOTIFY_CID";

/// Environment variable holding the catalog client secret
pub const CLIENT_SECRET_ENV: &str = "SPOTIFY_CS";

/// Environment variable overriding the TOML config file location
pub const CONFIG_PATH_ENV: &str = "TUNEMATCH_CONFIG";

/// Classifier artifact location, relative to the working directory
pub const DEFAULT_MODEL_PATH: &str = "SpotiSai.json";

/// Bootstrap configuration loaded from TOML file
///
/// Read once at startup. The service must restart to pick up changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Interface the HTTP server binds to
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Path to the classifier artifact (XGBoost JSON model)
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Catalog API client identifier (fallback when SPOTIFY_CID is unset)
    #[serde(default)]
    pub client_id: Option<String>,

    /// Catalog API client secret (fallback when SPOTIFY_CS is unset)
    #[serde(default)]
    pub client_secret: Option<String>,

    /// Total timeout for one outbound request, in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Connection timeout for outbound requests, in seconds
    #[serde(default = "default_connect_timeout_secs")]
    pub connect_timeout_secs: u64,

    /// Extra attempts after a transient outbound failure
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Outbound request budget for the catalog API
    #[serde(default = "default_requests_per_second")]
    pub requests_per_second: u32,

    /// Optional ISO 3166-1 market code applied to catalog searches
    #[serde(default)]
    pub market: Option<String>,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
            model_path: default_model_path(),
            client_id: None,
            client_secret: None,
            request_timeout_secs: default_request_timeout_secs(),
            connect_timeout_secs: default_connect_timeout_secs(),
            max_retries: default_max_retries(),
            requests_per_second: default_requests_per_second(),
            market: None,
            logging: LoggingConfig::default(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_bind_address() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5731
}

fn default_model_path() -> PathBuf {
    PathBuf::from(DEFAULT_MODEL_PATH)
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_connect_timeout_secs() -> u64 {
    5
}

fn default_max_retries() -> u32 {
    2
}

fn default_requests_per_second() -> u32 {
    5
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Default TOML location: `<config_dir>/tunematch/config.toml`
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("tunematch").join("config.toml"))
}

/// Pick the config file to read: explicit path, then TUNEMATCH_CONFIG, then the platform default
pub fn resolve_config_path(cli_arg: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = cli_arg {
        return Some(path.to_path_buf());
    }

    if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
        if !path.trim().is_empty() {
            return Some(PathBuf::from(path));
        }
    }

    default_config_path()
}

/// Load bootstrap configuration
///
/// A missing file yields the built-in defaults. An unreadable or malformed
/// file is a configuration error.
pub fn load_toml_config(path: Option<&Path>) -> Result<TomlConfig> {
    let Some(path) = path else {
        warn!("No config directory available on this platform, using built-in defaults");
        return Ok(TomlConfig::default());
    };

    if !path.exists() {
        warn!(
            path = %path.display(),
            "Config file not found, using built-in defaults"
        );
        return Ok(TomlConfig::default());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Read TOML failed ({}): {}", path.display(), e)))?;

    let config: TomlConfig = toml::from_str(&content)
        .map_err(|e| Error::Config(format!("Parse TOML failed ({}): {}", path.display(), e)))?;

    info!(path = %path.display(), "Loaded config file");
    Ok(config)
}

/// Catalog API client credentials
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub client_id: String,
    pub client_secret: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .finish()
    }
}

/// Resolve catalog credentials from ENV → TOML
///
/// Both values are required. Their absence is fatal at startup and is
/// reported with every way to provide them.
pub fn resolve_credentials(toml_config: &TomlConfig) -> Result<Credentials> {
    let client_id = resolve_value(
        "client identifier",
        CLIENT_ID_ENV,
        toml_config.client_id.as_deref(),
    );
    let client_secret = resolve_value(
        "client secret",
        CLIENT_SECRET_ENV,
        toml_config.client_secret.as_deref(),
    );

    match (client_id, client_secret) {
        (Some(client_id), Some(client_secret)) => Ok(Credentials {
            client_id,
            client_secret,
        }),
        (id, secret) => {
            let mut missing = Vec::new();
            if id.is_none() {
                missing.push(format!("{} (or client_id in TOML)", CLIENT_ID_ENV));
            }
            if secret.is_none() {
                missing.push(format!("{} (or client_secret in TOML)", CLIENT_SECRET_ENV));
            }
            Err(Error::Config(format!(
                "Catalog credentials not configured. Missing: {}.\n\
                 Provide them using one of:\n\
                 1. Environment: {}=... {}=...\n\
                 2. TOML config: ~/.config/tunematch/config.toml (client_id = \"...\", client_secret = \"...\")",
                missing.join(", "),
                CLIENT_ID_ENV,
                CLIENT_SECRET_ENV
            )))
        }
    }
}

fn resolve_value(label: &str, env_name: &str, toml_value: Option<&str>) -> Option<String> {
    let env_value = std::env::var(env_name).ok().filter(|v| is_valid_key(v));
    let toml_value = toml_value.filter(|v| is_valid_key(v));

    if env_value.is_some() && toml_value.is_some() {
        warn!(
            "Catalog {} found in both environment and TOML. Using environment (highest priority).",
            label
        );
    }

    if let Some(value) = env_value {
        info!("Catalog {} loaded from environment variable", label);
        return Some(value);
    }

    if let Some(value) = toml_value {
        info!("Catalog {} loaded from TOML config", label);
        return Some(value.to_string());
    }

    None
}

/// Validate a credential value (non-empty, non-whitespace)
pub fn is_valid_key(key: &str) -> bool {
    !key.trim().is_empty()
}

/// User-Agent sent with every outbound request
pub fn get_user_agent() -> String {
    format!("tunematch/{}", env!("CARGO_PKG_VERSION"))
}
