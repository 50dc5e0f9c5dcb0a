//! Application configuration

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use signdeck_billing::GlobalFlags;

/// Log output format for the tracing subscriber
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{}'", other)),
        }
    }
}

/// Application configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub bind_address: SocketAddr,
    /// Empty disables the CORS layer; `*` allows any origin
    pub cors_allowed_origins: Vec<String>,

    // Logging
    pub log_format: LogFormat,

    // Feature flags
    pub global_feature_flags: GlobalFlags,
    pub enable_admin_routes: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_address: SocketAddr::from(([0, 0, 0, 0], 3000)),
            cors_allowed_origins: Vec::new(),
            log_format: LogFormat::Pretty,
            global_feature_flags: GlobalFlags::new(),
            enable_admin_routes: false,
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            // Server
            bind_address: parse_var("BIND_ADDRESS", "0.0.0.0:3000")?,
            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_default()
                .split(',')
                .map(str::trim)
                .filter(|origin| !origin.is_empty())
                .map(str::to_string)
                .collect(),

            // Logging
            log_format: parse_var("LOG_FORMAT", "pretty")?,

            // Feature flags
            global_feature_flags: GlobalFlags::parse(
                &env::var("GLOBAL_FEATURE_FLAGS").unwrap_or_default(),
            )
            .map_err(|e| ConfigError::InvalidFlags(e.to_string()))?,
            enable_admin_routes: parse_bool("ENABLE_ADMIN_ROUTES", false)?,
        })
    }
}

fn parse_var<T: FromStr>(key: &'static str, default: &str) -> Result<T, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::Invalid { key, value })
}

fn parse_bool(key: &'static str, default: bool) -> Result<bool, ConfigError> {
    let Ok(value) = env::var(key) else {
        return Ok(default);
    };
    match value.trim().to_ascii_lowercase().as_str() {
        "" => Ok(default),
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        _ => Err(ConfigError::Invalid { key, value }),
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: '{value}'")]
    Invalid { key: &'static str, value: String },
    #[error("Invalid GLOBAL_FEATURE_FLAGS: {0}")]
    InvalidFlags(String),
}
