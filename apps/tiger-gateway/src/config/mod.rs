//! Configuration module for the Tiger gateway.
//!
//! Loads YAML configuration with environment variable interpolation and
//! validates it before the gateway touches the broker.
//!
//! # Usage
//!
//! ```rust,ignore
//! use tiger_gateway::config::load_config;
//!
//! // Load from default path (config.yaml)
//! let config = load_config(None)?;
//!
//! // Access configuration values
//! println!("account: {}", config.tiger.account);
//! ```

mod observability;
mod supervisor;
mod tiger;
mod validation;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use observability::{LoggingConfig, MetricsSettings, ObservabilityConfig};
pub use supervisor::{ReconnectSettings, SupervisorSettings};
pub use tiger::{TigerSettings, load_private_key};
pub use validation::{StartupValidation, require_credentials, validate_startup};

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read configuration file.
    #[error("Failed to read config file '{path}': {source}")]
    ReadError {
        /// Path to the config file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// Failed to parse YAML configuration.
    #[error("Failed to parse config YAML: {0}")]
    ParseError(#[from] serde_yaml_bw::Error),

    /// Configuration validation failed.
    #[error("Config validation failed: {0}")]
    ValidationError(String),

    /// Required connect settings are empty.
    #[error("Missing Tiger credentials: {fields}")]
    MissingCredentials {
        /// Comma-separated names of the empty fields.
        fields: String,
    },

    /// Failed to read the private key file.
    #[error("Failed to read private key '{path}': {source}")]
    PrivateKey {
        /// Path to the key file.
        path: String,
        /// The underlying IO error.
        source: std::io::Error,
    },

    /// The private key file holds no key material.
    #[error("Private key '{path}' contains no key material")]
    EmptyPrivateKey {
        /// Path to the key file.
        path: String,
    },
}

/// Root configuration structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Gateway instance name stamped on log events.
    #[serde(default = "default_gateway_name")]
    pub gateway_name: String,
    /// Tiger connect settings.
    #[serde(default)]
    pub tiger: TigerSettings,
    /// Supervisor timing.
    #[serde(default)]
    pub supervisor: SupervisorSettings,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            gateway_name: default_gateway_name(),
            tiger: TigerSettings::default(),
            supervisor: SupervisorSettings::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

fn default_gateway_name() -> String {
    "TIGER".to_string()
}

// ============================================
// Configuration Loading
// ============================================

/// Load configuration from a YAML file with environment variable interpolation.
///
/// # Arguments
///
/// * `path` - Optional path to the config file. Defaults to "config.yaml".
///
/// # Errors
///
/// Returns a `ConfigError` if the file cannot be read, parsed, or validated.
pub fn load_config(path: Option<&str>) -> Result<Config, ConfigError> {
    let path = path.unwrap_or("config.yaml");

    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.to_string(),
        source: e,
    })?;

    load_config_from_string(&contents)
}

/// Load configuration from a YAML string (useful for testing).
///
/// # Errors
///
/// Returns a `ConfigError` if the YAML cannot be parsed or validated.
pub fn load_config_from_string(yaml: &str) -> Result<Config, ConfigError> {
    let interpolated = interpolate_env_vars(yaml);
    let config: Config = serde_yaml_bw::from_str(&interpolated)?;
    validate_config(&config)?;
    Ok(config)
}

/// Interpolate environment variables in a string.
///
/// Supports both `${VAR}` and `${VAR:-default}` syntax.
#[allow(clippy::expect_used)] // Regex is compile-time constant; expect() is safe here
fn interpolate_env_vars(input: &str) -> String {
    use std::sync::OnceLock;

    static ENV_VAR_REGEX: OnceLock<regex::Regex> = OnceLock::new();

    let re = ENV_VAR_REGEX.get_or_init(|| {
        regex::Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)(?::-([^}]*))?\}")
            .expect("env var regex is valid")
    });

    re.replace_all(input, |cap: &regex::Captures<'_>| {
        let default_value = cap.get(2).map_or("", |m| m.as_str());
        match cap.get(1).map(|m| std::env::var(m.as_str())) {
            Some(Ok(v)) if !v.is_empty() => v,
            _ => default_value.to_string(),
        }
    })
    .into_owned()
}

/// Validate configuration values.
///
/// Credentials are not required here: a config without them still loads,
/// and `connect` reports what is missing.
fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.gateway_name.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "gateway_name must not be empty".to_string(),
        ));
    }

    config.tiger.environment()?;
    config.tiger.language()?;

    let supervisor = &config.supervisor;
    for (name, value) in [
        ("heartbeat_interval_ms", supervisor.heartbeat_interval_ms),
        ("idle_poll_ms", supervisor.idle_poll_ms),
        ("shutdown_timeout_ms", supervisor.shutdown_timeout_ms),
        ("request_timeout_ms", supervisor.request_timeout_ms),
        ("reconnect.initial_delay_ms", supervisor.reconnect.initial_delay_ms),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "supervisor.{name} must be positive"
            )));
        }
    }

    let reconnect = &supervisor.reconnect;
    if reconnect.max_delay_ms < reconnect.initial_delay_ms {
        return Err(ConfigError::ValidationError(
            "supervisor.reconnect.max_delay_ms must be >= initial_delay_ms".to_string(),
        ));
    }
    if reconnect.multiplier < 1.0 {
        return Err(ConfigError::ValidationError(
            "supervisor.reconnect.multiplier must be >= 1.0".to_string(),
        ));
    }
    if !(0.0..=1.0).contains(&reconnect.jitter_factor) {
        return Err(ConfigError::ValidationError(
            "supervisor.reconnect.jitter_factor must be between 0.0 and 1.0".to_string(),
        ));
    }

    let valid_formats = ["json", "pretty"];
    if !valid_formats.contains(&config.observability.logging.format.as_str()) {
        return Err(ConfigError::ValidationError(format!(
            "observability.logging.format must be one of: {valid_formats:?}"
        )));
    }

    let metrics = &config.observability.metrics;
    if metrics.enabled && metrics.listen_addr.parse::<std::net::SocketAddr>().is_err() {
        return Err(ConfigError::ValidationError(format!(
            "observability.metrics.listen_addr '{}' is not a socket address",
            metrics.listen_addr
        )));
    }

    Ok(())
}
