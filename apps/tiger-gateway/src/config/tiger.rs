//! Tiger credentials and session options.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::ConfigError;
use super::validation::require_credentials;
use crate::broker::{ClientConfig, Environment, Language};

/// Connect settings for one Tiger session.
///
/// Mirrors the gateway's settings form: every field is a plain string so an
/// empty value can be reported instead of failing deserialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TigerSettings {
    /// Developer id (a.k.a. broker id).
    #[serde(default)]
    pub tiger_id: String,
    /// Trading account.
    #[serde(default)]
    pub account: String,
    /// Path to the RSA private key in PEM format.
    #[serde(default)]
    pub private_key_path: String,
    /// Path to Tiger's public key. Optional.
    #[serde(default)]
    pub tiger_public_key_path: String,
    /// `sandbox` or `live`.
    #[serde(default = "default_environment")]
    pub environment: String,
    /// `zh_CN` or `en_US`.
    #[serde(default = "default_language")]
    pub language: String,
}

impl Default for TigerSettings {
    fn default() -> Self {
        Self {
            tiger_id: String::new(),
            account: String::new(),
            private_key_path: String::new(),
            tiger_public_key_path: String::new(),
            environment: default_environment(),
            language: default_language(),
        }
    }
}

fn default_environment() -> String {
    "sandbox".to_string()
}

fn default_language() -> String {
    "zh_CN".to_string()
}

impl TigerSettings {
    /// Parsed environment.
    pub fn environment(&self) -> Result<Environment, ConfigError> {
        Environment::parse(&self.environment).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "tiger.environment must be 'sandbox' or 'live', got '{}'",
                self.environment
            ))
        })
    }

    /// Parsed language.
    pub fn language(&self) -> Result<Language, ConfigError> {
        Language::parse(&self.language).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "tiger.language must be 'zh_CN' or 'en_US', got '{}'",
                self.language
            ))
        })
    }

    /// Validate the settings and read the private key.
    ///
    /// Touches only the local filesystem; no broker call is made.
    pub fn client_config(&self) -> Result<ClientConfig, ConfigError> {
        require_credentials(self)?;
        let environment = self.environment()?;
        let language = self.language()?;
        let private_key = load_private_key(Path::new(&self.private_key_path))?;
        let tiger_public_key_path = if self.tiger_public_key_path.trim().is_empty() {
            None
        } else {
            Some(PathBuf::from(&self.tiger_public_key_path))
        };

        Ok(ClientConfig {
            tiger_id: self.tiger_id.clone(),
            account: self.account.clone(),
            private_key,
            tiger_public_key_path,
            environment,
            language,
        })
    }
}

/// Read a PEM private key and return its base64 body on one line.
///
/// Armor lines (`-----BEGIN ...-----`) and blank lines are dropped.
pub fn load_private_key(path: &Path) -> Result<String, ConfigError> {
    let contents = std::fs::read_to_string(path).map_err(|e| ConfigError::PrivateKey {
        path: path.display().to_string(),
        source: e,
    })?;

    let body: String = contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with("-----"))
        .collect();

    if body.is_empty() {
        return Err(ConfigError::EmptyPrivateKey {
            path: path.display().to_string(),
        });
    }
    Ok(body)
}
