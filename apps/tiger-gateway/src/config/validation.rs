//! Credential checks run before any broker call.

use super::ConfigError;
use super::tiger::TigerSettings;

/// Result of startup validation.
#[derive(Debug, Default)]
pub struct StartupValidation {
    /// Warning messages (non-fatal).
    pub warnings: Vec<String>,
}

/// Ensure the fields a Tiger session cannot start without are filled in.
///
/// # Errors
///
/// Returns `ConfigError::MissingCredentials` naming every empty field.
pub fn require_credentials(settings: &TigerSettings) -> Result<(), ConfigError> {
    let mut missing = Vec::new();
    if settings.tiger_id.trim().is_empty() {
        missing.push("tiger_id");
    }
    if settings.account.trim().is_empty() {
        missing.push("account");
    }
    if settings.private_key_path.trim().is_empty() {
        missing.push("private_key_path");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::MissingCredentials {
            fields: missing.join(", "),
        })
    }
}

/// Validate Tiger settings at startup and collect warnings.
///
/// # Errors
///
/// Returns an error if credentials are missing or the environment or
/// language is not recognized.
pub fn validate_startup(settings: &TigerSettings) -> Result<StartupValidation, ConfigError> {
    require_credentials(settings)?;
    let environment = settings.environment()?;
    settings.language()?;

    let mut warnings = Vec::new();
    if environment.is_live() {
        warnings.push("LIVE environment selected: orders will trade real money".to_string());
    }
    if settings.tiger_public_key_path.trim().is_empty() {
        warnings.push(
            "tiger_public_key_path not set: broker responses are not verified".to_string(),
        );
    }
    Ok(StartupValidation { warnings })
}
