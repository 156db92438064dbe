//! Errors raised by Tiger SDK calls.

use thiserror::Error;

/// Failure of a single SDK call.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerError {
    /// Network or session failure.
    #[error("Connection error: {message}")]
    Connection {
        /// Error description.
        message: String,
    },

    /// Tiger returned an error code.
    #[error("API error: {code} - {message}")]
    Api {
        /// Tiger error code.
        code: i32,
        /// Tiger error message.
        message: String,
    },

    /// Signature or credential check failed.
    #[error("Authentication failed: {message}")]
    Authentication {
        /// Error description.
        message: String,
    },

    /// Too many requests.
    #[error("Rate limited")]
    RateLimited,

    /// The SDK build does not offer this capability.
    #[error("Unsupported by the SDK: {feature}")]
    Unsupported {
        /// Capability that is missing.
        feature: String,
    },

    /// The request could not be expressed in Tiger's vocabulary.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// The call did not complete in time.
    #[error("Request timed out")]
    Timeout,
}

impl BrokerError {
    /// Build a connection error.
    #[must_use]
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection {
            message: message.into(),
        }
    }

    /// Build an unsupported-capability error.
    #[must_use]
    pub fn unsupported(feature: impl Into<String>) -> Self {
        Self::Unsupported {
            feature: feature.into(),
        }
    }

    /// Returns true if the capability is permanently missing.
    #[must_use]
    pub const fn is_unsupported(&self) -> bool {
        matches!(self, Self::Unsupported { .. })
    }

    /// Returns true if retrying later may succeed.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::Connection { .. } | Self::RateLimited | Self::Timeout
        )
    }
}
