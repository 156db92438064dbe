//! Tiger SDK client contract.
//!
//! The gateway never speaks Tiger's wire protocol itself. It drives three
//! client handles built by a [`TigerSdk`] factory:
//!
//! - [`TradeClient`]: order placement and account queries
//! - [`QuoteClient`]: polled quotes and bars
//! - [`PushClient`]: streaming channels, optional in some SDK builds
//!
//! All calls are blocking. The gateway only invokes them from its worker
//! thread, so implementations need `Send` but not `Sync`.

use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

use super::api_types::{
    BarQuery, Environment, Language, Market, Placement, TigerAsset, TigerBar, TigerOrder,
    TigerOrderSnapshot, TigerPosition, TigerQuote,
};
use super::error::BrokerError;

/// Everything the SDK needs to open a session.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Developer id issued by Tiger.
    pub tiger_id: String,
    /// Trading account.
    pub account: String,
    /// RSA private key body, armor lines stripped.
    pub private_key: String,
    /// Path to Tiger's public key, if the SDK should verify responses.
    pub tiger_public_key_path: Option<PathBuf>,
    /// Sandbox or live.
    pub environment: Environment,
    /// Message language.
    pub language: Language,
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("tiger_id", &self.tiger_id)
            .field("account", &self.account)
            .field("private_key", &"[REDACTED]")
            .field("tiger_public_key_path", &self.tiger_public_key_path)
            .field("environment", &self.environment)
            .field("language", &self.language)
            .finish()
    }
}

/// Order and account operations.
#[cfg_attr(test, mockall::automock)]
pub trait TradeClient: Send {
    /// Submit an order.
    fn place_order(&self, order: &TigerOrder) -> Result<Placement, BrokerError>;

    /// Request cancellation of a broker order.
    fn cancel_order(&self, id: i64) -> Result<(), BrokerError>;

    /// Orders of the configured account.
    fn get_orders(&self) -> Result<Vec<TigerOrderSnapshot>, BrokerError>;

    /// Account summaries.
    fn get_assets(&self) -> Result<Vec<TigerAsset>, BrokerError>;

    /// Holdings.
    fn get_positions(&self) -> Result<Vec<TigerPosition>, BrokerError>;
}

/// Market data operations.
pub trait QuoteClient: Send {
    /// Latest quotes for symbols of one market.
    fn get_market_data(
        &self,
        symbols: &[String],
        market: Market,
    ) -> Result<Vec<TigerQuote>, BrokerError>;

    /// Historical bars.
    fn get_bars(&self, query: &BarQuery) -> Result<Vec<TigerBar>, BrokerError>;
}

/// Receiver of push-channel callbacks.
///
/// Invoked on the SDK's own thread. Implementations must return quickly.
pub trait PushListener: Send + Sync {
    /// A subscribed quote changed.
    fn on_quote_change(&self, quote: TigerQuote);

    /// An account summary changed.
    fn on_asset_change(&self, asset: TigerAsset);

    /// A holding changed.
    fn on_position_change(&self, position: TigerPosition);

    /// An order changed.
    fn on_order_change(&self, order: TigerOrderSnapshot);

    /// The push session went up or down.
    fn on_connection_change(&self, connected: bool);
}

/// Streaming channel operations.
pub trait PushClient: Send {
    /// Open the push session and start delivering callbacks.
    fn connect(&self, listener: Arc<dyn PushListener>) -> Result<(), BrokerError>;

    /// Close the push session.
    fn disconnect(&self);

    /// Stream quotes for symbols.
    fn subscribe_quote(&self, symbols: &[String]) -> Result<(), BrokerError>;

    /// Stop streaming quotes for symbols.
    fn unsubscribe_quote(&self, symbols: &[String]) -> Result<(), BrokerError>;

    /// Subscribe the asset, position and order channels of the account.
    fn subscribe_account_channels(&self, account: &str) -> Result<(), BrokerError>;
}

/// Factory for client handles.
pub trait TigerSdk: Send + Sync {
    /// Build a trade client.
    fn trade_client(&self, config: &ClientConfig) -> Result<Box<dyn TradeClient>, BrokerError>;

    /// Build a quote client.
    fn quote_client(&self, config: &ClientConfig) -> Result<Box<dyn QuoteClient>, BrokerError>;

    /// Build a push client. Returns [`BrokerError::Unsupported`] when the SDK
    /// build has no push support.
    fn push_client(&self, config: &ClientConfig) -> Result<Box<dyn PushClient>, BrokerError>;
}

/// Whether a Tiger SDK binding is present in this process.
///
/// Resolved once at startup; connecting with `Unavailable` fails cleanly.
#[derive(Clone)]
pub enum SdkAvailability {
    /// SDK present.
    Available(Arc<dyn TigerSdk>),
    /// SDK missing.
    Unavailable {
        /// Why the SDK could not be loaded.
        reason: String,
    },
}

impl SdkAvailability {
    /// Wrap an SDK implementation.
    #[must_use]
    pub fn available(sdk: impl TigerSdk + 'static) -> Self {
        Self::Available(Arc::new(sdk))
    }

    /// Record a missing SDK.
    #[must_use]
    pub fn unavailable(reason: impl Into<String>) -> Self {
        Self::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns true if an SDK is present.
    #[must_use]
    pub const fn is_available(&self) -> bool {
        matches!(self, Self::Available(_))
    }

    /// The SDK, or the reason it is missing.
    pub fn sdk(&self) -> Result<Arc<dyn TigerSdk>, String> {
        match self {
            Self::Available(sdk) => Ok(Arc::clone(sdk)),
            Self::Unavailable { reason } => Err(reason.clone()),
        }
    }
}

impl fmt::Debug for SdkAvailability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Available(_) => write!(f, "Available"),
            Self::Unavailable { reason } => write!(f, "Unavailable({reason})"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ClientConfig {
        ClientConfig {
            tiger_id: "20150001".to_string(),
            account: "DU575569".to_string(),
            private_key: "MIIEsecret".to_string(),
            tiger_public_key_path: None,
            environment: Environment::Sandbox,
            language: Language::EnUs,
        }
    }

    #[test]
    fn client_config_debug_redacts_key() {
        let debug = format!("{:?}", config());
        assert!(debug.contains("REDACTED"));
        assert!(!debug.contains("MIIEsecret"));
        assert!(debug.contains("DU575569"));
    }

    #[test]
    fn unavailable_reports_reason() {
        let sdk = SdkAvailability::unavailable("tigeropen not installed");
        assert!(!sdk.is_available());
        let Err(reason) = sdk.sdk() else {
            panic!("expected unavailable");
        };
        assert_eq!(reason, "tigeropen not installed");
    }
}
