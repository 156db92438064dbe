//! Tiger Open API vocabulary.
//!
//! Plain data mirroring what the Tiger client SDK accepts and returns. Every
//! field the SDK may leave unset is an `Option` or defaults to zero.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Tiger market code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Market {
    /// United States.
    Us,
    /// Hong Kong.
    Hk,
    /// Mainland China.
    Cn,
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Us => write!(f, "US"),
            Self::Hk => write!(f, "HK"),
            Self::Cn => write!(f, "CN"),
        }
    }
}

/// Tiger order action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ActionType {
    /// Buy.
    Buy,
    /// Sell.
    Sell,
}

/// Tiger order type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TigerOrderType {
    /// Market.
    Mkt,
    /// Limit.
    Lmt,
    /// Stop.
    Stp,
    /// Stop limit.
    StpLmt,
}

/// Tiger time in force.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Valid for the trading day.
    #[default]
    Day,
    /// Good till cancelled.
    Gtc,
}

/// Tiger order status as parsed from the SDK's status string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TigerOrderStatus {
    /// Received, not yet routed.
    PendingNew,
    /// Working.
    New,
    /// Some volume filled.
    PartiallyFilled,
    /// Completely filled.
    Filled,
    /// Cancel requested.
    PendingCancel,
    /// Cancelled.
    Cancelled,
    /// Refused (Tiger reports `Inactive`).
    Rejected,
    /// Expired (Tiger reports `Invalid`).
    Expired,
    /// Anything the gateway does not recognize.
    Unknown(String),
}

impl TigerOrderStatus {
    /// Parse a status string.
    ///
    /// Accepts both the SDK's wire values (`Initial`, `Inactive`, ...) and the
    /// enum member names (`NEW`, `REJECTED`, ...). Never fails.
    #[must_use]
    pub fn parse(status: &str) -> Self {
        let normalized: String = status
            .chars()
            .filter(|c| *c != '_')
            .collect::<String>()
            .to_ascii_lowercase();
        match normalized.as_str() {
            "pendingnew" => Self::PendingNew,
            "initial" | "new" => Self::New,
            "partiallyfilled" => Self::PartiallyFilled,
            "filled" => Self::Filled,
            "pendingcancel" => Self::PendingCancel,
            "cancelled" | "canceled" => Self::Cancelled,
            "inactive" | "rejected" => Self::Rejected,
            "invalid" | "expired" => Self::Expired,
            _ => Self::Unknown(status.to_string()),
        }
    }
}

/// SDK environment selector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Paper trading.
    #[default]
    Sandbox,
    /// Real money.
    Live,
}

impl Environment {
    /// Parse a configuration value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "sandbox" => Some(Self::Sandbox),
            "live" => Some(Self::Live),
            _ => None,
        }
    }

    /// Check if this is live trading.
    #[must_use]
    pub const fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sandbox => write!(f, "sandbox"),
            Self::Live => write!(f, "live"),
        }
    }
}

/// SDK message language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Language {
    /// Simplified Chinese.
    #[default]
    #[serde(rename = "zh_CN")]
    ZhCn,
    /// English.
    #[serde(rename = "en_US")]
    EnUs,
}

impl Language {
    /// Parse a configuration value.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim() {
            "zh_CN" => Some(Self::ZhCn),
            "en_US" => Some(Self::EnUs),
            _ => None,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ZhCn => write!(f, "zh_CN"),
            Self::EnUs => write!(f, "en_US"),
        }
    }
}

/// Order as submitted to `place_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TigerOrder {
    /// Trading account.
    pub account: String,
    /// Symbol.
    pub symbol: String,
    /// Market.
    pub market: Market,
    /// Buy or sell.
    pub action: ActionType,
    /// Order type.
    pub order_type: TigerOrderType,
    /// Whole-share quantity.
    pub quantity: u64,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Auxiliary (stop trigger) price.
    pub aux_price: Option<Decimal>,
    /// Time in force.
    pub time_in_force: TimeInForce,
}

/// Synchronous outcome of `place_order`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Placement {
    /// Broker accepted the order and assigned an id.
    Accepted {
        /// Broker order id.
        id: i64,
    },
    /// Broker refused the order without raising.
    Rejected {
        /// Broker-provided reason.
        reason: String,
    },
}

/// Order as returned by `get_orders` or the order push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TigerOrderSnapshot {
    /// Broker order id.
    pub id: i64,
    /// Trading account.
    pub account: String,
    /// Symbol.
    pub symbol: String,
    /// Market.
    pub market: Market,
    /// Buy or sell.
    pub action: ActionType,
    /// Order type.
    pub order_type: TigerOrderType,
    /// Requested quantity.
    pub quantity: i64,
    /// Filled quantity.
    #[serde(default)]
    pub filled: i64,
    /// Limit price.
    pub limit_price: Option<Decimal>,
    /// Auxiliary (stop trigger) price.
    pub aux_price: Option<Decimal>,
    /// Average fill price.
    pub avg_fill_price: Option<Decimal>,
    /// Raw status string.
    pub status: String,
    /// Order time in epoch milliseconds.
    pub order_time: Option<i64>,
    /// Rejection or cancellation reason.
    pub reason: Option<String>,
}

/// Account summary from `get_assets` or the asset push channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TigerAsset {
    /// Trading account.
    pub account: String,
    /// Net liquidation value.
    pub net_liquidation: Option<Decimal>,
    /// Initial margin requirement.
    pub init_margin_req: Option<Decimal>,
    /// Available cash.
    pub cash: Option<Decimal>,
}

/// Holding from `get_positions` or the position push channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TigerPosition {
    /// Trading account.
    pub account: String,
    /// Symbol.
    pub symbol: String,
    /// Market.
    pub market: Market,
    /// Security type (`STK`, `OPT`, `FUT`, `WAR`, ...).
    #[serde(default)]
    pub sec_type: String,
    /// Signed quantity; negative for short holdings.
    pub quantity: i64,
    /// Average cost.
    pub average_cost: Option<Decimal>,
    /// Unrealized profit and loss.
    pub unrealized_pnl: Option<Decimal>,
    /// Latest mark.
    pub market_price: Option<Decimal>,
}

/// Real-time quote from `get_market_data` or the quote push channel.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TigerQuote {
    /// Symbol.
    pub symbol: String,
    /// Last traded price.
    pub latest_price: Option<Decimal>,
    /// Session volume.
    pub volume: Option<Decimal>,
    /// Session turnover.
    pub amount: Option<Decimal>,
    /// Session open.
    pub open: Option<Decimal>,
    /// Session high.
    pub high: Option<Decimal>,
    /// Session low.
    pub low: Option<Decimal>,
    /// Previous close.
    pub prev_close: Option<Decimal>,
    /// Best bid.
    pub bid_price: Option<Decimal>,
    /// Best ask.
    pub ask_price: Option<Decimal>,
    /// Best bid size.
    pub bid_size: Option<Decimal>,
    /// Best ask size.
    pub ask_size: Option<Decimal>,
    /// Quote time in epoch milliseconds.
    pub timestamp: Option<i64>,
}

/// One bar from `get_bars`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TigerBar {
    /// Bar time, `%Y-%m-%d %H:%M:%S`.
    pub time: String,
    /// Open.
    pub open: Option<Decimal>,
    /// High.
    pub high: Option<Decimal>,
    /// Low.
    pub low: Option<Decimal>,
    /// Close.
    pub close: Option<Decimal>,
    /// Volume.
    pub volume: Option<Decimal>,
    /// Turnover.
    pub amount: Option<Decimal>,
}

/// Arguments to `get_bars`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BarQuery {
    /// Symbols to query.
    pub symbols: Vec<String>,
    /// Market of the symbols.
    pub market: Market,
    /// Period code (`1min`, `60min`, `day`, `week`).
    pub period: String,
    /// First day, `%Y-%m-%d`.
    pub begin_time: String,
    /// Last day, `%Y-%m-%d`.
    pub end_time: String,
}
