//! Instrument identity: symbol, exchange and the pair keying every cache.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A trading symbol as the platform knows it.
///
/// Examples: "AAPL" on NASDAQ, "00700" on SEHK, "600519" on SSE.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    /// Create a new Symbol.
    ///
    /// Surrounding whitespace is dropped and letters are normalized to uppercase.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into().trim().to_uppercase())
    }

    /// Get the symbol string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Consume and return the inner string.
    #[must_use]
    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for Symbol {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Symbol {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

/// Platform exchange codes the gateway can route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Exchange {
    /// Nasdaq Stock Market.
    Nasdaq,
    /// New York Stock Exchange.
    Nyse,
    /// Stock Exchange of Hong Kong.
    Sehk,
    /// Shanghai Stock Exchange.
    Sse,
    /// Shenzhen Stock Exchange.
    Szse,
}

impl Exchange {
    /// Platform code, as used in `vt_symbol` style keys.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Nasdaq => "NASDAQ",
            Self::Nyse => "NYSE",
            Self::Sehk => "SEHK",
            Self::Sse => "SSE",
            Self::Szse => "SZSE",
        }
    }

    /// Parse a platform exchange code (case-insensitive).
    #[must_use]
    pub fn parse(code: &str) -> Option<Self> {
        match code.trim().to_ascii_uppercase().as_str() {
            "NASDAQ" => Some(Self::Nasdaq),
            "NYSE" => Some(Self::Nyse),
            "SEHK" => Some(Self::Sehk),
            "SSE" => Some(Self::Sse),
            "SZSE" => Some(Self::Szse),
            _ => None,
        }
    }
}

impl fmt::Display for Exchange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// (symbol, exchange) pair. Keys contracts, ticks and subscriptions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct InstrumentKey {
    /// Instrument symbol.
    pub symbol: Symbol,
    /// Listing exchange.
    pub exchange: Exchange,
}

impl InstrumentKey {
    /// Create a key.
    #[must_use]
    pub fn new(symbol: impl Into<Symbol>, exchange: Exchange) -> Self {
        Self {
            symbol: symbol.into(),
            exchange,
        }
    }
}

impl fmt::Display for InstrumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.symbol, self.exchange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_normalizes() {
        assert_eq!(Symbol::new(" aapl ").as_str(), "AAPL");
        assert_eq!(Symbol::new("00700").as_str(), "00700");
    }

    #[test]
    fn exchange_parse_accepts_codes() {
        assert_eq!(Exchange::parse("nasdaq"), Some(Exchange::Nasdaq));
        assert_eq!(Exchange::parse("SEHK"), Some(Exchange::Sehk));
        assert_eq!(Exchange::parse("LSE"), None);
    }

    #[test]
    fn exchange_serde_uses_codes() {
        let json = serde_json::to_string(&Exchange::Sehk).unwrap();
        assert_eq!(json, "\"SEHK\"");
    }

    #[test]
    fn key_display_is_dotted() {
        let key = InstrumentKey::new("AAPL", Exchange::Nasdaq);
        assert_eq!(key.to_string(), "AAPL.NASDAQ");
    }

    #[test]
    fn keys_compare_by_both_parts() {
        let a = InstrumentKey::new("AAPL", Exchange::Nasdaq);
        let b = InstrumentKey::new("AAPL", Exchange::Nyse);
        assert_ne!(a, b);
        assert_eq!(a, InstrumentKey::new("aapl", Exchange::Nasdaq));
    }
}
