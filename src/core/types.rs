use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors raised while building domain values
#[derive(Error, Debug)]
pub enum TypesError {
    #[error("Invalid symbol: {0}")]
    InvalidSymbol(String),
    #[error("Invalid decimal: {0}")]
    InvalidDecimal(#[from] rust_decimal::Error),
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(String),
    #[error("Invalid order side: {0}")]
    InvalidSide(String),
}

/// Type-safe market representation
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol {
    pub base: String,
    pub quote: String,
}

impl Symbol {
    /// Create a new symbol with validation
    pub fn new(base: impl Into<String>, quote: impl Into<String>) -> Result<Self, TypesError> {
        let base = base.into().to_uppercase();
        let quote = quote.into().to_uppercase();

        if base.is_empty() || quote.is_empty() {
            return Err(TypesError::InvalidSymbol(
                "Base and quote assets cannot be empty".to_string(),
            ));
        }
        if !base.chars().chain(quote.chars()).all(|c| c.is_ascii_alphanumeric()) {
            return Err(TypesError::InvalidSymbol(format!("{}/{}", base, quote)));
        }

        Ok(Self { base, quote })
    }

    /// Parse "BTC/USD", "btc_usd" or "BTC-USD"
    pub fn parse(symbol: &str) -> Result<Self, TypesError> {
        let (base, quote) = symbol
            .split_once(['/', '_', '-'])
            .ok_or_else(|| TypesError::InvalidSymbol(symbol.to_string()))?;
        Self::new(base, quote)
    }

    /// Exchange pair code, e.g. `pair("_", true)` gives `btc_usd`
    pub fn pair(&self, separator: &str, lowercase: bool) -> String {
        let joined = format!("{}{}{}", self.base, separator, self.quote);
        if lowercase {
            joined.to_lowercase()
        } else {
            joined
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// Type-safe price representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Price(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Price {
    pub fn new(value: Decimal) -> Self {
        Self(value)
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Price {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(s.trim().parse()?))
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

/// Type-safe quantity representation
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Quantity(#[serde(with = "rust_decimal::serde::str")] pub Decimal);

impl Quantity {
    pub fn new(value: Decimal) -> Result<Self, TypesError> {
        if value.is_sign_negative() {
            return Err(TypesError::InvalidQuantity(value.to_string()));
        }
        Ok(Self(value))
    }

    pub fn value(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Quantity {
    type Err = TypesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s.trim().parse()?)
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.normalize())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl OrderSide {
    pub const fn as_lower(self) -> &'static str {
        match self {
            Self::Buy => "buy",
            Self::Sell => "sell",
        }
    }
}

impl FromStr for OrderSide {
    type Err = TypesError;

    /// Accepts `buy`/`sell` and the `bid`/`ask` spelling some exchanges use
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "buy" | "bid" => Ok(Self::Buy),
            "sell" | "ask" => Ok(Self::Sell),
            _ => Err(TypesError::InvalidSide(s.to_string())),
        }
    }
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_lower())
    }
}

/// A limit order as the trading layer asks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderRequest {
    pub symbol: Symbol,
    pub side: OrderSide,
    pub quantity: Quantity,
    pub price: Price,
}

impl OrderRequest {
    pub fn limit(symbol: Symbol, side: OrderSide, quantity: Quantity, price: Price) -> Self {
        Self {
            symbol,
            side,
            quantity,
            price,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenOrder {
    pub order_id: String,
    pub symbol: Symbol,
    pub side: OrderSide,
    pub price: Price,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBookEntry {
    pub price: Price,
    pub quantity: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderBook {
    pub symbol: Symbol,
    pub bids: Vec<OrderBookEntry>,
    pub asks: Vec<OrderBookEntry>,
}

impl OrderBook {
    pub fn best_bid(&self) -> Option<&OrderBookEntry> {
        self.bids.first()
    }

    pub fn best_ask(&self) -> Option<&OrderBookEntry> {
        self.asks.first()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ticker {
    pub symbol: Symbol,
    pub bid: Price,
    pub ask: Price,
    pub last: Price,
    pub volume: Quantity,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Balance {
    pub asset: String,
    pub free: Decimal,
    pub locked: Decimal,
}

impl Balance {
    pub fn total(&self) -> Decimal {
        self.free + self.locked
    }
}

/// Helpers for building domain values out of exchange payloads
pub mod conversion {
    use super::{OrderBookEntry, Price, Quantity, TypesError};
    use rust_decimal::Decimal;

    pub fn book_entry(price: Decimal, amount: Decimal) -> Result<OrderBookEntry, TypesError> {
        Ok(OrderBookEntry {
            price: Price::new(price),
            quantity: Quantity::new(amount)?,
        })
    }

    /// One side of a book from `(price, amount)` pairs, keeping the exchange's order
    pub fn book_side(
        levels: impl IntoIterator<Item = (Decimal, Decimal)>,
    ) -> Result<Vec<OrderBookEntry>, TypesError> {
        levels
            .into_iter()
            .map(|(price, amount)| book_entry(price, amount))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_symbol_parse_and_pair_codes() {
        let symbol = Symbol::parse("btc_usd").unwrap();
        assert_eq!(symbol.base, "BTC");
        assert_eq!(symbol.quote, "USD");
        assert_eq!(symbol.pair("", true), "btcusd");
        assert_eq!(symbol.pair("_", true), "btc_usd");
        assert_eq!(symbol.to_string(), "BTC/USD");
        assert!(Symbol::parse("BTCUSD").is_err());
        assert!(Symbol::new("", "USD").is_err());
    }

    #[test]
    fn test_price_and_quantity_display_is_normalized() {
        let price: Price = "250.500".parse().unwrap();
        assert_eq!(price.to_string(), "250.5");
        assert_eq!(price.value(), d("250.5"));

        let qty: Quantity = "0.0100".parse().unwrap();
        assert_eq!(qty.to_string(), "0.01");
        assert!("-1".parse::<Quantity>().is_err());
    }

    #[test]
    fn test_order_side_accepts_bid_ask_spelling() {
        assert_eq!("BUY".parse::<OrderSide>().unwrap(), OrderSide::Buy);
        assert_eq!("ask".parse::<OrderSide>().unwrap(), OrderSide::Sell);
        assert!("hold".parse::<OrderSide>().is_err());
    }

    #[test]
    fn test_balance_total() {
        let balance = Balance {
            asset: "BTC".into(),
            free: d("1.5"),
            locked: d("0.25"),
        };
        assert_eq!(balance.total(), d("1.75"));
    }
}
