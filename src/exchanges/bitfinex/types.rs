use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// One price level from `/v1/book/{pair}`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitfinexBookLevel {
    pub price: Decimal,
    pub amount: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitfinexOrderBook {
    pub bids: Vec<BitfinexBookLevel>,
    pub asks: Vec<BitfinexBookLevel>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitfinexTicker {
    pub bid: Decimal,
    pub ask: Decimal,
    pub last_price: Decimal,
    pub volume: Decimal,
}

/// Order status as returned by `/v1/orders`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitfinexOrder {
    pub id: u64,
    pub symbol: String,
    pub price: Decimal,
    pub side: String,
    pub remaining_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitfinexBalance {
    /// Wallet: `exchange`, `trading` or `deposit`
    #[serde(rename = "type")]
    pub wallet: String,
    pub currency: String,
    pub amount: Decimal,
    pub available: Decimal,
}
