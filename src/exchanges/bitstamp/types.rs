use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `/api/v2/order_book/{pair}/`, levels as `["price", "amount"]`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitstampOrderBook {
    pub bids: Vec<(Decimal, Decimal)>,
    pub asks: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitstampTicker {
    pub bid: Decimal,
    pub ask: Decimal,
    pub last: Decimal,
    pub volume: Decimal,
}

/// Entry of `/api/v2/open_orders/{pair}/`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BitstampOrder {
    /// String on v2, number on older endpoints
    pub id: Value,
    /// `0` buy, `1` sell; string or number
    #[serde(rename = "type")]
    pub side: Value,
    pub price: Decimal,
    pub amount: Decimal,
}
