use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Public v3 answers are keyed by pair: `{"btc_usd": {...}}`
pub type WexByPair<T> = BTreeMap<String, T>;

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WexDepth {
    pub asks: Vec<(Decimal, Decimal)>,
    pub bids: Vec<(Decimal, Decimal)>,
}

/// `buy` is the price a buyer pays (best ask), `sell` the price a seller gets (best bid)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WexTicker {
    pub buy: Decimal,
    pub sell: Decimal,
    pub last: Decimal,
    /// Volume in the base currency
    pub vol_cur: Decimal,
}

/// Entry of `ActiveOrders`, keyed by order id
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WexOrder {
    pub pair: String,
    #[serde(rename = "type")]
    pub side: String,
    pub amount: Decimal,
    pub rate: Decimal,
}

/// `return` of `getInfo`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct WexInfo {
    pub funds: BTreeMap<String, Decimal>,
}
