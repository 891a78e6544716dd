use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// `/api/v1/depth.do`: levels are `[price, amount]` pairs, asks from highest to lowest
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinOrderBook {
    pub asks: Vec<(Decimal, Decimal)>,
    pub bids: Vec<(Decimal, Decimal)>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinTickerResponse {
    pub ticker: OkcoinTicker,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinTicker {
    pub buy: Decimal,
    pub sell: Decimal,
    pub last: Decimal,
    pub vol: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinOrdersResponse {
    #[serde(default)]
    pub orders: Vec<OkcoinOrder>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinOrder {
    pub order_id: u64,
    pub symbol: String,
    /// `buy`, `sell`, `buy_market` or `sell_market`
    #[serde(rename = "type")]
    pub side: String,
    pub price: Decimal,
    pub amount: Decimal,
    #[serde(default)]
    pub deal_amount: Decimal,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinUserInfo {
    pub info: OkcoinInfo,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinInfo {
    pub funds: OkcoinFunds,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OkcoinFunds {
    pub free: BTreeMap<String, Decimal>,
    #[serde(default)]
    pub freezed: BTreeMap<String, Decimal>,
}
