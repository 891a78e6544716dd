use super::types::{WexDepth, WexInfo, WexOrder, WexTicker};
use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::Params;
use crate::core::types::{
    conversion, Balance, OpenOrder, OrderBook, OrderRequest, OrderSide, Price, Quantity, Symbol,
    Ticker, TypesError,
};
use std::collections::BTreeMap;

/// Pair code, e.g. `btc_usd`
pub fn pair(symbol: &Symbol) -> String {
    symbol.pair("_", true)
}

fn malformed(endpoint: &str) -> impl Fn(TypesError) -> ExchangeError + '_ {
    move |e| ExchangeError::malformed(endpoint, e.to_string())
}

pub fn convert_order_book(
    endpoint: &str,
    symbol: &Symbol,
    depth: WexDepth,
) -> Result<OrderBook, ExchangeError> {
    Ok(OrderBook {
        symbol: symbol.clone(),
        bids: conversion::book_side(depth.bids).map_err(malformed(endpoint))?,
        asks: conversion::book_side(depth.asks).map_err(malformed(endpoint))?,
    })
}

pub fn convert_ticker(
    endpoint: &str,
    symbol: &Symbol,
    ticker: WexTicker,
) -> Result<Ticker, ExchangeError> {
    Ok(Ticker {
        symbol: symbol.clone(),
        bid: Price::new(ticker.sell),
        ask: Price::new(ticker.buy),
        last: Price::new(ticker.last),
        volume: Quantity::new(ticker.vol_cur).map_err(malformed(endpoint))?,
    })
}

pub fn convert_open_orders(
    endpoint: &str,
    symbol: &Symbol,
    orders: BTreeMap<String, WexOrder>,
) -> Result<Vec<OpenOrder>, ExchangeError> {
    orders
        .into_iter()
        .map(|(order_id, order)| {
            Ok(OpenOrder {
                order_id,
                symbol: symbol.clone(),
                side: order
                    .side
                    .parse::<OrderSide>()
                    .map_err(malformed(endpoint))?,
                price: Price::new(order.rate),
                quantity: Quantity::new(order.amount).map_err(malformed(endpoint))?,
            })
        })
        .collect()
}

/// `getInfo` only reports available funds
pub fn convert_balances(info: WexInfo) -> Vec<Balance> {
    info.funds
        .into_iter()
        .filter(|(_, amount)| !amount.is_zero())
        .map(|(asset, free)| Balance {
            asset: asset.to_uppercase(),
            free,
            locked: rust_decimal::Decimal::ZERO,
        })
        .collect()
}

pub fn trade_params(order: &OrderRequest) -> Params {
    vec![
        text_param("pair", pair(&order.symbol)),
        text_param("type", order.side.as_lower()),
        text_param("rate", order.price),
        text_param("amount", order.quantity),
    ]
}

/// `ActiveOrders` reports an empty book as an error
pub fn is_no_orders(message: &str) -> bool {
    message.trim().eq_ignore_ascii_case("no orders")
}

pub fn is_unknown_order(message: &str, _code: Option<&str>) -> bool {
    let lower = message.to_lowercase();
    lower.contains("bad status") || lower.contains("invalid order") || lower.contains("no orders")
}
