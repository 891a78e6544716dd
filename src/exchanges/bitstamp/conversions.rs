use super::types::{BitstampOrder, BitstampOrderBook, BitstampTicker};
use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::{lenient_decimal, Params};
use crate::core::types::{
    conversion, Balance, OpenOrder, OrderBook, OrderRequest, OrderSide, Price, Quantity, Symbol,
    Ticker,
};
use serde_json::{Map, Value};

/// Pair code, e.g. `btcusd`
pub fn pair(symbol: &Symbol) -> String {
    symbol.pair("", true)
}

pub fn convert_order_book(
    endpoint: &str,
    symbol: &Symbol,
    book: BitstampOrderBook,
) -> Result<OrderBook, ExchangeError> {
    let malformed = |e: crate::core::types::TypesError| {
        ExchangeError::malformed(endpoint, e.to_string())
    };
    Ok(OrderBook {
        symbol: symbol.clone(),
        bids: conversion::book_side(book.bids).map_err(malformed)?,
        asks: conversion::book_side(book.asks).map_err(malformed)?,
    })
}

pub fn convert_ticker(
    endpoint: &str,
    symbol: &Symbol,
    ticker: BitstampTicker,
) -> Result<Ticker, ExchangeError> {
    Ok(Ticker {
        symbol: symbol.clone(),
        bid: Price::new(ticker.bid),
        ask: Price::new(ticker.ask),
        last: Price::new(ticker.last),
        volume: Quantity::new(ticker.volume)
            .map_err(|e| ExchangeError::malformed(endpoint, e.to_string()))?,
    })
}

fn id_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn side(endpoint: &str, value: &Value) -> Result<OrderSide, ExchangeError> {
    match id_text(value).as_str() {
        "0" => Ok(OrderSide::Buy),
        "1" => Ok(OrderSide::Sell),
        other => Err(ExchangeError::malformed(
            endpoint,
            format!("Unknown order type '{}'", other),
        )),
    }
}

pub fn convert_open_orders(
    endpoint: &str,
    symbol: &Symbol,
    orders: Vec<BitstampOrder>,
) -> Result<Vec<OpenOrder>, ExchangeError> {
    orders
        .into_iter()
        .map(|order| {
            Ok(OpenOrder {
                order_id: id_text(&order.id),
                symbol: symbol.clone(),
                side: side(endpoint, &order.side)?,
                price: Price::new(order.price),
                quantity: Quantity::new(order.amount)
                    .map_err(|e| ExchangeError::malformed(endpoint, e.to_string()))?,
            })
        })
        .collect()
}

/// `/api/v2/balance/` is flat: `btc_available`, `btc_reserved`, `btc_balance`, ..., `fee`
pub fn convert_balances(payload: &Map<String, Value>) -> Vec<Balance> {
    let mut balances: Vec<Balance> = payload
        .iter()
        .filter_map(|(key, value)| {
            let asset = key.strip_suffix("_available")?;
            let free = lenient_decimal(value)?;
            let locked = payload
                .get(&format!("{}_reserved", asset))
                .and_then(lenient_decimal)
                .unwrap_or_default();
            Some(Balance {
                asset: asset.to_uppercase(),
                free,
                locked,
            })
        })
        .filter(|b| !b.total().is_zero())
        .collect();
    balances.sort_by(|a, b| a.asset.cmp(&b.asset));
    balances
}

pub fn order_path(order: &OrderRequest) -> String {
    format!("/api/v2/{}/{}/", order.side.as_lower(), pair(&order.symbol))
}

pub fn order_params(order: &OrderRequest) -> Params {
    vec![
        text_param("amount", order.quantity),
        text_param("price", order.price),
    ]
}

pub fn is_unknown_order(message: &str, _code: Option<&str>) -> bool {
    message.to_lowercase().contains("order not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn test_flat_balance_payload() {
        let payload = json!({
            "btc_available": "0.40000000",
            "btc_reserved": "0.10000000",
            "btc_balance": "0.50000000",
            "usd_available": "0.00",
            "usd_reserved": "0.00",
            "fee": "0.25"
        });
        let balances = convert_balances(payload.as_object().unwrap());
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].asset, "BTC");
        assert_eq!(balances[0].total(), Decimal::from_str("0.5").unwrap());
    }

    #[test]
    fn test_open_orders_tolerate_string_and_number_fields() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let orders: Vec<BitstampOrder> = serde_json::from_value(json!([
            {"id": "1766", "type": "1", "price": "251.00", "amount": "0.5"},
            {"id": 1767, "type": 0, "price": 249.5, "amount": 1}
        ]))
        .unwrap();

        let open = convert_open_orders("/api/v2/open_orders/btcusd/", &symbol, orders).unwrap();
        assert_eq!(open[0].order_id, "1766");
        assert_eq!(open[0].side, OrderSide::Sell);
        assert_eq!(open[1].order_id, "1767");
        assert_eq!(open[1].side, OrderSide::Buy);
    }

    #[test]
    fn test_order_path_has_trailing_slash() {
        let order = OrderRequest::limit(
            Symbol::new("ETH", "EUR").unwrap(),
            OrderSide::Sell,
            "1".parse().unwrap(),
            "2000".parse().unwrap(),
        );
        assert_eq!(order_path(&order), "/api/v2/sell/etheur/");
    }
}
