use super::types::{OkcoinFunds, OkcoinOrder, OkcoinOrderBook, OkcoinTicker};
use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::{DecodedResult, Params};
use crate::core::types::{
    conversion, Balance, OpenOrder, OrderBook, OrderRequest, OrderSide, Price, Quantity, Symbol,
    Ticker, TypesError,
};

/// The order id OKCoin treats as "every open order"
pub const ALL_OPEN_ORDERS: &str = "-1";

/// OKCoin no longer knows the order (filled, cancelled or never existed)
pub const ORDER_NOT_FOUND: &str = "10009";

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
    book: OkcoinOrderBook,
) -> Result<OrderBook, ExchangeError> {
    // Asks arrive worst first.
    let asks = conversion::book_side(book.asks.into_iter().rev()).map_err(malformed(endpoint))?;
    let bids = conversion::book_side(book.bids).map_err(malformed(endpoint))?;
    Ok(OrderBook {
        symbol: symbol.clone(),
        bids,
        asks,
    })
}

pub fn convert_ticker(
    endpoint: &str,
    symbol: &Symbol,
    ticker: OkcoinTicker,
) -> Result<Ticker, ExchangeError> {
    Ok(Ticker {
        symbol: symbol.clone(),
        bid: Price::new(ticker.buy),
        ask: Price::new(ticker.sell),
        last: Price::new(ticker.last),
        volume: Quantity::new(ticker.vol).map_err(malformed(endpoint))?,
    })
}

pub fn convert_open_orders(
    endpoint: &str,
    symbol: &Symbol,
    orders: Vec<OkcoinOrder>,
) -> Result<Vec<OpenOrder>, ExchangeError> {
    orders
        .into_iter()
        .map(|order| {
            let side = order
                .side
                .trim_end_matches("_market")
                .parse::<OrderSide>()
                .map_err(malformed(endpoint))?;
            Ok(OpenOrder {
                order_id: order.order_id.to_string(),
                symbol: symbol.clone(),
                side,
                price: Price::new(order.price),
                quantity: Quantity::new(order.amount - order.deal_amount)
                    .map_err(malformed(endpoint))?,
            })
        })
        .collect()
}

/// Free and frozen funds per currency; currencies with nothing in either are skipped
pub fn convert_balances(funds: OkcoinFunds) -> Vec<Balance> {
    let mut balances: Vec<Balance> = funds
        .free
        .into_iter()
        .map(|(asset, free)| {
            let locked = funds.freezed.get(&asset).copied().unwrap_or_default();
            Balance {
                asset: asset.to_uppercase(),
                free,
                locked,
            }
        })
        .collect();
    balances.retain(|b| !b.total().is_zero());
    balances
}

pub fn order_params(order: &OrderRequest) -> Params {
    vec![
        text_param("symbol", pair(&order.symbol)),
        text_param("type", order.side.as_lower()),
        text_param("price", order.price),
        text_param("amount", order.quantity),
    ]
}

pub fn is_unknown_order(_message: &str, code: Option<&str>) -> bool {
    code == Some(ORDER_NOT_FOUND)
}

/// Error codes OKCoin returns without any text
fn describe(code: &str) -> Option<&'static str> {
    Some(match code {
        "10000" => "Required field missing",
        "10001" => "Request frequency too high",
        "10005" => "Secret key does not exist",
        "10006" => "Api_key does not exist",
        "10007" => "Signature does not match",
        "10008" => "Illegal parameter",
        "10009" => "Order does not exist",
        "10010" => "Insufficient funds",
        "10011" => "Amount too low",
        "10012" => "Only btc_usd and ltc_usd supported",
        "10014" => "Order price must be between 0 and 1,000,000",
        "10016" => "Insufficient coins balance",
        "10024" => "Balance not sufficient",
        "10026" => "Currency amount must be positive",
        "10216" => "Non-public API",
        _ => return None,
    })
}

/// Replace the bare code in a business error with its description
pub fn explain(result: DecodedResult) -> DecodedResult {
    match result {
        DecodedResult::BusinessError {
            message,
            code: Some(code),
        } => match describe(&code) {
            Some(text) => {
                DecodedResult::business(format!("{} (error code {})", text, code), Some(code))
            }
            None => DecodedResult::business(message, Some(code)),
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ProtocolErrorKind;
    use rust_decimal::Decimal;
    use std::collections::BTreeMap;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_asks_are_reordered_best_first() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let book = OkcoinOrderBook {
            asks: vec![(d("252"), d("1")), (d("251"), d("2"))],
            bids: vec![(d("249"), d("3"))],
        };
        let book = convert_order_book("/api/v1/depth.do", &symbol, book).unwrap();
        assert_eq!(book.best_ask().unwrap().price.value(), d("251"));
        assert_eq!(book.best_bid().unwrap().price.value(), d("249"));
    }

    #[test]
    fn test_open_order_quantity_is_what_remains() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let orders = vec![OkcoinOrder {
            order_id: 10_000_591,
            symbol: "btc_usd".into(),
            side: "sell_market".into(),
            price: d("500"),
            amount: d("0.3"),
            deal_amount: d("0.1"),
        }];
        let open = convert_open_orders("/api/v1/order_info.do", &symbol, orders).unwrap();
        assert_eq!(open[0].side, OrderSide::Sell);
        assert_eq!(open[0].quantity.value(), d("0.2"));
    }

    #[test]
    fn test_empty_balances_are_dropped() {
        let mut free = BTreeMap::new();
        free.insert("btc".to_string(), d("0.5"));
        free.insert("ltc".to_string(), d("0"));
        let mut freezed = BTreeMap::new();
        freezed.insert("btc".to_string(), d("0.1"));

        let balances = convert_balances(OkcoinFunds { free, freezed });
        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].total(), d("0.6"));
    }

    #[test]
    fn test_signature_error_code_becomes_authentication_failure() {
        let explained = explain(DecodedResult::business(
            "Exchange error code 10007",
            Some("10007".into()),
        ));
        let err = explained.into_result("/api/v1/trade.do").unwrap_err();
        assert_eq!(err.kind(), Some(&ProtocolErrorKind::Authentication));
    }
}
