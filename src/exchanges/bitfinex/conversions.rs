use super::types::{
    BitfinexBalance, BitfinexBookLevel, BitfinexOrder, BitfinexOrderBook, BitfinexTicker,
};
use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::Params;
use crate::core::types::{
    conversion, Balance, OpenOrder, OrderBook, OrderBookEntry, OrderRequest, OrderSide, Price,
    Quantity, Symbol, Ticker, TypesError,
};

/// Pair code Bitfinex v1 uses, e.g. `btcusd`
pub fn pair(symbol: &Symbol) -> String {
    symbol.pair("", true)
}

pub fn convert_order_book(
    endpoint: &str,
    symbol: &Symbol,
    book: BitfinexOrderBook,
) -> Result<OrderBook, ExchangeError> {
    Ok(OrderBook {
        symbol: symbol.clone(),
        bids: book_side(endpoint, book.bids)?,
        asks: book_side(endpoint, book.asks)?,
    })
}

fn book_side(
    endpoint: &str,
    levels: Vec<BitfinexBookLevel>,
) -> Result<Vec<OrderBookEntry>, ExchangeError> {
    conversion::book_side(levels.into_iter().map(|l| (l.price, l.amount)))
        .map_err(|e| ExchangeError::malformed(endpoint, e.to_string()))
}

pub fn convert_ticker(
    endpoint: &str,
    symbol: &Symbol,
    ticker: BitfinexTicker,
) -> Result<Ticker, ExchangeError> {
    Ok(Ticker {
        symbol: symbol.clone(),
        bid: Price::new(ticker.bid),
        ask: Price::new(ticker.ask),
        last: Price::new(ticker.last_price),
        volume: Quantity::new(ticker.volume)
            .map_err(|e| ExchangeError::malformed(endpoint, e.to_string()))?,
    })
}

/// Keep only orders on `symbol`; `/v1/orders` lists every market
pub fn convert_open_orders(
    endpoint: &str,
    symbol: &Symbol,
    orders: Vec<BitfinexOrder>,
) -> Result<Vec<OpenOrder>, ExchangeError> {
    let wanted = pair(symbol);
    orders
        .into_iter()
        .filter(|order| order.symbol.eq_ignore_ascii_case(&wanted))
        .map(|order| {
            let malformed = |e: TypesError| {
                ExchangeError::malformed(endpoint, e.to_string())
            };
            Ok(OpenOrder {
                order_id: order.id.to_string(),
                symbol: symbol.clone(),
                side: order.side.parse::<OrderSide>().map_err(malformed)?,
                price: Price::new(order.price),
                quantity: Quantity::new(order.remaining_amount).map_err(malformed)?,
            })
        })
        .collect()
}

/// Balances of the exchange wallet; margin and funding wallets are not tradable here
pub fn convert_balances(balances: Vec<BitfinexBalance>) -> Vec<Balance> {
    balances
        .into_iter()
        .filter(|b| b.wallet == "exchange")
        .map(|b| Balance {
            asset: b.currency.to_uppercase(),
            free: b.available,
            locked: b.amount - b.available,
        })
        .collect()
}

pub fn order_params(order: &OrderRequest) -> Params {
    vec![
        text_param("symbol", pair(&order.symbol)),
        text_param("amount", order.quantity),
        text_param("price", order.price),
        text_param("exchange", "bitfinex"),
        text_param("side", order.side.as_lower()),
        text_param("type", "exchange limit"),
    ]
}

/// Bitfinex answers a cancel of a filled or unknown order with this message
pub fn is_unknown_order(message: &str, _code: Option<&str>) -> bool {
    let lower = message.to_lowercase();
    lower.contains("could not be cancelled") || lower.contains("order not found")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::kernel::request::raw_query_string;
    use rust_decimal::Decimal;
    use std::str::FromStr;

    fn d(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    #[test]
    fn test_order_params_layout() {
        let order = OrderRequest::limit(
            Symbol::new("BTC", "USD").unwrap(),
            OrderSide::Buy,
            "0.50".parse().unwrap(),
            "250".parse().unwrap(),
        );
        assert_eq!(
            raw_query_string(&order_params(&order)),
            "symbol=btcusd&amount=0.5&price=250&exchange=bitfinex&side=buy&type=exchange limit"
        );
    }

    #[test]
    fn test_open_orders_are_filtered_by_pair() {
        let symbol = Symbol::new("BTC", "USD").unwrap();
        let orders = vec![
            BitfinexOrder {
                id: 1,
                symbol: "btcusd".into(),
                price: d("250"),
                side: "sell".into(),
                remaining_amount: d("0.1"),
            },
            BitfinexOrder {
                id: 2,
                symbol: "ltcusd".into(),
                price: d("3"),
                side: "buy".into(),
                remaining_amount: d("10"),
            },
        ];

        let open = convert_open_orders("/v1/orders", &symbol, orders).unwrap();
        assert_eq!(open.len(), 1);
        assert_eq!(open[0].order_id, "1");
        assert_eq!(open[0].side, OrderSide::Sell);
    }

    #[test]
    fn test_only_exchange_wallet_balances() {
        let balances = vec![
            BitfinexBalance {
                wallet: "exchange".into(),
                currency: "btc".into(),
                amount: d("1.5"),
                available: d("1.0"),
            },
            BitfinexBalance {
                wallet: "deposit".into(),
                currency: "usd".into(),
                amount: d("100"),
                available: d("100"),
            },
        ];

        let converted = convert_balances(balances);
        assert_eq!(converted.len(), 1);
        assert_eq!(converted[0].asset, "BTC");
        assert_eq!(converted[0].locked, d("0.5"));
    }
}
