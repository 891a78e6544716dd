use crate::core::{
    errors::ExchangeError,
    fees::FeeSchedule,
    types::{Balance, OpenOrder, OrderBook, OrderRequest, Symbol, Ticker},
};
use async_trait::async_trait;

#[async_trait]
pub trait MarketDataSource {
    /// Current order book for a market
    async fn get_order_book(&self, symbol: &Symbol) -> Result<OrderBook, ExchangeError>;

    /// Best bid/ask and last trade for a market
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExchangeError>;
}

/// Authenticated trading calls.
///
/// Methods take `&mut self`: each one consumes a nonce, and the exchange must see them in the
/// order they were issued.
#[async_trait]
pub trait OrderPlacer {
    /// Place a limit order and return the exchange's order id
    async fn place_order(&mut self, order: OrderRequest) -> Result<String, ExchangeError>;

    /// Cancel an order.
    ///
    /// Returns `Ok(false)` when the exchange reports the order as unknown, or answers with a
    /// status or message on the configured non-fatal lists.
    async fn cancel_order(&mut self, symbol: &Symbol, order_id: &str)
        -> Result<bool, ExchangeError>;

    async fn get_open_orders(&mut self, symbol: &Symbol) -> Result<Vec<OpenOrder>, ExchangeError>;
}

#[async_trait]
pub trait AccountInfo {
    async fn get_balances(&mut self) -> Result<Vec<Balance>, ExchangeError>;
}

/// Composite trait for a full exchange adapter
pub trait ExchangeConnector: MarketDataSource + OrderPlacer + AccountInfo + Send + Sync {
    /// Lower-case exchange name used in logs
    fn name(&self) -> &'static str;

    fn fee_schedule(&self) -> &FeeSchedule;
}
