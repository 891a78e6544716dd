use crate::core::errors::ExchangeError;
use crate::core::fees::FeeSchedule;
use crate::core::kernel::{cancel_answer, extract_order_id, ReqwestTransport, Transport};
use crate::core::traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer};
use crate::core::types::{Balance, OpenOrder, OrderBook, OrderRequest, Symbol, Ticker};
use crate::exchanges::okcoin::conversions::{
    convert_balances, convert_open_orders, convert_order_book, convert_ticker, is_unknown_order,
    order_params, pair,
};
use crate::exchanges::okcoin::rest::{self, OkcoinRest};
use async_trait::async_trait;
use tracing::instrument;

/// OKCoin v1 connector
pub struct OkcoinConnector<T: Transport = ReqwestTransport> {
    rest: OkcoinRest<T>,
    fees: FeeSchedule,
}

impl<T: Transport> OkcoinConnector<T> {
    pub fn new(rest: OkcoinRest<T>, fees: FeeSchedule) -> Self {
        Self { rest, fees }
    }

    pub const fn rest(&self) -> &OkcoinRest<T> {
        &self.rest
    }
}

#[async_trait]
impl<T: Transport> MarketDataSource for OkcoinConnector<T> {
    #[instrument(skip(self), fields(exchange = "okcoin", symbol = %symbol))]
    async fn get_order_book(&self, symbol: &Symbol) -> Result<OrderBook, ExchangeError> {
        let book = self.rest.get_order_book(&pair(symbol)).await?;
        convert_order_book(rest::DEPTH, symbol, book)
    }

    #[instrument(skip(self), fields(exchange = "okcoin", symbol = %symbol))]
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExchangeError> {
        let ticker = self.rest.get_ticker(&pair(symbol)).await?;
        convert_ticker(rest::TICKER, symbol, ticker)
    }
}

#[async_trait]
impl<T: Transport> OrderPlacer for OkcoinConnector<T> {
    #[instrument(skip(self, order), fields(exchange = "okcoin", symbol = %order.symbol))]
    async fn place_order(&mut self, order: OrderRequest) -> Result<String, ExchangeError> {
        let answer = self.rest.trade(order_params(&order)).await?;
        // Older deployments answer with `id` instead of `order_id`.
        extract_order_id(&answer, &["order_id", "id"]).into_result(rest::TRADE)
    }

    #[instrument(skip(self), fields(exchange = "okcoin", symbol = %symbol, order_id = %order_id))]
    async fn cancel_order(&mut self, symbol: &Symbol, order_id: &str) -> Result<bool, ExchangeError> {
        let result = self.rest.cancel_order(&pair(symbol), order_id).await;
        cancel_answer(rest::CANCEL_ORDER, result, is_unknown_order)
    }

    #[instrument(skip(self), fields(exchange = "okcoin", symbol = %symbol))]
    async fn get_open_orders(&mut self, symbol: &Symbol) -> Result<Vec<OpenOrder>, ExchangeError> {
        let orders = self.rest.get_open_orders(&pair(symbol)).await?;
        convert_open_orders(rest::ORDER_INFO, symbol, orders)
    }
}

#[async_trait]
impl<T: Transport> AccountInfo for OkcoinConnector<T> {
    #[instrument(skip(self), fields(exchange = "okcoin"))]
    async fn get_balances(&mut self) -> Result<Vec<Balance>, ExchangeError> {
        Ok(convert_balances(self.rest.get_funds().await?))
    }
}

impl<T: Transport> ExchangeConnector for OkcoinConnector<T> {
    fn name(&self) -> &'static str {
        "okcoin"
    }

    fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }
}
