use crate::core::errors::ExchangeError;
use crate::core::fees::FeeSchedule;
use crate::core::kernel::{cancel_answer, extract_order_id, ReqwestTransport, Transport};
use crate::core::traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer};
use crate::core::types::{Balance, OpenOrder, OrderBook, OrderRequest, Symbol, Ticker};
use crate::exchanges::bitstamp::conversions::{
    convert_balances, convert_open_orders, convert_order_book, convert_ticker, is_unknown_order,
    order_params, order_path, pair,
};
use crate::exchanges::bitstamp::rest::{self, BitstampRest};
use async_trait::async_trait;
use tracing::instrument;

/// Bitstamp v2 connector
#[derive(Debug)]
pub struct BitstampConnector<T: Transport = ReqwestTransport> {
    rest: BitstampRest<T>,
    fees: FeeSchedule,
}

impl<T: Transport> BitstampConnector<T> {
    pub fn new(rest: BitstampRest<T>, fees: FeeSchedule) -> Self {
        Self { rest, fees }
    }

    pub const fn rest(&self) -> &BitstampRest<T> {
        &self.rest
    }
}

#[async_trait]
impl<T: Transport> MarketDataSource for BitstampConnector<T> {
    #[instrument(skip(self), fields(exchange = "bitstamp", symbol = %symbol))]
    async fn get_order_book(&self, symbol: &Symbol) -> Result<OrderBook, ExchangeError> {
        let book = self.rest.get_order_book(&pair(symbol)).await?;
        convert_order_book("/api/v2/order_book", symbol, book)
    }

    #[instrument(skip(self), fields(exchange = "bitstamp", symbol = %symbol))]
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExchangeError> {
        let ticker = self.rest.get_ticker(&pair(symbol)).await?;
        convert_ticker("/api/v2/ticker", symbol, ticker)
    }
}

#[async_trait]
impl<T: Transport> OrderPlacer for BitstampConnector<T> {
    #[instrument(skip(self, order), fields(exchange = "bitstamp", symbol = %order.symbol))]
    async fn place_order(&mut self, order: OrderRequest) -> Result<String, ExchangeError> {
        let path = order_path(&order);
        let answer = self
            .rest
            .place_limit_order(&path, order_params(&order))
            .await?;
        extract_order_id(&answer, &["id"]).into_result(&path)
    }

    #[instrument(skip(self), fields(exchange = "bitstamp", order_id = %order_id))]
    async fn cancel_order(
        &mut self,
        _symbol: &Symbol,
        order_id: &str,
    ) -> Result<bool, ExchangeError> {
        let result = self.rest.cancel_order(order_id).await;
        cancel_answer(rest::CANCEL_ORDER, result, is_unknown_order)
    }

    #[instrument(skip(self), fields(exchange = "bitstamp", symbol = %symbol))]
    async fn get_open_orders(&mut self, symbol: &Symbol) -> Result<Vec<OpenOrder>, ExchangeError> {
        let orders = self.rest.get_open_orders(&pair(symbol)).await?;
        convert_open_orders("/api/v2/open_orders", symbol, orders)
    }
}

#[async_trait]
impl<T: Transport> AccountInfo for BitstampConnector<T> {
    #[instrument(skip(self), fields(exchange = "bitstamp"))]
    async fn get_balances(&mut self) -> Result<Vec<Balance>, ExchangeError> {
        let payload = self.rest.get_balance().await?;
        Ok(convert_balances(&payload))
    }
}

impl<T: Transport> ExchangeConnector for BitstampConnector<T> {
    fn name(&self) -> &'static str {
        "bitstamp"
    }

    fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }
}
