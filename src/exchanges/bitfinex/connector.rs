use crate::core::errors::ExchangeError;
use crate::core::fees::FeeSchedule;
use crate::core::kernel::{cancel_answer, extract_order_id, ReqwestTransport, Transport};
use crate::core::traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer};
use crate::core::types::{Balance, OpenOrder, OrderBook, OrderRequest, Symbol, Ticker};
use crate::exchanges::bitfinex::conversions::{
    convert_balances, convert_open_orders, convert_order_book, convert_ticker, is_unknown_order,
    order_params, pair,
};
use crate::exchanges::bitfinex::rest::{self, BitfinexRest};
use async_trait::async_trait;
use tracing::instrument;

/// Bitfinex v1 connector
pub struct BitfinexConnector<T: Transport = ReqwestTransport> {
    rest: BitfinexRest<T>,
    fees: FeeSchedule,
}

impl<T: Transport> BitfinexConnector<T> {
    pub fn new(rest: BitfinexRest<T>, fees: FeeSchedule) -> Self {
        Self { rest, fees }
    }

    pub const fn rest(&self) -> &BitfinexRest<T> {
        &self.rest
    }
}

#[async_trait]
impl<T: Transport> MarketDataSource for BitfinexConnector<T> {
    #[instrument(skip(self), fields(exchange = "bitfinex", symbol = %symbol))]
    async fn get_order_book(&self, symbol: &Symbol) -> Result<OrderBook, ExchangeError> {
        let book = self.rest.get_order_book(&pair(symbol)).await?;
        convert_order_book("/v1/book", symbol, book)
    }

    #[instrument(skip(self), fields(exchange = "bitfinex", symbol = %symbol))]
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExchangeError> {
        let ticker = self.rest.get_ticker(&pair(symbol)).await?;
        convert_ticker("/v1/pubticker", symbol, ticker)
    }
}

#[async_trait]
impl<T: Transport> OrderPlacer for BitfinexConnector<T> {
    #[instrument(skip(self, order), fields(exchange = "bitfinex", symbol = %order.symbol))]
    async fn place_order(&mut self, order: OrderRequest) -> Result<String, ExchangeError> {
        let status = self.rest.new_order(order_params(&order)).await?;
        extract_order_id(&status, &["order_id", "id"]).into_result(rest::NEW_ORDER)
    }

    #[instrument(skip(self), fields(exchange = "bitfinex", order_id = %order_id))]
    async fn cancel_order(
        &mut self,
        _symbol: &Symbol,
        order_id: &str,
    ) -> Result<bool, ExchangeError> {
        let id: u64 = order_id.parse().map_err(|_| {
            ExchangeError::invalid_request(
                rest::CANCEL_ORDER,
                format!("Bitfinex order ids are numeric, got '{}'", order_id),
            )
        })?;
        let result = self.rest.cancel_order(id).await;
        cancel_answer(rest::CANCEL_ORDER, result, is_unknown_order)
    }

    #[instrument(skip(self), fields(exchange = "bitfinex", symbol = %symbol))]
    async fn get_open_orders(&mut self, symbol: &Symbol) -> Result<Vec<OpenOrder>, ExchangeError> {
        let orders = self.rest.get_active_orders().await?;
        convert_open_orders(rest::ACTIVE_ORDERS, symbol, orders)
    }
}

#[async_trait]
impl<T: Transport> AccountInfo for BitfinexConnector<T> {
    #[instrument(skip(self), fields(exchange = "bitfinex"))]
    async fn get_balances(&mut self) -> Result<Vec<Balance>, ExchangeError> {
        Ok(convert_balances(self.rest.get_balances().await?))
    }
}

impl<T: Transport> ExchangeConnector for BitfinexConnector<T> {
    fn name(&self) -> &'static str {
        "bitfinex"
    }

    fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }
}
