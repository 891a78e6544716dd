use crate::core::errors::ExchangeError;
use crate::core::fees::FeeSchedule;
use crate::core::kernel::{cancel_answer, extract_order_id, ReqwestTransport, Transport};
use crate::core::traits::{AccountInfo, ExchangeConnector, MarketDataSource, OrderPlacer};
use crate::core::types::{Balance, OpenOrder, OrderBook, OrderRequest, Symbol, Ticker};
use crate::exchanges::wex::conversions::{
    convert_balances, convert_open_orders, convert_order_book, convert_ticker, is_unknown_order,
    pair, trade_params,
};
use crate::exchanges::wex::rest::{WexRest, TRADE_API};
use async_trait::async_trait;
use tracing::{debug, instrument};

/// WEX (formerly BTC-e) connector
pub struct WexConnector<T: Transport = ReqwestTransport> {
    rest: WexRest<T>,
    fees: FeeSchedule,
}

impl<T: Transport> WexConnector<T> {
    pub fn new(rest: WexRest<T>, fees: FeeSchedule) -> Self {
        Self { rest, fees }
    }

    pub const fn rest(&self) -> &WexRest<T> {
        &self.rest
    }
}

#[async_trait]
impl<T: Transport> MarketDataSource for WexConnector<T> {
    #[instrument(skip(self), fields(exchange = "wex", symbol = %symbol))]
    async fn get_order_book(&self, symbol: &Symbol) -> Result<OrderBook, ExchangeError> {
        let depth = self.rest.get_depth(&pair(symbol)).await?;
        convert_order_book("/api/3/depth", symbol, depth)
    }

    #[instrument(skip(self), fields(exchange = "wex", symbol = %symbol))]
    async fn get_ticker(&self, symbol: &Symbol) -> Result<Ticker, ExchangeError> {
        let ticker = self.rest.get_ticker(&pair(symbol)).await?;
        convert_ticker("/api/3/ticker", symbol, ticker)
    }
}

#[async_trait]
impl<T: Transport> OrderPlacer for WexConnector<T> {
    /// An order matched in full comes back with `order_id: 0` and is reported as rejected
    #[instrument(skip(self, order), fields(exchange = "wex", symbol = %order.symbol))]
    async fn place_order(&mut self, order: OrderRequest) -> Result<String, ExchangeError> {
        let answer = self.rest.trade(trade_params(&order)).await?;
        debug!(
            received = ?answer.get("received"),
            remains = ?answer.get("remains"),
            "Trade accepted"
        );
        extract_order_id(&answer, &["order_id"]).into_result(TRADE_API)
    }

    #[instrument(skip(self), fields(exchange = "wex", order_id = %order_id))]
    async fn cancel_order(
        &mut self,
        _symbol: &Symbol,
        order_id: &str,
    ) -> Result<bool, ExchangeError> {
        let result = self.rest.cancel_order(order_id).await;
        cancel_answer(TRADE_API, result, is_unknown_order)
    }

    #[instrument(skip(self), fields(exchange = "wex", symbol = %symbol))]
    async fn get_open_orders(&mut self, symbol: &Symbol) -> Result<Vec<OpenOrder>, ExchangeError> {
        let orders = self.rest.get_active_orders(&pair(symbol)).await?;
        convert_open_orders(TRADE_API, symbol, orders)
    }
}

#[async_trait]
impl<T: Transport> AccountInfo for WexConnector<T> {
    #[instrument(skip(self), fields(exchange = "wex"))]
    async fn get_balances(&mut self) -> Result<Vec<Balance>, ExchangeError> {
        let info = self.rest.get_info().await?;
        Ok(convert_balances(info))
    }
}

impl<T: Transport> ExchangeConnector for WexConnector<T> {
    fn name(&self) -> &'static str {
        "wex"
    }

    fn fee_schedule(&self) -> &FeeSchedule {
        &self.fees
    }
}
