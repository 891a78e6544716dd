use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::{
    from_payload, DecodedResult, EnvelopeSpec, Params, PayloadKind, RestPipeline, Transport,
};
use crate::exchanges::okcoin::conversions::{explain, ALL_OPEN_ORDERS};
use crate::exchanges::okcoin::types::{
    OkcoinFunds, OkcoinOrder, OkcoinOrderBook, OkcoinOrdersResponse, OkcoinTicker,
    OkcoinTickerResponse, OkcoinUserInfo,
};
use reqwest::Method;
use serde_json::Value;

pub const DEPTH: &str = "/api/v1/depth.do";
pub const TICKER: &str = "/api/v1/ticker.do";
pub const TRADE: &str = "/api/v1/trade.do";
pub const CANCEL_ORDER: &str = "/api/v1/cancel_order.do";
pub const ORDER_INFO: &str = "/api/v1/order_info.do";
pub const USER_INFO: &str = "/api/v1/userinfo.do";

/// Market data: bare body, a lone `error_code` on failure
fn public_envelope() -> EnvelopeSpec {
    EnvelopeSpec::bare(PayloadKind::Object)
        .with_error_keys(&["error_code"])
        .with_code_key("error_code")
}

/// Trade API: `{"result": true, ...}` or `{"result": false, "error_code": n}`
fn private_envelope() -> EnvelopeSpec {
    EnvelopeSpec::flagged("result", None, PayloadKind::Object).with_code_key("error_code")
}

/// Thin typed wrapper around the pipeline for OKCoin v1
pub struct OkcoinRest<T: Transport> {
    pipeline: RestPipeline<T>,
}

impl<T: Transport> OkcoinRest<T> {
    pub fn new(pipeline: RestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub const fn pipeline(&self) -> &RestPipeline<T> {
        &self.pipeline
    }

    async fn public(&self, path: &str, pair: &str) -> Result<Value, ExchangeError> {
        self.pipeline
            .public_decoded(path, vec![text_param("symbol", pair)], &public_envelope())
            .await
            .map(explain)?
            .into_result(path)
    }

    async fn private(&mut self, path: &str, params: Params) -> Result<DecodedResult, ExchangeError> {
        self.pipeline
            .private_decoded(Method::POST, path, params, &private_envelope())
            .await
            .map(explain)
    }

    pub async fn get_order_book(&self, pair: &str) -> Result<OkcoinOrderBook, ExchangeError> {
        from_payload(DEPTH, self.public(DEPTH, pair).await?)
    }

    pub async fn get_ticker(&self, pair: &str) -> Result<OkcoinTicker, ExchangeError> {
        let response: OkcoinTickerResponse = from_payload(TICKER, self.public(TICKER, pair).await?)?;
        Ok(response.ticker)
    }

    pub async fn trade(&mut self, params: Params) -> Result<Value, ExchangeError> {
        self.private(TRADE, params).await?.into_result(TRADE)
    }

    pub async fn cancel_order(
        &mut self,
        pair: &str,
        order_id: &str,
    ) -> Result<DecodedResult, ExchangeError> {
        let params = vec![text_param("symbol", pair), text_param("order_id", order_id)];
        self.private(CANCEL_ORDER, params).await
    }

    pub async fn get_open_orders(&mut self, pair: &str) -> Result<Vec<OkcoinOrder>, ExchangeError> {
        let params = vec![
            text_param("symbol", pair),
            text_param("order_id", ALL_OPEN_ORDERS),
        ];
        let payload = self.private(ORDER_INFO, params).await?.into_result(ORDER_INFO)?;
        let response: OkcoinOrdersResponse = from_payload(ORDER_INFO, payload)?;
        Ok(response.orders)
    }

    pub async fn get_funds(&mut self) -> Result<OkcoinFunds, ExchangeError> {
        let payload = self
            .private(USER_INFO, Vec::new())
            .await?
            .into_result(USER_INFO)?;
        let info: OkcoinUserInfo = from_payload(USER_INFO, payload)?;
        Ok(info.info.funds)
    }
}
