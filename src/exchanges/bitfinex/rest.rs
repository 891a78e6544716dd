use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    from_payload, DecodedResult, EnvelopeSpec, Params, PayloadKind, RestPipeline, Transport,
};
use crate::exchanges::bitfinex::types::{
    BitfinexBalance, BitfinexOrder, BitfinexOrderBook, BitfinexTicker,
};
use reqwest::Method;
use serde_json::{json, Value};

pub const NEW_ORDER: &str = "/v1/order/new";
pub const CANCEL_ORDER: &str = "/v1/order/cancel";
pub const ACTIVE_ORDERS: &str = "/v1/orders";
pub const BALANCES: &str = "/v1/balances";

/// Bitfinex reports failures as `{"message": ...}`, sometimes with a 200 status
fn envelope(expect: PayloadKind) -> EnvelopeSpec {
    EnvelopeSpec::bare(expect).with_error_keys(&["message", "error"])
}

/// Thin typed wrapper around the pipeline for Bitfinex v1
pub struct BitfinexRest<T: Transport> {
    pipeline: RestPipeline<T>,
}

impl<T: Transport> BitfinexRest<T> {
    pub fn new(pipeline: RestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub const fn pipeline(&self) -> &RestPipeline<T> {
        &self.pipeline
    }

    pub async fn get_order_book(&self, pair: &str) -> Result<BitfinexOrderBook, ExchangeError> {
        let path = format!("/v1/book/{}", pair);
        let payload = self
            .pipeline
            .public(&path, Vec::new(), &envelope(PayloadKind::Object))
            .await?;
        from_payload(&path, payload)
    }

    pub async fn get_ticker(&self, pair: &str) -> Result<BitfinexTicker, ExchangeError> {
        let path = format!("/v1/pubticker/{}", pair);
        let payload = self
            .pipeline
            .public(&path, Vec::new(), &envelope(PayloadKind::Object))
            .await?;
        from_payload(&path, payload)
    }

    /// Raw order status; the id is pulled out by the caller
    pub async fn new_order(&mut self, params: Params) -> Result<Value, ExchangeError> {
        self.pipeline
            .private(Method::POST, NEW_ORDER, params, &envelope(PayloadKind::Object))
            .await
    }

    pub async fn cancel_order(&mut self, order_id: u64) -> Result<DecodedResult, ExchangeError> {
        self.pipeline
            .private_decoded(
                Method::POST,
                CANCEL_ORDER,
                vec![("order_id".to_string(), json!(order_id))],
                &envelope(PayloadKind::Object),
            )
            .await
    }

    pub async fn get_active_orders(&mut self) -> Result<Vec<BitfinexOrder>, ExchangeError> {
        let payload = self
            .pipeline
            .private(
                Method::POST,
                ACTIVE_ORDERS,
                Vec::new(),
                &envelope(PayloadKind::Array),
            )
            .await?;
        from_payload(ACTIVE_ORDERS, payload)
    }

    pub async fn get_balances(&mut self) -> Result<Vec<BitfinexBalance>, ExchangeError> {
        let payload = self
            .pipeline
            .private(Method::POST, BALANCES, Vec::new(), &envelope(PayloadKind::Array))
            .await?;
        from_payload(BALANCES, payload)
    }
}
