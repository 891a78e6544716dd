use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::{
    from_payload, DecodedResult, EnvelopeSpec, Params, PayloadKind, RestPipeline, Transport,
};
use crate::exchanges::bitstamp::types::{BitstampOrder, BitstampOrderBook, BitstampTicker};
use reqwest::Method;
use serde_json::{Map, Value};

pub const CANCEL_ORDER: &str = "/api/v2/cancel_order/";
pub const BALANCE: &str = "/api/v2/balance/";

/// Errors come back as `{"error": ...}` or `{"status": "error", "reason": ...}`
fn envelope(expect: PayloadKind) -> EnvelopeSpec {
    EnvelopeSpec::bare(expect)
        .with_error_keys(&["error", "reason"])
        .with_code_key("code")
}

/// Thin typed wrapper around the pipeline for Bitstamp v2
#[derive(Debug)]
pub struct BitstampRest<T: Transport> {
    pipeline: RestPipeline<T>,
}

impl<T: Transport> BitstampRest<T> {
    pub fn new(pipeline: RestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub const fn pipeline(&self) -> &RestPipeline<T> {
        &self.pipeline
    }

    pub async fn get_order_book(&self, pair: &str) -> Result<BitstampOrderBook, ExchangeError> {
        let path = format!("/api/v2/order_book/{}/", pair);
        let payload = self
            .pipeline
            .public(&path, Vec::new(), &envelope(PayloadKind::Object))
            .await?;
        from_payload(&path, payload)
    }

    pub async fn get_ticker(&self, pair: &str) -> Result<BitstampTicker, ExchangeError> {
        let path = format!("/api/v2/ticker/{}/", pair);
        let payload = self
            .pipeline
            .public(&path, Vec::new(), &envelope(PayloadKind::Object))
            .await?;
        from_payload(&path, payload)
    }

    /// `path` is `/api/v2/buy/{pair}/` or `/api/v2/sell/{pair}/`
    pub async fn place_limit_order(
        &mut self,
        path: &str,
        params: Params,
    ) -> Result<Value, ExchangeError> {
        self.pipeline
            .private(Method::POST, path, params, &envelope(PayloadKind::Object))
            .await
    }

    pub async fn cancel_order(&mut self, order_id: &str) -> Result<DecodedResult, ExchangeError> {
        self.pipeline
            .private_decoded(
                Method::POST,
                CANCEL_ORDER,
                vec![text_param("id", order_id)],
                &envelope(PayloadKind::Object),
            )
            .await
    }

    pub async fn get_open_orders(&mut self, pair: &str) -> Result<Vec<BitstampOrder>, ExchangeError> {
        let path = format!("/api/v2/open_orders/{}/", pair);
        let payload = self
            .pipeline
            .private(Method::POST, &path, Vec::new(), &envelope(PayloadKind::Array))
            .await?;
        from_payload(&path, payload)
    }

    pub async fn get_balance(&mut self) -> Result<Map<String, Value>, ExchangeError> {
        let payload = self
            .pipeline
            .private(Method::POST, BALANCE, Vec::new(), &envelope(PayloadKind::Object))
            .await?;
        from_payload(BALANCE, payload)
    }
}
