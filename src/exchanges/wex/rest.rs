use crate::core::errors::ExchangeError;
use crate::core::kernel::signer::text_param;
use crate::core::kernel::{
    from_payload, DecodedResult, EnvelopeSpec, Params, PayloadKind, RestPipeline, Transport,
};
use crate::exchanges::wex::conversions::is_no_orders;
use crate::exchanges::wex::types::{WexByPair, WexDepth, WexInfo, WexOrder, WexTicker};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::BTreeMap;

pub const TRADE_API: &str = "/tapi";

/// Trade API: `{"success": 1, "return": {...}}` or `{"success": 0, "error": "..."}`
fn trade_envelope() -> EnvelopeSpec {
    EnvelopeSpec::flagged("success", Some("return"), PayloadKind::Object)
}

/// Thin typed wrapper around the pipeline for the WEX (BTC-e) API
pub struct WexRest<T: Transport> {
    pipeline: RestPipeline<T>,
}

impl<T: Transport> WexRest<T> {
    pub fn new(pipeline: RestPipeline<T>) -> Self {
        Self { pipeline }
    }

    pub const fn pipeline(&self) -> &RestPipeline<T> {
        &self.pipeline
    }

    async fn public_for_pair<R: DeserializeOwned>(
        &self,
        path: &str,
        pair: &str,
    ) -> Result<R, ExchangeError> {
        let payload = self
            .pipeline
            .public(path, Vec::new(), &EnvelopeSpec::bare(PayloadKind::Object))
            .await?;
        let mut by_pair: WexByPair<R> = from_payload(path, payload)?;
        by_pair.remove(pair).ok_or_else(|| {
            ExchangeError::malformed(path, format!("No entry for pair '{}'", pair))
        })
    }

    /// One trade API call; `method` goes first in the signed body
    async fn call(&mut self, method: &str, params: Params) -> Result<DecodedResult, ExchangeError> {
        let mut body = vec![text_param("method", method)];
        body.extend(params);
        self.pipeline
            .private_decoded(Method::POST, TRADE_API, body, &trade_envelope())
            .await
    }

    pub async fn get_depth(&self, pair: &str) -> Result<WexDepth, ExchangeError> {
        self.public_for_pair(&format!("/api/3/depth/{}", pair), pair)
            .await
    }

    pub async fn get_ticker(&self, pair: &str) -> Result<WexTicker, ExchangeError> {
        self.public_for_pair(&format!("/api/3/ticker/{}", pair), pair)
            .await
    }

    /// `return` carries `received`, `remains` and `order_id`
    pub async fn trade(&mut self, params: Params) -> Result<Value, ExchangeError> {
        self.call("Trade", params).await?.into_result(TRADE_API)
    }

    pub async fn cancel_order(&mut self, order_id: &str) -> Result<DecodedResult, ExchangeError> {
        self.call("CancelOrder", vec![text_param("order_id", order_id)])
            .await
    }

    /// Open orders by id; "no orders" is an empty map, not an error
    pub async fn get_active_orders(
        &mut self,
        pair: &str,
    ) -> Result<BTreeMap<String, WexOrder>, ExchangeError> {
        match self
            .call("ActiveOrders", vec![text_param("pair", pair)])
            .await?
        {
            DecodedResult::BusinessError { message, .. } if is_no_orders(&message) => {
                Ok(BTreeMap::new())
            }
            decoded => from_payload(TRADE_API, decoded.into_result(TRADE_API)?),
        }
    }

    pub async fn get_info(&mut self) -> Result<WexInfo, ExchangeError> {
        let payload = self.call("getInfo", Vec::new()).await?.into_result(TRADE_API)?;
        from_payload(TRADE_API, payload)
    }
}
