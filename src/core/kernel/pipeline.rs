use crate::core::errors::ExchangeError;
use crate::core::kernel::envelope::{decode, DecodedResult, EnvelopeSpec};
use crate::core::kernel::nonce::{NonceGenerator, NonceResolution};
use crate::core::kernel::request::{CanonicalRequest, ParamEncoding, Params};
use crate::core::kernel::signer::Signer;
use crate::core::kernel::transport::{HttpRequest, ReqwestTransport, Transport, TransportConfig};
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument, warn};

/// Configuration for a request pipeline
#[derive(Clone, Debug)]
pub struct PipelineConfig {
    /// Base URL for the API
    pub base_url: String,
    /// Exchange name for logging and tracing
    pub exchange_name: String,
    pub transport: TransportConfig,
    pub nonce_resolution: NonceResolution,
}

impl PipelineConfig {
    pub fn new(base_url: impl Into<String>, exchange_name: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            exchange_name: exchange_name.into(),
            transport: TransportConfig::default(),
            nonce_resolution: NonceResolution::Millis,
        }
    }

    #[must_use]
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    #[must_use]
    pub const fn with_nonce_resolution(mut self, resolution: NonceResolution) -> Self {
        self.nonce_resolution = resolution;
        self
    }
}

/// Builder for [`RestPipeline`]
pub struct RestPipelineBuilder {
    config: PipelineConfig,
    signer: Option<Box<dyn Signer>>,
    nonce: Option<NonceGenerator>,
}

impl RestPipelineBuilder {
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            signer: None,
            nonce: None,
        }
    }

    #[must_use]
    pub fn with_signer(mut self, signer: Box<dyn Signer>) -> Self {
        self.signer = Some(signer);
        self
    }

    /// Use an explicit nonce counter instead of seeding one from the clock
    #[must_use]
    pub const fn with_nonce(mut self, nonce: NonceGenerator) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn build(self) -> Result<RestPipeline<ReqwestTransport>, ExchangeError> {
        let transport = ReqwestTransport::new(self.config.transport.clone())?;
        Ok(self.build_with_transport(transport))
    }

    pub fn build_with_transport<T: Transport>(self, transport: T) -> RestPipeline<T> {
        let nonce = self
            .nonce
            .unwrap_or_else(|| NonceGenerator::new(self.config.nonce_resolution));
        RestPipeline {
            base_url: self.config.base_url,
            exchange_name: self.config.exchange_name,
            transport,
            signer: self.signer,
            nonce,
        }
    }
}

/// Build → sign → send → decode, once per call.
///
/// Authenticated calls take `&mut self`, so one pipeline can only have a single signed request
/// in flight and nonces reach the exchange in the order they were issued. Failures are never
/// retried here; a `NetworkFailure` is handed back for the caller to decide.
pub struct RestPipeline<T: Transport = ReqwestTransport> {
    base_url: String,
    exchange_name: String,
    transport: T,
    signer: Option<Box<dyn Signer>>,
    nonce: NonceGenerator,
}

impl<T: Transport> std::fmt::Debug for RestPipeline<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestPipeline")
            .field("base_url", &self.base_url)
            .field("exchange_name", &self.exchange_name)
            .field("authenticated", &self.signer.is_some())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> RestPipeline<T> {
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn exchange_name(&self) -> &str {
        &self.exchange_name
    }

    pub const fn transport(&self) -> &T {
        &self.transport
    }

    pub const fn is_authenticated(&self) -> bool {
        self.signer.is_some()
    }

    /// Last nonce handed to the signer
    pub const fn last_nonce(&self) -> u64 {
        self.nonce.last()
    }

    /// Unsigned GET with `params` in the query string
    pub async fn public(
        &self,
        path: &str,
        params: Params,
        spec: &EnvelopeSpec,
    ) -> Result<Value, ExchangeError> {
        self.public_decoded(path, params, spec)
            .await?
            .into_result(path)
    }

    #[instrument(
        skip(self, params, spec),
        fields(exchange = %self.exchange_name, endpoint = %path)
    )]
    pub async fn public_decoded(
        &self,
        path: &str,
        params: Params,
        spec: &EnvelopeSpec,
    ) -> Result<DecodedResult, ExchangeError> {
        let mut url = format!("{}{}", self.base_url.trim_end_matches('/'), path);
        if !params.is_empty() {
            if let (Some(query), _) = ParamEncoding::Query.encode(&params) {
                url.push('?');
                url.push_str(&query);
            }
        }

        let payload = self
            .transport
            .send(HttpRequest::new(Method::GET, url))
            .await
            .into_payload(path)?;
        Ok(decode(&payload, spec))
    }

    /// Signed call; business errors are raised as `ProtocolFailure`
    pub async fn private(
        &mut self,
        method: Method,
        path: &str,
        params: Params,
        spec: &EnvelopeSpec,
    ) -> Result<Value, ExchangeError> {
        self.private_decoded(method, path, params, spec)
            .await?
            .into_result(path)
    }

    /// Signed call returning the decoded envelope untouched, for operations that treat
    /// some business errors as ordinary answers.
    #[instrument(
        skip(self, params, spec),
        fields(exchange = %self.exchange_name, method = %method, endpoint = %path)
    )]
    pub async fn private_decoded(
        &mut self,
        method: Method,
        path: &str,
        params: Params,
        spec: &EnvelopeSpec,
    ) -> Result<DecodedResult, ExchangeError> {
        let signer = self.signer.as_ref().ok_or_else(|| {
            ExchangeError::invalid_request(path, "Authenticated call requires API credentials")
        })?;

        let nonce = self.nonce.next()?;
        debug!(nonce, "Signing request");
        let signed = signer.sign(CanonicalRequest::new(method, path, params, nonce))?;

        let payload = self
            .transport
            .send(signed.into_http(&self.base_url))
            .await
            .into_payload(path)?;
        Ok(decode(&payload, spec))
    }
}

/// Boolean answer for a cancel call.
///
/// `false` when the exchange reports the order as unknown, or when it refused the cancel with a
/// 4xx the configuration marks as non-fatal. A 404 means the host is gone, and a non-fatal 5xx
/// leaves the order state unknown; both stay retryable errors.
pub fn cancel_answer(
    endpoint: &str,
    result: Result<DecodedResult, ExchangeError>,
    is_unknown_order: impl Fn(&str, Option<&str>) -> bool,
) -> Result<bool, ExchangeError> {
    match result {
        Ok(DecodedResult::Ok(_)) => Ok(true),
        Ok(DecodedResult::BusinessError { message, code }) => {
            if is_unknown_order(&message, code.as_deref()) {
                debug!(%message, "Exchange does not know the order");
                Ok(false)
            } else {
                DecodedResult::<Value>::BusinessError { message, code }
                    .into_result(endpoint)
                    .map(|_| true)
            }
        }
        Err(ExchangeError::NetworkFailure {
            status: Some(status),
            message,
            ..
        }) if (400..500).contains(&status) && status != 404 => {
            warn!(status, %message, "Cancel answered with a non-fatal failure");
            Ok(false)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ProtocolErrorKind;
    use crate::core::kernel::envelope::PayloadKind;
    use crate::core::kernel::request::SignedRequest;
    use crate::core::kernel::transport::{TransportFailure, TransportOutcome};
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    struct ScriptedTransport {
        outcomes: Mutex<VecDeque<TransportOutcome>>,
        seen: Mutex<Vec<HttpRequest>>,
    }

    impl ScriptedTransport {
        fn new(outcomes: Vec<TransportOutcome>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                seen: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl Transport for ScriptedTransport {
        async fn send(&self, request: HttpRequest) -> TransportOutcome {
            self.seen.lock().unwrap().push(request);
            self.outcomes.lock().unwrap().pop_front().unwrap()
        }
    }

    struct NonceHeaderSigner;

    impl Signer for NonceHeaderSigner {
        fn sign(&self, request: CanonicalRequest) -> Result<SignedRequest, ExchangeError> {
            let mut signed = SignedRequest::new(request.method, request.path, request.nonce);
            signed
                .headers
                .push(("X-Nonce".to_string(), request.nonce.to_string()));
            Ok(signed)
        }
    }

    fn ok(payload: &str) -> TransportOutcome {
        TransportOutcome::Success {
            status: 200,
            reason: "OK".to_string(),
            payload: payload.to_string(),
        }
    }

    fn pipeline(outcomes: Vec<TransportOutcome>) -> RestPipeline<ScriptedTransport> {
        RestPipelineBuilder::new(PipelineConfig::new("https://api.test/", "test"))
            .with_signer(Box::new(NonceHeaderSigner))
            .with_nonce(NonceGenerator::starting_at(100, NonceResolution::Millis))
            .build_with_transport(ScriptedTransport::new(outcomes))
    }

    #[tokio::test]
    async fn test_private_calls_carry_increasing_nonces() {
        let mut pipeline = pipeline(vec![ok("{}"), ok("{}"), ok("{}")]);
        let spec = EnvelopeSpec::bare(PayloadKind::Object);

        for _ in 0..3 {
            pipeline
                .private(Method::POST, "/orders", Vec::new(), &spec)
                .await
                .unwrap();
        }

        let seen = pipeline.transport().seen.lock().unwrap();
        let nonces: Vec<&str> = seen
            .iter()
            .map(|r| r.headers[0].1.as_str())
            .collect();
        assert_eq!(nonces, vec!["101", "102", "103"]);
        assert_eq!(seen[0].url, "https://api.test/orders");
    }

    #[tokio::test]
    async fn test_failed_call_still_consumes_its_nonce() {
        let failure = TransportOutcome::NetworkFailure(TransportFailure {
            message: "timed out".to_string(),
            status: None,
        });
        let mut pipeline = pipeline(vec![failure, ok("{}")]);
        let spec = EnvelopeSpec::bare(PayloadKind::Object);

        let err = pipeline
            .private(Method::POST, "/orders", Vec::new(), &spec)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.endpoint(), "/orders");

        pipeline
            .private(Method::POST, "/orders", Vec::new(), &spec)
            .await
            .unwrap();
        assert_eq!(pipeline.last_nonce(), 102);
    }

    #[tokio::test]
    async fn test_business_error_becomes_protocol_failure() {
        let mut pipeline = pipeline(vec![ok(r#"{"error":"Invalid pair"}"#)]);
        let err = pipeline
            .private(
                Method::POST,
                "/orders",
                Vec::new(),
                &EnvelopeSpec::bare(PayloadKind::Object),
            )
            .await
            .unwrap_err();
        assert!(matches!(
            err.kind(),
            Some(ProtocolErrorKind::Rejected { .. })
        ));
    }

    #[tokio::test]
    async fn test_private_call_without_signer_never_reaches_transport() {
        let mut pipeline = RestPipelineBuilder::new(PipelineConfig::new("https://api.test", "t"))
            .build_with_transport(ScriptedTransport::new(Vec::new()));

        let err = pipeline
            .private(
                Method::GET,
                "/balances",
                Vec::new(),
                &EnvelopeSpec::bare(PayloadKind::Any),
            )
            .await
            .unwrap_err();
        assert_eq!(err.kind(), Some(&ProtocolErrorKind::InvalidRequest));
        assert!(pipeline.transport().seen.lock().unwrap().is_empty());
    }

    #[test]
    fn test_cancel_answer_cases() {
        let unknown = |message: &str, code: Option<&str>| {
            code == Some("10009") || message.contains("not found")
        };

        assert!(cancel_answer("/c", Ok(DecodedResult::Ok(Value::Null)), unknown).unwrap());
        assert!(!cancel_answer(
            "/c",
            Ok(DecodedResult::business("x", Some("10009".into()))),
            unknown
        )
        .unwrap());
        assert!(cancel_answer("/c", Ok(DecodedResult::business("bad pair", None)), unknown)
            .is_err());

        let answered = ExchangeError::NetworkFailure {
            endpoint: "/c".into(),
            message: "HTTP 400 Bad Request: gone".into(),
            status: Some(400),
        };
        assert!(!cancel_answer("/c", Err(answered), unknown).unwrap());

        let unreachable = ExchangeError::NetworkFailure {
            endpoint: "/c".into(),
            message: "HTTP 404 Not Found".into(),
            status: Some(404),
        };
        assert!(cancel_answer("/c", Err(unreachable), unknown)
            .unwrap_err()
            .is_retryable());
        assert!(cancel_answer("/c", Err(ExchangeError::network("/c", "timed out")), unknown)
            .is_err());
    }

    #[test]
    fn test_cancel_answer_keeps_server_side_failures_retryable() {
        let busy = ExchangeError::NetworkFailure {
            endpoint: "/c".into(),
            message: "HTTP 503 Service Unavailable: busy".into(),
            status: Some(503),
        };
        let err = cancel_answer("/c", Err(busy), |_: &str, _: Option<&str>| false).unwrap_err();
        assert!(err.is_retryable());
        assert_eq!(err.status(), Some(503));
    }

    #[tokio::test]
    async fn test_public_call_puts_params_in_query() {
        let pipeline = pipeline(vec![ok("[]")]);
        pipeline
            .public(
                "/depth",
                vec![("symbol".to_string(), Value::String("btc_usd".to_string()))],
                &EnvelopeSpec::bare(PayloadKind::Array),
            )
            .await
            .unwrap();

        let seen = pipeline.transport().seen.lock().unwrap();
        assert_eq!(seen[0].url, "https://api.test/depth?symbol=btc_usd");
        assert!(seen[0].headers.is_empty());
        assert_eq!(pipeline.last_nonce(), 100);
    }
}
