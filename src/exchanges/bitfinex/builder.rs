use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    Credentials, NonceGenerator, NonceResolution, PayloadHmacSigner, PayloadScheme,
    PipelineConfig, ReqwestTransport, RestPipelineBuilder, Transport,
};
use crate::exchanges::bitfinex::{connector::BitfinexConnector, rest::BitfinexRest};

pub const DEFAULT_BASE_URL: &str = "https://api.bitfinex.com";

/// Builder for Bitfinex connectors
pub struct BitfinexBuilder {
    config: ExchangeConfig,
    nonce: Option<NonceGenerator>,
}

impl Default for BitfinexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BitfinexBuilder {
    /// Read-only builder; add credentials through [`Self::with_config`]
    pub fn new() -> Self {
        Self {
            config: ExchangeConfig::read_only(),
            nonce: None,
        }
    }

    #[must_use]
    pub fn with_config(mut self, config: ExchangeConfig) -> Self {
        self.config = config;
        self
    }

    /// Start from a known nonce instead of the clock
    #[must_use]
    pub const fn with_nonce(mut self, nonce: NonceGenerator) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn build(self) -> Result<BitfinexConnector<ReqwestTransport>, ExchangeError> {
        let transport = ReqwestTransport::new(self.config.transport_config())?;
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: Transport>(
        self,
        transport: T,
    ) -> Result<BitfinexConnector<T>, ExchangeError> {
        let base_url = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let pipeline_config = PipelineConfig::new(base_url, "bitfinex")
            .with_transport(self.config.transport_config())
            .with_nonce_resolution(NonceResolution::Millis);

        let mut builder = RestPipelineBuilder::new(pipeline_config);
        if self.config.has_credentials() {
            let credentials = Credentials::from_config(&self.config)?;
            let signer = PayloadHmacSigner::new(&credentials, PayloadScheme::bitfinex())?;
            builder = builder.with_signer(Box::new(signer));
        }
        if let Some(nonce) = self.nonce {
            builder = builder.with_nonce(nonce);
        }

        let rest = BitfinexRest::new(builder.build_with_transport(transport));
        Ok(BitfinexConnector::new(rest, self.config.fees))
    }
}

/// Create a Bitfinex connector from configuration
pub fn build_connector(config: ExchangeConfig) -> Result<BitfinexConnector, ExchangeError> {
    BitfinexBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_without_credentials_is_read_only() {
        let connector = build_connector(ExchangeConfig::read_only()).unwrap();
        assert!(!connector.rest().pipeline().is_authenticated());
        assert_eq!(connector.rest().pipeline().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_build_with_credentials_and_base_url() {
        let config = ExchangeConfig::new("key".into(), "secret".into())
            .base_url("http://127.0.0.1:9999");
        let connector = build_connector(config).unwrap();
        assert!(connector.rest().pipeline().is_authenticated());
        assert_eq!(connector.rest().pipeline().base_url(), "http://127.0.0.1:9999");
    }
}
