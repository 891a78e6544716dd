use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    ConcatHmacSigner, ConcatScheme, Credentials, NonceGenerator, NonceResolution, PipelineConfig,
    ReqwestTransport, RestPipelineBuilder, Transport,
};
use crate::exchanges::wex::{connector::WexConnector, rest::WexRest};

pub const DEFAULT_BASE_URL: &str = "https://wex.nz";

/// Builder for WEX connectors. The trade API rejects nonces above 2^32, so seconds are used.
pub struct WexBuilder {
    config: ExchangeConfig,
    nonce: Option<NonceGenerator>,
}

impl Default for WexBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WexBuilder {
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

    #[must_use]
    pub const fn with_nonce(mut self, nonce: NonceGenerator) -> Self {
        self.nonce = Some(nonce);
        self
    }

    pub fn build(self) -> Result<WexConnector<ReqwestTransport>, ExchangeError> {
        let transport = ReqwestTransport::new(self.config.transport_config())?;
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: Transport>(
        self,
        transport: T,
    ) -> Result<WexConnector<T>, ExchangeError> {
        let base_url = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let pipeline_config = PipelineConfig::new(base_url, "wex")
            .with_transport(self.config.transport_config())
            .with_nonce_resolution(NonceResolution::Seconds);

        let mut builder = RestPipelineBuilder::new(pipeline_config);
        if self.config.has_credentials() {
            let credentials = Credentials::from_config(&self.config)?;
            let signer = ConcatHmacSigner::new(&credentials, ConcatScheme::wex())?;
            builder = builder.with_signer(Box::new(signer));
        }
        if let Some(nonce) = self.nonce {
            builder = builder.with_nonce(nonce);
        }

        let rest = WexRest::new(builder.build_with_transport(transport));
        Ok(WexConnector::new(rest, self.config.fees))
    }
}

/// Create a WEX connector from configuration
pub fn build_connector(config: ExchangeConfig) -> Result<WexConnector, ExchangeError> {
    WexBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_only_build_has_no_signer() {
        let connector = WexBuilder::new().build().unwrap();
        assert!(!connector.rest().pipeline().is_authenticated());
        assert_eq!(connector.rest().pipeline().base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_custom_base_url() {
        let config = ExchangeConfig::new("key".into(), "secret".into()).base_url("http://localhost:1");
        let connector = build_connector(config).unwrap();
        assert!(connector.rest().pipeline().is_authenticated());
        assert_eq!(connector.rest().pipeline().base_url(), "http://localhost:1");
    }
}
