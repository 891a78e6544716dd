use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    Credentials, DigestScheme, NonceGenerator, NonceResolution, PipelineConfig, ReqwestTransport,
    RestPipelineBuilder, SortedDigestSigner, Transport,
};
use crate::exchanges::okcoin::{connector::OkcoinConnector, rest::OkcoinRest};

pub const DEFAULT_BASE_URL: &str = "https://www.okcoin.com";

/// Builder for OKCoin connectors
pub struct OkcoinBuilder {
    config: ExchangeConfig,
    nonce: Option<NonceGenerator>,
}

impl Default for OkcoinBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl OkcoinBuilder {
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

    pub fn build(self) -> Result<OkcoinConnector<ReqwestTransport>, ExchangeError> {
        let transport = ReqwestTransport::new(self.config.transport_config())?;
        self.build_with_transport(transport)
    }

    /// OKCoin signs without a nonce; the counter still advances once per signed call.
    pub fn build_with_transport<T: Transport>(
        self,
        transport: T,
    ) -> Result<OkcoinConnector<T>, ExchangeError> {
        let base_url = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let pipeline_config = PipelineConfig::new(base_url, "okcoin")
            .with_transport(self.config.transport_config())
            .with_nonce_resolution(NonceResolution::Millis);

        let mut builder = RestPipelineBuilder::new(pipeline_config);
        if self.config.has_credentials() {
            let credentials = Credentials::from_config(&self.config)?;
            let signer = SortedDigestSigner::new(&credentials, DigestScheme::okcoin());
            builder = builder.with_signer(Box::new(signer));
        }
        if let Some(nonce) = self.nonce {
            builder = builder.with_nonce(nonce);
        }

        let rest = OkcoinRest::new(builder.build_with_transport(transport));
        Ok(OkcoinConnector::new(rest, self.config.fees))
    }
}

/// Create an OKCoin connector from configuration
pub fn build_connector(config: ExchangeConfig) -> Result<OkcoinConnector, ExchangeError> {
    OkcoinBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_okcoin_connector_without_credentials() {
        let connector = build_connector(ExchangeConfig::read_only()).unwrap();
        assert!(!connector.rest().pipeline().is_authenticated());
    }

    #[test]
    fn test_build_okcoin_connector_with_credentials() {
        let connector =
            build_connector(ExchangeConfig::new("key".into(), "secret".into())).unwrap();
        assert!(connector.rest().pipeline().is_authenticated());
        assert_eq!(connector.rest().pipeline().exchange_name(), "okcoin");
    }
}
