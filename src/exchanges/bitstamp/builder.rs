use crate::core::config::ExchangeConfig;
use crate::core::errors::ExchangeError;
use crate::core::kernel::{
    ConcatHmacSigner, ConcatScheme, Credentials, NonceGenerator, NonceResolution, PipelineConfig,
    ReqwestTransport, RestPipelineBuilder, Transport,
};
use crate::exchanges::bitstamp::{connector::BitstampConnector, rest::BitstampRest};

pub const DEFAULT_BASE_URL: &str = "https://www.bitstamp.net";

/// Builder for Bitstamp connectors
pub struct BitstampBuilder {
    config: ExchangeConfig,
    nonce: Option<NonceGenerator>,
}

impl Default for BitstampBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl BitstampBuilder {
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

    pub fn build(self) -> Result<BitstampConnector<ReqwestTransport>, ExchangeError> {
        let transport = ReqwestTransport::new(self.config.transport_config())?;
        self.build_with_transport(transport)
    }

    pub fn build_with_transport<T: Transport>(
        self,
        transport: T,
    ) -> Result<BitstampConnector<T>, ExchangeError> {
        let base_url = self
            .config
            .base_url
            .clone()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        let pipeline_config = PipelineConfig::new(base_url, "bitstamp")
            .with_transport(self.config.transport_config())
            .with_nonce_resolution(NonceResolution::Millis);

        let mut builder = RestPipelineBuilder::new(pipeline_config);
        if self.config.has_credentials() {
            let credentials = Credentials::from_config(&self.config)?;
            let signer = ConcatHmacSigner::new(&credentials, ConcatScheme::bitstamp())?;
            builder = builder.with_signer(Box::new(signer));
        }
        if let Some(nonce) = self.nonce {
            builder = builder.with_nonce(nonce);
        }

        let rest = BitstampRest::new(builder.build_with_transport(transport));
        Ok(BitstampConnector::new(rest, self.config.fees))
    }
}

/// Create a Bitstamp connector from configuration
pub fn build_connector(config: ExchangeConfig) -> Result<BitstampConnector, ExchangeError> {
    BitstampBuilder::new().with_config(config).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::errors::ProtocolErrorKind;

    #[test]
    fn test_credentials_without_client_id_are_rejected() {
        let config = ExchangeConfig::new("key".into(), "secret".into());
        let err = build_connector(config).unwrap_err();
        assert_eq!(err.kind(), Some(&ProtocolErrorKind::Configuration));
        assert!(err.to_string().contains("client_id"));
    }

    #[test]
    fn test_build_with_client_id() {
        let config =
            ExchangeConfig::new("key".into(), "secret".into()).with_client_id("123456");
        let connector = build_connector(config).unwrap();
        assert!(connector.rest().pipeline().is_authenticated());
    }
}
