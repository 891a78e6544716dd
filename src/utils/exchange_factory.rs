use crate::core::config::ExchangeConfig;
use crate::core::errors::{ExchangeError, ProtocolErrorKind};
use crate::core::traits::ExchangeConnector;
use crate::exchanges::{bitfinex, bitstamp, okcoin, wex};
use std::str::FromStr;

/// Supported exchanges
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExchangeKind {
    Bitfinex,
    Bitstamp,
    Okcoin,
    Wex,
}

impl ExchangeKind {
    pub const ALL: [Self; 4] = [Self::Bitfinex, Self::Bitstamp, Self::Okcoin, Self::Wex];

    /// Lowercase identifier, also used as the environment variable prefix
    pub const fn name(self) -> &'static str {
        match self {
            Self::Bitfinex => "bitfinex",
            Self::Bitstamp => "bitstamp",
            Self::Okcoin => "okcoin",
            Self::Wex => "wex",
        }
    }
}

impl std::fmt::Display for ExchangeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bitfinex => write!(f, "Bitfinex"),
            Self::Bitstamp => write!(f, "Bitstamp"),
            Self::Okcoin => write!(f, "OKCoin"),
            Self::Wex => write!(f, "WEX"),
        }
    }
}

impl FromStr for ExchangeKind {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|kind| kind.name() == wanted || (wanted == "btce" && *kind == Self::Wex))
            .ok_or_else(|| {
                ExchangeError::protocol(
                    "factory",
                    ProtocolErrorKind::Configuration,
                    format!("Unknown exchange '{}'", s),
                )
            })
    }
}

/// Factory for creating exchange connectors
pub struct ExchangeFactory;

impl ExchangeFactory {
    /// Create a connector for the given exchange
    pub fn create(
        kind: ExchangeKind,
        config: ExchangeConfig,
    ) -> Result<Box<dyn ExchangeConnector>, ExchangeError> {
        Ok(match kind {
            ExchangeKind::Bitfinex => Box::new(bitfinex::build_connector(config)?),
            ExchangeKind::Bitstamp => Box::new(bitstamp::build_connector(config)?),
            ExchangeKind::Okcoin => Box::new(okcoin::build_connector(config)?),
            ExchangeKind::Wex => Box::new(wex::build_connector(config)?),
        })
    }

    /// Public-data-only connector
    pub fn create_read_only(kind: ExchangeKind) -> Result<Box<dyn ExchangeConnector>, ExchangeError> {
        Self::create(kind, ExchangeConfig::read_only())
    }

    /// Connector configured from `{EXCHANGE}_*` environment variables
    pub fn create_from_env(kind: ExchangeKind) -> Result<Box<dyn ExchangeConnector>, ExchangeError> {
        let config = ExchangeConfig::from_env(kind.name())?;
        Self::create(kind, config)
    }

    /// Exchanges whose API key and secret are present in the environment
    pub fn configured_exchanges() -> Vec<ExchangeKind> {
        ExchangeKind::ALL
            .into_iter()
            .filter(|kind| ExchangeConfig::from_env(kind.name()).is_ok())
            .collect()
    }
}
