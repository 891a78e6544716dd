pub mod core;
pub mod exchanges;
pub mod utils;

pub use core::{errors::ExchangeError, traits::ExchangeConnector, types::*};
pub use exchanges::bitfinex::BitfinexConnector;
pub use exchanges::bitstamp::BitstampConnector;
pub use exchanges::okcoin::OkcoinConnector;
pub use exchanges::wex::WexConnector;
pub use utils::{ExchangeFactory, ExchangeKind};
