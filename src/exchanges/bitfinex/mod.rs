pub mod conversions;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

pub use builder::{build_connector, BitfinexBuilder};
pub use connector::BitfinexConnector;
pub use types::{BitfinexBalance, BitfinexOrder, BitfinexOrderBook, BitfinexTicker};
