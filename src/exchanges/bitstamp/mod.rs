pub mod conversions;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

pub use builder::{build_connector, BitstampBuilder};
pub use connector::BitstampConnector;
pub use types::{BitstampOrder, BitstampOrderBook, BitstampTicker};
