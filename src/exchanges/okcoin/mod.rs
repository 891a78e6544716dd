pub mod conversions;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

pub use builder::{build_connector, OkcoinBuilder};
pub use connector::OkcoinConnector;
pub use types::{OkcoinFunds, OkcoinOrder, OkcoinOrderBook, OkcoinTicker};
