pub mod conversions;
pub mod types;

pub mod builder;
pub mod connector;
pub mod rest;

pub use builder::{build_connector, WexBuilder};
pub use connector::WexConnector;
pub use types::{WexDepth, WexOrder, WexTicker};
