pub mod bitfinex;
pub mod bitstamp;
pub mod okcoin;
pub mod wex;
