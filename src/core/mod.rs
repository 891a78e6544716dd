pub mod config;
pub mod errors;
pub mod fees;
pub mod kernel;
pub mod traits;
pub mod types;
