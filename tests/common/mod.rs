#![allow(dead_code)]

use exgate::core::config::ExchangeConfig;
use exgate::Symbol;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Once;

static INIT: Once = Once::new();

/// Route `tracing` output through the test harness; honours `RUST_LOG`
pub fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .try_init();
    });
}

pub fn btc_usd() -> Symbol {
    Symbol::new("BTC", "USD").unwrap()
}

pub fn d(s: &str) -> Decimal {
    Decimal::from_str(s).unwrap()
}

/// Credentials pointed at a mock server
pub fn mock_config(base_url: &str) -> ExchangeConfig {
    ExchangeConfig::new("test_api_key".to_string(), "test_secret_key".to_string())
        .base_url(base_url)
        .with_timeout(5)
}

/// Value of `name` in an `application/x-www-form-urlencoded` body
pub fn form_field(body: &[u8], name: &str) -> Option<String> {
    let body = std::str::from_utf8(body).ok()?;
    body.split('&').find_map(|pair| {
        let (key, value) = pair.split_once('=')?;
        (key == name).then(|| value.to_string())
    })
}
