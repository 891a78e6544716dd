use crate::core::fees::FeeSchedule;
use crate::core::kernel::transport::TransportConfig;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, Secret};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashSet;
use std::env;
use std::time::Duration;

/// Default connect/read timeout in seconds
pub const DEFAULT_TIMEOUT_SECONDS: u64 = 30;

#[derive(Debug, Clone)]
pub struct ExchangeConfig {
    pub api_key: Secret<String>,
    pub secret_key: Secret<String>,
    pub passphrase: Option<Secret<String>>,
    /// Customer / client id for exchanges that sign it (Bitstamp)
    pub client_id: Option<String>,
    pub base_url: Option<String>,
    pub timeout_seconds: u64,
    /// HTTP status codes this exchange returns transiently under load
    pub non_fatal_status_codes: Vec<u16>,
    /// I/O error text fragments that mean "try again later" for this exchange
    pub non_fatal_errors: Vec<String>,
    pub fees: FeeSchedule,
}

// Custom Serialize implementation - never expose secrets in serialization
impl Serialize for ExchangeConfig {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut state = serializer.serialize_struct("ExchangeConfig", 9)?;
        state.serialize_field("api_key", "[REDACTED]")?;
        state.serialize_field("secret_key", "[REDACTED]")?;
        state.serialize_field(
            "passphrase",
            &self.passphrase.as_ref().map(|_| "[REDACTED]"),
        )?;
        state.serialize_field("client_id", &self.client_id)?;
        state.serialize_field("base_url", &self.base_url)?;
        state.serialize_field("timeout_seconds", &self.timeout_seconds)?;
        state.serialize_field("non_fatal_status_codes", &self.non_fatal_status_codes)?;
        state.serialize_field("non_fatal_errors", &self.non_fatal_errors)?;
        state.serialize_field("fees", &self.fees)?;
        state.end()
    }
}

impl<'de> Deserialize<'de> for ExchangeConfig {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        const fn default_timeout() -> u64 {
            DEFAULT_TIMEOUT_SECONDS
        }

        #[derive(Deserialize)]
        struct ExchangeConfigHelper {
            api_key: String,
            secret_key: String,
            #[serde(default)]
            passphrase: Option<String>,
            #[serde(default)]
            client_id: Option<String>,
            #[serde(default)]
            base_url: Option<String>,
            #[serde(default = "default_timeout")]
            timeout_seconds: u64,
            #[serde(default)]
            non_fatal_status_codes: Vec<u16>,
            #[serde(default)]
            non_fatal_errors: Vec<String>,
            #[serde(default)]
            fees: FeeSchedule,
        }

        let helper = ExchangeConfigHelper::deserialize(deserializer)?;
        Ok(Self {
            api_key: Secret::new(helper.api_key),
            secret_key: Secret::new(helper.secret_key),
            passphrase: helper.passphrase.map(Secret::new),
            client_id: helper.client_id,
            base_url: helper.base_url,
            timeout_seconds: helper.timeout_seconds,
            non_fatal_status_codes: helper.non_fatal_status_codes,
            non_fatal_errors: helper.non_fatal_errors,
            fees: helper.fees,
        })
    }
}

impl ExchangeConfig {
    /// Create a new configuration with API credentials
    #[must_use]
    pub fn new(api_key: String, secret_key: String) -> Self {
        Self {
            api_key: Secret::new(api_key),
            secret_key: Secret::new(secret_key),
            passphrase: None,
            client_id: None,
            base_url: None,
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            non_fatal_status_codes: Vec::new(),
            non_fatal_errors: Vec::new(),
            fees: FeeSchedule::default(),
        }
    }

    /// Create configuration from environment variables
    ///
    /// Expected environment variables:
    /// - `{EXCHANGE}_API_KEY` and `{EXCHANGE}_SECRET_KEY`
    /// - `{EXCHANGE}_PASSPHRASE`, `{EXCHANGE}_CLIENT_ID`, `{EXCHANGE}_BASE_URL` (optional)
    /// - `{EXCHANGE}_TIMEOUT_SECONDS` (optional, defaults to 30)
    /// - `{EXCHANGE}_NON_FATAL_STATUS_CODES` (optional, comma separated, e.g. `502,503`)
    /// - `{EXCHANGE}_NON_FATAL_ERRORS` (optional, `;` separated message fragments)
    /// - `{EXCHANGE}_FEE_PERCENT` (optional)
    pub fn from_env(exchange_prefix: &str) -> Result<Self, ConfigError> {
        let prefix = exchange_prefix.to_uppercase();
        let var = |name: &str| format!("{}_{}", prefix, name);

        let api_key_var = var("API_KEY");
        let secret_key_var = var("SECRET_KEY");

        let api_key = env::var(&api_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(api_key_var))?;
        let secret_key = env::var(&secret_key_var)
            .map_err(|_| ConfigError::MissingEnvironmentVariable(secret_key_var))?;

        let mut config = Self::new(api_key, secret_key);
        config.passphrase = env::var(var("PASSPHRASE")).ok().map(Secret::new);
        config.client_id = env::var(var("CLIENT_ID")).ok();
        config.base_url = env::var(var("BASE_URL")).ok();

        if let Ok(raw) = env::var(var("TIMEOUT_SECONDS")) {
            config.timeout_seconds = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidConfiguration(format!(
                    "{} must be a whole number of seconds, got '{}'",
                    var("TIMEOUT_SECONDS"),
                    raw
                ))
            })?;
        }

        if let Ok(raw) = env::var(var("NON_FATAL_STATUS_CODES")) {
            config.non_fatal_status_codes = parse_status_codes(&raw)?;
        }

        if let Ok(raw) = env::var(var("NON_FATAL_ERRORS")) {
            config.non_fatal_errors = raw
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect();
        }

        if let Ok(raw) = env::var(var("FEE_PERCENT")) {
            let percent: Decimal = raw.trim().parse().map_err(|_| {
                ConfigError::InvalidConfiguration(format!(
                    "{} must be a decimal, got '{}'",
                    var("FEE_PERCENT"),
                    raw
                ))
            })?;
            config.fees = FeeSchedule::flat(percent);
        }

        Ok(config)
    }

    /// Create configuration from .env file and environment variables
    ///
    /// **Security Warning**: Never commit .env files to version control!
    #[cfg(feature = "env-file")]
    pub fn from_env_file(exchange_prefix: &str) -> Result<Self, ConfigError> {
        Self::from_env_file_with_path(exchange_prefix, ".env")
    }

    /// Create configuration from a specific .env file path
    #[cfg(feature = "env-file")]
    pub fn from_env_file_with_path(
        exchange_prefix: &str,
        env_file_path: &str,
    ) -> Result<Self, ConfigError> {
        match dotenv::from_path(env_file_path) {
            Ok(()) => {}
            Err(dotenv::Error::Io(io_err)) if io_err.kind() == std::io::ErrorKind::NotFound => {
                // No .env file, fall through to the process environment
            }
            Err(e) => {
                return Err(ConfigError::InvalidConfiguration(format!(
                    "Failed to load .env file '{}': {}",
                    env_file_path, e
                )));
            }
        }

        Self::from_env(exchange_prefix)
    }

    /// Configuration for public endpoints only
    #[must_use]
    pub fn read_only() -> Self {
        Self::new(String::new(), String::new())
    }

    /// Check if this configuration has credentials for authenticated operations
    #[must_use]
    pub fn has_credentials(&self) -> bool {
        !self.api_key.expose_secret().is_empty() && !self.secret_key.expose_secret().is_empty()
    }

    #[must_use]
    pub fn base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    #[must_use]
    pub fn with_passphrase(mut self, passphrase: String) -> Self {
        self.passphrase = Some(Secret::new(passphrase));
        self
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    #[must_use]
    pub fn with_non_fatal_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.non_fatal_status_codes = codes.into_iter().collect();
        self
    }

    #[must_use]
    pub fn with_non_fatal_errors<S: Into<String>>(
        mut self,
        fragments: impl IntoIterator<Item = S>,
    ) -> Self {
        self.non_fatal_errors = fragments.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_fees(mut self, fees: FeeSchedule) -> Self {
        self.fees = fees;
        self
    }

    /// Get API key (use carefully - exposes secret)
    pub fn api_key(&self) -> &str {
        self.api_key.expose_secret()
    }

    /// Get secret key (use carefully - exposes secret)
    pub fn secret_key(&self) -> &str {
        self.secret_key.expose_secret()
    }

    /// Transport settings derived from this configuration
    pub fn transport_config(&self) -> TransportConfig {
        TransportConfig::new(Duration::from_secs(self.timeout_seconds))
            .with_non_fatal_status_codes(self.non_fatal_status_codes.iter().copied())
            .with_non_fatal_messages(self.non_fatal_errors.iter().cloned())
    }
}

fn parse_status_codes(raw: &str) -> Result<Vec<u16>, ConfigError> {
    let mut seen = HashSet::new();
    let mut codes = Vec::new();
    for part in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let code: u16 = part.parse().map_err(|_| {
            ConfigError::InvalidConfiguration(format!("Invalid HTTP status code '{}'", part))
        })?;
        if !(100..=599).contains(&code) {
            return Err(ConfigError::InvalidConfiguration(format!(
                "HTTP status code out of range: {}",
                code
            )));
        }
        if seen.insert(code) {
            codes.push(code);
        }
    }
    Ok(codes)
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvironmentVariable(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialization_redacts_secrets() {
        let config = ExchangeConfig::new("key-123".into(), "secret-456".into())
            .with_passphrase("pass-789".into());
        let json = serde_json::to_string(&config).unwrap();

        assert!(!json.contains("key-123"));
        assert!(!json.contains("secret-456"));
        assert!(!json.contains("pass-789"));
        assert!(json.contains("[REDACTED]"));
    }

    #[test]
    fn test_debug_does_not_leak_secret() {
        let config = ExchangeConfig::new("key".into(), "very-secret".into());
        assert!(!format!("{:?}", config).contains("very-secret"));
    }

    #[test]
    fn test_deserialize_applies_defaults() {
        let config: ExchangeConfig =
            serde_json::from_str(r#"{"api_key":"k","secret_key":"s"}"#).unwrap();
        assert_eq!(config.timeout_seconds, DEFAULT_TIMEOUT_SECONDS);
        assert!(config.non_fatal_status_codes.is_empty());
        assert!(config.has_credentials());
        assert!(!ExchangeConfig::read_only().has_credentials());
    }

    #[test]
    fn test_from_env_reads_allow_lists() {
        env::set_var("EXGATE_CFG_TEST_API_KEY", "k");
        env::set_var("EXGATE_CFG_TEST_SECRET_KEY", "s");
        env::set_var("EXGATE_CFG_TEST_TIMEOUT_SECONDS", "12");
        env::set_var("EXGATE_CFG_TEST_NON_FATAL_STATUS_CODES", "502, 503,502");
        env::set_var(
            "EXGATE_CFG_TEST_NON_FATAL_ERRORS",
            "Connection reset; Remote host closed connection",
        );

        let config = ExchangeConfig::from_env("exgate_cfg_test").unwrap();
        assert_eq!(config.timeout_seconds, 12);
        assert_eq!(config.non_fatal_status_codes, vec![502, 503]);
        assert_eq!(
            config.non_fatal_errors,
            vec!["Connection reset", "Remote host closed connection"]
        );
    }

    #[test]
    fn test_from_env_missing_key_is_reported() {
        let err = ExchangeConfig::from_env("exgate_cfg_absent").unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnvironmentVariable(v) if v == "EXGATE_CFG_ABSENT_API_KEY"));
    }

    #[test]
    fn test_rejects_out_of_range_status_codes() {
        assert!(parse_status_codes("999").is_err());
        assert!(parse_status_codes("abc").is_err());
        assert_eq!(parse_status_codes("").unwrap(), Vec::<u16>::new());
    }
}
