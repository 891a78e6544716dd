use crate::core::errors::{preview, ExchangeError, ProtocolErrorKind};
use async_trait::async_trait;
use reqwest::{Client, Method, Url};
use std::collections::HashSet;
use std::error::Error as StdError;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::{instrument, trace, warn};

/// Several exchanges refuse requests without a recognisable browser identifier.
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// One outbound HTTP call, fully signed and encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: Method,
    pub url: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
}

impl HttpRequest {
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: Vec::new(),
            body: None,
        }
    }

    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportFailure {
    pub message: String,
    /// Set when the exchange answered with a non-success status
    pub status: Option<u16>,
}

/// Result of exactly one HTTP exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportOutcome {
    Success {
        status: u16,
        reason: String,
        payload: String,
    },
    NetworkFailure(TransportFailure),
    ProtocolFailure(TransportFailure),
}

impl TransportOutcome {
    /// Raw body on success, otherwise the matching `ExchangeError`
    pub fn into_payload(self, endpoint: &str) -> Result<String, ExchangeError> {
        match self {
            Self::Success { payload, .. } => Ok(payload),
            Self::NetworkFailure(failure) => Err(ExchangeError::NetworkFailure {
                endpoint: endpoint.to_string(),
                message: failure.message,
                status: failure.status,
            }),
            Self::ProtocolFailure(failure) => Err(ExchangeError::protocol(
                endpoint,
                ProtocolErrorKind::Transport {
                    status: failure.status,
                },
                failure.message,
            )),
        }
    }

    pub const fn is_network_failure(&self) -> bool {
        matches!(self, Self::NetworkFailure(_))
    }

    pub const fn is_protocol_failure(&self) -> bool {
        matches!(self, Self::ProtocolFailure(_))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureClass {
    Network,
    Protocol,
}

/// Decides which failures an exchange considers transient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailurePolicy {
    non_fatal_status_codes: HashSet<u16>,
    non_fatal_messages: Vec<String>,
    not_found_is_unreachable: bool,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        Self::new()
    }
}

impl FailurePolicy {
    pub fn new() -> Self {
        Self {
            non_fatal_status_codes: HashSet::new(),
            non_fatal_messages: Vec::new(),
            not_found_is_unreachable: true,
        }
    }

    #[must_use]
    pub fn with_non_fatal_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.non_fatal_status_codes.extend(codes);
        self
    }

    #[must_use]
    pub fn with_non_fatal_messages<S: Into<String>>(
        mut self,
        fragments: impl IntoIterator<Item = S>,
    ) -> Self {
        self.non_fatal_messages
            .extend(fragments.into_iter().map(Into::<String>::into).filter(|s| !s.is_empty()));
        self
    }

    /// Some exchanges answer 404 when the backend host is down
    #[must_use]
    pub const fn with_not_found_as_unreachable(mut self, enabled: bool) -> Self {
        self.not_found_is_unreachable = enabled;
        self
    }

    /// Classify an I/O failure that is neither a timeout nor a refused connection.
    pub fn classify(&self, status: Option<u16>, message: &str) -> FailureClass {
        if status == Some(404) && self.not_found_is_unreachable {
            return FailureClass::Network;
        }
        let status_listed = status.is_some_and(|s| self.non_fatal_status_codes.contains(&s));
        let message_listed = self
            .non_fatal_messages
            .iter()
            .any(|fragment| message.contains(fragment.as_str()));

        if status_listed || message_listed {
            FailureClass::Network
        } else {
            FailureClass::Protocol
        }
    }

    /// Outcome for a response that arrived with a non-success status
    ///
    /// Allow-listed fragments are matched against the full body; only the stored message is cut.
    pub fn classify_status(&self, status: u16, reason: &str, body: &str) -> TransportOutcome {
        let body = body.trim();
        let status_line = format!("HTTP {} {}", status, reason);
        let class = self.classify(Some(status), &format!("{}: {}", status_line, body));
        let failure = TransportFailure {
            message: if body.is_empty() {
                status_line
            } else {
                format!("{}: {}", status_line, preview(body))
            },
            status: Some(status),
        };
        match class {
            FailureClass::Network => TransportOutcome::NetworkFailure(failure),
            FailureClass::Protocol => TransportOutcome::ProtocolFailure(failure),
        }
    }
}

/// Configuration for the transport client
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Applied to both the connect phase and the whole request
    pub timeout: Duration,
    pub user_agent: String,
    pub policy: FailurePolicy,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self::new(Duration::from_secs(crate::core::config::DEFAULT_TIMEOUT_SECONDS))
    }
}

impl TransportConfig {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            user_agent: BROWSER_USER_AGENT.to_string(),
            policy: FailurePolicy::new(),
        }
    }

    #[must_use]
    pub fn with_non_fatal_status_codes(mut self, codes: impl IntoIterator<Item = u16>) -> Self {
        self.policy = self.policy.with_non_fatal_status_codes(codes);
        self
    }

    #[must_use]
    pub fn with_non_fatal_messages<S: Into<String>>(
        mut self,
        fragments: impl IntoIterator<Item = S>,
    ) -> Self {
        self.policy = self.policy.with_non_fatal_messages(fragments);
        self
    }

    #[must_use]
    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

/// Transport trait performing one HTTP request per call
#[async_trait]
pub trait Transport: Send + Sync {
    async fn send(&self, request: HttpRequest) -> TransportOutcome;
}

/// Counts connection handles taken and given back by a transport.
#[derive(Debug, Default)]
pub struct ConnectionStats {
    opened: AtomicU64,
    released: AtomicU64,
}

impl ConnectionStats {
    fn open(self: &Arc<Self>) -> ConnectionGuard {
        self.opened.fetch_add(1, Ordering::SeqCst);
        ConnectionGuard {
            stats: Arc::clone(self),
        }
    }

    pub fn opened(&self) -> u64 {
        self.opened.load(Ordering::SeqCst)
    }

    pub fn released(&self) -> u64 {
        self.released.load(Ordering::SeqCst)
    }

    pub fn in_flight(&self) -> u64 {
        self.opened().saturating_sub(self.released())
    }
}

/// Held for the lifetime of one call; releasing happens in `Drop` so every exit path counts once.
struct ConnectionGuard {
    stats: Arc<ConnectionStats>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.stats.released.fetch_add(1, Ordering::SeqCst);
    }
}

/// Implementation of `Transport` using reqwest
#[derive(Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: TransportConfig,
    stats: Arc<ConnectionStats>,
}

impl std::fmt::Debug for ReqwestTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReqwestTransport")
            .field("config", &self.config)
            .field("in_flight", &self.stats.in_flight())
            .finish_non_exhaustive()
    }
}

impl ReqwestTransport {
    pub fn new(config: TransportConfig) -> Result<Self, ExchangeError> {
        // No idle pooling: every call opens its own connection and closes it afterwards.
        let client = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.timeout)
            .pool_max_idle_per_host(0)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| {
                ExchangeError::protocol(
                    "transport",
                    ProtocolErrorKind::Configuration,
                    format!("Failed to build HTTP client: {}", e),
                )
            })?;

        Ok(Self {
            client,
            config,
            stats: Arc::new(ConnectionStats::default()),
        })
    }

    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    pub fn stats(&self) -> Arc<ConnectionStats> {
        Arc::clone(&self.stats)
    }

    fn classify_error(&self, err: &reqwest::Error) -> TransportOutcome {
        let message = error_chain(err);
        let failure = TransportFailure {
            message,
            status: err.status().map(|s| s.as_u16()),
        };

        if err.is_builder() {
            return TransportOutcome::ProtocolFailure(failure);
        }
        if err.is_timeout() || err.is_connect() {
            return TransportOutcome::NetworkFailure(failure);
        }
        match self.config.policy.classify(failure.status, &failure.message) {
            FailureClass::Network => TransportOutcome::NetworkFailure(failure),
            FailureClass::Protocol => TransportOutcome::ProtocolFailure(failure),
        }
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    #[instrument(skip(self, request), fields(method = %request.method, url = %request.url))]
    async fn send(&self, request: HttpRequest) -> TransportOutcome {
        let url = match Url::parse(&request.url) {
            Ok(url) => url,
            Err(e) => {
                return TransportOutcome::ProtocolFailure(TransportFailure {
                    message: format!("Malformed URL '{}': {}", request.url, e),
                    status: None,
                })
            }
        };

        let _connection = self.stats.open();

        let mut builder = self.client.request(request.method, url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = request.body {
            builder = builder.body(body);
        }

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let outcome = self.classify_error(&e);
                warn!(error = %e, network = outcome.is_network_failure(), "HTTP request failed");
                return outcome;
            }
        };

        let status = response.status();
        let reason = status.canonical_reason().unwrap_or_default().to_string();
        let payload = match response.text().await {
            Ok(text) => text,
            Err(e) => {
                let outcome = self.classify_error(&e);
                warn!(error = %e, network = outcome.is_network_failure(), "Failed to read response body");
                return outcome;
            }
        };

        trace!(status = status.as_u16(), "Response body: {}", payload);

        if status.is_success() {
            TransportOutcome::Success {
                status: status.as_u16(),
                reason,
                payload,
            }
        } else {
            let outcome = self
                .config
                .policy
                .classify_status(status.as_u16(), &reason, &payload);
            warn!(
                status = status.as_u16(),
                network = outcome.is_network_failure(),
                "Exchange returned error status"
            );
            outcome
        }
    }
}

/// Flatten an error and its sources into one line; allow-list fragments may sit at any level.
fn error_chain(err: &(dyn StdError + 'static)) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}
