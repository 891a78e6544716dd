use std::fmt;
use thiserror::Error;

/// Longest slice of a raw exchange response carried inside an error message.
pub const RESPONSE_PREVIEW_LEN: usize = 200;

/// Why a call failed permanently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProtocolErrorKind {
    /// The request could not be built (bad URL, bad parameters, unsigned call).
    InvalidRequest,
    /// The exchange refused our credentials, signature or nonce.
    Authentication,
    /// The exchange understood the call and rejected it in-band.
    Rejected { code: Option<String> },
    /// The response could not be parsed into a recognised envelope.
    MalformedResponse,
    /// Transport answered with a failure that is not on the non-fatal allow-lists.
    Transport { status: Option<u16> },
    /// Client construction failed.
    Configuration,
}

impl fmt::Display for ProtocolErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidRequest => write!(f, "invalid request"),
            Self::Authentication => write!(f, "authentication"),
            Self::Rejected { code: Some(code) } => write!(f, "rejected ({})", code),
            Self::Rejected { code: None } => write!(f, "rejected"),
            Self::MalformedResponse => write!(f, "malformed response"),
            Self::Transport { status: Some(status) } => write!(f, "transport (HTTP {})", status),
            Self::Transport { status: None } => write!(f, "transport"),
            Self::Configuration => write!(f, "configuration"),
        }
    }
}

/// The two failure classes surfaced to callers.
///
/// `NetworkFailure` is worth retrying later; `ProtocolFailure` will fail the same way again.
/// Neither variant ever carries credential material.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExchangeError {
    #[error("Network failure calling {endpoint}: {message}")]
    NetworkFailure {
        endpoint: String,
        message: String,
        /// Status code when the exchange did answer (allow-listed status or message).
        status: Option<u16>,
    },

    #[error("Protocol failure calling {endpoint} [{kind}]: {message}")]
    ProtocolFailure {
        endpoint: String,
        kind: ProtocolErrorKind,
        message: String,
    },
}

impl ExchangeError {
    pub fn network(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::NetworkFailure {
            endpoint: endpoint.into(),
            message: message.into(),
            status: None,
        }
    }

    pub fn protocol(
        endpoint: impl Into<String>,
        kind: ProtocolErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self::ProtocolFailure {
            endpoint: endpoint.into(),
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_request(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::protocol(endpoint, ProtocolErrorKind::InvalidRequest, message)
    }

    pub fn authentication(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::protocol(endpoint, ProtocolErrorKind::Authentication, message)
    }

    pub fn malformed(endpoint: impl Into<String>, message: impl Into<String>) -> Self {
        Self::protocol(endpoint, ProtocolErrorKind::MalformedResponse, message)
    }

    pub fn rejected(
        endpoint: impl Into<String>,
        code: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::protocol(endpoint, ProtocolErrorKind::Rejected { code }, message)
    }

    /// True for failures the caller may retry with a fresh request.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NetworkFailure { .. })
    }

    pub fn endpoint(&self) -> &str {
        match self {
            Self::NetworkFailure { endpoint, .. } | Self::ProtocolFailure { endpoint, .. } => {
                endpoint
            }
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NetworkFailure { status, .. } => *status,
            Self::ProtocolFailure {
                kind: ProtocolErrorKind::Transport { status },
                ..
            } => *status,
            Self::ProtocolFailure { .. } => None,
        }
    }

    pub fn kind(&self) -> Option<&ProtocolErrorKind> {
        match self {
            Self::ProtocolFailure { kind, .. } => Some(kind),
            Self::NetworkFailure { .. } => None,
        }
    }
}

impl From<crate::core::config::ConfigError> for ExchangeError {
    fn from(err: crate::core::config::ConfigError) -> Self {
        Self::protocol("config", ProtocolErrorKind::Configuration, err.to_string())
    }
}

/// Cut `raw` down to at most [`RESPONSE_PREVIEW_LEN`] characters for error messages.
pub fn preview(raw: &str) -> String {
    if raw.chars().count() <= RESPONSE_PREVIEW_LEN {
        raw.to_string()
    } else {
        let mut cut: String = raw.chars().take(RESPONSE_PREVIEW_LEN).collect();
        cut.push_str("...");
        cut
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_network_failures_are_retryable() {
        let network = ExchangeError::network("/v1/orders", "timed out");
        let protocol = ExchangeError::rejected("/v1/orders", Some("10009".into()), "no order");

        assert!(network.is_retryable());
        assert!(!protocol.is_retryable());
        assert_eq!(protocol.endpoint(), "/v1/orders");
    }

    #[test]
    fn test_display_includes_endpoint_and_kind() {
        let err = ExchangeError::rejected("/tapi", Some("42".into()), "bad pair");
        let text = err.to_string();
        assert!(text.contains("/tapi"));
        assert!(text.contains("rejected (42)"));
        assert!(text.contains("bad pair"));
    }

    #[test]
    fn test_preview_truncates_long_payloads() {
        let raw = "x".repeat(500);
        let cut = preview(&raw);
        assert_eq!(cut.len(), RESPONSE_PREVIEW_LEN + 3);
        assert_eq!(preview("short"), "short");
    }
}
