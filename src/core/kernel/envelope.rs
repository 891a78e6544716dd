use crate::core::errors::{preview, ExchangeError};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::str::FromStr;

/// Outcome of inspecting a response body that arrived with a success status.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedResult<T = Value> {
    Ok(T),
    /// The exchange understood the call and refused it in-band
    BusinessError {
        message: String,
        code: Option<String>,
    },
}

impl<T> DecodedResult<T> {
    pub fn business(message: impl Into<String>, code: Option<String>) -> Self {
        Self::BusinessError {
            message: message.into(),
            code,
        }
    }

    pub const fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }

    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Ok(_) => None,
            Self::BusinessError { code, .. } => code.as_deref(),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> DecodedResult<U> {
        match self {
            Self::Ok(value) => DecodedResult::Ok(f(value)),
            Self::BusinessError { message, code } => DecodedResult::BusinessError { message, code },
        }
    }

    pub fn and_then<U>(self, f: impl FnOnce(T) -> DecodedResult<U>) -> DecodedResult<U> {
        match self {
            Self::Ok(value) => f(value),
            Self::BusinessError { message, code } => DecodedResult::BusinessError { message, code },
        }
    }

    /// Business errors become `ProtocolFailure`; nonce and credential complaints are
    /// reported as authentication failures.
    pub fn into_result(self, endpoint: &str) -> Result<T, ExchangeError> {
        match self {
            Self::Ok(value) => Ok(value),
            Self::BusinessError { message, code } => {
                if looks_like_auth_failure(&message) {
                    Err(ExchangeError::authentication(endpoint, message))
                } else {
                    Err(ExchangeError::rejected(endpoint, code, message))
                }
            }
        }
    }
}

fn looks_like_auth_failure(message: &str) -> bool {
    const MARKERS: [&str; 7] = [
        "nonce",
        "signature",
        "api key",
        "api_key",
        "apikey",
        "secret key",
        "authenticat",
    ];
    let lower = message.to_lowercase();
    MARKERS.iter().any(|marker| lower.contains(marker))
}

/// JSON kind the payload must have
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadKind {
    Object,
    Array,
    Any,
}

impl PayloadKind {
    fn matches(self, value: &Value) -> bool {
        match self {
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Any => true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EnvelopeShape {
    /// The body is the payload; an object carrying one of `error_keys` is an error
    Bare {
        error_keys: Vec<String>,
        code_key: Option<String>,
    },
    /// `{flag: true, payload: ...}` or `{flag: false, error: ...}`
    Flagged {
        flag: String,
        /// Field holding the payload; `None` means the whole object is the payload
        payload: Option<String>,
        error: Option<String>,
        code: Option<String>,
    },
}

/// What a response for one endpoint is expected to look like
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvelopeSpec {
    pub shape: EnvelopeShape,
    pub expect: PayloadKind,
}

impl EnvelopeSpec {
    /// Bare payload, errors signalled by an `error` key
    pub fn bare(expect: PayloadKind) -> Self {
        Self {
            shape: EnvelopeShape::Bare {
                error_keys: vec!["error".to_string()],
                code_key: None,
            },
            expect,
        }
    }

    /// Success flag wrapper, error text in `error`
    pub fn flagged(flag: &str, payload: Option<&str>, expect: PayloadKind) -> Self {
        Self {
            shape: EnvelopeShape::Flagged {
                flag: flag.to_string(),
                payload: payload.map(str::to_string),
                error: Some("error".to_string()),
                code: None,
            },
            expect,
        }
    }

    #[must_use]
    pub fn with_error_keys(mut self, keys: &[&str]) -> Self {
        let keys: Vec<String> = keys.iter().map(|k| (*k).to_string()).collect();
        match &mut self.shape {
            EnvelopeShape::Bare { error_keys, .. } => *error_keys = keys,
            EnvelopeShape::Flagged { error, .. } => *error = keys.into_iter().next(),
        }
        self
    }

    #[must_use]
    pub fn with_code_key(mut self, key: &str) -> Self {
        match &mut self.shape {
            EnvelopeShape::Bare { code_key, .. } => *code_key = Some(key.to_string()),
            EnvelopeShape::Flagged { code, .. } => *code = Some(key.to_string()),
        }
        self
    }
}

/// Decode one raw body. Pure: the same input always yields the same result.
pub fn decode(raw: &str, spec: &EnvelopeSpec) -> DecodedResult {
    let value: Value = match serde_json::from_str(raw.trim()) {
        Ok(value) => value,
        Err(e) => {
            return DecodedResult::business(
                format!("Response is not JSON ({}): {}", e, preview(raw)),
                None,
            )
        }
    };

    match &spec.shape {
        EnvelopeShape::Bare {
            error_keys,
            code_key,
        } => decode_bare(value, raw, error_keys, code_key.as_deref(), spec.expect),
        EnvelopeShape::Flagged {
            flag,
            payload,
            error,
            code,
        } => decode_flagged(
            value,
            raw,
            flag,
            payload.as_deref(),
            error.as_deref(),
            code.as_deref(),
            spec.expect,
        ),
    }
}

fn decode_bare(
    value: Value,
    raw: &str,
    error_keys: &[String],
    code_key: Option<&str>,
    expect: PayloadKind,
) -> DecodedResult {
    if let Value::Object(map) = &value {
        for key in error_keys {
            if let Some(error) = map.get(key).filter(|v| is_present(v)) {
                let code = code_key.and_then(|k| map.get(k)).and_then(scalar_text);
                return DecodedResult::business(error_text(error), code);
            }
        }
    }
    checked_kind(value, raw, expect)
}

fn decode_flagged(
    value: Value,
    raw: &str,
    flag: &str,
    payload_field: Option<&str>,
    error_field: Option<&str>,
    code_field: Option<&str>,
    expect: PayloadKind,
) -> DecodedResult {
    let Value::Object(mut map) = value else {
        return unrecognised("Expected an object envelope", raw);
    };

    let code = code_field.and_then(|k| map.get(k)).and_then(scalar_text);
    let error = error_field
        .and_then(|k| map.get(k))
        .filter(|v| is_present(v))
        .map(error_text);

    match map.get(flag).map(is_truthy) {
        Some(true) => {}
        Some(false) => {
            let message = match (error, &code) {
                (Some(message), _) => message,
                (None, Some(code)) => format!("Exchange error code {}", code),
                (None, None) => format!("Request failed: {}", preview(raw)),
            };
            return DecodedResult::business(message, code);
        }
        None => {
            return match error {
                Some(message) => DecodedResult::business(message, code),
                None => unrecognised(&format!("Missing '{}' flag", flag), raw),
            };
        }
    }

    let payload = match payload_field {
        None => Value::Object(map),
        Some(field) => match map.remove(field) {
            Some(payload) => payload,
            None => return unrecognised(&format!("Missing '{}' field", field), raw),
        },
    };
    checked_kind(payload, raw, expect)
}

fn checked_kind(payload: Value, raw: &str, expect: PayloadKind) -> DecodedResult {
    if expect.matches(&payload) {
        DecodedResult::Ok(payload)
    } else {
        unrecognised(&format!("Expected {:?} payload", expect), raw)
    }
}

fn unrecognised(reason: &str, raw: &str) -> DecodedResult {
    DecodedResult::business(format!("{}: {}", reason, preview(raw)), None)
}

fn is_present(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
        _ => true,
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|n| n != 0.0),
        Value::String(s) => matches!(s.to_lowercase().as_str(), "1" | "true" | "success" | "ok"),
        _ => false,
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn error_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// First order id found under `fields`; 0, `"0"` or an empty string mean "no id".
pub fn extract_order_id(payload: &Value, fields: &[&str]) -> DecodedResult<String> {
    for field in fields {
        let Some(value) = payload.get(*field) else {
            continue;
        };
        return match scalar_text(value) {
            Some(id) if id != "0" => DecodedResult::Ok(id),
            _ => DecodedResult::business(
                format!("Exchange returned no order id in '{}'", field),
                None,
            ),
        };
    }
    DecodedResult::business(
        format!("No order id field in response: {}", preview(&payload.to_string())),
        None,
    )
}

/// Deserialize a decoded payload into an exchange type
pub fn from_payload<T: DeserializeOwned>(endpoint: &str, payload: Value) -> Result<T, ExchangeError> {
    serde_json::from_value(payload).map_err(|e| {
        ExchangeError::malformed(endpoint, format!("Unexpected payload layout: {}", e))
    })
}

/// Decimal from a field that may be a JSON number or a numeric string
pub fn lenient_decimal(value: &Value) -> Option<Decimal> {
    match value {
        Value::String(s) => Decimal::from_str(s.trim())
            .or_else(|_| Decimal::from_scientific(s.trim()))
            .ok(),
        Value::Number(n) => {
            let text = n.to_string();
            Decimal::from_str(&text)
                .or_else(|_| Decimal::from_scientific(&text))
                .ok()
        }
        _ => None,
    }
}
