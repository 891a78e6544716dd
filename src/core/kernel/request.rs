use crate::core::kernel::transport::HttpRequest;
use reqwest::Method;
use serde_json::{Map, Value};

/// Ordered request parameters; order is kept exactly as inserted.
pub type Params = Vec<(String, Value)>;

/// The exact request an exchange will reconstruct and verify.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalRequest {
    pub method: Method,
    pub path: String,
    pub params: Params,
    pub nonce: u64,
}

impl CanonicalRequest {
    pub fn new(method: Method, path: impl Into<String>, params: Params, nonce: u64) -> Self {
        Self {
            method,
            path: path.into(),
            params,
            nonce,
        }
    }
}

/// Canonical request plus the credential material an exchange demands.
///
/// Deliberately not `Clone`: the pipeline consumes it once, so a nonce can't be replayed.
#[derive(Debug, PartialEq, Eq)]
pub struct SignedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub nonce: u64,
}

impl SignedRequest {
    pub fn new(method: Method, path: impl Into<String>, nonce: u64) -> Self {
        Self {
            method,
            path: path.into(),
            query: None,
            headers: Vec::new(),
            body: None,
            nonce,
        }
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Turn into a transport request against `base_url`
    pub fn into_http(self, base_url: &str) -> HttpRequest {
        let mut url = format!("{}{}", base_url.trim_end_matches('/'), self.path);
        if let Some(query) = self.query.filter(|q| !q.is_empty()) {
            url.push('?');
            url.push_str(&query);
        }
        HttpRequest {
            method: self.method,
            url,
            headers: self.headers,
            body: self.body,
        }
    }
}

/// How request parameters travel on the wire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamEncoding {
    Query,
    Form,
    Json,
}

impl ParamEncoding {
    pub const fn content_type(self) -> Option<&'static str> {
        match self {
            Self::Query => None,
            Self::Form => Some("application/x-www-form-urlencoded"),
            Self::Json => Some("application/json"),
        }
    }

    /// Encode `params`; returns (query, body)
    pub fn encode(self, params: &[(String, Value)]) -> (Option<String>, Option<String>) {
        match self {
            Self::Query => (Some(query_string(params)), None),
            Self::Form => (None, Some(query_string(params))),
            Self::Json => (None, Some(json_object(params))),
        }
    }
}

/// Text form of a parameter value as it appears in `k=v` strings
pub fn param_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        other => other.to_string(),
    }
}

/// Percent-encoded `k=v&k=v` in the given order, as sent on the wire
pub fn query_string(params: &[(String, Value)]) -> String {
    params
        .iter()
        .map(|(k, v)| {
            format!(
                "{}={}",
                urlencoding::encode(k),
                urlencoding::encode(&param_text(v))
            )
        })
        .collect::<Vec<_>>()
        .join("&")
}

/// `k=v&k=v` without percent-encoding, for digests computed over decoded parameters
pub fn raw_query_string(params: &[(String, Value)]) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", k, param_text(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Compact JSON object with keys in insertion order
pub fn json_object(params: &[(String, Value)]) -> String {
    let map: Map<String, Value> = params.iter().cloned().collect();
    Value::Object(map).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn params() -> Params {
        vec![
            ("symbol".to_string(), json!("btc_usd")),
            ("amount".to_string(), json!("0.5")),
            ("order_id".to_string(), json!(42)),
        ]
    }

    #[test]
    fn test_query_string_keeps_insertion_order() {
        assert_eq!(
            query_string(&params()),
            "symbol=btc_usd&amount=0.5&order_id=42"
        );
    }

    #[test]
    fn test_reserved_characters_are_escaped_on_the_wire() {
        let params = vec![
            ("type".to_string(), json!("exchange limit")),
            ("note".to_string(), json!("a&b=c+d")),
        ];
        assert_eq!(
            query_string(&params),
            "type=exchange%20limit&note=a%26b%3Dc%2Bd"
        );
        assert_eq!(raw_query_string(&params), "type=exchange limit&note=a&b=c+d");
        let (_, body) = ParamEncoding::Form.encode(&params);
        assert_eq!(body.as_deref(), Some("type=exchange%20limit&note=a%26b%3Dc%2Bd"));
    }

    #[test]
    fn test_json_object_keeps_insertion_order_and_types() {
        assert_eq!(
            json_object(&params()),
            r#"{"symbol":"btc_usd","amount":"0.5","order_id":42}"#
        );
    }

    #[test]
    fn test_into_http_joins_query_and_base() {
        let mut signed = SignedRequest::new(Method::GET, "/api/v1/depth.do", 1);
        signed.query = Some("symbol=btc_usd".to_string());
        let http = signed.into_http("https://www.okcoin.com/");
        assert_eq!(http.url, "https://www.okcoin.com/api/v1/depth.do?symbol=btc_usd");
        assert!(http.body.is_none());
    }
}
