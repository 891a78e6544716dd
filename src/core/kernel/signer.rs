use crate::core::config::{ConfigError, ExchangeConfig};
use crate::core::errors::ExchangeError;
use crate::core::kernel::request::{
    raw_query_string, CanonicalRequest, ParamEncoding, SignedRequest,
};
use base64::engine::general_purpose;
use base64::Engine;
use hmac::{Hmac, Mac};
use md5::{Digest, Md5};
use secrecy::{ExposeSecret, Secret};
use serde_json::{Map, Value};
use sha2::{Sha256, Sha384, Sha512};
use zeroize::Zeroizing;

/// Signer trait for request authentication
///
/// Implementations assemble the byte sequence the exchange reconstructs server-side and attach
/// the resulting credential material. Whitespace, key case, parameter order and trailing slashes
/// all matter: any deviation produces a silent authentication failure on the exchange side.
pub trait Signer: Send + Sync {
    /// Sign a canonical request, consuming it
    fn sign(&self, request: CanonicalRequest) -> Result<SignedRequest, ExchangeError>;
}

/// API credentials for one exchange account
#[derive(Clone)]
pub struct Credentials {
    pub api_key: String,
    pub secret: Secret<String>,
    pub passphrase: Option<Secret<String>>,
    pub client_id: Option<String>,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"[REDACTED]")
            .field("has_passphrase", &self.passphrase.is_some())
            .field("client_id", &self.client_id)
            .finish_non_exhaustive()
    }
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            secret: Secret::new(secret.into()),
            passphrase: None,
            client_id: None,
        }
    }

    #[must_use]
    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = Some(client_id.into());
        self
    }

    #[must_use]
    pub fn with_passphrase(mut self, passphrase: impl Into<String>) -> Self {
        self.passphrase = Some(Secret::new(passphrase.into()));
        self
    }

    pub fn from_config(config: &ExchangeConfig) -> Result<Self, ConfigError> {
        if config.api_key().is_empty() {
            return Err(ConfigError::MissingCredential("api_key"));
        }
        if config.secret_key().is_empty() {
            return Err(ConfigError::MissingCredential("secret_key"));
        }
        Ok(Self {
            api_key: config.api_key().to_string(),
            secret: config.secret_key.clone(),
            passphrase: config.passphrase.clone(),
            client_id: config.client_id.clone(),
        })
    }
}

/// Hash function behind an HMAC
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HmacAlgorithm {
    Sha256,
    Sha384,
    Sha512,
}

/// Text encoding of signature bytes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureEncoding {
    LowerHex,
    UpperHex,
    Base64,
}

impl SignatureEncoding {
    pub fn encode(self, bytes: &[u8]) -> String {
        match self {
            Self::LowerHex => hex::encode(bytes),
            Self::UpperHex => hex::encode_upper(bytes),
            Self::Base64 => general_purpose::STANDARD.encode(bytes),
        }
    }
}

/// How the shared secret is handed out by the exchange
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecretEncoding {
    Raw,
    Base64,
}

/// An HMAC already keyed with the account secret; cloned per signature.
#[derive(Clone)]
enum KeyedMac {
    Sha256(Hmac<Sha256>),
    Sha384(Hmac<Sha384>),
    Sha512(Hmac<Sha512>),
}

impl KeyedMac {
    fn new(
        algorithm: HmacAlgorithm,
        secret: &Secret<String>,
        encoding: SecretEncoding,
    ) -> Result<Self, ExchangeError> {
        let key: Zeroizing<Vec<u8>> = match encoding {
            SecretEncoding::Raw => Zeroizing::new(secret.expose_secret().as_bytes().to_vec()),
            SecretEncoding::Base64 => Zeroizing::new(
                general_purpose::STANDARD
                    .decode(secret.expose_secret())
                    .map_err(|_| {
                        ExchangeError::authentication("signer", "Secret is not valid base64")
                    })?,
            ),
        };
        let invalid = |_| ExchangeError::authentication("signer", "Invalid secret key length");

        Ok(match algorithm {
            HmacAlgorithm::Sha256 => Self::Sha256(Hmac::new_from_slice(&key).map_err(invalid)?),
            HmacAlgorithm::Sha384 => Self::Sha384(Hmac::new_from_slice(&key).map_err(invalid)?),
            HmacAlgorithm::Sha512 => Self::Sha512(Hmac::new_from_slice(&key).map_err(invalid)?),
        })
    }

    fn sign(&self, message: &[u8]) -> Vec<u8> {
        match self {
            Self::Sha256(mac) => {
                let mut mac = mac.clone();
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha384(mac) => {
                let mut mac = mac.clone();
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
            Self::Sha512(mac) => {
                let mut mac = mac.clone();
                mac.update(message);
                mac.finalize().into_bytes().to_vec()
            }
        }
    }
}

// ---------------------------------------------------------------------------
// HMAC over a fixed concatenation
// ---------------------------------------------------------------------------

/// One piece of the string an exchange signs
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessagePart {
    Nonce,
    Method,
    Path,
    /// Encoded query string, empty when there is none
    Query,
    /// Encoded body, empty when there is none
    Body,
    ApiKey,
    ClientId,
}

/// Where the key and signature go
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthPlacement {
    Headers {
        key: String,
        signature: String,
        nonce: Option<String>,
        passphrase: Option<String>,
    },
    /// Appended to the encoded parameters after signing
    Params { key: String, signature: String },
}

/// Layout of a concatenation-HMAC exchange
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConcatScheme {
    pub algorithm: HmacAlgorithm,
    pub secret_encoding: SecretEncoding,
    pub output: SignatureEncoding,
    pub parts: Vec<MessagePart>,
    pub encoding: ParamEncoding,
    /// Parameter name to carry the nonce, if the exchange wants it among the params
    pub nonce_param: Option<String>,
    pub placement: AuthPlacement,
}

impl ConcatScheme {
    /// Bitstamp: `nonce + customer_id + api_key`, HMAC-SHA256, upper hex, auth in the form body
    pub fn bitstamp() -> Self {
        Self {
            algorithm: HmacAlgorithm::Sha256,
            secret_encoding: SecretEncoding::Raw,
            output: SignatureEncoding::UpperHex,
            parts: vec![MessagePart::Nonce, MessagePart::ClientId, MessagePart::ApiKey],
            encoding: ParamEncoding::Form,
            nonce_param: Some("nonce".to_string()),
            placement: AuthPlacement::Params {
                key: "key".to_string(),
                signature: "signature".to_string(),
            },
        }
    }

    /// WEX / BTC-e trade API: HMAC-SHA512 of the form body, `Key` and `Sign` headers
    pub fn wex() -> Self {
        Self {
            algorithm: HmacAlgorithm::Sha512,
            secret_encoding: SecretEncoding::Raw,
            output: SignatureEncoding::LowerHex,
            parts: vec![MessagePart::Body],
            encoding: ParamEncoding::Form,
            nonce_param: Some("nonce".to_string()),
            placement: AuthPlacement::Headers {
                key: "Key".to_string(),
                signature: "Sign".to_string(),
                nonce: None,
                passphrase: None,
            },
        }
    }

    /// `nonce + METHOD + path + body` signed with a base64 secret, base64 output, header auth
    pub fn timestamped_headers(prefix: &str) -> Self {
        Self {
            algorithm: HmacAlgorithm::Sha256,
            secret_encoding: SecretEncoding::Base64,
            output: SignatureEncoding::Base64,
            parts: vec![
                MessagePart::Nonce,
                MessagePart::Method,
                MessagePart::Path,
                MessagePart::Body,
            ],
            encoding: ParamEncoding::Json,
            nonce_param: None,
            placement: AuthPlacement::Headers {
                key: format!("{}-KEY", prefix),
                signature: format!("{}-SIGN", prefix),
                nonce: Some(format!("{}-TIMESTAMP", prefix)),
                passphrase: Some(format!("{}-PASSPHRASE", prefix)),
            },
        }
    }
}

/// HMAC computed over a fixed-order concatenation of request fields
pub struct ConcatHmacSigner {
    api_key: String,
    client_id: Option<String>,
    passphrase: Option<Secret<String>>,
    mac: KeyedMac,
    scheme: ConcatScheme,
}

impl std::fmt::Debug for ConcatHmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConcatHmacSigner")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl ConcatHmacSigner {
    pub fn new(credentials: &Credentials, scheme: ConcatScheme) -> Result<Self, ExchangeError> {
        if matches!(scheme.placement, AuthPlacement::Params { .. })
            && scheme.parts.contains(&MessagePart::Body)
        {
            return Err(ExchangeError::invalid_request(
                "signer",
                "A signature carried in the body cannot also sign the body",
            ));
        }
        if scheme.parts.contains(&MessagePart::ClientId) && credentials.client_id.is_none() {
            return Err(ConfigError::MissingCredential("client_id").into());
        }
        if let AuthPlacement::Headers {
            passphrase: Some(_),
            ..
        } = scheme.placement
        {
            if credentials.passphrase.is_none() {
                return Err(ConfigError::MissingCredential("passphrase").into());
            }
        }

        let mac = KeyedMac::new(scheme.algorithm, &credentials.secret, scheme.secret_encoding)?;
        Ok(Self {
            api_key: credentials.api_key.clone(),
            client_id: credentials.client_id.clone(),
            passphrase: credentials.passphrase.clone(),
            mac,
            scheme,
        })
    }

    fn message(&self, request: &CanonicalRequest, query: &str, body: &str) -> String {
        let mut message = String::new();
        for part in &self.scheme.parts {
            match part {
                MessagePart::Nonce => message.push_str(&request.nonce.to_string()),
                MessagePart::Method => message.push_str(request.method.as_str()),
                MessagePart::Path => message.push_str(&request.path),
                MessagePart::Query => message.push_str(query),
                MessagePart::Body => message.push_str(body),
                MessagePart::ApiKey => message.push_str(&self.api_key),
                MessagePart::ClientId => {
                    message.push_str(self.client_id.as_deref().unwrap_or_default());
                }
            }
        }
        message
    }
}

impl Signer for ConcatHmacSigner {
    fn sign(&self, request: CanonicalRequest) -> Result<SignedRequest, ExchangeError> {
        let mut params = request.params.clone();
        if let Some(name) = &self.scheme.nonce_param {
            params.push((name.clone(), Value::String(request.nonce.to_string())));
        }

        let (query, body) = self.scheme.encoding.encode(&params);
        let message = self.message(
            &request,
            query.as_deref().unwrap_or_default(),
            body.as_deref().unwrap_or_default(),
        );
        let signature = self.scheme.output.encode(&self.mac.sign(message.as_bytes()));

        let mut signed = SignedRequest::new(request.method, request.path, request.nonce);
        signed.query = query;
        signed.body = body;

        match &self.scheme.placement {
            AuthPlacement::Headers {
                key,
                signature: signature_header,
                nonce,
                passphrase,
            } => {
                signed.headers.push((key.clone(), self.api_key.clone()));
                signed.headers.push((signature_header.clone(), signature));
                if let Some(nonce_header) = nonce {
                    signed
                        .headers
                        .push((nonce_header.clone(), request.nonce.to_string()));
                }
                if let (Some(header), Some(secret)) = (passphrase, &self.passphrase) {
                    signed
                        .headers
                        .push((header.clone(), secret.expose_secret().clone()));
                }
            }
            AuthPlacement::Params {
                key,
                signature: signature_param,
            } => {
                params.push((key.clone(), Value::String(self.api_key.clone())));
                params.push((signature_param.clone(), Value::String(signature)));
                let (query, body) = self.scheme.encoding.encode(&params);
                signed.query = query;
                signed.body = body;
            }
        }

        if signed.body.is_some() {
            if let Some(content_type) = self.scheme.encoding.content_type() {
                signed
                    .headers
                    .push(("Content-Type".to_string(), content_type.to_string()));
            }
        }

        Ok(signed)
    }
}

// ---------------------------------------------------------------------------
// HMAC over a base64 JSON payload
// ---------------------------------------------------------------------------

/// Header names and hash for payload-signing exchanges
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PayloadScheme {
    pub header_prefix: String,
    pub algorithm: HmacAlgorithm,
    /// Send the JSON payload as the body too (Bitfinex) or leave the body empty (Gemini)
    pub payload_in_body: bool,
}

impl PayloadScheme {
    pub fn bitfinex() -> Self {
        Self {
            header_prefix: "X-BFX".to_string(),
            algorithm: HmacAlgorithm::Sha384,
            payload_in_body: true,
        }
    }

    pub fn gemini() -> Self {
        Self {
            header_prefix: "X-GEMINI".to_string(),
            algorithm: HmacAlgorithm::Sha384,
            payload_in_body: false,
        }
    }
}

/// Serialises `{request, nonce, ..params}` to JSON, base64-encodes it and signs the base64 text
pub struct PayloadHmacSigner {
    api_key: String,
    mac: KeyedMac,
    scheme: PayloadScheme,
}

impl std::fmt::Debug for PayloadHmacSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PayloadHmacSigner")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl PayloadHmacSigner {
    pub fn new(credentials: &Credentials, scheme: PayloadScheme) -> Result<Self, ExchangeError> {
        let mac = KeyedMac::new(scheme.algorithm, &credentials.secret, SecretEncoding::Raw)?;
        Ok(Self {
            api_key: credentials.api_key.clone(),
            mac,
            scheme,
        })
    }

    fn payload(request: &CanonicalRequest) -> String {
        let mut map = Map::new();
        map.insert("request".to_string(), Value::String(request.path.clone()));
        map.insert("nonce".to_string(), Value::String(request.nonce.to_string()));
        for (key, value) in &request.params {
            map.insert(key.clone(), value.clone());
        }
        Value::Object(map).to_string()
    }
}

impl Signer for PayloadHmacSigner {
    fn sign(&self, request: CanonicalRequest) -> Result<SignedRequest, ExchangeError> {
        let payload = Self::payload(&request);
        let encoded = general_purpose::STANDARD.encode(payload.as_bytes());
        let signature = hex::encode(self.mac.sign(encoded.as_bytes()));

        let prefix = &self.scheme.header_prefix;
        let mut signed = SignedRequest::new(request.method, request.path, request.nonce);
        signed
            .headers
            .push((format!("{}-APIKEY", prefix), self.api_key.clone()));
        signed
            .headers
            .push((format!("{}-PAYLOAD", prefix), encoded));
        signed
            .headers
            .push((format!("{}-SIGNATURE", prefix), signature));

        if self.scheme.payload_in_body {
            signed
                .headers
                .push(("Content-Type".to_string(), "application/json".to_string()));
            signed.body = Some(payload);
        } else {
            signed
                .headers
                .push(("Content-Type".to_string(), "text/plain".to_string()));
        }

        Ok(signed)
    }
}

// ---------------------------------------------------------------------------
// Plain digest over the sorted parameter string
// ---------------------------------------------------------------------------

/// How the secret is glued onto the sorted parameter string
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretSuffix {
    /// `...&<name>=<secret>`
    Param(String),
    /// `...<secret>`
    Raw,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestScheme {
    pub key_param: String,
    pub secret_suffix: SecretSuffix,
    pub sign_param: String,
    pub uppercase: bool,
    pub nonce_param: Option<String>,
    pub encoding: ParamEncoding,
}

impl DigestScheme {
    /// OKCoin v1: MD5 over sorted params with `&secret_key=`, upper hex, form body
    pub fn okcoin() -> Self {
        Self {
            key_param: "api_key".to_string(),
            secret_suffix: SecretSuffix::Param("secret_key".to_string()),
            sign_param: "sign".to_string(),
            uppercase: true,
            nonce_param: None,
            encoding: ParamEncoding::Form,
        }
    }
}

/// MD5 digest over alphabetically sorted `k=v` pairs with the secret appended
pub struct SortedDigestSigner {
    api_key: String,
    // The secret is part of the digested text, so it has to stay around.
    secret: Secret<String>,
    scheme: DigestScheme,
}

impl std::fmt::Debug for SortedDigestSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SortedDigestSigner")
            .field("scheme", &self.scheme)
            .finish_non_exhaustive()
    }
}

impl SortedDigestSigner {
    pub fn new(credentials: &Credentials, scheme: DigestScheme) -> Self {
        Self {
            api_key: credentials.api_key.clone(),
            secret: credentials.secret.clone(),
            scheme,
        }
    }
}

impl Signer for SortedDigestSigner {
    fn sign(&self, request: CanonicalRequest) -> Result<SignedRequest, ExchangeError> {
        let mut params = request.params.clone();
        params.push((
            self.scheme.key_param.clone(),
            Value::String(self.api_key.clone()),
        ));
        if let Some(name) = &self.scheme.nonce_param {
            params.push((name.clone(), Value::String(request.nonce.to_string())));
        }
        params.sort_by(|a, b| a.0.cmp(&b.0));

        let sorted = raw_query_string(&params);
        let mut message = Zeroizing::new(sorted);
        match &self.scheme.secret_suffix {
            SecretSuffix::Param(name) => {
                message.push('&');
                message.push_str(name);
                message.push('=');
                message.push_str(self.secret.expose_secret());
            }
            SecretSuffix::Raw => message.push_str(self.secret.expose_secret()),
        }

        let digest = Md5::digest(message.as_bytes());
        let signature = if self.scheme.uppercase {
            hex::encode_upper(digest)
        } else {
            hex::encode(digest)
        };
        params.push((self.scheme.sign_param.clone(), Value::String(signature)));

        let (query, body) = self.scheme.encoding.encode(&params);
        let mut signed = SignedRequest::new(request.method, request.path, request.nonce);
        signed.query = query;
        signed.body = body;
        if signed.body.is_some() {
            if let Some(content_type) = self.scheme.encoding.content_type() {
                signed
                    .headers
                    .push(("Content-Type".to_string(), content_type.to_string()));
            }
        }
        Ok(signed)
    }
}

/// Look up a parameter by name in an encoded `k=v&k=v` string
pub fn form_value<'a>(encoded: &'a str, name: &str) -> Option<&'a str> {
    encoded
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v)
}

/// Text of a JSON parameter, for adapters that build canonical params from domain values
pub fn text_param(name: &str, value: impl ToString) -> (String, Value) {
    (name.to_string(), Value::String(value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::Method;
    use serde_json::json;

    #[test]
    fn test_bitstamp_signature_golden() {
        let credentials = Credentials::new("bs-key", "bs-secret").with_client_id("123456");
        let signer = ConcatHmacSigner::new(&credentials, ConcatScheme::bitstamp()).unwrap();
        let request = CanonicalRequest::new(
            Method::POST,
            "/api/v2/balance/",
            Vec::new(),
            1_500_000_000,
        );

        let signed = signer.sign(request).unwrap();
        let body = signed.body.as_deref().unwrap();
        assert_eq!(
            body,
            "nonce=1500000000&key=bs-key&signature=40072B327AEB4A70A10EC1ECFBBED66A48EF7595C5D3A90217E6E96AEA4514AE"
        );
        assert_eq!(
            signed.header("content-type"),
            Some("application/x-www-form-urlencoded")
        );
    }

    #[test]
    fn test_wex_signature_golden() {
        let credentials = Credentials::new("wex-key", "wex-secret");
        let signer = ConcatHmacSigner::new(&credentials, ConcatScheme::wex()).unwrap();
        let request = CanonicalRequest::new(
            Method::POST,
            "/tapi",
            vec![text_param("method", "getInfo")],
            1_500_000_000,
        );

        let signed = signer.sign(request).unwrap();
        assert_eq!(signed.body.as_deref(), Some("method=getInfo&nonce=1500000000"));
        assert_eq!(signed.header("Key"), Some("wex-key"));
        assert_eq!(
            signed.header("Sign"),
            Some("5721fd90cff523ad7f05fcd54ce96f4e44c918d4726ea25095db6b4bbeedc3d7a2723092346a0ba889e4eb2269ffd391fc6e60bf226666efc02099323a394cc6")
        );
    }

    #[test]
    fn test_timestamped_header_signature_golden() {
        let credentials = Credentials::new("cb-key", "Y2Itc2VjcmV0").with_passphrase("cb-pass");
        let signer =
            ConcatHmacSigner::new(&credentials, ConcatScheme::timestamped_headers("CB-ACCESS"))
                .unwrap();
        let request = CanonicalRequest::new(
            Method::POST,
            "/orders",
            vec![text_param("size", "0.01")],
            1_500_000_000,
        );

        let signed = signer.sign(request).unwrap();
        assert_eq!(signed.body.as_deref(), Some(r#"{"size":"0.01"}"#));
        assert_eq!(
            signed.header("CB-ACCESS-SIGN"),
            Some("yOWFOlolJFcHwTBbyXoQ7UgBl0gMMOHklQjytMFCcvA=")
        );
        assert_eq!(signed.header("CB-ACCESS-TIMESTAMP"), Some("1500000000"));
        assert_eq!(signed.header("CB-ACCESS-PASSPHRASE"), Some("cb-pass"));
        assert_eq!(signed.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_bitfinex_payload_signature_golden() {
        let credentials = Credentials::new("bfx-key", "bfx-secret");
        let signer = PayloadHmacSigner::new(&credentials, PayloadScheme::bitfinex()).unwrap();
        let request = CanonicalRequest::new(
            Method::POST,
            "/v1/order/new",
            vec![
                text_param("symbol", "btcusd"),
                text_param("amount", "0.5"),
                text_param("price", "250"),
                text_param("exchange", "bitfinex"),
                text_param("side", "buy"),
                text_param("type", "exchange limit"),
            ],
            1_500_000_000_000,
        );

        let signed = signer.sign(request).unwrap();
        assert_eq!(
            signed.header("X-BFX-PAYLOAD"),
            Some("eyJyZXF1ZXN0IjoiL3YxL29yZGVyL25ldyIsIm5vbmNlIjoiMTUwMDAwMDAwMDAwMCIsInN5bWJvbCI6ImJ0Y3VzZCIsImFtb3VudCI6IjAuNSIsInByaWNlIjoiMjUwIiwiZXhjaGFuZ2UiOiJiaXRmaW5leCIsInNpZGUiOiJidXkiLCJ0eXBlIjoiZXhjaGFuZ2UgbGltaXQifQ==")
        );
        assert_eq!(
            signed.header("X-BFX-SIGNATURE"),
            Some("9319d675a57517864bbbf4a4c9b52ff686e79458817c18a9aa5f57450dc9cf000d8e920e3704da08db46d0a3dde07396")
        );
        assert_eq!(signed.header("X-BFX-APIKEY"), Some("bfx-key"));
        assert!(signed.body.unwrap().starts_with(r#"{"request":"/v1/order/new","nonce":"#));
    }

    #[test]
    fn test_gemini_payload_leaves_body_empty() {
        let credentials = Credentials::new("g-key", "g-secret");
        let signer = PayloadHmacSigner::new(&credentials, PayloadScheme::gemini()).unwrap();
        let signed = signer
            .sign(CanonicalRequest::new(Method::POST, "/v1/balances", Vec::new(), 7))
            .unwrap();

        assert!(signed.body.is_none());
        assert!(signed.header("X-GEMINI-SIGNATURE").is_some());
    }

    #[test]
    fn test_okcoin_digest_golden() {
        let credentials = Credentials::new("ok-key", "ok-secret");
        let signer = SortedDigestSigner::new(&credentials, DigestScheme::okcoin());
        let request = CanonicalRequest::new(
            Method::POST,
            "/api/v1/trade.do",
            vec![
                text_param("symbol", "btc_usd"),
                text_param("type", "buy"),
                text_param("price", "250"),
                text_param("amount", "0.5"),
            ],
            99,
        );

        let signed = signer.sign(request).unwrap();
        let body = signed.body.unwrap();
        assert_eq!(
            body,
            "amount=0.5&api_key=ok-key&price=250&symbol=btc_usd&type=buy&sign=024CD3B86391DACE91C3698EEA5AC78C"
        );
        assert!(!body.contains("ok-secret"));
    }

    #[test]
    fn test_signing_is_deterministic_for_fixed_nonce() {
        let credentials = Credentials::new("bfx-key", "bfx-secret");
        let signer = PayloadHmacSigner::new(&credentials, PayloadScheme::bitfinex()).unwrap();
        let make = || {
            CanonicalRequest::new(
                Method::POST,
                "/v1/orders",
                vec![("limit".to_string(), json!(10))],
                1234,
            )
        };

        assert_eq!(signer.sign(make()).unwrap(), signer.sign(make()).unwrap());
    }

    #[test]
    fn test_missing_client_id_is_rejected_at_construction() {
        let credentials = Credentials::new("k", "s");
        let err = ConcatHmacSigner::new(&credentials, ConcatScheme::bitstamp()).unwrap_err();
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_invalid_base64_secret_is_authentication_error() {
        let credentials = Credentials::new("k", "not base64!!").with_passphrase("p");
        let err = ConcatHmacSigner::new(&credentials, ConcatScheme::timestamped_headers("CB"))
            .unwrap_err();
        assert!(!err.to_string().contains("not base64!!"));
    }

    #[test]
    fn test_debug_output_hides_secrets() {
        let credentials = Credentials::new("visible-key", "hidden-secret");
        let signer = SortedDigestSigner::new(&credentials, DigestScheme::okcoin());
        let debug = format!("{:?} {:?}", credentials, signer);
        assert!(!debug.contains("hidden-secret"));
        assert!(!debug.contains("visible-key"));
    }

    #[test]
    fn test_form_value_lookup() {
        assert_eq!(form_value("a=1&nonce=77&b=2", "nonce"), Some("77"));
        assert_eq!(form_value("a=1", "nonce"), None);
    }
}
