/// Exgate kernel - the authenticated request pipeline shared by every exchange
///
/// The kernel holds everything that does not depend on a particular exchange. Adapters only
/// choose a signing scheme, an envelope shape per endpoint, and map payloads to domain types.
///
/// # Components
///
/// - `Transport`: one HTTP request per call, outcome classified as success, network failure
///   or protocol failure. `ReqwestTransport` is the production implementation.
/// - `NonceGenerator`: strictly increasing per-adapter counter seeded from the clock.
/// - `Signer`: pluggable authentication. `ConcatHmacSigner`, `PayloadHmacSigner` and
///   `SortedDigestSigner` cover the schemes the bundled exchanges use.
/// - `decode`: unwraps bare, flagged and error-in-200 envelopes into a `DecodedResult`.
/// - `RestPipeline`: composes the above as build, sign, send, decode.
///
/// # Example
///
/// ```rust,no_run
/// use exgate::core::kernel::*;
/// use reqwest::Method;
///
/// # async fn example() -> Result<(), exgate::ExchangeError> {
/// let credentials = Credentials::new("api-key", "secret").with_client_id("123456");
/// let signer = ConcatHmacSigner::new(&credentials, ConcatScheme::bitstamp())?;
///
/// let mut pipeline = RestPipelineBuilder::new(PipelineConfig::new(
///     "https://www.bitstamp.net",
///     "bitstamp",
/// ))
/// .with_signer(Box::new(signer))
/// .build()?;
///
/// let balances = pipeline
///     .private(
///         Method::POST,
///         "/api/v2/balance/",
///         Vec::new(),
///         &EnvelopeSpec::bare(PayloadKind::Object),
///     )
///     .await?;
/// # let _ = balances;
/// # Ok(())
/// # }
/// ```
pub mod envelope;
pub mod nonce;
pub mod pipeline;
pub mod request;
pub mod signer;
pub mod transport;

pub use envelope::{
    decode, extract_order_id, from_payload, lenient_decimal, DecodedResult, EnvelopeShape,
    EnvelopeSpec, PayloadKind,
};
pub use nonce::{NonceGenerator, NonceResolution};
pub use pipeline::{cancel_answer, PipelineConfig, RestPipeline, RestPipelineBuilder};
pub use request::{CanonicalRequest, ParamEncoding, Params, SignedRequest};
pub use signer::{
    AuthPlacement, ConcatHmacSigner, ConcatScheme, Credentials, DigestScheme, HmacAlgorithm,
    MessagePart, PayloadHmacSigner, PayloadScheme, SecretEncoding, SecretSuffix,
    SignatureEncoding, Signer, SortedDigestSigner,
};
pub use transport::{
    ConnectionStats, FailureClass, FailurePolicy, HttpRequest, ReqwestTransport, Transport,
    TransportConfig, TransportFailure, TransportOutcome,
};
