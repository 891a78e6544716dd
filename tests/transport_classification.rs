mod common;

use common::init_tracing;
use exgate::core::kernel::{
    FailureClass, FailurePolicy, HttpRequest, NonceGenerator, NonceResolution, ReqwestTransport,
    Transport, TransportConfig, TransportOutcome,
};
use proptest::prelude::*;
use reqwest::Method;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ALLOWED_STATUS: [u16; 3] = [502, 503, 504];
const ALLOWED_FRAGMENT: &str = "temporarily unavailable";

fn policy() -> FailurePolicy {
    FailurePolicy::new()
        .with_non_fatal_status_codes(ALLOWED_STATUS)
        .with_non_fatal_messages([ALLOWED_FRAGMENT])
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(200))]

    #[test]
    fn prop_classification_follows_allow_lists(
        status in 400u16..600,
        message in "[a-z ]{0,40}",
        mention_fragment in any::<bool>(),
    ) {
        let message = if mention_fragment {
            format!("{} {}", message, ALLOWED_FRAGMENT)
        } else {
            message
        };
        let expected = if status == 404
            || ALLOWED_STATUS.contains(&status)
            || message.contains(ALLOWED_FRAGMENT)
        {
            FailureClass::Network
        } else {
            FailureClass::Protocol
        };
        prop_assert_eq!(policy().classify(Some(status), &message), expected);
    }

    #[test]
    fn prop_status_outcome_keeps_status_code(status in 400u16..600, body in "[a-z]{0,20}") {
        let outcome = policy().classify_status(status, "Reason", &body);
        let failure = match outcome {
            TransportOutcome::NetworkFailure(f) | TransportOutcome::ProtocolFailure(f) => f,
            TransportOutcome::Success { .. } => unreachable!("error status classified as success"),
        };
        prop_assert_eq!(failure.status, Some(status));
    }

    #[test]
    fn prop_nonces_strictly_increase(seed in 0u64..(u64::MAX / 2), calls in 1usize..50) {
        let mut nonce = NonceGenerator::starting_at(seed, NonceResolution::Millis);
        let mut last = nonce.last();
        for _ in 0..calls {
            let next = nonce.next().unwrap();
            prop_assert!(next > last);
            last = next;
        }
    }
}

fn transport(timeout: Duration) -> ReqwestTransport {
    ReqwestTransport::new(TransportConfig::new(timeout).with_policy(policy())).unwrap()
}

#[tokio::test]
async fn test_success_releases_connection() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ok"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{}"))
        .mount(&server)
        .await;

    let transport = transport(Duration::from_secs(5));
    let outcome = transport
        .send(HttpRequest::new(Method::GET, format!("{}/ok", server.uri())))
        .await;

    assert!(matches!(outcome, TransportOutcome::Success { status: 200, .. }));
    let stats = transport.stats();
    assert_eq!(stats.opened(), 1);
    assert_eq!(stats.released(), 1);
}

#[tokio::test]
async fn test_error_status_releases_connection() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/busy"))
        .respond_with(ResponseTemplate::new(503).set_body_string("try later"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad amount"))
        .mount(&server)
        .await;

    let transport = transport(Duration::from_secs(5));
    let busy = transport
        .send(HttpRequest::new(Method::POST, format!("{}/busy", server.uri())).body("a=1"))
        .await;
    let bad = transport
        .send(HttpRequest::new(Method::POST, format!("{}/bad", server.uri())).body("a=1"))
        .await;

    assert!(busy.is_network_failure());
    match bad {
        TransportOutcome::ProtocolFailure(failure) => {
            assert_eq!(failure.status, Some(400));
            assert!(failure.message.contains("bad amount"));
        }
        other => panic!("expected protocol failure, got {:?}", other),
    }
    let stats = transport.stats();
    assert_eq!(stats.opened(), 2);
    assert_eq!(stats.released(), 2);
}

#[tokio::test]
async fn test_timeout_releases_connection() {
    init_tracing();
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let transport = transport(Duration::from_millis(200));
    let outcome = transport
        .send(HttpRequest::new(Method::GET, format!("{}/slow", server.uri())))
        .await;

    match outcome {
        TransportOutcome::NetworkFailure(failure) => assert_eq!(failure.status, None),
        other => panic!("expected network failure, got {:?}", other),
    }
    assert_eq!(transport.stats().in_flight(), 0);
    assert_eq!(transport.stats().released(), 1);
}

#[tokio::test]
async fn test_refused_connection_is_network_failure() {
    init_tracing();
    let transport = transport(Duration::from_secs(2));
    let outcome = transport
        .send(HttpRequest::new(Method::GET, "http://127.0.0.1:1/unreachable"))
        .await;

    assert!(outcome.is_network_failure());
    assert_eq!(transport.stats().in_flight(), 0);
}
