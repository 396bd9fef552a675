//! Contract Test: Response classification
//!
//! Constraints verified:
//! - Every (status, body) pair gets exactly one verdict
//! - Rules are tried in order and the first match wins
//! - Unmatched 2xx responses are unknown, never success
//! - Echoed addresses must match the one sent

mod common;

use common::*;
use ddns_core::classify::{Verdict, classify};
use ddns_core::{Error, ErrorKind, Settings, UpdateOutcome};
use tokio_util::sync::CancellationToken;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

#[test]
fn classification_is_total() {
    let statuses = [100, 200, 201, 204, 301, 400, 401, 403, 404, 429, 500, 503];
    let bodies = ["", "good", "nochg", "badauth", "GOOD 1.2.3.4", "???", "\n"];
    for status in statuses {
        for body in bodies {
            let verdict = classify(ECHO_RULES, status, body);
            if status != 200 {
                assert_eq!(verdict, Verdict::BadStatus, "{status} {body:?}");
            }
        }
    }
}

#[test]
fn unmatched_success_is_unknown() {
    assert_eq!(classify(ECHO_RULES, 200, "maintenance"), Verdict::Unknown);
    assert_eq!(classify(ECHO_RULES, 200, ""), Verdict::Unknown);
}

async fn update_with_body(body: &str) -> ddns_core::Result<UpdateOutcome> {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    EchoSettings::new("example.com", "home")
        .update(&CancellationToken::new(), &transport_for(&server), ipv4("1.2.3.4"))
        .await
}

#[tokio::test]
async fn unchanged_is_success() {
    let outcome = update_with_body("nochg 1.2.3.4").await.unwrap();
    assert!(outcome.is_unchanged());
    assert_eq!(outcome.ip(), ipv4("1.2.3.4"));
}

#[tokio::test]
async fn auth_failure_is_classified() {
    let err = update_with_body("badauth\n").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn unknown_body_is_reported_lowercase() {
    let err = update_with_body("Service Moved").await.unwrap_err();
    match err {
        Error::UnknownResponse { body, .. } => assert_eq!(body, "service moved"),
        other => panic!("expected UnknownResponse, got {other:?}"),
    }
}

#[tokio::test]
async fn mismatched_echo_is_rejected() {
    let err = update_with_body("good 5.6.7.8").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Rejected);
}
