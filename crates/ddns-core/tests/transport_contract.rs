//! Contract Test: HTTP transport
//!
//! Constraints verified:
//! - Every request carries the client signature
//! - Cancellation aborts an in-flight request with a distinct kind
//! - Error bodies are reduced to a single line
//! - A base URL override keeps path and query

mod common;

use common::*;
use ddns_core::{Error, ErrorKind, Settings, USER_AGENT, UpdateOutcome};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn requests_carry_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nic/update"))
        .and(header("user-agent", USER_AGENT))
        .and(query_param("hostname", "home.example.com"))
        .and(query_param("myip", "1.2.3.4"))
        .respond_with(ResponseTemplate::new(200).set_body_string("good 1.2.3.4"))
        .expect(1)
        .mount(&server)
        .await;

    let settings = EchoSettings::new("example.com", "home");
    let outcome = settings
        .update(&CancellationToken::new(), &transport_for(&server), ipv4("1.2.3.4"))
        .await
        .expect("update succeeds");

    assert_eq!(outcome, UpdateOutcome::Updated { ip: ipv4("1.2.3.4") });
}

#[tokio::test]
async fn cancellation_aborts_in_flight_request() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("good").set_delay(Duration::from_secs(30)))
        .mount(&server)
        .await;

    let settings = EchoSettings::new("example.com", "@");
    let transport = transport_for(&server);
    let cancel = CancellationToken::new();

    let canceller = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            cancel.cancel();
        })
    };

    let result = tokio::time::timeout(
        Duration::from_secs(5),
        settings.update(&cancel, &transport, ipv4("1.2.3.4")),
    )
    .await
    .expect("update returns promptly after cancellation");
    canceller.await.unwrap();

    let err = result.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn cancelled_before_start_sends_nothing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("good"))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    cancel.cancel();

    let settings = EchoSettings::new("example.com", "@");
    let err = settings
        .update(&cancel, &transport_for(&server), ipv4("1.2.3.4"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Cancelled);
}

#[tokio::test]
async fn bad_status_body_is_single_line() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502).set_body_string("Bad Gateway\n<html>\r\nupstream</html>\n"))
        .mount(&server)
        .await;

    let settings = EchoSettings::new("example.com", "@");
    let err = settings
        .update(&CancellationToken::new(), &transport_for(&server), ipv4("1.2.3.4"))
        .await
        .unwrap_err();

    match err {
        Error::BadHttpStatus { status, body, .. } => {
            assert_eq!(status, 502);
            assert!(!body.contains('\n') && !body.contains('\r'));
            assert!(body.starts_with("Bad Gateway"));
        }
        other => panic!("expected BadHttpStatus, got {other:?}"),
    }
}

#[tokio::test]
async fn unreachable_server_is_transport_error() {
    let server = MockServer::start().await;
    let transport = transport_for(&server);
    drop(server);

    let settings = EchoSettings::new("example.com", "@");
    let err = settings
        .update(&CancellationToken::new(), &transport, ipv4("1.2.3.4"))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Transport);
    assert!(err.is_retryable());
}
