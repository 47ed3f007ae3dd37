//! Integration tests for the safe request wrapper

#[path = "common/mod.rs"]
mod common;

use common::*;
use entsoe_cli::client::Client;
use entsoe_cli::config::ResolvedConfig;
use entsoe_cli::errors::AppError;
use std::time::{Duration, Instant};
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_client(server: &MockServer, max_attempts: u32) -> Client {
    let config = ResolvedConfig {
        base_url: server.uri(),
        max_attempts,
        retry_initial_delay_ms: 1,
        retry_max_delay_ms: 5,
        ..ResolvedConfig::default()
    };
    Client::new(&config).unwrap()
}

fn api_url(server: &MockServer) -> Url {
    Url::parse(&format!(
        "{}/api?documentType=A65&securityToken=test-token",
        server.uri()
    ))
    .unwrap()
}

#[tokio::test]
async fn test_market_document_is_returned_as_is() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(LOAD_DOCUMENT, "text/xml"),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = fast_client(&server, 3).send(&api_url(&server)).await.unwrap();
    assert_eq!(response.status, 200);
    assert_eq!(response.content_type.as_deref(), Some("text/xml"));
    assert_eq!(response.body, LOAD_DOCUMENT.as_bytes());
}

#[tokio::test]
async fn test_server_errors_are_retried_until_exhausted() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .expect(3)
        .mount(&server)
        .await;

    let err = fast_client(&server, 3)
        .send(&api_url(&server))
        .await
        .unwrap_err();
    match err {
        AppError::ServiceUnavailableError { status, attempts } => {
            assert_eq!(status, 503);
            assert_eq!(attempts, 3);
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_recovers_after_transient_server_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(LOAD_DOCUMENT))
        .expect(1)
        .mount(&server)
        .await;

    let response = fast_client(&server, 3).send(&api_url(&server)).await.unwrap();
    assert_eq!(response.status, 200);
}

#[tokio::test]
async fn test_client_errors_are_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("Invalid parameter: in_Domain"))
        .expect(1)
        .mount(&server)
        .await;

    let err = fast_client(&server, 3)
        .send(&api_url(&server))
        .await
        .unwrap_err();
    match err {
        AppError::RequestRejectedError { status, body } => {
            assert_eq!(status, 400);
            assert_eq!(body, "Invalid parameter: in_Domain");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn test_acknowledgements_are_classified_and_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_string(NO_DATA_ACK))
        .expect(1)
        .mount(&server)
        .await;

    let err = fast_client(&server, 3)
        .send(&api_url(&server))
        .await
        .unwrap_err();
    assert!(err.is_no_data());

    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(REJECTED_ACK))
        .expect(1)
        .mount(&server)
        .await;

    let err = fast_client(&server, 3)
        .send(&api_url(&server))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        AppError::ProviderError { ref reason, .. } if reason == "The amount of requested data exceeds allowed limit."
    ));
}

#[tokio::test]
async fn test_unreachable_host_is_retried_then_transport_error() {
    // Bind and drop a listener so its port is closed
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = Url::parse(&format!(
        "http://127.0.0.1:{port}/api?documentType=A65&securityToken=test-token"
    ))
    .unwrap();
    let config = ResolvedConfig {
        max_attempts: 3,
        retry_initial_delay_ms: 40,
        retry_max_delay_ms: 1000,
        ..ResolvedConfig::default()
    };
    let client = Client::new(&config).unwrap();

    let started = Instant::now();
    let err = client.send(&url).await.unwrap_err();
    let elapsed = started.elapsed();

    assert!(matches!(err, AppError::TransportError(ref msg) if !msg.contains("test-token")));
    // Two backoff sleeps between three attempts: 40 ms then 80 ms
    assert!(
        elapsed >= Duration::from_millis(120),
        "finished after {elapsed:?}, expected the retry backoff to elapse"
    );
}

#[tokio::test]
async fn test_single_attempt_does_not_wait() {
    let port = std::net::TcpListener::bind("127.0.0.1:0")
        .unwrap()
        .local_addr()
        .unwrap()
        .port();
    let url = Url::parse(&format!("http://127.0.0.1:{port}/api?documentType=A65")).unwrap();
    let config = ResolvedConfig {
        max_attempts: 1,
        retry_initial_delay_ms: 5000,
        ..ResolvedConfig::default()
    };

    let started = Instant::now();
    let err = Client::new(&config).unwrap().send(&url).await.unwrap_err();
    assert!(matches!(err, AppError::TransportError(_)));
    assert!(started.elapsed() < Duration::from_millis(5000));
}

#[tokio::test]
async fn test_zip_bodies_pass_through() {
    let server = MockServer::start().await;
    let archive = zip_bytes(&[("outage.xml", LOAD_DOCUMENT)]);
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(archive.clone()))
        .mount(&server)
        .await;

    let response = fast_client(&server, 1).send(&api_url(&server)).await.unwrap();
    assert!(response.is_zip());
    assert_eq!(response.body, archive);
}
