//! HttpFetcher against a throwaway loopback responder.

use std::sync::Arc;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::time::Duration;

use pulsegraph::clock::SystemClock;
use pulsegraph::config::DashboardConfig;
use pulsegraph::fetch::{FetchError, HttpFetcher, JsonFetcher};
use pulsegraph::session::{PollOutcome, Session};

/// Answers exactly one request with `status` and `body`; returns its URL.
async fn serve_once(status: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut sock, _) = listener.accept().await.unwrap();
        let mut buf = vec![0u8; 8192];
        let mut read = 0;
        loop {
            let n = sock.read(&mut buf[read..]).await.unwrap();
            if n == 0 {
                break;
            }
            read += n;
            if buf[..read].windows(4).any(|w| w == b"\r\n\r\n") {
                break;
            }
        }
        let resp = format!(
            "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
            status,
            body.len(),
            body
        );
        sock.write_all(resp.as_bytes()).await.unwrap();
        let _ = sock.shutdown().await;
    });
    format!("http://{}/data.json", addr)
}

fn fetcher() -> HttpFetcher {
    let client = reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap();
    HttpFetcher::from_client(client)
}

#[tokio::test]
async fn ok_response_decodes_json() {
    let url = serve_once("200 OK", r#"{"a":{"b":5}}"#).await;
    let body = fetcher().fetch(&url).await.unwrap();
    assert_eq!(body["a"]["b"], 5);
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let url = serve_once("503 Service Unavailable", r#"{"error":"down"}"#).await;
    let err = fetcher().fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 503 }));
}

#[tokio::test]
async fn garbage_body_is_decode_error() {
    let url = serve_once("200 OK", "<html>nope</html>").await;
    let err = fetcher().fetch(&url).await.unwrap_err();
    assert!(matches!(err, FetchError::Decode(_)));
}

#[tokio::test]
async fn bitcoin_scenario_end_to_end() {
    let url = serve_once("200 OK", r#"{"bpi":{"USD":{"rate_float":67890.12}}}"#).await;
    let cfg = DashboardConfig {
        url,
        path: "bpi.USD.rate_float".to_string(),
        ..DashboardConfig::default()
    };
    let session = Session::new(&cfg, Arc::new(fetcher()), Arc::new(SystemClock));
    assert_eq!(session.poll_once().await, PollOutcome::Appended { value: 67890.12 });
    assert_eq!(session.aggregate().map(|a| a.last), Some(67890.12));
}

#[tokio::test]
async fn server_error_lands_in_last_error() {
    let url = serve_once("500 Internal Server Error", "{}").await;
    let cfg = DashboardConfig { url, ..DashboardConfig::default() };
    let session = Session::new(&cfg, Arc::new(fetcher()), Arc::new(SystemClock));
    let outcome = session.poll_once().await;
    assert!(matches!(outcome, PollOutcome::Failed { .. }));
    assert_eq!(session.last_error().as_deref(), Some("HTTP error! status: 500"));
    assert!(session.samples().is_empty());
}
