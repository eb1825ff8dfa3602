//! Integration tests for the HTTP transport
//!
//! A one-shot HTTP/1.1 server on a loopback port stands in for the
//! generative-language API: it captures the raw request and answers with a
//! canned status and body.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use trial_compliance::analysis::{
    AnalyzerConfig, DocumentAnalysis, DocumentAnalyzer, DocumentInput, HttpBackend,
};
use trial_compliance::Error;

const ANALYSIS: &str = r#"{"hasTRN":true,"trn":"NCT01234567","enrollmentMentioned":true,
    "registrationMentioned":true,"extractedDates":["2017-03-01"],"analysis":"Registered late."}"#;

/// Captured request: lower-cased head plus the decoded JSON body
struct Captured {
    head: String,
    body: Value,
}

/// Serve exactly one request and return its capture when joined
async fn serve_once(status: &'static str, body: String) -> (String, JoinHandle<Captured>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());

    let handle = tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let captured = read_request(&mut socket).await;

        let response = format!(
            "HTTP/1.1 {status}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
            body.len()
        );
        socket.write_all(response.as_bytes()).await.unwrap();
        socket.shutdown().await.unwrap();
        captured
    });

    (base_url, handle)
}

async fn read_request(socket: &mut TcpStream) -> Captured {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];
    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        assert!(n > 0, "client closed before sending a full request");
        buf.extend_from_slice(&chunk[..n]);

        let Some(end) = buf.windows(4).position(|w| w == b"\r\n\r\n") else {
            continue;
        };
        let head = String::from_utf8_lossy(&buf[..end]).to_lowercase();
        let length: usize = head
            .lines()
            .find_map(|line| line.strip_prefix("content-length:"))
            .map_or(0, |value| value.trim().parse().unwrap());

        if buf.len() >= end + 4 + length {
            let body = serde_json::from_slice(&buf[end + 4..end + 4 + length]).unwrap();
            return Captured { head, body };
        }
    }
}

fn envelope(text: &str) -> String {
    json!({
        "candidates": [{ "content": { "role": "model", "parts": [{ "text": text }] } }]
    })
    .to_string()
}

#[tokio::test]
async fn test_pdf_posted_and_answer_decoded() {
    let (base_url, server) = serve_once("200 OK", envelope(ANALYSIS)).await;
    let config = AnalyzerConfig::new("stub-key")
        .with_model("test-model")
        .with_endpoint(base_url);
    let analyzer = DocumentAnalyzer::new(config, HttpBackend::new());

    let pdf = b"%PDF-1.7 minimal".to_vec();
    let result = analyzer.try_analyze(DocumentInput::pdf(pdf.clone())).await.unwrap();
    assert!(result.has_trn);
    assert_eq!(result.trn.as_deref(), Some("NCT01234567"));
    assert_eq!(result.extracted_dates, vec!["2017-03-01"]);

    let captured = server.await.unwrap();
    assert!(captured
        .head
        .starts_with("post /models/test-model:generatecontent http/1.1"));
    assert!(captured.head.contains("x-goog-api-key: stub-key"));
    assert!(!captured.head.contains("key="));

    let parts = captured.body["contents"][0]["parts"].as_array().unwrap();
    assert_eq!(parts[1]["inlineData"]["mimeType"], "application/pdf");
    assert_eq!(parts[1]["inlineData"]["data"], STANDARD.encode(&pdf));
    assert_eq!(
        captured.body["generationConfig"]["responseMimeType"],
        "application/json"
    );
}

#[tokio::test]
async fn test_server_error_yields_fallback() {
    let body = r#"{"error":{"code":500,"message":"internal"}}"#.to_string();
    let (base_url, server) = serve_once("500 Internal Server Error", body).await;
    let analyzer = DocumentAnalyzer::new(
        AnalyzerConfig::new("stub-key").with_endpoint(base_url),
        HttpBackend::new(),
    );

    let (result, error) = analyzer
        .analyze_reported(DocumentInput::text("Some abstract"))
        .await;
    assert_eq!(result, DocumentAnalysis::fallback());
    match error {
        Some(Error::Backend(message)) => assert!(message.contains("500")),
        other => panic!("expected backend error, got {other:?}"),
    }

    let captured = server.await.unwrap();
    assert_eq!(
        captured.body["contents"][0]["parts"][1]["text"],
        "Text Content:\n\"Some abstract\""
    );
}

#[tokio::test]
async fn test_answer_without_candidates_is_empty_response() {
    let (base_url, server) = serve_once("200 OK", r#"{"candidates":[]}"#.to_string()).await;
    let analyzer = DocumentAnalyzer::new(
        AnalyzerConfig::new("stub-key").with_endpoint(base_url),
        HttpBackend::new(),
    );

    let err = analyzer
        .try_analyze(DocumentInput::text("abstract"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyResponse));
    server.await.unwrap();
}

#[tokio::test]
async fn test_unreachable_endpoint_yields_fallback() {
    // bind then drop, so nothing listens on the port
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let base_url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let analyzer = DocumentAnalyzer::new(
        AnalyzerConfig::new("stub-key").with_endpoint(base_url),
        HttpBackend::new(),
    );
    let (result, error) = analyzer.analyze_reported(DocumentInput::text("abstract")).await;
    assert_eq!(result, DocumentAnalysis::fallback());
    assert!(matches!(error, Some(Error::Backend(_))));
}
