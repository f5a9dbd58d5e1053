//! Integration tests for InferenceClient.
//!
//! Uses wiremock for HTTP mocking. Tests cover the health probe, model
//! listing, generate request shape, and transport/protocol error mapping.

use std::time::Duration;

use judging::{EndpointConfig, GenerateOptions, InferenceBackend, InferenceClient, InferenceError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(mock_server: &MockServer) -> InferenceClient {
    InferenceClient::new(EndpointConfig {
        base_url: mock_server.uri(),
        model: "llama2".to_string(),
        health_timeout: Duration::from_secs(2),
    })
    .expect("failed to create client")
}

fn options() -> GenerateOptions {
    GenerateOptions::new(0.1, Duration::from_secs(5)).with_top_p(0.9)
}

#[tokio::test]
async fn test_health_check_ok() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&mock_server)
        .await;

    assert!(client_for(&mock_server).health_check().await);
}

#[tokio::test]
async fn test_health_check_server_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    assert!(!client_for(&mock_server).health_check().await);
}

#[tokio::test]
async fn test_health_check_unreachable() {
    let client = InferenceClient::new(EndpointConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..EndpointConfig::default()
    })
    .unwrap();
    assert!(!client.health_check().await);
}

#[tokio::test]
async fn test_list_models() {
    let mock_server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [{"name": "llama2:latest"}, {"name": "mistral:7b"}]
        })))
        .mount(&mock_server)
        .await;

    let models = client_for(&mock_server).list_models().await.unwrap();
    assert_eq!(models, ["llama2:latest", "mistral:7b"]);
}

#[tokio::test]
async fn test_generate_success() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({
            "model": "llama2",
            "prompt": "Classify this",
            "stream": false,
            "options": {"temperature": 0.1, "top_p": 0.9}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "llama2",
            "response": "  CLASSIFICATION: YES\n",
            "done": true
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let text = client_for(&mock_server)
        .generate("Classify this", &options())
        .await
        .unwrap();
    assert_eq!(text, "CLASSIFICATION: YES");
}

#[tokio::test]
async fn test_generate_omits_unset_top_p() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .and(body_partial_json(json!({"options": {"temperature": 0.3}})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"response": "ok"})))
        .mount(&mock_server)
        .await;

    let text = client_for(&mock_server)
        .generate("p", &GenerateOptions::new(0.3, Duration::from_secs(5)))
        .await
        .unwrap();
    assert_eq!(text, "ok");

    let requests = mock_server.received_requests().await.unwrap();
    let body: serde_json::Value = serde_json::from_slice(&requests[0].body).unwrap();
    assert!(body["options"].get("top_p").is_none());
}

#[tokio::test]
async fn test_generate_missing_response_field() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"done": true})))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .generate("p", &options())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        InferenceError::Protocol("response field missing".to_string())
    );
}

#[tokio::test]
async fn test_generate_malformed_body_is_protocol_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .generate("p", &options())
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::Protocol(_)));
}

#[tokio::test]
async fn test_generate_server_error_is_protocol_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .generate("p", &options())
        .await
        .unwrap_err();
    match err {
        InferenceError::Protocol(msg) => assert!(msg.contains("500"), "got {msg}"),
        other => panic!("expected protocol error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_generate_connection_refused_is_transport_error() {
    let client = InferenceClient::new(EndpointConfig {
        base_url: "http://127.0.0.1:1".to_string(),
        ..EndpointConfig::default()
    })
    .unwrap();
    let err = client.generate("p", &options()).await.unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}

#[tokio::test]
async fn test_generate_timeout_is_transport_error() {
    let mock_server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/api/generate"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": "late"}))
                .set_delay(Duration::from_secs(2)),
        )
        .mount(&mock_server)
        .await;

    let err = client_for(&mock_server)
        .generate("p", &GenerateOptions::new(0.1, Duration::from_millis(200)))
        .await
        .unwrap_err();
    assert!(err.is_transport(), "got {err:?}");
}
