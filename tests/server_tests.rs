//! HTTP Boundary Tests
//!
//! Router-level behavior via `tower::ServiceExt::oneshot`: health output,
//! malformed-request rejection, the always-respond contract for
//! unconfigured engines, and one full request through a mocked Azure
//! backend.

mod fixtures;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;
use wiremock::matchers::method;
use wiremock::{Mock, MockServer, ResponseTemplate};

use scribe_gateway::{AppState, ServerConfig, routes};

const BOUNDARY: &str = "scribe-test-boundary";

/// Build a multipart/form-data body from text fields plus an optional file.
fn multipart_body(
    text_fields: &[(&str, &str)],
    file: Option<(&str, &str, &[u8])>,
) -> Vec<u8> {
    let mut body = Vec::new();

    for (name, value) in text_fields {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!("Content-Disposition: form-data; name=\"{name}\"\r\n\r\n").as_bytes(),
        );
        body.extend_from_slice(value.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    if let Some((filename, content_type, bytes)) = file {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn transcribe_request(body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/v1/transcribe")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn test_app(config: ServerConfig) -> Router {
    let state = AppState::new(config).unwrap();
    routes::api::create_api_router().with_state(state)
}

fn bare_config(dir: &tempfile::TempDir) -> ServerConfig {
    ServerConfig {
        scratch_dir: dir.path().join("scratch"),
        ..Default::default()
    }
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn sample_wav_bytes() -> Vec<u8> {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.wav");
    fixtures::write_wav(
        &path,
        &fixtures::sine_wave(16_000, 440.0, 8_000, 0.4),
        8_000,
    );
    std::fs::read(&path).unwrap()
}

#[tokio::test]
async fn test_health_reports_service_and_engines() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(bare_config(&dir));

    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "scribe-gateway");
    // No credentials configured, so no engines are available.
    assert_eq!(json["engines"], serde_json::json!([]));
}

#[tokio::test]
async fn test_missing_source_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(bare_config(&dir));

    let body = multipart_body(&[("provider", "web")], None);
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("no audio source"));
}

#[tokio::test]
async fn test_unknown_engine_name_is_a_bad_request() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(bare_config(&dir));

    let body = multipart_body(
        &[("engine", "parakeet")],
        Some(("clip.wav", "audio/wav", &sample_wav_bytes())),
    );
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert!(json["error"].as_str().unwrap().contains("Unsupported STT engine"));
}

#[tokio::test]
async fn test_unconfigured_engine_returns_failure_envelope_not_an_error_status() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(bare_config(&dir));

    let body = multipart_body(
        &[("engine", "azure"), ("detail", "full"), ("lang", "es")],
        Some(("clip.wav", "audio/wav", &sample_wav_bytes())),
    );
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    // Always respond: a configured-out engine is a failure envelope.
    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "");
    assert_eq!(json["confidence"], 0.0);
    assert!(
        json["raw"]["error"]
            .as_str()
            .unwrap()
            .contains("not configured")
    );
}

#[tokio::test]
async fn test_compact_detail_drops_raw() {
    let dir = tempfile::tempdir().unwrap();
    let app = test_app(bare_config(&dir));

    let body = multipart_body(
        &[("engine", "azure")],
        Some(("clip.wav", "audio/wav", &sample_wav_bytes())),
    );
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "");
    assert!(json.get("raw").is_none());
}

#[tokio::test]
async fn test_full_request_through_mocked_azure_backend() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "RecognitionStatus": "Success",
            "DisplayText": "Hola desde el gateway.",
            "NBest": [{"Confidence": 0.88, "Display": "Hola desde el gateway."}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        scratch_dir: dir.path().join("scratch"),
        azure_speech_key: Some("test-subscription-key".to_string()),
        azure_speech_region: Some("eastus".to_string()),
        azure_speech_endpoint: Some(server.uri()),
        ..Default::default()
    };
    let app = test_app(config);

    let body = multipart_body(
        &[
            ("engine", "azure"),
            ("provider", "web"),
            ("lang", "es"),
            ("detail", "full"),
        ],
        Some(("clip.wav", "audio/wav", &sample_wav_bytes())),
    );
    let response = app.oneshot(transcribe_request(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "Hola desde el gateway.");
    assert!((json["confidence"].as_f64().unwrap() - 0.88).abs() < 1e-3);
    assert_eq!(json["language"], "es-MX");
    assert_eq!(json["provider"], "web");
    assert_eq!(json["original_format"], "audio/wav");
    assert!(json["raw"]["response"]["RecognitionStatus"] == "Success");
}
