//! Vision client tests against a local chat-completions stand-in
//!
//! Each test binds an axum server on 127.0.0.1:0 that answers
//! `/v1/chat/completions` with a canned status and body and records what
//! the client sent.

use axum::{http::HeaderMap, http::StatusCode, routing::post, Json, Router};
use serde_json::{json, Value};
use std::sync::{Arc, Mutex};
use vetwatch_ai::config::VisionSettings;
use vetwatch_ai::types::Severity;
use vetwatch_ai::vision::{
    AnalysisService, AnimalType, ChatCompletionsClient, FfmpegFrameExtractor, MediaFile, MediaKind,
    ParseFailure, VisionBackend, VisionError,
};

const API_KEY: &str = "sk-test-vetwatch";

const PNG_HEADER: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D];

#[derive(Debug, Clone)]
struct CapturedRequest {
    authorization: Option<String>,
    body: Value,
}

type Captured = Arc<Mutex<Vec<CapturedRequest>>>;

/// Start a fake endpoint returning `status` and `body`, return its base URL
async fn spawn_fake_api(status: StatusCode, body: String) -> (String, Captured) {
    let captured: Captured = Arc::new(Mutex::new(Vec::new()));
    let sink = captured.clone();

    let app = Router::new().route(
        "/v1/chat/completions",
        post(move |headers: HeaderMap, Json(request): Json<Value>| {
            let sink = sink.clone();
            let body = body.clone();
            async move {
                sink.lock().unwrap().push(CapturedRequest {
                    authorization: headers
                        .get("authorization")
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string),
                    body: request,
                });
                (status, body)
            }
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{}/v1", addr), captured)
}

fn completion(content: &str) -> String {
    json!({ "choices": [{ "message": { "role": "assistant", "content": content } }] }).to_string()
}

fn client_for(base_url: &str) -> ChatCompletionsClient {
    let settings = VisionSettings::default()
        .with_api_key(API_KEY)
        .with_api_url(base_url);
    ChatCompletionsClient::new(settings).unwrap()
}

fn service_for(base_url: &str) -> AnalysisService {
    AnalysisService::new(
        Arc::new(client_for(base_url)),
        Arc::new(FfmpegFrameExtractor::new()),
    )
}

fn png_upload() -> MediaFile {
    MediaFile::new("establo.png", Some("image/png".to_string()), PNG_HEADER.to_vec())
}

#[tokio::test]
async fn test_successful_completion_returns_first_choice() {
    let (url, captured) = spawn_fake_api(StatusCode::OK, completion("Sin hallazgos")).await;
    let client = client_for(&url);

    let text = client
        .complete(MediaKind::Image, "data:image/png;base64,AAAA")
        .await
        .unwrap();
    assert_eq!(text, "Sin hallazgos");

    let requests = captured.lock().unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].authorization.as_deref(), Some("Bearer sk-test-vetwatch"));
    assert_eq!(requests[0].body["max_tokens"], 1000);
    assert_eq!(
        requests[0].body["messages"][1]["content"][1]["image_url"]["url"],
        "data:image/png;base64,AAAA"
    );
}

#[tokio::test]
async fn test_out_of_range_response_is_clamped_end_to_end() {
    let model_text = concat!(
        "Here is my assessment:\n",
        r#"{"symptoms":[{"name":"Cojera","confidence":1.5,"severity":"extreme"}],"confidence":-0.2,"animalType":"perro"}"#,
        "\nConsult a veterinarian."
    );
    let (url, captured) = spawn_fake_api(StatusCode::OK, completion(model_text)).await;

    let result = service_for(&url).analyze(&png_upload()).await.unwrap();

    assert_eq!(result.file_name, "establo.png");
    assert_eq!(result.file_type, MediaKind::Image);
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.animal_type, AnimalType::Desconocido);
    assert!(result.parse_failure.is_none());
    assert!(!result.alert_generated);

    assert_eq!(result.symptoms.len(), 1);
    let symptom = &result.symptoms[0];
    assert_eq!(symptom.name, "Cojera");
    assert_eq!(symptom.confidence, 1.0);
    assert_eq!(symptom.severity, Severity::Medium);

    let requests = captured.lock().unwrap();
    let image_url = requests[0].body["messages"][1]["content"][1]["image_url"]["url"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(image_url.starts_with("data:image/png;base64,"));
}

#[tokio::test]
async fn test_error_status_surfaces_api_message() {
    let body = json!({ "error": { "message": "Incorrect API key provided", "type": "invalid_request_error" } });
    let (url, _) = spawn_fake_api(StatusCode::UNAUTHORIZED, body.to_string()).await;

    let err = client_for(&url)
        .complete(MediaKind::Image, "data:image/png;base64,AAAA")
        .await
        .unwrap_err();

    match err {
        VisionError::Api { status, message } => {
            assert_eq!(status, 401);
            assert_eq!(message, "Incorrect API key provided");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_error_without_envelope_uses_generic_message() {
    let (url, _) = spawn_fake_api(StatusCode::BAD_GATEWAY, "upstream unavailable".to_string()).await;

    let err = service_for(&url).analyze(&png_upload()).await.unwrap_err();

    match err {
        VisionError::Api { status, message } => {
            assert_eq!(status, 502);
            assert_eq!(message, "Unknown error");
        }
        other => panic!("expected Api error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_prose_only_response_falls_back() {
    let (url, _) = spawn_fake_api(
        StatusCode::OK,
        completion("I'm sorry, I can't identify any animal in this image."),
    )
    .await;

    let result = service_for(&url).analyze(&png_upload()).await.unwrap();

    assert!(result.symptoms.is_empty());
    assert_eq!(result.confidence, 0.0);
    assert_eq!(result.animal_type, AnimalType::Desconocido);
    assert!(!result.alert_generated);
    assert_eq!(result.parse_failure, Some(ParseFailure::NoJsonObject));
}

#[tokio::test]
async fn test_empty_choices_is_invalid_response() {
    let (url, _) = spawn_fake_api(StatusCode::OK, json!({ "choices": [] }).to_string()).await;

    let err = client_for(&url)
        .complete(MediaKind::Image, "data:image/png;base64,AAAA")
        .await
        .unwrap_err();
    assert!(matches!(err, VisionError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_camera_capture_is_relabelled() {
    let model_text = r#"{"symptoms":[{"name":"Secreción nasal","confidence":0.9,"severity":"high","associatedDiseases":["Influenza equina"]}],"confidence":0.85,"animalType":"caballo"}"#;
    let (url, _) = spawn_fake_api(StatusCode::OK, completion(model_text)).await;

    let capture = MediaFile::new("frame.jpg", Some("image/jpeg".to_string()), vec![0xFF, 0xD8, 0xFF, 0xE0]);
    let result = service_for(&url).analyze_camera_capture(&capture).await.unwrap();

    assert_eq!(result.file_type, MediaKind::Camera);
    assert_eq!(result.file_name, "Real-time analysis");
    assert_eq!(result.animal_type, AnimalType::Caballo);
    assert!(result.alert_generated);
    assert_eq!(result.alerting_symptoms().count(), 1);
}

#[tokio::test]
async fn test_unconfigured_client_never_calls_endpoint() {
    let (url, captured) = spawn_fake_api(StatusCode::OK, completion("{}")).await;
    let settings = VisionSettings::default().with_api_url(url);
    let service = AnalysisService::new(
        Arc::new(ChatCompletionsClient::new(settings).unwrap()),
        Arc::new(FfmpegFrameExtractor::new()),
    );

    assert!(!service.is_configured());
    let err = service.analyze(&png_upload()).await.unwrap_err();
    assert!(matches!(err, VisionError::Config(_)));
    assert!(captured.lock().unwrap().is_empty());
}
