use std::convert::Infallible;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use bytes::Bytes;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use stt_server::application::ports::{EngineError, EngineOutput, TranscriptionEngine};
use stt_server::application::services::{FileValidator, TranscriptionService};
use stt_server::domain::TranscriptionSegment;
use stt_server::infrastructure::observability::TracingConfig;
use stt_server::infrastructure::storage::LocalStagingStore;
use stt_server::presentation::config::{ServerSettings, Settings, UploadSettings, WhisperSettings};
use stt_server::presentation::{AppState, create_router};

const BOUNDARY: &str = "test-boundary-7f3a9c";

struct MockEngine {
    ready: bool,
    fail: bool,
    called: AtomicBool,
    seen_language: Mutex<Option<String>>,
}

impl MockEngine {
    fn ready() -> Self {
        Self {
            ready: true,
            fail: false,
            called: AtomicBool::new(false),
            seen_language: Mutex::new(None),
        }
    }

    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::ready()
        }
    }

    fn not_ready() -> Self {
        Self {
            ready: false,
            ..Self::ready()
        }
    }
}

#[async_trait]
impl TranscriptionEngine for MockEngine {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        language: Option<&str>,
    ) -> Result<EngineOutput, EngineError> {
        self.called.store(true, Ordering::SeqCst);
        *self.seen_language.lock().unwrap() = language.map(String::from);
        if self.fail {
            return Err(EngineError::ApiRequestFailed(
                "decoder exploded".to_string(),
            ));
        }
        Ok(EngineOutput {
            segments: vec![
                TranscriptionSegment {
                    start: 0.0,
                    end: 1.2,
                    text: "hello".to_string(),
                    confidence: None,
                },
                TranscriptionSegment {
                    start: 1.2,
                    end: 2.0,
                    text: "world".to_string(),
                    confidence: None,
                },
            ],
            language: "en".to_string(),
            language_probability: 0.97,
        })
    }

    fn is_ready(&self) -> bool {
        self.ready
    }
}

fn test_settings(staging_dir: &Path) -> Settings {
    Settings {
        server: ServerSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
        upload: UploadSettings {
            staging_dir: staging_dir.to_path_buf(),
            max_file_size: 16 * 1024 * 1024,
            allowed_extensions: vec![
                "wav".to_string(),
                "mp3".to_string(),
                "m4a".to_string(),
                "flac".to_string(),
                "ogg".to_string(),
            ],
        },
        whisper: WhisperSettings {
            model: "whisper-1".to_string(),
            device: "cpu".to_string(),
            language: None,
            api_base_url: None,
            api_key: String::new(),
            timeout_secs: 30,
        },
        logging: TracingConfig::default(),
    }
}

fn create_app(engine: Arc<MockEngine>, staging_dir: &Path) -> Router {
    let settings = test_settings(staging_dir);
    let staging = Arc::new(LocalStagingStore::new(settings.upload.staging_dir.clone()).unwrap());
    let validator = FileValidator::new(
        settings.upload.allowed_extensions.iter().cloned(),
        settings.upload.max_file_size,
    );
    let service = Arc::new(TranscriptionService::new(
        engine,
        staging,
        validator,
        settings.whisper.language.clone(),
        Duration::from_secs(settings.whisper.timeout_secs),
    ));
    create_router(AppState {
        transcription_service: service,
        settings,
    })
}

fn multipart_body(filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(data);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

fn multipart_request(uri: &str, body: Vec<u8>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(body))
        .unwrap()
}

fn staged_file_count(dir: &Path) -> usize {
    std::fs::read_dir(dir).unwrap().count()
}

async fn response_json(response: axum::response::Response) -> serde_json::Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn given_wav_upload_when_transcribing_then_returns_transcript() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let body = multipart_body("sample.wav", "audio/wav", &[0u8; 10 * 1024]);
    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "hello world");
    assert_eq!(json["language"], "en");
    assert!((json["language_probability"].as_f64().unwrap() - 0.97).abs() < 1e-6);
    assert_eq!(json["segments_count"], 2);
    assert_eq!(json["segments"].as_array().unwrap().len(), 2);
    assert_eq!(json["segments"][0]["text"], "hello");
    assert_eq!(json["file_info"]["filename"], "sample.wav");
    assert_eq!(json["file_info"]["content_type"], "audio/wav");
    assert_eq!(json["file_info"]["size_bytes"], 10 * 1024);
    assert!(json["processing_time"].as_f64().unwrap() >= 0.0);
}

#[tokio::test]
async fn given_wav_upload_when_transcribing_then_staging_dir_is_empty_afterwards() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let body = multipart_body("sample.wav", "audio/wav", b"fake audio");
    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn given_text_file_upload_when_transcribing_then_returns_validation_error() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockEngine::ready());
    let app = create_app(Arc::clone(&engine), dir.path());

    let body = multipart_body("notes.txt", "text/plain", b"not audio");
    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["type"], "FileValidation");
    assert_eq!(json["status_code"], 400);
    assert_eq!(staged_file_count(dir.path()), 0);
    assert!(!engine.called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_oversized_upload_without_part_length_then_rejected_before_streaming() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockEngine::ready());
    let app = create_app(Arc::clone(&engine), dir.path());

    // The part itself declares no length, so only the request-level
    // Content-Length reveals the size up front. Deliver the body in
    // wire-sized chunks so the rejection provably happens at validation
    // rather than on the router's body limit.
    let body = multipart_body("big.wav", "audio/wav", &vec![0u8; 17 * 1024 * 1024]);
    let content_length = body.len();
    let chunks: Vec<Result<Bytes, Infallible>> = body
        .chunks(8 * 1024)
        .map(|c| Ok(Bytes::copy_from_slice(c)))
        .collect();
    let request = Request::builder()
        .method("POST")
        .uri("/transcribe")
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header("content-length", content_length)
        .body(Body::from_stream(futures::stream::iter(chunks)))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["type"], "FileValidation");
    assert_eq!(json["status_code"], 400);
    assert_eq!(staged_file_count(dir.path()), 0);
    assert!(!engine.called.load(Ordering::SeqCst));
}

#[tokio::test]
async fn given_no_file_field_when_transcribing_then_returns_no_file_supplied() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let body = format!("--{BOUNDARY}--\r\n").into_bytes();
    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = response_json(response).await;
    assert_eq!(json["type"], "FileValidation");
    assert_eq!(json["error"], "no file supplied");
}

#[tokio::test]
async fn given_engine_failure_when_transcribing_then_classified_error_and_staging_cleaned() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::failing()), dir.path());

    let body = multipart_body("sample.wav", "audio/wav", b"fake audio");
    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["type"], "Transcription");
    let message = json["error"].as_str().unwrap();
    assert!(message.starts_with("transcription failed"));
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn given_engine_not_ready_when_transcribing_then_returns_model_not_loaded() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::not_ready()), dir.path());

    let body = multipart_body("sample.wav", "audio/wav", b"fake audio");
    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let json = response_json(response).await;
    assert_eq!(json["type"], "ModelNotLoaded");
    assert_eq!(staged_file_count(dir.path()), 0);
}

#[tokio::test]
async fn given_language_query_param_when_transcribing_then_hint_reaches_engine() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockEngine::ready());
    let app = create_app(Arc::clone(&engine), dir.path());

    let body = multipart_body("sample.wav", "audio/wav", b"fake audio");
    let response = app
        .oneshot(multipart_request("/transcribe?language=ko", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.seen_language.lock().unwrap().as_deref(), Some("ko"));
}

#[tokio::test]
async fn given_language_form_field_when_transcribing_then_hint_reaches_engine() {
    let dir = tempfile::TempDir::new().unwrap();
    let engine = Arc::new(MockEngine::ready());
    let app = create_app(Arc::clone(&engine), dir.path());

    let mut body = Vec::new();
    body.extend_from_slice(
        format!("--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"language\"\r\n\r\nja\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"sample.wav\"\r\nContent-Type: audio/wav\r\n\r\nfake audio\r\n--{BOUNDARY}--\r\n"
        )
        .as_bytes(),
    );

    let response = app
        .oneshot(multipart_request("/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(engine.seen_language.lock().unwrap().as_deref(), Some("ja"));
}

#[tokio::test]
async fn given_versioned_path_when_transcribing_then_behaves_like_legacy_path() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let body = multipart_body("sample.wav", "audio/wav", b"fake audio");
    let response = app
        .oneshot(multipart_request("/api/v1/transcribe", body))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["text"], "hello world");
}

#[tokio::test]
async fn given_root_request_then_returns_service_pointer() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let response = app
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["message"], "STT Server is running");
    assert_eq!(json["health"], "/api/v1/health");
    assert_eq!(json["transcribe"], "/api/v1/transcribe");
}

#[tokio::test]
async fn given_ready_engine_when_checking_health_then_model_loaded_is_true() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["model_loaded"], true);
    assert_eq!(json["service"], "stt-server");
}

#[tokio::test]
async fn given_unloaded_engine_when_checking_health_then_model_loaded_is_false() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::not_ready()), dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    let json = response_json(response).await;
    assert_eq!(json["model_loaded"], false);
}

#[tokio::test]
async fn given_info_request_then_reflects_configuration() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/info")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = response_json(response).await;
    assert_eq!(json["service"], "stt-server");
    assert_eq!(json["model"], "whisper-1");
    assert_eq!(json["device"], "cpu");
    assert_eq!(json["max_file_size_mb"], 16);
    let formats: Vec<&str> = json["supported_formats"]
        .as_array()
        .unwrap()
        .iter()
        .map(|v| v.as_str().unwrap())
        .collect();
    assert_eq!(formats, vec!["wav", "mp3", "m4a", "flac", "ogg"]);
}

#[tokio::test]
async fn given_request_id_header_then_it_is_echoed_back() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .header("x-request-id", "test-request-123")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(
        response.headers().get("x-request-id").unwrap(),
        "test-request-123"
    );
}

#[tokio::test]
async fn given_no_request_id_header_then_one_is_generated() {
    let dir = tempfile::TempDir::new().unwrap();
    let app = create_app(Arc::new(MockEngine::ready()), dir.path());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.headers().contains_key("x-request-id"));
}
