//! Integration tests for vsep-ui HTTP endpoints
//!
//! External tools are replaced with in-process fakes; uploads are small
//! synthesized WAV files.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot` method
use vsep_common::{Error, Result};
use vsep_sep::{AudioBuffer, SeparationModel, Separator, StemSet, Trimmer};
use vsep_ui::fetch::{FetchedMedia, MediaFetcher};
use vsep_ui::session::{SessionController, SessionStore};
use vsep_ui::{build_router, AppState};

const BOUNDARY: &str = "vsep-test-boundary";

struct QuarterModel;

impl SeparationModel for QuarterModel {
    fn name(&self) -> &str {
        "quarter"
    }

    fn apply(&self, mix: &AudioBuffer) -> Result<StemSet> {
        let quarter = AudioBuffer::new(
            mix.sample_rate(),
            mix.channels()
                .iter()
                .map(|c| c.iter().map(|s| s * 0.25).collect())
                .collect(),
        )?;
        StemSet::new(
            mix,
            [quarter.clone(), quarter.clone(), quarter.clone(), quarter],
        )
    }
}

struct CopyTrimmer;

impl Trimmer for CopyTrimmer {
    fn trim(&self, input: &Path, output: &Path, _start: u32, _duration: u32) -> Result<()> {
        std::fs::copy(input, output)?;
        Ok(())
    }
}

struct OfflineFetcher;

impl MediaFetcher for OfflineFetcher {
    fn fetch(&self, _url: &str, _dest_dir: &Path) -> Result<FetchedMedia> {
        Err(Error::Tool {
            tool: "yt-dlp".to_string(),
            code: Some(1),
            stderr: "ERROR: network unreachable".to_string(),
        })
    }
}

/// Test helper: app with fakes and the given upload limit
fn setup_app(max_upload_bytes: usize) -> axum::Router {
    let controller = SessionController::new(
        Separator::new(Arc::new(QuarterModel)),
        Arc::new(CopyTrimmer),
        Arc::new(OfflineFetcher),
    );
    let state = AppState::new(
        SessionStore::new(Duration::from_secs(600)),
        controller,
        max_upload_bytes,
    );
    build_router(state)
}

fn wav_bytes(seconds: u32) -> Vec<u8> {
    let spec = hound::WavSpec {
        channels: 2,
        sample_rate: 8000,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = hound::WavWriter::new(&mut cursor, spec).unwrap();
        for i in 0..8000 * seconds {
            let value: i16 = if i % 20 < 10 { 6000 } else { -6000 };
            writer.write_sample(value).unwrap();
            writer.write_sample(value).unwrap();
        }
        writer.finalize().unwrap();
    }
    cursor.into_inner()
}

/// Test helper: multipart/form-data body
fn multipart_body(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Vec<u8> {
    let mut body = Vec::new();
    for (name, value) in fields {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n{}\r\n",
                BOUNDARY, name, value
            )
            .as_bytes(),
        );
    }
    if let Some((file_name, bytes)) = file {
        body.extend_from_slice(
            format!(
                "--{}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{}\"\r\nContent-Type: application/octet-stream\r\n\r\n",
                BOUNDARY, file_name
            )
            .as_bytes(),
        );
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn post_form(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Test helper: `name=value` part of the Set-Cookie header
fn session_cookie(response: &Response) -> String {
    response
        .headers()
        .get(header::SET_COOKIE)
        .expect("Should set session cookie")
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_string()
}

async fn body_bytes(response: Response) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("Should read body")
        .to_vec()
}

async fn body_text(response: Response) -> String {
    String::from_utf8(body_bytes(response).await).expect("Should be UTF-8")
}

async fn extract_json(response: Response) -> Value {
    serde_json::from_slice(&body_bytes(response).await).expect("Should parse JSON")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let app = setup_app(1024 * 1024);

    let response = app.oneshot(get("/health", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "vsep-ui");
    assert!(body["version"].is_string());
}

// =============================================================================
// Form
// =============================================================================

#[tokio::test]
async fn test_first_visit_sets_cookie_and_renders_form() {
    let app = setup_app(1024 * 1024);

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with("vsep_session="));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie = session_cookie(&response);

    let html = body_text(response).await;
    assert!(html.contains("<form"));
    assert!(html.contains(r#"value="separate" disabled"#));

    // Known session: no new cookie
    let response = app.oneshot(get("/", Some(&cookie))).await.unwrap();
    assert!(response.headers().get(header::SET_COOKIE).is_none());
}

#[tokio::test]
async fn test_upload_separate_and_download() {
    let app = setup_app(1024 * 1024);
    let wav = wav_bytes(2);

    let body = multipart_body(
        &[("link", ""), ("start", "00:00"), ("end", ""), ("action", "separate")],
        Some(("My Song (Remix).wav", &wav)),
    );
    let response = app.clone().oneshot(post_form(None, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let cookie = session_cookie(&response);

    let html = body_text(response).await;
    assert!(html.contains("Separation complete"));
    assert!(html.contains(r#"src="/audio/vocals""#));
    assert!(html.contains(r#"src="/audio/melody""#));
    assert!(html.contains(r#"src="/audio/original""#));
    assert!(html.contains("My_Song__Remix__vocals.wav"));
    assert!(html.contains(r#"value="separate" disabled"#));

    let response = app
        .clone()
        .oneshot(get("/audio/vocals", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "audio/wav");
    assert!(response.headers().get(header::CONTENT_DISPOSITION).is_none());
    let bytes = body_bytes(response).await;
    assert_eq!(&bytes[..4], b"RIFF");

    let response = app
        .clone()
        .oneshot(get("/audio/melody?download=1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"My_Song__Remix__melody.wav\""
    );

    let response = app
        .oneshot(get("/audio/original?download=1", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"My_Song__Remix_.wav\""
    );
    assert_eq!(body_bytes(response).await, wav);
}

#[tokio::test]
async fn test_second_separate_shows_notice() {
    let app = setup_app(1024 * 1024);
    let wav = wav_bytes(1);

    let body = multipart_body(&[("action", "separate")], Some(("a.wav", &wav)));
    let response = app.clone().oneshot(post_form(None, body)).await.unwrap();
    let cookie = session_cookie(&response);

    let body = multipart_body(&[("action", "separate")], None);
    let response = app.oneshot(post_form(Some(&cookie), body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"class="notice""#));
    assert!(html.contains("Already separated"));
    assert!(html.contains("Separation complete"));
}

#[tokio::test]
async fn test_unsupported_upload_renders_error() {
    let app = setup_app(1024 * 1024);

    let body = multipart_body(&[("action", "refresh")], Some(("<notes>.txt", b"hello")));
    let response = app.oneshot(post_form(None, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains(r#"class="error-box""#));
    assert!(html.contains("Unsupported file type"));
    assert!(html.contains("&lt;notes&gt;.txt"));
}

#[tokio::test]
async fn test_fetch_failure_renders_tool_message() {
    let app = setup_app(1024 * 1024);

    let body = multipart_body(&[("link", "https://example.com/v"), ("action", "refresh")], None);
    let response = app.oneshot(post_form(None, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let html = body_text(response).await;
    assert!(html.contains("ERROR: network unreachable"));
    assert!(html.contains(r#"value="https://example.com/v""#));
}

#[tokio::test]
async fn test_reset_clears_results() {
    let app = setup_app(1024 * 1024);
    let wav = wav_bytes(1);

    let body = multipart_body(&[("action", "separate")], Some(("a.wav", &wav)));
    let response = app.clone().oneshot(post_form(None, body)).await.unwrap();
    let cookie = session_cookie(&response);

    let body = multipart_body(&[("action", "reset")], None);
    let response = app
        .clone()
        .oneshot(post_form(Some(&cookie), body))
        .await
        .unwrap();
    let html = body_text(response).await;
    assert!(html.contains("Waiting for a file or link"));
    assert!(!html.contains("<audio"));

    let response = app
        .oneshot(get("/audio/vocals", Some(&cookie)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_oversized_upload_rejected() {
    let app = setup_app(1024);
    let wav = wav_bytes(1);

    let body = multipart_body(&[("action", "refresh")], Some(("big.wav", &wav)));
    let response = app.oneshot(post_form(None, body)).await.unwrap();
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
}

// =============================================================================
// Audio
// =============================================================================

#[tokio::test]
async fn test_audio_without_session_is_not_found() {
    let app = setup_app(1024 * 1024);

    let response = app.oneshot(get("/audio/vocals", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = extract_json(response).await;
    assert_eq!(body["error"]["code"], "NOT_FOUND");
}

#[tokio::test]
async fn test_audio_unknown_kind_is_not_found() {
    let app = setup_app(1024 * 1024);

    let response = app.oneshot(get("/audio/drums", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
