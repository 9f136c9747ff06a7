//! Upload pipeline against a local mock of the Pinata API.

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::routing::post;
use axum::{Json, Router};
use clipclash_upload::{
    MediaFile, ProgressReporter, UploadConfig, UploadError, UploadOrigin, Uploader, ValidationError,
};
use serde_json::{json, Value};

// ---------------------------------------------------------------------------
// Mock server
// ---------------------------------------------------------------------------

#[derive(Clone, Default)]
struct Seen {
    files: Arc<Mutex<Vec<Vec<u8>>>>,
    documents: Arc<Mutex<Vec<Value>>>,
}

fn api_key(headers: &HeaderMap) -> String {
    headers
        .get("pinata_api_key")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

fn has_secret(headers: &HeaderMap) -> bool {
    headers.get("pinata_secret_api_key").is_some()
}

async fn pin_file(State(seen): State<Seen>, headers: HeaderMap, body: Bytes) -> (StatusCode, Json<Value>) {
    seen.files.lock().unwrap().push(body.to_vec());
    match api_key(&headers).as_str() {
        _ if !has_secret(&headers) => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "missing secret" }))),
        "good-key" | "no-json" => (
            StatusCode::OK,
            Json(json!({ "IpfsHash": "bafybeimockclip", "PinSize": body.len(), "Timestamp": "2024-01-01T00:00:00Z" })),
        ),
        "forbidden" => (StatusCode::FORBIDDEN, Json(json!({ "error": "NO_SCOPES_FOUND" }))),
        "broken" => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "pin queue full" }))),
        _ => (StatusCode::UNAUTHORIZED, Json(json!({ "error": "Invalid API key" }))),
    }
}

async fn pin_json(State(seen): State<Seen>, headers: HeaderMap, Json(doc): Json<Value>) -> (StatusCode, Json<Value>) {
    seen.documents.lock().unwrap().push(doc);
    match api_key(&headers).as_str() {
        "good-key" => (StatusCode::OK, Json(json!({ "IpfsHash": "bafkreimockmeta" }))),
        _ => (StatusCode::INTERNAL_SERVER_ERROR, Json(json!({ "error": "metadata store down" }))),
    }
}

async fn spawn_mock() -> (SocketAddr, Seen) {
    let seen = Seen::default();
    let app = Router::new()
        .route("/pinning/pinFileToIPFS", post(pin_file))
        .route("/pinning/pinJSONToIPFS", post(pin_json))
        .with_state(seen.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    (addr, seen)
}

fn uploader(addr: SocketAddr, key: &str) -> Uploader {
    Uploader::from_config(&UploadConfig {
        pinata_api_key: Some(key.to_string()),
        pinata_secret_key: Some("secret".to_string()),
        pinata_api_url: format!("http://{addr}"),
        pinata_gateway_url: format!("http://{addr}/ipfs"),
        timeout_secs: 5,
        ..Default::default()
    })
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

fn mp4_box(kind: &[u8; 4], payload: &[u8]) -> Vec<u8> {
    let mut out = ((payload.len() + 8) as u32).to_be_bytes().to_vec();
    out.extend_from_slice(kind);
    out.extend_from_slice(payload);
    out
}

/// An MP4 whose `mvhd` declares `secs` seconds, padded with `mdat` bytes.
fn mp4_clip(secs: u32, mdat_len: usize) -> MediaFile {
    let mut mvhd = vec![0u8; 12];
    mvhd.extend_from_slice(&1000u32.to_be_bytes());
    mvhd.extend_from_slice(&(secs * 1000).to_be_bytes());
    mvhd.extend_from_slice(&[0; 80]);
    let mut bytes = mp4_box(b"ftyp", b"isom\0\0\x02\0isomiso2");
    bytes.extend_from_slice(&mp4_box(b"moov", &mp4_box(b"mvhd", &mvhd)));
    bytes.extend_from_slice(&mp4_box(b"mdat", &vec![0x5A; mdat_len]));
    MediaFile::new("dance.mp4", "video/mp4", bytes)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[tokio::test]
async fn pins_clip_and_metadata() {
    let (addr, seen) = spawn_mock().await;
    let (reporter, rx) = ProgressReporter::channel();
    let clip = mp4_clip(12, 200 * 1024);

    let out = uploader(addr, "good-key")
        .upload_battle_video(&clip, "dance", None, &reporter)
        .await
        .unwrap();

    assert_eq!(out.video.origin, UploadOrigin::Pinata);
    assert_eq!(out.video.hash.as_str(), "bafybeimockclip");
    assert_eq!(out.video.url, format!("http://{addr}/ipfs/bafybeimockclip"));
    assert_eq!(out.video.size, clip.size());
    assert_eq!(out.metadata.unwrap().as_str(), "bafkreimockmeta");

    let progress = *rx.borrow();
    assert_eq!((progress.loaded, progress.total, progress.percentage), (clip.size(), clip.size(), 100));

    let body = String::from_utf8_lossy(&seen.files.lock().unwrap()[0]).into_owned();
    assert!(body.contains("name=\"pinataMetadata\""));
    assert!(body.contains("\"type\":\"battle-video\""));
    assert!(body.contains("\"category\":\"dance\""));
    assert!(body.contains("\"duration\":\"12\""));
    assert!(body.contains("\"cidVersion\":1"));
    assert!(body.contains("\"wrapWithDirectory\":false"));
    assert!(body.contains("filename=\"dance.mp4\""));

    let doc = seen.documents.lock().unwrap()[0].clone();
    assert_eq!(doc["pinataMetadata"]["keyvalues"]["videoHash"], "bafybeimockclip");
    assert_eq!(doc["pinataContent"]["attributes"][1]["value"], "12s");
}

#[tokio::test]
async fn bad_key_is_unauthorized() {
    let (addr, _) = spawn_mock().await;
    let err = uploader(addr, "wrong")
        .upload_battle_video(&mp4_clip(5, 16), "comedy", None, &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert_eq!(err, UploadError::Unauthorized { status: 401 });
    assert!(err.needs_configuration());
}

#[tokio::test]
async fn missing_scopes_is_unauthorized() {
    let (addr, _) = spawn_mock().await;
    let err = uploader(addr, "forbidden")
        .upload_battle_video(&mp4_clip(5, 16), "comedy", None, &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert_eq!(err, UploadError::Unauthorized { status: 403 });
}

#[tokio::test]
async fn server_error_is_a_service_failure() {
    let (addr, _) = spawn_mock().await;
    let err = uploader(addr, "broken")
        .upload_battle_video(&mp4_clip(5, 16), "comedy", None, &ProgressReporter::silent())
        .await
        .unwrap_err();
    match err {
        UploadError::Service { status, body } => {
            assert_eq!(status, 500);
            assert!(body.contains("pin queue full"));
        }
        other => panic!("expected service error, got {other:?}"),
    }
}

#[tokio::test]
async fn metadata_failure_keeps_clip() {
    let (addr, _) = spawn_mock().await;
    let out = uploader(addr, "no-json")
        .upload_battle_video(&mp4_clip(5, 16), "comedy", None, &ProgressReporter::silent())
        .await
        .unwrap();
    assert_eq!(out.video.hash.as_str(), "bafybeimockclip");
    assert!(matches!(out.metadata, Err(UploadError::Service { status: 500, .. })));
}

#[tokio::test]
async fn unreachable_service_is_a_network_failure() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = uploader(addr, "good-key")
        .upload_battle_video(&mp4_clip(5, 16), "comedy", None, &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert!(matches!(err, UploadError::Network(_)), "{err:?}");
    assert!(err.is_retryable());
}

#[tokio::test]
async fn invalid_clip_never_reaches_the_service() {
    let (addr, seen) = spawn_mock().await;
    let err = uploader(addr, "good-key")
        .upload_battle_video(&mp4_clip(20, 16), "comedy", None, &ProgressReporter::silent())
        .await
        .unwrap_err();
    assert_eq!(
        err,
        UploadError::Validation(ValidationError::TooLong { duration: Duration::from_secs(20) })
    );
    assert!(seen.files.lock().unwrap().is_empty());
}
