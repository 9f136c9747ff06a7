//! Pinata pinning API client.
//!
//! `POST {api}/pinning/pinFileToIPFS` (multipart) for clips and
//! `POST {api}/pinning/pinJSONToIPFS` for metadata documents, authenticated
//! with the `pinata_api_key` / `pinata_secret_api_key` header pair.

use std::fmt;
use std::time::Duration;

use bytes::Bytes;
use clipclash_types::ContentHash;
use futures_util::stream::{self, StreamExt};
use reqwest::multipart::{Form, Part};
use reqwest::Body;
use serde::Deserialize;
use serde_json::json;
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

use crate::error::UploadError;
use crate::media::{MediaFile, UploadOrigin, UploadResult};
use crate::metadata::{format_secs, VideoMetadata};
use crate::progress::ProgressReporter;
use crate::validation::ValidatedClip;

pub const DEFAULT_API_URL: &str = "https://api.pinata.cloud";
pub const DEFAULT_GATEWAY: &str = "https://gateway.pinata.cloud/ipfs";

/// Default timeout for a whole request, upload included.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bytes handed to the HTTP body per progress report.
const CHUNK_SIZE: usize = 64 * 1024;

/// Pinata API key pair.
#[derive(Clone, PartialEq, Eq)]
pub struct PinataCredentials {
    api_key: String,
    secret_key: String,
}

impl PinataCredentials {
    pub fn new(api_key: impl Into<String>, secret_key: impl Into<String>) -> Result<Self, UploadError> {
        let api_key = api_key.into().trim().to_string();
        let secret_key = secret_key.into().trim().to_string();
        if api_key.is_empty() || secret_key.is_empty() {
            return Err(UploadError::MissingCredentials);
        }
        Ok(Self { api_key, secret_key })
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }
}

impl fmt::Debug for PinataCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PinataCredentials")
            .field("api_key", &self.api_key)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct PinResponse {
    #[serde(rename = "IpfsHash")]
    ipfs_hash: String,
}

fn build_http(timeout: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .timeout(timeout)
        .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
        .build()
        .unwrap_or_default()
}

#[derive(Clone, Debug)]
pub struct PinataClient {
    http: reqwest::Client,
    api_url: String,
    gateway: String,
    credentials: PinataCredentials,
}

impl PinataClient {
    pub fn new(credentials: PinataCredentials) -> Self {
        Self {
            http: build_http(DEFAULT_TIMEOUT),
            api_url: DEFAULT_API_URL.to_string(),
            gateway: DEFAULT_GATEWAY.to_string(),
            credentials,
        }
    }

    pub fn with_endpoints(mut self, api_url: &str, gateway: &str) -> Self {
        self.api_url = api_url.trim_end_matches('/').to_string();
        self.gateway = gateway.trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.http = build_http(timeout);
        self
    }

    pub fn gateway_url(&self, hash: &ContentHash) -> String {
        hash.gateway_url(&self.gateway)
    }

    fn authed(&self, path: &str) -> reqwest::RequestBuilder {
        self.http
            .post(format!("{}/pinning/{path}", self.api_url))
            .header("pinata_api_key", &self.credentials.api_key)
            .header("pinata_secret_api_key", &self.credentials.secret_key)
    }

    /// Pin a validated clip, streaming the body so progress tracks bytes
    /// actually handed to the connection.
    pub async fn pin_file(
        &self,
        file: &MediaFile,
        metadata: &VideoMetadata,
        clip: &ValidatedClip,
        progress: &ProgressReporter,
    ) -> Result<UploadResult, UploadError> {
        let total = file.size();
        progress.report(0, total);

        let chunks = chunk_views(&file.bytes);
        let reporter = progress.clone();
        let mut sent = 0u64;
        let body = stream::iter(chunks).map(move |chunk| {
            sent += chunk.len() as u64;
            reporter.report(sent, total);
            Ok::<_, std::io::Error>(chunk)
        });
        let part = Part::stream_with_length(Body::wrap_stream(body), total)
            .file_name(file.name.clone())
            .mime_str(&file.mime_type)
            .map_err(UploadError::from_reqwest)?;

        let pinata_metadata = json!({
            "name": metadata.name,
            "keyvalues": {
                "type": "battle-video",
                "category": metadata.category_or_default(),
                "duration": format_secs(clip.duration),
                "size": total.to_string(),
                "uploadDate": OffsetDateTime::now_utc().format(&Rfc3339).unwrap_or_default(),
            },
        });
        let pinata_options = json!({ "cidVersion": 1, "wrapWithDirectory": false });
        let form = Form::new()
            .part("file", part)
            .text("pinataMetadata", pinata_metadata.to_string())
            .text("pinataOptions", pinata_options.to_string());

        tracing::debug!(name = %file.name, size = total, "pinning clip to Pinata");
        let response = self
            .authed("pinFileToIPFS")
            .multipart(form)
            .send()
            .await
            .map_err(UploadError::from_reqwest)?;
        let hash = read_pin_response(response).await?;

        progress.report(total, total);
        tracing::info!(%hash, name = %file.name, size = total, "clip pinned");
        Ok(UploadResult {
            url: self.gateway_url(&hash),
            hash,
            size: total,
            mime_type: file.mime_type.clone(),
            origin: UploadOrigin::Pinata,
        })
    }

    /// Pin the metadata document for an already pinned clip.
    pub async fn pin_json(
        &self,
        video_hash: &ContentHash,
        metadata: &VideoMetadata,
    ) -> Result<ContentHash, UploadError> {
        let body = json!({
            "pinataContent": metadata.document(&self.gateway_url(video_hash)),
            "pinataMetadata": {
                "name": format!("{}-metadata", metadata.name),
                "keyvalues": {
                    "type": "video-metadata",
                    "videoHash": video_hash.as_str(),
                    "category": metadata.category,
                },
            },
            "pinataOptions": { "cidVersion": 1 },
        });
        let response = self
            .authed("pinJSONToIPFS")
            .json(&body)
            .send()
            .await
            .map_err(UploadError::from_reqwest)?;
        let hash = read_pin_response(response).await?;
        tracing::info!(%hash, video = %video_hash, "metadata pinned");
        Ok(hash)
    }
}

async fn read_pin_response(response: reqwest::Response) -> Result<ContentHash, UploadError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(UploadError::from_status(status.as_u16(), body));
    }
    let pin: PinResponse = response
        .json()
        .await
        .map_err(|e| UploadError::InvalidResponse(format!("failed to parse pin response: {e}")))?;
    ContentHash::new(pin.ipfs_hash).map_err(|e| UploadError::InvalidResponse(e.to_string()))
}

/// Zero-copy `CHUNK_SIZE` views over the clip buffer.
fn chunk_views(bytes: &Bytes) -> Vec<Bytes> {
    (0..bytes.len())
        .step_by(CHUNK_SIZE)
        .map(|start| bytes.slice(start..bytes.len().min(start + CHUNK_SIZE)))
        .collect()
}
