//! Clip inputs and upload results.

use std::path::Path;
use std::time::Duration;

use bytes::Bytes;
use clipclash_types::ContentHash;
use serde::Serialize;

use crate::error::UploadError;

/// A clip selected for upload.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MediaFile {
    pub name: String,
    pub mime_type: String,
    /// Clip contents; clones and upload chunks share one buffer.
    pub bytes: Bytes,
    /// Duration reported by the caller, used when the container header
    /// cannot be read.
    pub duration_hint: Option<Duration>,
}

impl MediaFile {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            name: name.into(),
            mime_type: mime_type.into(),
            bytes: bytes.into(),
            duration_hint: None,
        }
    }

    pub fn with_duration_hint(mut self, duration: Duration) -> Self {
        self.duration_hint = Some(duration);
        self
    }

    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }

    /// MIME type guessed from a file extension.
    pub fn mime_for_extension(ext: &str) -> &'static str {
        match ext.to_ascii_lowercase().as_str() {
            "mp4" | "m4v" => "video/mp4",
            "webm" => "video/webm",
            "mov" | "qt" => "video/quicktime",
            "avi" => "video/x-msvideo",
            _ => "application/octet-stream",
        }
    }

    /// Read a clip from disk, guessing its MIME type from the extension.
    pub async fn read(path: &Path) -> Result<Self, UploadError> {
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| UploadError::InvalidResponse(format!("cannot read {}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "clip".to_string());
        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("");
        Ok(Self::new(name, Self::mime_for_extension(ext), bytes))
    }
}

/// Which provider pinned a clip.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum UploadOrigin {
    Pinata,
    Simulated,
}

/// A pinned clip.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct UploadResult {
    pub hash: ContentHash,
    pub url: String,
    pub size: u64,
    pub mime_type: String,
    pub origin: UploadOrigin,
}

/// A pinned battle clip and its companion metadata document.
///
/// The metadata pin is best effort: its failure is reported here and never
/// undoes the clip upload.
#[derive(Clone, Debug)]
pub struct BattleVideo {
    pub video: UploadResult,
    pub metadata: Result<ContentHash, UploadError>,
}
