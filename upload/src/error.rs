use std::time::Duration;
use thiserror::Error;

/// Why a clip was refused before upload.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Invalid file type ({0}). Please upload MP4, WebM, MOV, or AVI files only.")]
    UnsupportedType(String),

    #[error("File too large ({size} bytes). Videos must be at most 50MB.")]
    TooLarge { size: u64 },

    #[error("Video too long ({:.1}s). Videos must be at most 15 seconds long.", .duration.as_secs_f64())]
    TooLong { duration: Duration },

    #[error("Could not read video metadata")]
    UnreadableMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UploadError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Pinata rejected the API credentials (HTTP {status}); check PINATA_API_KEY and PINATA_SECRET_KEY")]
    Unauthorized { status: u16 },

    #[error("upload failed: HTTP {status} {body}")]
    Service { status: u16, body: String },

    #[error("upload failed due to network error: {0}")]
    Network(String),

    #[error("invalid response from pinning service: {0}")]
    InvalidResponse(String),

    #[error("Pinata API credentials not found; set PINATA_API_KEY and PINATA_SECRET_KEY")]
    MissingCredentials,
}

impl UploadError {
    /// Failures fixed by configuring credentials rather than retrying.
    pub fn needs_configuration(&self) -> bool {
        matches!(self, Self::Unauthorized { .. } | Self::MissingCredentials)
    }

    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network(_) => true,
            Self::Service { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    pub(crate) fn from_status(status: u16, body: String) -> Self {
        match status {
            401 | 403 => Self::Unauthorized { status },
            _ => Self::Service { status, body },
        }
    }

    pub(crate) fn from_reqwest(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Network(format!("request timed out: {e}"))
        } else if e.is_connect() {
            Self::Network(format!("connection failed: {e}"))
        } else {
            Self::Network(e.to_string())
        }
    }
}
