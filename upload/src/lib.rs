//! Clip upload for ClipClash.
//!
//! A clip is validated locally (container type, size, duration read from the
//! container header) before anything leaves the machine, then pinned to IPFS
//! through an [`UploadProvider`]:
//!
//! - [`PinataClient`]: the Pinata pinning API, with streamed progress
//! - [`SimulatedPinning`]: no network; a deterministic content id after a
//!   fixed delay, for development without credentials
//!
//! The content hash of the pinned clip is what battle transactions reference.

pub mod config;
pub mod error;
pub mod media;
pub mod metadata;
pub mod pinata;
pub mod probe;
pub mod progress;
pub mod provider;
pub mod simulated;
pub mod validation;

pub use config::UploadConfig;
pub use error::{UploadError, ValidationError};
pub use media::{BattleVideo, MediaFile, UploadOrigin, UploadResult};
pub use metadata::VideoMetadata;
pub use pinata::{PinataClient, PinataCredentials};
pub use probe::probe_duration;
pub use progress::{ProgressReporter, UploadProgress};
pub use provider::{UploadProvider, Uploader};
pub use simulated::SimulatedPinning;
pub use validation::{validate, ValidatedClip, ALLOWED_MIME_TYPES, MAX_DURATION, MAX_FILE_BYTES};
