//! Provider selection and the upload pipeline.

use clipclash_types::ContentHash;

use crate::config::UploadConfig;
use crate::error::UploadError;
use crate::media::{BattleVideo, MediaFile, UploadOrigin, UploadResult};
use crate::metadata::VideoMetadata;
use crate::pinata::PinataClient;
use crate::progress::ProgressReporter;
use crate::simulated::SimulatedPinning;
use crate::validation::{validate, ValidatedClip};

/// Where clips are pinned. Chosen once, at construction.
#[derive(Clone, Debug)]
pub enum UploadProvider {
    Pinata(PinataClient),
    Simulated(SimulatedPinning),
}

impl UploadProvider {
    /// Pinata when credentials are configured, simulated otherwise or when
    /// public mode is requested.
    pub fn from_config(config: &UploadConfig) -> Self {
        let simulated = || {
            Self::Simulated(
                SimulatedPinning::new(config.simulated_delay())
                    .with_gateway(config.public_gateway_url.as_str()),
            )
        };
        if config.use_public_ipfs {
            tracing::warn!("public IPFS mode enabled, uploads are simulated");
            return simulated();
        }
        match config.credentials() {
            Ok(credentials) => Self::Pinata(
                PinataClient::new(credentials)
                    .with_endpoints(&config.pinata_api_url, &config.pinata_gateway_url)
                    .with_timeout(config.timeout()),
            ),
            Err(e) => {
                tracing::warn!(reason = %e, "Pinata credentials not found, uploads are simulated");
                simulated()
            }
        }
    }

    pub fn origin(&self) -> UploadOrigin {
        match self {
            Self::Pinata(_) => UploadOrigin::Pinata,
            Self::Simulated(_) => UploadOrigin::Simulated,
        }
    }

    pub fn is_simulated(&self) -> bool {
        self.origin() == UploadOrigin::Simulated
    }
}

/// Validates clips and pins them through an [`UploadProvider`].
#[derive(Clone, Debug)]
pub struct Uploader {
    provider: UploadProvider,
}

impl Uploader {
    pub fn new(provider: UploadProvider) -> Self {
        Self { provider }
    }

    pub fn from_config(config: &UploadConfig) -> Self {
        Self::new(UploadProvider::from_config(config))
    }

    pub fn provider(&self) -> &UploadProvider {
        &self.provider
    }

    /// Validate `file`, then pin it. Nothing is sent if validation fails.
    pub async fn upload(
        &self,
        file: &MediaFile,
        metadata: &VideoMetadata,
        progress: &ProgressReporter,
    ) -> Result<UploadResult, UploadError> {
        let clip = validate(file)?;
        self.pin_validated(file, metadata, &clip, progress).await
    }

    /// Pin a clip that `validate` has already accepted.
    async fn pin_validated(
        &self,
        file: &MediaFile,
        metadata: &VideoMetadata,
        clip: &ValidatedClip,
        progress: &ProgressReporter,
    ) -> Result<UploadResult, UploadError> {
        let outcome = match &self.provider {
            UploadProvider::Pinata(client) => client.pin_file(file, metadata, clip, progress).await,
            UploadProvider::Simulated(sim) => sim.pin_file(file, progress).await,
        };
        if let Err(e) = &outcome {
            tracing::warn!(
                name = %file.name,
                error = %e,
                needs_configuration = e.needs_configuration(),
                "clip upload failed"
            );
        }
        outcome
    }

    /// Pin the metadata document describing an uploaded clip.
    pub async fn pin_metadata(
        &self,
        video_hash: &ContentHash,
        metadata: &VideoMetadata,
    ) -> Result<ContentHash, UploadError> {
        match &self.provider {
            UploadProvider::Pinata(client) => client.pin_json(video_hash, metadata).await,
            UploadProvider::Simulated(sim) => {
                sim.pin_json(&metadata.document(&sim.gateway_url(video_hash))).await
            }
        }
    }

    /// Upload a battle clip and then its metadata document.
    ///
    /// A metadata failure is logged and returned alongside the clip result.
    pub async fn upload_battle_video(
        &self,
        file: &MediaFile,
        category: &str,
        title: Option<&str>,
        progress: &ProgressReporter,
    ) -> Result<BattleVideo, UploadError> {
        let clip = validate(file)?;
        let metadata = VideoMetadata::for_battle(file, &clip, category, title);
        let video = self.pin_validated(file, &metadata, &clip, progress).await?;

        let metadata = self.pin_metadata(&video.hash, &metadata).await;
        if let Err(e) = &metadata {
            tracing::warn!(video = %video.hash, error = %e, "metadata pin failed, clip upload kept");
        }
        Ok(BattleVideo { video, metadata })
    }
}
