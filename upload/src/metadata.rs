//! Descriptive metadata pinned alongside a clip.

use std::time::Duration;

use serde::Serialize;
use serde_json::{json, Value};

use crate::media::MediaFile;
use crate::validation::ValidatedClip;

const MIB: u64 = 1024 * 1024;

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct VideoMetadata {
    pub name: String,
    pub description: String,
    pub category: String,
    pub duration: Duration,
    pub size: u64,
    pub mime_type: String,
}

impl VideoMetadata {
    /// Metadata for a battle clip; the name defaults to the file name.
    pub fn for_battle(file: &MediaFile, clip: &ValidatedClip, category: &str, title: Option<&str>) -> Self {
        let name = title
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .unwrap_or(&file.name)
            .to_string();
        Self {
            name,
            description: format!("Battle video for {category} category"),
            category: category.to_string(),
            duration: clip.duration,
            size: clip.size,
            mime_type: file.mime_type.clone(),
        }
    }

    /// Category, or `general` when none was given.
    pub fn category_or_default(&self) -> &str {
        match self.category.trim() {
            "" => "general",
            c => c,
        }
    }

    /// NFT-style document describing the clip at `video_url`.
    pub fn document(&self, video_url: &str) -> Value {
        json!({
            "name": self.name,
            "description": self.description,
            "image": video_url,
            "external_url": video_url,
            "attributes": [
                { "trait_type": "Category", "value": self.category },
                { "trait_type": "Duration", "value": format!("{}s", format_secs(self.duration)) },
                { "trait_type": "Size", "value": format!("{}MB", rounded_mib(self.size)) },
                { "trait_type": "Type", "value": self.mime_type },
            ],
        })
    }
}

/// Seconds without a trailing `.0`, e.g. `12` or `12.5`.
pub(crate) fn format_secs(duration: Duration) -> String {
    format!("{}", duration.as_secs_f64())
}

fn rounded_mib(bytes: u64) -> u64 {
    (bytes + MIB / 2) / MIB
}
