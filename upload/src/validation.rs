//! Local checks a clip must pass before any upload starts.

use std::time::Duration;

use crate::error::ValidationError;
use crate::media::MediaFile;
use crate::probe::probe_duration;

pub const ALLOWED_MIME_TYPES: [&str; 4] = [
    "video/mp4",
    "video/webm",
    "video/quicktime",
    "video/x-msvideo",
];

/// 50 MiB, inclusive.
pub const MAX_FILE_BYTES: u64 = 50 * 1024 * 1024;

/// Inclusive.
pub const MAX_DURATION: Duration = Duration::from_secs(15);

/// Facts established about a clip that passed validation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValidatedClip {
    pub duration: Duration,
    pub size: u64,
}

/// Check type, then size, then duration.
///
/// Duration comes from the container header when it can be read, otherwise
/// from the caller's hint.
pub fn validate(file: &MediaFile) -> Result<ValidatedClip, ValidationError> {
    let mime = file.mime_type.trim().to_ascii_lowercase();
    if !ALLOWED_MIME_TYPES.contains(&mime.as_str()) {
        return Err(ValidationError::UnsupportedType(file.mime_type.clone()));
    }

    let size = file.size();
    if size > MAX_FILE_BYTES {
        return Err(ValidationError::TooLarge { size });
    }

    let duration = probe_duration(&file.bytes)
        .or(file.duration_hint)
        .ok_or(ValidationError::UnreadableMetadata)?;
    if duration > MAX_DURATION {
        return Err(ValidationError::TooLong { duration });
    }

    tracing::debug!(name = %file.name, size, duration_ms = duration.as_millis() as u64, "clip validated");
    Ok(ValidatedClip { duration, size })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::probe::tests::mp4_with_duration;

    fn webm(size: usize, hint: Option<Duration>) -> MediaFile {
        let file = MediaFile::new("clip.webm", "video/webm", vec![0u8; size]);
        match hint {
            Some(d) => file.with_duration_hint(d),
            None => file,
        }
    }

    #[test]
    fn accepts_short_mp4() {
        let file = MediaFile::new("clip.mp4", "video/mp4", mp4_with_duration(1000, 9_000));
        let clip = validate(&file).unwrap();
        assert_eq!(clip.duration, Duration::from_secs(9));
    }

    #[test]
    fn rejects_non_video_type() {
        let file = MediaFile::new("pic.png", "image/png", vec![1, 2, 3]);
        assert_eq!(
            validate(&file),
            Err(ValidationError::UnsupportedType("image/png".into()))
        );
    }

    #[test]
    fn rejects_sixty_mib() {
        let err = validate(&webm(60 * 1024 * 1024, Some(Duration::from_secs(5)))).unwrap_err();
        assert!(matches!(err, ValidationError::TooLarge { .. }));
    }

    #[test]
    fn size_limit_is_inclusive() {
        let file = webm(MAX_FILE_BYTES as usize, Some(Duration::from_secs(5)));
        assert!(validate(&file).is_ok());
    }

    #[test]
    fn rejects_twenty_second_clip() {
        let file = MediaFile::new("long.mp4", "video/mp4", mp4_with_duration(1000, 20_000));
        assert_eq!(
            validate(&file),
            Err(ValidationError::TooLong { duration: Duration::from_secs(20) })
        );
    }

    #[test]
    fn duration_limit_is_inclusive() {
        let file = MediaFile::new("edge.mp4", "video/mp4", mp4_with_duration(1000, 15_000));
        assert!(validate(&file).is_ok());
        let file = MediaFile::new("over.mp4", "video/mp4", mp4_with_duration(1000, 15_001));
        assert!(validate(&file).is_err());
    }

    #[test]
    fn header_wins_over_hint() {
        let file = MediaFile::new("clip.mov", "video/quicktime", mp4_with_duration(600, 600 * 30))
            .with_duration_hint(Duration::from_secs(3));
        assert!(matches!(validate(&file), Err(ValidationError::TooLong { .. })));
    }

    #[test]
    fn unreadable_without_header_or_hint() {
        assert_eq!(validate(&webm(1024, None)), Err(ValidationError::UnreadableMetadata));
        assert!(validate(&webm(1024, Some(Duration::from_secs(14)))).is_ok());
    }

    #[test]
    fn mime_match_ignores_case() {
        let file = MediaFile::new("clip.webm", "Video/WebM", vec![0; 8])
            .with_duration_hint(Duration::from_secs(1));
        assert!(validate(&file).is_ok());
    }
}
