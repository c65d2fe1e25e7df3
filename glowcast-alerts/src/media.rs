//! Media file validation
//!
//! Confirms a referenced media file exists and carries an allowed
//! extension for its category before it is attached to an alert payload.
//! Failure is silent (returns false); the builder logs and drops the
//! block, so a missing file never aborts payload construction.

use std::path::Path;

/// Media category with its own allowed extension set
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Sound,
    Image,
    Video,
}

impl MediaKind {
    /// Allowed extensions, lowercase, no leading dot
    pub fn allowed_extensions(&self) -> &'static [&'static str] {
        match self {
            MediaKind::Sound => &["mp3", "wav", "ogg", "aac"],
            MediaKind::Image => &["png", "jpg", "jpeg", "gif", "webp"],
            MediaKind::Video => &["mp4", "webm", "ogg", "mov"],
        }
    }
}

impl std::fmt::Display for MediaKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MediaKind::Sound => write!(f, "sound"),
            MediaKind::Image => write!(f, "image"),
            MediaKind::Video => write!(f, "video"),
        }
    }
}

/// True only if `path` exists and its extension (case-insensitive) is
/// allowed for `kind`
pub fn validate(path: impl AsRef<Path>, kind: MediaKind) -> bool {
    let path = path.as_ref();
    if !path.is_file() {
        return false;
    }

    let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
        return false;
    };
    let ext = ext.to_ascii_lowercase();

    kind.allowed_extensions().contains(&ext.as_str())
}
