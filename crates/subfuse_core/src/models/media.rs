//! Media file classification by extension.
//!
//! Used by outer shells to route a dropped or picked file into the right
//! input slot. The pipeline itself only checks that files exist; it does
//! not validate formats.

use std::path::Path;

/// Known subtitle file extensions (lowercase, no dot).
pub const SUBTITLE_EXTENSIONS: &[&str] = &["srt", "ass"];

/// Known video container extensions (lowercase, no dot).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "avi", "mov", "mkv", "flv", "wmv", "webm", "m4v", "3gp", "ts", "m3u8",
];

/// Coarse classification of an input file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    /// A subtitle file.
    Subtitle,
    /// A video container.
    Video,
    /// Anything else.
    Unknown,
}

impl MediaKind {
    /// Classify a path by its extension (case-insensitive).
    pub fn classify(path: &Path) -> Self {
        let Some(ext) = path.extension().and_then(|e| e.to_str()) else {
            return Self::Unknown;
        };
        let ext = ext.to_ascii_lowercase();

        if SUBTITLE_EXTENSIONS.contains(&ext.as_str()) {
            Self::Subtitle
        } else if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
            Self::Video
        } else {
            Self::Unknown
        }
    }
}
