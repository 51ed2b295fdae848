//! crates/course_calendar_core/src/preview.rs
//!
//! Classifies files by extension and picks how the browser should render them.

use serde::Serialize;

/// Shown in place of an image that fails to load.
pub const IMAGE_PLACEHOLDER_URL: &str = "/assets/preview-unavailable.png";

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif", "webp", "svg"];
const VIDEO_EXTENSIONS: &[&str] = &["mp4", "webm", "ogg"];
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "wav", "ogg", "m4a"];
const PDF_EXTENSIONS: &[&str] = &["pdf"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PreviewKind {
    Image,
    Video,
    Pdf,
    Audio,
    Generic,
}

impl PreviewKind {
    /// Classifies an extension, case-insensitively, with or without a leading dot.
    ///
    /// Tables are checked image, video, audio, pdf. `ogg` appears in both the
    /// video and audio tables and always resolves to `Video`.
    pub fn classify(extension: &str) -> Self {
        let ext = extension.trim().trim_start_matches('.').to_ascii_lowercase();
        let ext = ext.as_str();
        if IMAGE_EXTENSIONS.contains(&ext) {
            PreviewKind::Image
        } else if VIDEO_EXTENSIONS.contains(&ext) {
            PreviewKind::Video
        } else if AUDIO_EXTENSIONS.contains(&ext) {
            PreviewKind::Audio
        } else if PDF_EXTENSIONS.contains(&ext) {
            PreviewKind::Pdf
        } else {
            PreviewKind::Generic
        }
    }
}

/// How a file should be rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "strategy", rename_all = "snake_case")]
pub enum PreviewStrategy {
    InlineImage { src: String, fallback_src: String },
    InlineVideo { src: String, mime_type: String },
    DocumentFrame { src: String },
    AudioPlayer { src: String, mime_type: String, icon: String },
    NoPreview { src: String, extension: String },
}

impl PreviewStrategy {
    /// Builds the strategy for a file reference, resolving relative paths against `origin`.
    pub fn for_file(origin: &str, file_url: &str) -> Self {
        let extension = extension_of(file_url);
        let src = resolve_file_url(origin, file_url);
        match PreviewKind::classify(&extension) {
            PreviewKind::Image => PreviewStrategy::InlineImage {
                src,
                fallback_src: IMAGE_PLACEHOLDER_URL.to_string(),
            },
            PreviewKind::Video => PreviewStrategy::InlineVideo {
                src,
                mime_type: format!("video/{extension}"),
            },
            PreviewKind::Pdf => PreviewStrategy::DocumentFrame { src },
            PreviewKind::Audio => PreviewStrategy::AudioPlayer {
                src,
                mime_type: audio_mime(&extension).to_string(),
                icon: "music".to_string(),
            },
            PreviewKind::Generic => PreviewStrategy::NoPreview { src, extension },
        }
    }

    pub fn kind(&self) -> PreviewKind {
        match self {
            PreviewStrategy::InlineImage { .. } => PreviewKind::Image,
            PreviewStrategy::InlineVideo { .. } => PreviewKind::Video,
            PreviewStrategy::DocumentFrame { .. } => PreviewKind::Pdf,
            PreviewStrategy::AudioPlayer { .. } => PreviewKind::Audio,
            PreviewStrategy::NoPreview { .. } => PreviewKind::Generic,
        }
    }

    pub fn src(&self) -> &str {
        match self {
            PreviewStrategy::InlineImage { src, .. }
            | PreviewStrategy::InlineVideo { src, .. }
            | PreviewStrategy::DocumentFrame { src }
            | PreviewStrategy::AudioPlayer { src, .. }
            | PreviewStrategy::NoPreview { src, .. } => src,
        }
    }
}

fn audio_mime(extension: &str) -> &'static str {
    match extension {
        "mp3" => "audio/mpeg",
        "wav" => "audio/wav",
        "m4a" => "audio/mp4",
        _ => "audio/ogg",
    }
}

/// Lower-cased extension of the last path segment, query and fragment ignored.
/// Empty when there is none.
pub fn extension_of(file_url: &str) -> String {
    let path = file_url
        .split(['?', '#'])
        .next()
        .unwrap_or_default();
    let file_name = path.rsplit('/').next().unwrap_or_default();
    match file_name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => ext.to_ascii_lowercase(),
        _ => String::new(),
    }
}

/// Absolute URLs pass through; anything else is a path under the API origin.
pub fn resolve_file_url(origin: &str, file_url: &str) -> String {
    let lower = file_url.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") || lower.starts_with("//") {
        return file_url.to_string();
    }
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        file_url.trim_start_matches('/')
    )
}
