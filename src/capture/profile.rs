/// Target video bitrate for every profile.
pub const VIDEO_BITS_PER_SECOND: u32 = 2_500_000;

/// Container/codec preference, most preferred first.
pub const PREFERRED_MIME_TYPES: [&str; 4] = [
    "video/mp4",
    "video/webm;codecs=vp8,opus",
    "video/webm;codecs=vp9,opus",
    "video/webm",
];

/// Mime type used when an encoder does not report one.
pub const FALLBACK_MIME_TYPE: &str = "video/webm";

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct EncodingProfile {
    /// Requested mime type. `None` lets the encoder pick its own default.
    pub mime_type: Option<String>,
    pub video_bits_per_second: u32,
}

impl EncodingProfile {
    pub fn host_default() -> Self {
        Self {
            mime_type: None,
            video_bits_per_second: VIDEO_BITS_PER_SECOND,
        }
    }
}

/// First preferred mime type the encoder accepts, or the host default.
pub fn select_profile(supports: impl Fn(&str) -> bool) -> EncodingProfile {
    PREFERRED_MIME_TYPES
        .iter()
        .find(|m| supports(m))
        .map(|m| EncodingProfile {
            mime_type: Some((*m).to_string()),
            video_bits_per_second: VIDEO_BITS_PER_SECOND,
        })
        .unwrap_or_else(EncodingProfile::host_default)
}

/// Container portion of a mime type, without codec parameters.
pub fn essence(mime_type: &str) -> &str {
    mime_type.split(';').next().unwrap_or(mime_type).trim()
}

pub fn extension_for_mime(mime_type: &str) -> &'static str {
    match essence(mime_type) {
        "video/mp4" => "mp4",
        "video/webm" => "webm",
        "video/x-matroska" => "mkv",
        "video/x-raw" => "raw",
        _ => "bin",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/profile.rs"]
mod tests;
