use std::path::{Path, PathBuf};

use crate::foundation::error::{PhotocardError, PhotocardResult};

#[derive(Clone, Debug)]
pub struct VideoSourceInfo {
    pub source_path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub fps_num: u32,
    pub fps_den: u32,
    pub duration_sec: f64,
    pub has_audio: bool,
}

impl VideoSourceInfo {
    pub fn source_fps(&self) -> f64 {
        if self.fps_den == 0 {
            0.0
        } else {
            f64::from(self.fps_num) / f64::from(self.fps_den)
        }
    }

    /// Number of whole frames in the clip, at least one.
    pub fn frame_count(&self) -> u64 {
        let n = (self.duration_sec * self.source_fps()).floor();
        if n.is_finite() && n >= 1.0 { n as u64 } else { 1 }
    }

    /// Source frame index shown `elapsed_sec` after playback started.
    pub fn frame_index_at(&self, elapsed_sec: f64) -> u64 {
        let fps = self.source_fps();
        if !(fps.is_finite() && fps > 0.0) {
            return 0;
        }
        (elapsed_sec.max(0.0) * fps).floor() as u64
    }
}

pub fn is_ffmpeg_on_path() -> bool {
    std::process::Command::new("ffmpeg")
        .arg("-version")
        .stdout(std::process::Stdio::null())
        .stderr(std::process::Stdio::null())
        .status()
        .map(|s| s.success())
        .unwrap_or(false)
}

#[cfg(feature = "media-ffmpeg")]
pub fn probe_video(source_path: &Path) -> PhotocardResult<VideoSourceInfo> {
    #[derive(serde::Deserialize)]
    struct ProbeStream {
        codec_type: Option<String>,
        width: Option<u32>,
        height: Option<u32>,
        r_frame_rate: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeFormat {
        duration: Option<String>,
    }
    #[derive(serde::Deserialize)]
    struct ProbeOut {
        streams: Vec<ProbeStream>,
        format: Option<ProbeFormat>,
    }

    let out = std::process::Command::new("ffprobe")
        .args([
            "-v",
            "error",
            "-print_format",
            "json",
            "-show_streams",
            "-show_format",
        ])
        .arg(source_path)
        .output()
        .map_err(|e| PhotocardError::device(format!("failed to run ffprobe: {e}")))?;
    if !out.status.success() {
        return Err(PhotocardError::device(format!(
            "ffprobe failed for '{}': {}",
            source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    let parsed: ProbeOut = serde_json::from_slice(&out.stdout)
        .map_err(|e| PhotocardError::serde(format!("ffprobe json parse failed: {e}")))?;
    let video_stream = parsed
        .streams
        .iter()
        .find(|s| s.codec_type.as_deref() == Some("video"))
        .ok_or_else(|| PhotocardError::device("no video stream found"))?;
    let width = video_stream
        .width
        .ok_or_else(|| PhotocardError::device("missing video width from ffprobe"))?;
    let height = video_stream
        .height
        .ok_or_else(|| PhotocardError::device("missing video height from ffprobe"))?;

    let (fps_num, fps_den) = parse_ff_ratio(video_stream.r_frame_rate.as_deref().unwrap_or("0/1"))
        .ok_or_else(|| PhotocardError::device("invalid video r_frame_rate"))?;
    let duration_sec = parsed
        .format
        .as_ref()
        .and_then(|f| f.duration.as_ref())
        .and_then(|s| s.parse::<f64>().ok())
        .unwrap_or(0.0);
    let has_audio = parsed
        .streams
        .iter()
        .any(|s| s.codec_type.as_deref() == Some("audio"));

    Ok(VideoSourceInfo {
        source_path: source_path.to_path_buf(),
        width,
        height,
        fps_num,
        fps_den,
        duration_sec,
        has_audio,
    })
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn probe_video(_source_path: &Path) -> PhotocardResult<VideoSourceInfo> {
    Err(PhotocardError::device(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Decode up to `frame_count` consecutive frames starting at `start_time_sec` as straight RGBA8.
#[cfg(feature = "media-ffmpeg")]
pub fn decode_video_frames_rgba8(
    source: &VideoSourceInfo,
    start_time_sec: f64,
    frame_count: u32,
) -> PhotocardResult<Vec<Vec<u8>>> {
    if frame_count == 0 {
        return Ok(Vec::new());
    }

    let out = std::process::Command::new("ffmpeg")
        .args(["-v", "error", "-ss", &format!("{start_time_sec:.9}")])
        .arg("-i")
        .arg(&source.source_path)
        .args([
            "-frames:v",
            &frame_count.to_string(),
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "pipe:1",
        ])
        .output()
        .map_err(|e| PhotocardError::device(format!("failed to run ffmpeg for video decode: {e}")))?;

    if !out.status.success() {
        return Err(PhotocardError::device(format!(
            "ffmpeg video decode failed for '{}': {}",
            source.source_path.display(),
            String::from_utf8_lossy(&out.stderr).trim()
        )));
    }

    split_raw_frames(&out.stdout, source.width, source.height, frame_count)
}

#[cfg(not(feature = "media-ffmpeg"))]
pub fn decode_video_frames_rgba8(
    _source: &VideoSourceInfo,
    _start_time_sec: f64,
    _frame_count: u32,
) -> PhotocardResult<Vec<Vec<u8>>> {
    Err(PhotocardError::device(
        "video sources require the 'media-ffmpeg' feature",
    ))
}

/// Cut a rawvideo rgba byte stream into whole frames. A trailing partial frame is an error.
#[cfg(any(test, feature = "media-ffmpeg"))]
pub(crate) fn split_raw_frames(
    raw: &[u8],
    width: u32,
    height: u32,
    max_frames: u32,
) -> PhotocardResult<Vec<Vec<u8>>> {
    let expected_len = width as usize * height as usize * 4;
    if expected_len == 0 {
        return Err(PhotocardError::validation(
            "decoded video frame size is zero (invalid source dimensions)",
        ));
    }
    if !raw.len().is_multiple_of(expected_len) {
        return Err(PhotocardError::device(format!(
            "decoded video batch has invalid size: got {} bytes, expected multiples of {expected_len}",
            raw.len()
        )));
    }

    Ok(raw
        .chunks_exact(expected_len)
        .take(max_frames as usize)
        .map(<[u8]>::to_vec)
        .collect())
}

#[cfg_attr(not(feature = "media-ffmpeg"), allow(dead_code))]
fn parse_ff_ratio(s: &str) -> Option<(u32, u32)> {
    let mut parts = s.split('/');
    let a = parts.next()?.parse::<u32>().ok()?;
    let b = parts.next()?.parse::<u32>().ok()?;
    if b == 0 {
        return None;
    }
    Some((a, b))
}

#[cfg(test)]
#[path = "../../tests/unit/media/probe.rs"]
mod tests;
