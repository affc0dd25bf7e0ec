use super::*;

const ENCODERS: &str = "\
Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libx264              libx264 H.264 / AVC / MPEG-4 AVC (codec h264)
 V....D libvpx               libvpx VP8 (codec vp8)
 A....D aac                  AAC (Advanced Audio Coding)
";

#[test]
fn encoder_list_parsing_skips_legend() {
    let names = parse_encoder_list(ENCODERS);
    assert_eq!(names, vec!["libx264", "libvpx", "aac"]);
}

#[test]
fn container_mapping_tolerates_spaces() {
    assert_eq!(
        container_for("video/webm; codecs=vp9,opus").map(|c| c.video_codec),
        Some("libvpx-vp9")
    );
    assert_eq!(container_for("video/webm").map(|c| c.video_codec), Some("libvpx"));
    assert_eq!(container_for("video/mp4").map(|c| c.muxer), Some("mp4"));
    assert!(container_for("video/ogg").is_none());
}

#[test]
fn support_follows_available_encoders() {
    let f = FfmpegEncoderFactory::with_encoders(parse_encoder_list(ENCODERS));
    assert!(f.supports("video/mp4"));
    assert!(f.supports("video/webm;codecs=vp8,opus"));
    assert!(!f.supports("video/webm;codecs=vp9,opus"));
    assert!(!f.supports("audio/ogg"));
}

#[test]
fn profile_selection_uses_factory_support() {
    let f = FfmpegEncoderFactory::with_encoders(vec!["libvpx-vp9".to_string()]);
    let p = crate::capture::profile::select_profile(|m| f.supports(m));
    assert_eq!(p.mime_type.as_deref(), Some("video/webm;codecs=vp9,opus"));
}

#[cfg(unix)]
fn shell_encoder(script: &str) -> FfmpegEncoder {
    let mut cmd = Command::new("sh");
    cmd.args(["-c", script]);
    let request = EncodeRequest {
        profile: crate::capture::profile::EncodingProfile::host_default(),
        width: 8,
        height: 8,
        fps: 30,
        audio: None,
        background: [0, 0, 0, 255],
    };
    FfmpegEncoder::attach(cmd, &request, "video/mp4").unwrap()
}

#[cfg(unix)]
fn opaque_frame() -> FrameRGBA {
    FrameRGBA {
        width: 8,
        height: 8,
        data: vec![255; 8 * 8 * 4],
        premultiplied: true,
    }
}

#[cfg(unix)]
#[test]
fn chatty_stderr_does_not_stall_the_pipe() {
    // Far more than a pipe buffer of stderr before any stdout is produced.
    let mut enc = Box::new(shell_encoder("head -c 300000 /dev/zero >&2; cat"));
    for _ in 0..4 {
        enc.push_frame(&opaque_frame()).unwrap();
    }
    let chunks = enc.finish().unwrap();
    let total: usize = chunks.iter().map(Vec::len).sum();
    assert_eq!(total, 4 * 8 * 8 * 4);
}

#[cfg(unix)]
#[test]
fn failed_exit_reports_stderr_text() {
    let enc = Box::new(shell_encoder("cat >/dev/null; echo boom >&2; exit 3"));
    let err = enc.finish().unwrap_err().to_string();
    assert!(err.contains("boom"), "{err}");
    assert!(err.contains("exit status: 3"), "{err}");
}

#[cfg(unix)]
#[test]
fn abort_reaps_a_running_child() {
    let mut enc = Box::new(shell_encoder("head -c 300000 /dev/zero >&2; exec sleep 30"));
    enc.push_frame(&opaque_frame()).unwrap();
    let started = std::time::Instant::now();
    enc.abort();
    assert!(started.elapsed() < std::time::Duration::from_secs(10));
}
