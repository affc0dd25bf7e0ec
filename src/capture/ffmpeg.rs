//! Encoder backed by the system `ffmpeg` binary.
//!
//! Raw RGBA frames go in on stdin; a fragmented container comes out on stdout so chunks are
//! available while recording, like a browser recorder's `dataavailable` events. One reader thread
//! drains stdout into a channel; the session polls it on its own turns.

use std::{
    cell::OnceCell,
    io::Read as _,
    process::{Child, ChildStdin, Command, Stdio},
    sync::mpsc,
    thread::JoinHandle,
};

use crate::{
    capture::{
        encoder::{EncodeRequest, Encoder, EncoderFactory},
        profile::essence,
    },
    foundation::error::{PhotocardError, PhotocardResult},
    media::probe::is_ffmpeg_on_path,
    render::{composite::flatten_to_opaque_rgba8, frame::FrameRGBA},
};

const READ_CHUNK_BYTES: usize = 64 * 1024;

/// ffmpeg muxer and codecs for one mime type.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContainerSpec {
    pub mime_type: &'static str,
    pub muxer: &'static str,
    pub video_codec: &'static str,
    pub audio_codec: &'static str,
    pub mux_flags: &'static [&'static str],
}

const MP4: ContainerSpec = ContainerSpec {
    mime_type: "video/mp4",
    muxer: "mp4",
    video_codec: "libx264",
    audio_codec: "aac",
    mux_flags: &["-movflags", "frag_keyframe+empty_moov+default_base_moof"],
};

const WEBM_VP8: ContainerSpec = ContainerSpec {
    mime_type: "video/webm;codecs=vp8,opus",
    muxer: "webm",
    video_codec: "libvpx",
    audio_codec: "libopus",
    mux_flags: &[],
};

const WEBM_VP9: ContainerSpec = ContainerSpec {
    mime_type: "video/webm;codecs=vp9,opus",
    muxer: "webm",
    video_codec: "libvpx-vp9",
    audio_codec: "libopus",
    mux_flags: &[],
};

/// Map a requested mime type onto an ffmpeg output. Plain `video/webm` means VP8.
pub fn container_for(mime_type: &str) -> Option<ContainerSpec> {
    let compact: String = mime_type.chars().filter(|c| !c.is_whitespace()).collect();
    match compact.as_str() {
        "video/mp4" => Some(MP4),
        "video/webm;codecs=vp8,opus" => Some(WEBM_VP8),
        "video/webm;codecs=vp9,opus" => Some(WEBM_VP9),
        "video/webm" => Some(ContainerSpec {
            mime_type: "video/webm",
            ..WEBM_VP8
        }),
        _ => None,
    }
}

/// Encoder names listed by `ffmpeg -encoders`.
fn list_encoders() -> Vec<String> {
    let out = match Command::new("ffmpeg")
        .args(["-hide_banner", "-encoders"])
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
    {
        Ok(out) if out.status.success() => out,
        _ => return Vec::new(),
    };
    parse_encoder_list(&String::from_utf8_lossy(&out.stdout))
}

/// Parse the table printed by `ffmpeg -encoders`: a flags column, then the encoder name.
pub(crate) fn parse_encoder_list(text: &str) -> Vec<String> {
    text.lines()
        .skip_while(|l| !l.trim_start().starts_with("------"))
        .skip(1)
        .filter_map(|l| {
            let mut cols = l.split_whitespace();
            let flags = cols.next()?;
            let name = cols.next()?;
            (flags.len() == 6).then(|| name.to_string())
        })
        .collect()
}

pub struct FfmpegEncoderFactory {
    encoders: OnceCell<Vec<String>>,
}

impl Default for FfmpegEncoderFactory {
    fn default() -> Self {
        Self::new()
    }
}

impl FfmpegEncoderFactory {
    pub fn new() -> Self {
        Self {
            encoders: OnceCell::new(),
        }
    }

    /// Factory with a fixed encoder list instead of asking the installed binary.
    pub fn with_encoders(encoders: Vec<String>) -> Self {
        Self {
            encoders: OnceCell::from(encoders),
        }
    }

    fn has_encoder(&self, name: &str) -> bool {
        self.encoders
            .get_or_init(list_encoders)
            .iter()
            .any(|e| e == name)
    }
}

impl EncoderFactory for FfmpegEncoderFactory {
    fn supports(&self, mime_type: &str) -> bool {
        container_for(mime_type).is_some_and(|c| self.has_encoder(c.video_codec))
    }

    fn create(&mut self, request: &EncodeRequest) -> PhotocardResult<Box<dyn Encoder>> {
        request.validate()?;
        let container = match request.profile.mime_type.as_deref() {
            Some(m) => container_for(m)
                .ok_or_else(|| PhotocardError::encode(format!("unsupported mime type '{m}'")))?,
            // Host default: webm/vp8 is the most widely built encoder.
            None => container_for("video/webm")
                .ok_or_else(|| PhotocardError::encode("no default container"))?,
        };
        if !is_ffmpeg_on_path() {
            return Err(PhotocardError::encode(
                "ffmpeg is required for recording, but was not found on PATH",
            ));
        }
        Ok(Box::new(FfmpegEncoder::spawn(request, container)?))
    }
}

type StderrDrain = JoinHandle<std::io::Result<Vec<u8>>>;

pub struct FfmpegEncoder {
    width: u32,
    height: u32,
    bg_rgba: [u8; 4],
    mime_type: String,
    child: Child,
    stdin: Option<ChildStdin>,
    chunks: mpsc::Receiver<Vec<u8>>,
    reader: Option<JoinHandle<()>>,
    stderr_drain: Option<StderrDrain>,
    scratch: Vec<u8>,
}

impl FfmpegEncoder {
    fn spawn(request: &EncodeRequest, container: ContainerSpec) -> PhotocardResult<Self> {
        let mut cmd = Command::new("ffmpeg");
        cmd.args([
            "-loglevel",
            "error",
            "-f",
            "rawvideo",
            "-pix_fmt",
            "rgba",
            "-s",
            &format!("{}x{}", request.width, request.height),
            "-r",
            &request.fps.to_string(),
            "-i",
            "pipe:0",
        ]);

        let audio_path = request.audio.as_ref().and_then(|t| t.source.as_ref());
        if let Some(path) = audio_path {
            cmd.arg("-i").arg(path);
            cmd.args(["-map", "0:v", "-map", "1:a", "-c:a", container.audio_codec]);
            cmd.arg("-shortest");
        } else {
            cmd.arg("-an");
        }

        cmd.args([
            "-c:v",
            container.video_codec,
            "-b:v",
            &request.profile.video_bits_per_second.to_string(),
            "-pix_fmt",
            "yuv420p",
        ]);
        cmd.args(container.mux_flags);
        cmd.args(["-f", container.muxer, "pipe:1"]);

        tracing::debug!(
            mime = container.mime_type,
            codec = container.video_codec,
            audio = audio_path.is_some(),
            "spawning ffmpeg encoder"
        );

        // The system binary keeps native FFmpeg libraries out of the build.
        Self::attach(cmd, request, essence(container.mime_type))
    }

    /// Spawn `cmd` with piped stdio and start draining its stdout and stderr.
    ///
    /// The process reads raw RGBA frames on stdin and writes the container on stdout.
    fn attach(
        mut cmd: Command,
        request: &EncodeRequest,
        mime_type: &str,
    ) -> PhotocardResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(|e| {
            PhotocardError::encode(format!(
                "failed to spawn ffmpeg (is it installed and on PATH?): {e}"
            ))
        })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| PhotocardError::encode("failed to open ffmpeg stdin (unexpected)"))?;
        let mut stdout = child
            .stdout
            .take()
            .ok_or_else(|| PhotocardError::encode("failed to open ffmpeg stdout (unexpected)"))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| PhotocardError::encode("failed to open ffmpeg stderr (unexpected)"))?;

        // stderr must be drained concurrently: a full pipe would block ffmpeg, and with it both
        // the stdout reader and our stdin writes.
        let stderr_drain = std::thread::Builder::new()
            .name("photocard-ffmpeg-stderr".to_string())
            .spawn(move || {
                let mut bytes = Vec::new();
                stderr.read_to_end(&mut bytes)?;
                Ok(bytes)
            });
        let stderr_drain = match stderr_drain {
            Ok(h) => h,
            Err(e) => {
                kill_and_reap(&mut child);
                return Err(PhotocardError::encode(format!(
                    "failed to start stderr thread: {e}"
                )));
            }
        };

        let (tx, rx) = mpsc::channel();
        let reader = std::thread::Builder::new()
            .name("photocard-ffmpeg-reader".to_string())
            .spawn(move || {
                let mut buf = vec![0u8; READ_CHUNK_BYTES];
                loop {
                    match stdout.read(&mut buf) {
                        Ok(0) => break,
                        Ok(n) => {
                            if tx.send(buf[..n].to_vec()).is_err() {
                                break;
                            }
                        }
                        Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
                        Err(e) => {
                            tracing::warn!("ffmpeg stdout read failed: {e}");
                            break;
                        }
                    }
                }
            });
        let reader = match reader {
            Ok(h) => h,
            Err(e) => {
                drop(stdin);
                kill_and_reap(&mut child);
                let _ = stderr_drain.join();
                return Err(PhotocardError::encode(format!(
                    "failed to start reader thread: {e}"
                )));
            }
        };

        Ok(Self {
            width: request.width,
            height: request.height,
            bg_rgba: request.background,
            mime_type: mime_type.to_string(),
            child,
            stdin: Some(stdin),
            chunks: rx,
            reader: Some(reader),
            stderr_drain: Some(stderr_drain),
            scratch: vec![0u8; request.width as usize * request.height as usize * 4],
        })
    }

    fn drain(&mut self, out: &mut Vec<Vec<u8>>) {
        while let Ok(chunk) = self.chunks.try_recv() {
            out.push(chunk);
        }
    }

    fn join_threads(&mut self) -> PhotocardResult<Vec<u8>> {
        if let Some(reader) = self.reader.take()
            && reader.join().is_err()
        {
            tracing::warn!("ffmpeg reader thread panicked");
        }
        match self.stderr_drain.take() {
            Some(handle) => handle
                .join()
                .map_err(|_| PhotocardError::encode("ffmpeg stderr drain thread panicked"))?
                .map_err(|e| PhotocardError::encode(format!("ffmpeg stderr read failed: {e}"))),
            None => Ok(Vec::new()),
        }
    }
}

fn kill_and_reap(child: &mut Child) {
    if let Err(e) = child.kill() {
        tracing::debug!("ffmpeg already exited: {e}");
    }
    let _ = child.wait();
}

impl Encoder for FfmpegEncoder {
    fn mime_type(&self) -> &str {
        &self.mime_type
    }

    fn push_frame(&mut self, frame: &FrameRGBA) -> PhotocardResult<()> {
        if frame.width != self.width || frame.height != self.height {
            return Err(PhotocardError::validation(format!(
                "frame size mismatch: got {}x{}, expected {}x{}",
                frame.width, frame.height, self.width, self.height
            )));
        }
        flatten_to_opaque_rgba8(&mut self.scratch, &frame.data, self.bg_rgba)?;

        let Some(stdin) = self.stdin.as_mut() else {
            return Err(PhotocardError::encode("ffmpeg encoder is already finalized"));
        };

        use std::io::Write as _;
        stdin.write_all(&self.scratch).map_err(|e| {
            PhotocardError::encode(format!("failed to write frame to ffmpeg stdin: {e}"))
        })?;
        Ok(())
    }

    fn poll_chunks(&mut self, out: &mut Vec<Vec<u8>>) -> PhotocardResult<()> {
        self.drain(out);
        Ok(())
    }

    fn finish(mut self: Box<Self>) -> PhotocardResult<Vec<Vec<u8>>> {
        drop(self.stdin.take());
        let status = self.child.wait().map_err(|e| {
            PhotocardError::encode(format!("failed to wait for ffmpeg to finish: {e}"))
        })?;
        let stderr_bytes = self.join_threads()?;

        let mut out = Vec::new();
        self.drain(&mut out);

        if !status.success() {
            let stderr = String::from_utf8_lossy(&stderr_bytes);
            return Err(PhotocardError::encode(format!(
                "ffmpeg exited with status {status}: {}",
                stderr.trim()
            )));
        }
        Ok(out)
    }

    fn abort(mut self: Box<Self>) {
        drop(self.stdin.take());
        kill_and_reap(&mut self.child);
        if let Err(e) = self.join_threads() {
            tracing::debug!("ffmpeg teardown: {e}");
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/ffmpeg.rs"]
mod tests;
