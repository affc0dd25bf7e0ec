//! Camera and overlay sources decoded from video files with `ffmpeg`.

use std::{
    collections::{HashMap, VecDeque},
    path::{Path, PathBuf},
    sync::Arc,
    time::Duration,
};

use crate::{
    devices::{AudioTrack, Camera, Microphone, OverlayLoader, OverlaySource, PlaybackEvent},
    foundation::core::{FacingMode, ResolutionHint},
    foundation::error::{PhotocardError, PhotocardResult},
    media::probe::{self, VideoSourceInfo},
    render::frame::VideoFrame,
};

pub const ENV_VIDEO_CACHE_CAPACITY: &str = "PHOTOCARD_VIDEO_CACHE_CAPACITY";
pub const ENV_VIDEO_PREFETCH_FRAMES: &str = "PHOTOCARD_VIDEO_PREFETCH_FRAMES";

/// Decoded-frame cache size and ffmpeg batch length for file-backed clips.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DecoderTuning {
    pub cache_capacity: usize,
    pub prefetch_frames: u32,
}

impl Default for DecoderTuning {
    fn default() -> Self {
        Self {
            cache_capacity: 64,
            prefetch_frames: 12,
        }
    }
}

impl DecoderTuning {
    pub fn from_env() -> Self {
        Self::from_lookup(|k| std::env::var(k).ok())
    }

    /// Unparseable or zero values keep the default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            cache_capacity: lookup(ENV_VIDEO_CACHE_CAPACITY)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(d.cache_capacity),
            prefetch_frames: lookup(ENV_VIDEO_PREFETCH_FRAMES)
                .and_then(|v| v.trim().parse::<u32>().ok())
                .filter(|&n| n > 0)
                .unwrap_or(d.prefetch_frames),
        }
    }
}

/// Frame-indexed decoder with batch prefetch and an LRU of decoded frames.
pub(crate) struct ClipDecoder {
    info: Arc<VideoSourceInfo>,
    frame_cache: HashMap<u64, VideoFrame>,
    lru: VecDeque<u64>,
    capacity: usize,
    prefetch_frames: u32,
}

impl ClipDecoder {
    pub(crate) fn new(info: Arc<VideoSourceInfo>, tuning: DecoderTuning) -> Self {
        Self {
            info,
            frame_cache: HashMap::new(),
            lru: VecDeque::new(),
            capacity: tuning.cache_capacity.max(1),
            prefetch_frames: tuning.prefetch_frames.max(1),
        }
    }

    pub(crate) fn info(&self) -> &VideoSourceInfo {
        &self.info
    }

    pub(crate) fn frame(&mut self, index: u64) -> PhotocardResult<VideoFrame> {
        if let Some(f) = self.frame_cache.get(&index).cloned() {
            self.touch(index);
            return Ok(f);
        }

        let batch_start = index - index % u64::from(self.prefetch_frames);
        let fps = self.info.source_fps();
        let start_sec = if fps > 0.0 {
            batch_start as f64 / fps
        } else {
            0.0
        };
        let frames =
            probe::decode_video_frames_rgba8(&self.info, start_sec, self.prefetch_frames)?;
        tracing::trace!(
            path = %self.info.source_path.display(),
            batch_start,
            decoded = frames.len(),
            "prefetched clip frames"
        );
        for (offset, rgba) in frames.into_iter().enumerate() {
            let key = batch_start + offset as u64;
            if self.frame_cache.contains_key(&key) {
                continue;
            }
            let frame = VideoFrame::new(self.info.width, self.info.height, key, rgba)?;
            self.insert_frame(key, frame);
        }

        // Past the decodable end: hold the last frame of the batch.
        match self.frame_cache.get(&index).cloned() {
            Some(f) => {
                self.touch(index);
                Ok(f)
            }
            None => (batch_start..index)
                .rev()
                .find_map(|k| self.frame_cache.get(&k).cloned())
                .ok_or_else(|| {
                    PhotocardError::device(format!(
                        "ffmpeg returned no frame {index} for '{}'",
                        self.info.source_path.display()
                    ))
                }),
        }
    }

    fn insert_frame(&mut self, key: u64, frame: VideoFrame) {
        self.frame_cache.insert(key, frame);
        self.touch(key);
        while self.lru.len() > self.capacity {
            if let Some(old) = self.lru.pop_front() {
                self.frame_cache.remove(&old);
            }
        }
    }

    fn touch(&mut self, key: u64) {
        if let Some(pos) = self.lru.iter().position(|&k| k == key) {
            self.lru.remove(pos);
        }
        self.lru.push_back(key);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum FilePlayback {
    Paused { at_frame: u64 },
    Playing { started: Duration, announced: bool },
    Ended,
}

/// Overlay clip decoded from a file. Playback time is driven by `advance`.
pub struct FileOverlaySource {
    decoder: ClipDecoder,
    state: FilePlayback,
    current: Option<VideoFrame>,
}

impl FileOverlaySource {
    pub fn open(path: &Path) -> PhotocardResult<Self> {
        Self::open_with(path, DecoderTuning::from_env())
    }

    pub fn open_with(path: &Path, tuning: DecoderTuning) -> PhotocardResult<Self> {
        let info = probe::probe_video(path)?;
        tracing::debug!(
            path = %path.display(),
            width = info.width,
            height = info.height,
            fps = info.source_fps(),
            duration = info.duration_sec,
            "opened overlay clip"
        );
        Ok(Self {
            decoder: ClipDecoder::new(Arc::new(info), tuning),
            state: FilePlayback::Paused { at_frame: 0 },
            current: None,
        })
    }

    fn show(&mut self, index: u64) -> bool {
        match self.decoder.frame(index) {
            Ok(f) => {
                self.current = Some(f);
                true
            }
            Err(e) => {
                tracing::warn!("overlay frame {index} unavailable: {e}");
                false
            }
        }
    }
}

impl OverlaySource for FileOverlaySource {
    fn rewind(&mut self) {
        self.state = FilePlayback::Paused { at_frame: 0 };
        self.show(0);
    }

    fn play(&mut self, now: Duration) {
        let at_frame = match self.state {
            FilePlayback::Paused { at_frame } => at_frame,
            FilePlayback::Playing { .. } => return,
            FilePlayback::Ended => 0,
        };
        let fps = self.decoder.info().source_fps();
        let offset = if fps > 0.0 {
            Duration::from_secs_f64(at_frame as f64 / fps)
        } else {
            Duration::ZERO
        };
        self.state = FilePlayback::Playing {
            started: now.saturating_sub(offset),
            announced: false,
        };
    }

    fn pause(&mut self) {
        if let FilePlayback::Playing { .. } = self.state {
            let at_frame = self.current.as_ref().map_or(0, |f| f.seq);
            self.state = FilePlayback::Paused { at_frame };
        }
    }

    fn advance(&mut self, now: Duration, events: &mut Vec<PlaybackEvent>) {
        let FilePlayback::Playing { started, announced } = self.state else {
            return;
        };
        let info = self.decoder.info();
        let index = info.frame_index_at(now.saturating_sub(started).as_secs_f64());
        if index >= info.frame_count() {
            if !announced {
                events.push(PlaybackEvent::Playing);
            }
            self.state = FilePlayback::Ended;
            events.push(PlaybackEvent::Ended);
            return;
        }
        // `Playing` waits for the first frame that actually decoded.
        if self.show(index) && !announced {
            self.state = FilePlayback::Playing {
                started,
                announced: true,
            };
            events.push(PlaybackEvent::Playing);
        }
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        self.current.as_ref()
    }
}

/// Resolves catalog locators against a media root directory.
#[derive(Clone, Debug)]
pub struct FileOverlayLoader {
    root: PathBuf,
    tuning: DecoderTuning,
}

impl FileOverlayLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            tuning: DecoderTuning::default(),
        }
    }

    pub fn with_tuning(mut self, tuning: DecoderTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn resolve(&self, locator: &str) -> PathBuf {
        self.root.join(locator)
    }
}

impl OverlayLoader for FileOverlayLoader {
    fn open(&mut self, locator: &str) -> PhotocardResult<Box<dyn OverlaySource>> {
        let path = self.resolve(locator);
        Ok(Box::new(FileOverlaySource::open_with(&path, self.tuning)?))
    }
}

/// Camera that loops a video file, standing in for a live device.
pub struct FileCamera {
    path: PathBuf,
    tuning: DecoderTuning,
    decoder: Option<ClipDecoder>,
    started: Option<Duration>,
    current: Option<VideoFrame>,
}

impl FileCamera {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            tuning: DecoderTuning::default(),
            decoder: None,
            started: None,
            current: None,
        }
    }

    pub fn with_tuning(mut self, tuning: DecoderTuning) -> Self {
        self.tuning = tuning;
        self
    }
}

impl Camera for FileCamera {
    fn open(&mut self, facing: FacingMode, hint: ResolutionHint) -> PhotocardResult<()> {
        let info = probe::probe_video(&self.path)?;
        tracing::debug!(
            path = %self.path.display(),
            ?facing,
            ?hint,
            width = info.width,
            height = info.height,
            "opened file camera"
        );
        self.decoder = Some(ClipDecoder::new(Arc::new(info), self.tuning));
        self.started = None;
        self.current = None;
        Ok(())
    }

    fn close(&mut self) {
        self.decoder = None;
        self.current = None;
    }

    fn is_open(&self) -> bool {
        self.decoder.is_some()
    }

    fn frame(&mut self, now: Duration) -> Option<&VideoFrame> {
        let decoder = self.decoder.as_mut()?;
        let started = *self.started.get_or_insert(now);
        let info = decoder.info();
        let index =
            info.frame_index_at(now.saturating_sub(started).as_secs_f64()) % info.frame_count();
        match decoder.frame(index) {
            Ok(f) => self.current = Some(f),
            Err(e) => tracing::warn!("camera frame {index} unavailable: {e}"),
        }
        self.current.as_ref()
    }
}

/// Microphone whose track is an audio file on disk.
#[derive(Clone, Debug)]
pub struct FileMicrophone {
    path: PathBuf,
    next_id: u64,
    active: Vec<u64>,
}

impl FileMicrophone {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            next_id: 1,
            active: Vec::new(),
        }
    }
}

impl Microphone for FileMicrophone {
    fn acquire(&mut self) -> PhotocardResult<AudioTrack> {
        if !self.path.is_file() {
            return Err(PhotocardError::device(format!(
                "audio file '{}' not found",
                self.path.display()
            )));
        }
        let id = self.next_id;
        self.next_id += 1;
        self.active.push(id);
        Ok(AudioTrack {
            id,
            label: self.path.display().to_string(),
            source: Some(self.path.clone()),
        })
    }

    fn release(&mut self, track: AudioTrack) {
        self.active.retain(|&id| id != track.id);
    }

    fn active_tracks(&self) -> usize {
        self.active.len()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/devices/file.rs"]
mod tests;
