use std::{path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    devices::{Camera, OverlayLoader, OverlaySource, PlaybackEvent},
    foundation::core::{FacingMode, ResolutionHint},
    foundation::error::PhotocardResult,
    render::frame::VideoFrame,
};

/// Decode an image file or buffer into a straight-alpha frame.
pub fn decode_still(bytes: &[u8]) -> PhotocardResult<VideoFrame> {
    let rgba = image::load_from_memory(bytes)
        .context("decode image from memory")?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    VideoFrame::new(width, height, 0, rgba.into_raw())
}

pub fn load_still(path: &Path) -> PhotocardResult<VideoFrame> {
    let bytes =
        std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_still(&bytes)
}

/// A camera that shows one still picture while open.
#[derive(Clone, Debug)]
pub struct ImageCamera {
    frame: VideoFrame,
    facing: Option<FacingMode>,
    opens: u32,
}

impl ImageCamera {
    pub fn new(frame: VideoFrame) -> Self {
        Self {
            frame,
            facing: None,
            opens: 0,
        }
    }

    pub fn from_path(path: &Path) -> PhotocardResult<Self> {
        Ok(Self::new(load_still(path)?))
    }

    /// Facing mode of the current stream, `None` while closed.
    pub fn facing(&self) -> Option<FacingMode> {
        self.facing
    }

    /// How many times the camera has been (re)opened.
    pub fn open_count(&self) -> u32 {
        self.opens
    }
}

impl Camera for ImageCamera {
    fn open(&mut self, facing: FacingMode, hint: ResolutionHint) -> PhotocardResult<()> {
        tracing::debug!(?facing, ?hint, "opening still camera");
        self.facing = Some(facing);
        self.opens += 1;
        Ok(())
    }

    fn close(&mut self) {
        self.facing = None;
    }

    fn is_open(&self) -> bool {
        self.facing.is_some()
    }

    fn frame(&mut self, _now: Duration) -> Option<&VideoFrame> {
        self.facing.map(|_| &self.frame)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum StillPlayback {
    Paused,
    Starting { at: Duration },
    Playing { started: Duration },
    Ended,
}

/// Overlay source that shows a still for a fixed clip length.
///
/// `Playing` fires on the first advance at or after `startup` has passed since `play`, and
/// `Ended` once `clip_len` has elapsed after that.
#[derive(Clone, Debug)]
pub struct StillOverlay {
    frame: VideoFrame,
    startup: Duration,
    clip_len: Option<Duration>,
    state: StillPlayback,
}

impl StillOverlay {
    pub fn new(frame: VideoFrame) -> Self {
        Self {
            frame,
            startup: Duration::ZERO,
            clip_len: None,
            state: StillPlayback::Paused,
        }
    }

    pub fn with_startup(mut self, startup: Duration) -> Self {
        self.startup = startup;
        self
    }

    /// Clip length after which `Ended` fires. `None` plays forever.
    pub fn with_clip_len(mut self, clip_len: Option<Duration>) -> Self {
        self.clip_len = clip_len;
        self
    }

    pub fn is_playing(&self) -> bool {
        matches!(self.state, StillPlayback::Playing { .. })
    }
}

impl OverlaySource for StillOverlay {
    fn rewind(&mut self) {
        self.state = StillPlayback::Paused;
    }

    fn play(&mut self, now: Duration) {
        if let StillPlayback::Paused | StillPlayback::Ended = self.state {
            self.state = StillPlayback::Starting { at: now };
        }
    }

    fn pause(&mut self) {
        self.state = StillPlayback::Paused;
    }

    fn advance(&mut self, now: Duration, events: &mut Vec<PlaybackEvent>) {
        if let StillPlayback::Starting { at } = self.state
            && now.saturating_sub(at) >= self.startup
        {
            self.state = StillPlayback::Playing { started: now };
            events.push(PlaybackEvent::Playing);
        }
        if let StillPlayback::Playing { started } = self.state
            && let Some(len) = self.clip_len
            && now.saturating_sub(started) >= len
        {
            self.state = StillPlayback::Ended;
            events.push(PlaybackEvent::Ended);
        }
    }

    fn current_frame(&self) -> Option<&VideoFrame> {
        Some(&self.frame)
    }
}

/// Loader that answers every locator with the same poster frame.
#[derive(Clone, Debug)]
pub struct StillOverlayLoader {
    poster: StillOverlay,
    opened: Vec<String>,
}

impl StillOverlayLoader {
    pub fn new(poster: StillOverlay) -> Self {
        Self {
            poster,
            opened: Vec::new(),
        }
    }

    /// Locators requested so far, oldest first.
    pub fn opened(&self) -> &[String] {
        &self.opened
    }
}

impl OverlayLoader for StillOverlayLoader {
    fn open(&mut self, locator: &str) -> PhotocardResult<Box<dyn OverlaySource>> {
        tracing::debug!(locator, "opening still overlay");
        self.opened.push(locator.to_string());
        Ok(Box::new(self.poster.clone()))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/devices/still.rs"]
mod tests;
