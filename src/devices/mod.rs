//! Host collaborators consumed through narrow contracts.
//!
//! The session controller owns the [`Camera`] and [`Microphone`]; the compositor owns the
//! [`OverlaySource`]. Implementations backed by still images live in [`still`]; ffmpeg-backed
//! file sources live in [`file`].

use std::{path::PathBuf, time::Duration};

use crate::{
    foundation::core::{FacingMode, ResolutionHint},
    foundation::error::PhotocardResult,
    render::frame::VideoFrame,
};

pub(crate) mod file;
pub(crate) mod still;

/// A live camera.
pub trait Camera {
    /// Start (or restart) capture with the given facing mode.
    fn open(&mut self, facing: FacingMode, hint: ResolutionHint) -> PhotocardResult<()>;
    /// Stop every track of the current stream.
    fn close(&mut self);
    fn is_open(&self) -> bool;
    /// Latest frame at `now`, or `None` before the first frame arrives.
    fn frame(&mut self, now: Duration) -> Option<&VideoFrame>;
}

/// A handle to one live microphone track.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioTrack {
    pub id: u64,
    pub label: String,
    /// Media the encoder can read the track from, when the host exposes one.
    pub source: Option<PathBuf>,
}

pub trait Microphone {
    /// Request a track. Errors on permission denial or missing hardware.
    fn acquire(&mut self) -> PhotocardResult<AudioTrack>;
    /// Stop the track and give the hardware back.
    fn release(&mut self, track: AudioTrack);
    /// Number of tracks currently holding the device.
    fn active_tracks(&self) -> usize;
}

/// Microphone that is never available. Recording degrades to video only.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoMicrophone;

impl Microphone for NoMicrophone {
    fn acquire(&mut self) -> PhotocardResult<AudioTrack> {
        Err(crate::PhotocardError::device("no microphone available"))
    }

    fn release(&mut self, _track: AudioTrack) {}

    fn active_tracks(&self) -> usize {
        0
    }
}

/// Playback notifications from an overlay source, in the order they happened.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PlaybackEvent {
    /// Playback started and frames are actually being produced.
    Playing,
    /// Playback reached the end of the clip.
    Ended,
}

/// The picture-in-picture clip.
pub trait OverlaySource {
    /// Seek to the first frame.
    fn rewind(&mut self);
    fn play(&mut self, now: Duration);
    fn pause(&mut self);
    /// Advance playback to `now`, appending any events that fired.
    fn advance(&mut self, now: Duration, events: &mut Vec<PlaybackEvent>);
    /// Frame to draw, or `None` when nothing displayable is buffered yet.
    fn current_frame(&self) -> Option<&VideoFrame>;
}

/// Opens overlay sources from catalog locators.
pub trait OverlayLoader {
    fn open(&mut self, locator: &str) -> PhotocardResult<Box<dyn OverlaySource>>;
}
