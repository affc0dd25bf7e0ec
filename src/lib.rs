//! Photocard records a "photo card" video: a fan-club clip shown picture-in-picture over a live
//! camera feed, composited onto a square card and encoded into a downloadable file.
//!
//! The crate is host-agnostic. Cameras, microphones, overlay decoding, encoders and share/download
//! surfaces are traits; the [`SessionController`] sequences them:
//!
//! - Pick a collection and clip from the [`Catalog`]
//! - Drag, pinch and rotate the overlay with touch gestures
//! - Start: countdown, wait for the overlay to play, capture canvas frames
//! - Stop (or let the clip end), preview, then share or download
//!
//! Bundled implementations cover still images, video files decoded with `ffmpeg`
//! (feature `media-ffmpeg`) and an `ffmpeg` encoder.
#![forbid(unsafe_code)]

mod foundation;

pub(crate) mod capture;
pub(crate) mod catalog;
pub(crate) mod config;
pub(crate) mod devices;
pub(crate) mod export;
pub(crate) mod gesture;
pub(crate) mod layout;
pub(crate) mod media;
pub(crate) mod render;
pub(crate) mod session;

pub use crate::foundation::core::{
    Affine, FacingMode, OutputSide, Point, Rect, ResolutionHint, Rgba8, Size, TransformState,
};
pub use crate::foundation::error::{PhotocardError, PhotocardResult};

pub use crate::capture::buffer::{MediaBuffer, RecordedFile};
pub use crate::capture::encoder::{
    EncodeRequest, Encoder, EncoderFactory, RAW_MIME_TYPE, RawEncoderFactory,
};
pub use crate::capture::ffmpeg::{FfmpegEncoderFactory, container_for};
pub use crate::capture::pipeline::{CaptureFormat, CapturePipeline};
pub use crate::capture::profile::{
    EncodingProfile, PREFERRED_MIME_TYPES, VIDEO_BITS_PER_SECOND, extension_for_mime,
    select_profile,
};
pub use crate::catalog::model::{
    Catalog, CatalogData, ClipEntry, CollectionData, DEFAULT_SELECTION_NAME, display_name,
    locator, member_key,
};
pub use crate::config::{AudioPolicy, RecorderConfig, Variant};
pub use crate::devices::file::{
    DecoderTuning, FileCamera, FileMicrophone, FileOverlayLoader, FileOverlaySource,
};
pub use crate::devices::still::{
    ImageCamera, StillOverlay, StillOverlayLoader, decode_still, load_still,
};
pub use crate::devices::{
    AudioTrack, Camera, Microphone, NoMicrophone, OverlayLoader, OverlaySource, PlaybackEvent,
};
pub use crate::export::deliver::{
    DownloadDir, DownloadSurface, ExportOutcome, SHARE_TITLE, ShareSurface, deliver,
    export_file_name,
};
pub use crate::gesture::tracker::{GestureTracker, TouchPoint};
pub use crate::layout::geometry::{center_square_crop, cover_fit_scale, cover_fit_source};
pub use crate::layout::overlay::{
    LayoutCache, LayoutMeasurements, LayoutProbe, OverlayPlacement, ProportionalLayout,
};
pub use crate::media::probe::{VideoSourceInfo, is_ffmpeg_on_path, probe_video};
pub use crate::render::cadence::{Cadence, FrameThrottle};
pub use crate::render::compositor::{
    CameraInput, CardStyle, Compositor, CompositorSettings, MirrorRule, ShadowStyle,
};
pub use crate::render::frame::{FrameRGBA, VideoFrame};
pub use crate::session::controller::{Collaborators, SessionController};
pub use crate::session::state::{RecordingPhase, SessionState};
pub use crate::session::ui::{RecordButton, StatusLine, UiView};
