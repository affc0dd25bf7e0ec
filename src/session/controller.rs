//! Session controller: idle -> counting down -> recording -> previewing -> idle.
//!
//! The host drives it with [`SessionController::tick`] once per display refresh and with the
//! command methods on user input. Every call is a short, non-overlapping turn; waits (countdown,
//! overlay start-up) are sub-states with deadlines checked on ticks, so cancelling a wait is just
//! leaving the state.

use std::time::Duration;

use crate::{
    capture::{
        buffer::{MediaBuffer, RecordedFile},
        encoder::EncoderFactory,
        pipeline::CapturePipeline,
    },
    catalog::model::{Catalog, ClipEntry},
    config::{AudioPolicy, RecorderConfig},
    devices::{AudioTrack, Camera, Microphone, OverlayLoader, PlaybackEvent},
    export::deliver::{self, DownloadSurface, ExportOutcome, ShareSurface},
    foundation::core::{FacingMode, TransformState},
    foundation::error::{PhotocardError, PhotocardResult},
    gesture::tracker::{GestureTracker, TouchPoint},
    layout::overlay::LayoutProbe,
    render::{
        compositor::{CameraInput, Compositor},
        frame::FrameRGBA,
    },
    session::{
        state::{RecordingPhase, SessionState},
        ui::{RecordButton, StatusLine, UiView},
    },
};

const READY: &str = "Ready to record";

/// Host collaborators handed to the controller.
pub struct Collaborators {
    pub camera: Box<dyn Camera>,
    pub microphone: Box<dyn Microphone>,
    pub overlays: Box<dyn OverlayLoader>,
    pub encoders: Box<dyn EncoderFactory>,
}

#[derive(Clone, Debug, Default)]
struct Selection {
    collection: Option<String>,
    clip: Option<ClipEntry>,
}

pub struct SessionController {
    config: RecorderConfig,
    catalog: Catalog,
    camera: Box<dyn Camera>,
    microphone: Box<dyn Microphone>,
    overlays: Box<dyn OverlayLoader>,
    encoders: Box<dyn EncoderFactory>,
    compositor: Compositor,
    capture: CapturePipeline,
    gesture: GestureTracker,
    transform: TransformState,
    state: SessionState,
    selection: Selection,
    status: StatusLine,
    facing: FacingMode,
    facing_locked_until: Option<Duration>,
    audio: Option<AudioTrack>,
    audio_denied: bool,
    events: Vec<PlaybackEvent>,
    now: Duration,
}

impl SessionController {
    pub fn new(
        config: RecorderConfig,
        catalog: Catalog,
        devices: Collaborators,
    ) -> PhotocardResult<Self> {
        config.validate()?;
        let compositor = Compositor::new(config.compositor_settings())?;
        let capture = CapturePipeline::new(config.capture_format());
        Ok(Self {
            facing: config.initial_facing,
            config,
            catalog,
            camera: devices.camera,
            microphone: devices.microphone,
            overlays: devices.overlays,
            encoders: devices.encoders,
            compositor,
            capture,
            gesture: GestureTracker::new(),
            transform: TransformState::IDENTITY,
            state: SessionState::Idle,
            selection: Selection::default(),
            status: StatusLine::default(),
            facing_locked_until: None,
            audio: None,
            audio_denied: false,
            events: Vec::new(),
            now: Duration::ZERO,
        })
    }

    // --- accessors ---

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn config(&self) -> &RecorderConfig {
        &self.config
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn transform(&self) -> TransformState {
        self.transform
    }

    pub fn facing(&self) -> FacingMode {
        self.facing
    }

    pub fn camera(&self) -> &dyn Camera {
        self.camera.as_ref()
    }

    pub fn microphone(&self) -> &dyn Microphone {
        self.microphone.as_ref()
    }

    pub fn compositor(&self) -> &Compositor {
        &self.compositor
    }

    pub fn last_frame(&self) -> &FrameRGBA {
        self.compositor.last_frame()
    }

    pub fn buffer(&self) -> &MediaBuffer {
        self.capture.buffer()
    }

    pub fn recorded_file(&self) -> Option<&RecordedFile> {
        match &self.state {
            SessionState::Previewing { file } => Some(file),
            _ => None,
        }
    }

    pub fn status_text(&self) -> &str {
        self.status.text()
    }

    pub fn selected_collection(&self) -> Option<&str> {
        self.selection.collection.as_deref()
    }

    pub fn selected_clip(&self) -> Option<&ClipEntry> {
        self.selection.clip.as_ref()
    }

    /// Clips of the selected collection in display order.
    pub fn clips(&self) -> Vec<ClipEntry> {
        self.selection
            .collection
            .as_deref()
            .and_then(|c| self.catalog.clips(c))
            .unwrap_or_default()
    }

    // --- camera ---

    /// (Re)open the camera with the current facing mode. Failure is reported in the status line.
    pub fn init_camera(&mut self, now: Duration) -> bool {
        self.now = now;
        match self.camera.open(self.facing, self.config.resolution) {
            Ok(()) => {
                tracing::info!(facing = ?self.facing, "camera ready");
                self.status_ready(now);
                true
            }
            Err(e) => {
                tracing::error!("camera unavailable: {e}");
                self.status
                    .set("Camera access denied or unavailable.", None);
                false
            }
        }
    }

    /// Flip between the user- and environment-facing camera. Debounced, and refused while a
    /// capture is pending or running.
    pub fn toggle_facing(&mut self, now: Duration) -> bool {
        self.now = now;
        if !matches!(self.state, SessionState::Idle | SessionState::Previewing { .. }) {
            tracing::warn!(state = self.state.name(), "cannot flip camera while recording");
            return false;
        }
        if self.facing_locked_until.is_some_and(|t| now < t) {
            return false;
        }
        self.facing = self.facing.flipped();
        self.facing_locked_until = Some(now + self.config.facing_debounce());
        self.camera.close();
        self.init_camera(now);
        true
    }

    // --- selection ---

    /// Pick a collection (or none). Clears the clip and resets the transform.
    pub fn select_collection(&mut self, name: Option<&str>) -> PhotocardResult<bool> {
        if !self.state.is_idle() {
            return Ok(false);
        }
        if let Some(n) = name
            && !self.catalog.has_collection(n)
        {
            return Err(PhotocardError::validation(format!("unknown collection '{n}'")));
        }
        self.selection.collection = name.map(str::to_string);
        self.clear_overlay();
        Ok(true)
    }

    /// Pick a clip of the selected collection by display name and load it as the overlay.
    pub fn select_clip(&mut self, display_name: &str) -> PhotocardResult<bool> {
        if !self.state.is_idle() {
            return Ok(false);
        }
        let collection = self
            .selection
            .collection
            .as_deref()
            .ok_or_else(|| PhotocardError::validation("select a collection first"))?;
        let entry = self
            .catalog
            .find_clip(collection, display_name)
            .ok_or_else(|| {
                PhotocardError::validation(format!(
                    "no clip '{display_name}' in collection '{collection}'"
                ))
            })?;

        let source = match self.overlays.open(&entry.locator) {
            Ok(s) => s,
            Err(e) => {
                self.status.set("Could not load clip.", None);
                return Err(e);
            }
        };
        tracing::info!(locator = %entry.locator, "overlay selected");
        self.compositor.set_overlay(Some(source));
        self.selection.clip = Some(entry);
        self.reset_transform();
        Ok(true)
    }

    pub fn clear_clip(&mut self) -> bool {
        if !self.state.is_idle() {
            return false;
        }
        self.clear_overlay();
        true
    }

    fn clear_overlay(&mut self) {
        self.compositor.set_overlay(None);
        self.selection.clip = None;
        self.reset_transform();
    }

    fn reset_transform(&mut self) {
        self.gesture.end();
        self.transform = TransformState::IDENTITY;
    }

    // --- gestures ---

    fn gestures_enabled(&self) -> bool {
        self.state.is_idle() && self.compositor.has_overlay()
    }

    pub fn touch_start(&mut self, touches: &[TouchPoint]) -> bool {
        if !self.gestures_enabled() {
            return false;
        }
        self.gesture.begin(touches, self.transform);
        self.gesture.is_active()
    }

    pub fn touch_move(&mut self, touches: &[TouchPoint]) -> bool {
        if !self.gestures_enabled() {
            self.gesture.end();
            return false;
        }
        match self.gesture.update(touches) {
            Some(t) => {
                self.transform = t;
                true
            }
            None => false,
        }
    }

    pub fn touch_end(&mut self) {
        self.gesture.end();
    }

    // --- layout ---

    pub fn set_layout_probe(&mut self, probe: Option<Box<dyn LayoutProbe>>) {
        self.compositor.set_layout_probe(probe);
    }

    /// Viewport resized or rotated: measure the layout again on the next render.
    pub fn invalidate_layout(&mut self) {
        self.compositor.invalidate_layout();
    }

    // --- recording ---

    /// The record button: cancel while counting down, start while idle, stop while recording.
    pub fn press_record(&mut self, now: Duration) -> PhotocardResult<bool> {
        match self.state {
            SessionState::CountingDown { .. } => Ok(self.cancel(now)),
            SessionState::Idle => self.start(now),
            SessionState::Recording { .. } => self.stop(now),
            SessionState::Previewing { .. } => Ok(false),
        }
    }

    /// Begin an attempt. The encoder is built here so an unsupported environment fails before
    /// the countdown; in that case the session stays idle with the microphone released.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn start(&mut self, now: Duration) -> PhotocardResult<bool> {
        self.now = now;
        if !self.state.is_idle() {
            return Ok(false);
        }
        if !self.camera.is_open() {
            self.status.set("Camera not ready.", None);
            return Ok(false);
        }

        self.capture.reset();
        self.audio_denied = false;
        self.gesture.end();
        if self.config.audio == AudioPolicy::BeforeCountdown {
            self.status.set("Connecting Microphone...", None);
            self.acquire_microphone();
        }
        if self.config.audio != AudioPolicy::AtCapture {
            self.prepare_encoder()?;
        }

        let ticks = self.config.countdown_ticks;
        if ticks == 0 {
            self.begin_filming(now)?;
        } else {
            self.state = SessionState::CountingDown {
                remaining: ticks,
                next_tick_at: now + self.config.countdown_tick(),
            };
            self.status_countdown(ticks);
        }
        tracing::info!(state = self.state.name(), "recording attempt started");
        Ok(true)
    }

    /// Abort a running countdown. Nothing is recorded and the microphone is released.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn cancel(&mut self, now: Duration) -> bool {
        self.now = now;
        if !matches!(self.state, SessionState::CountingDown { .. }) {
            return false;
        }
        self.abandon_attempt();
        self.status_ready(now);
        tracing::info!("countdown cancelled");
        true
    }

    /// Finish recording. Before the overlay started producing frames nothing was captured, so
    /// the attempt is abandoned instead.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn stop(&mut self, now: Duration) -> PhotocardResult<bool> {
        self.now = now;
        match self.state {
            SessionState::Recording {
                phase: RecordingPhase::Capturing,
                ..
            } => {
                self.finish_recording()?;
                Ok(true)
            }
            SessionState::Recording {
                phase: RecordingPhase::AwaitingOverlay { .. },
                ..
            } => {
                self.abandon_attempt();
                self.status_ready(now);
                tracing::info!("recording stopped before the overlay started");
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    /// Drop the previewed file and go back to idle.
    #[tracing::instrument(skip(self), level = "debug")]
    pub fn reset(&mut self, now: Duration) -> bool {
        self.now = now;
        if !matches!(self.state, SessionState::Previewing { .. }) {
            return false;
        }
        self.capture.reset();
        self.state = SessionState::Idle;
        self.status_ready(now);
        true
    }

    /// Share or download the previewed file.
    pub fn export(
        &self,
        timestamp_ms: u64,
        share: Option<&mut dyn ShareSurface>,
        download: &mut dyn DownloadSurface,
    ) -> PhotocardResult<ExportOutcome> {
        let SessionState::Previewing { file } = &self.state else {
            return Err(PhotocardError::export("no recording to export"));
        };
        let name = deliver::export_file_name(
            self.selection.clip.as_ref().map(|c| c.display_name.as_str()),
            timestamp_ms,
            &file.extension,
        );
        deliver::deliver(file, &name, share, download)
    }

    /// One refresh: advance countdown and overlay, render if due, feed and drain the encoder.
    pub fn tick(&mut self, now: Duration) -> PhotocardResult<()> {
        self.now = now;

        if let SessionState::CountingDown {
            remaining,
            next_tick_at,
        } = self.state
            && now >= next_tick_at
        {
            let remaining = remaining - 1;
            if remaining == 0 {
                self.begin_filming(now)?;
            } else {
                self.state = SessionState::CountingDown {
                    remaining,
                    next_tick_at: next_tick_at + self.config.countdown_tick(),
                };
                self.status_countdown(remaining);
            }
        }

        let mut events = std::mem::take(&mut self.events);
        self.compositor.advance_overlay(now, &mut events);
        for ev in events.drain(..) {
            self.on_playback(ev, now)?;
        }
        self.events = events;

        if let SessionState::Recording {
            phase: RecordingPhase::AwaitingOverlay { deadline },
            ..
        } = self.state
            && now >= deadline
        {
            tracing::warn!("overlay did not start playing in time; recording anyway");
            self.arm()?;
        }

        let cadence = self.state.cadence();
        let camera = CameraInput {
            frame: self.camera.frame(now),
            facing: self.facing,
        };
        let pushed = match self
            .compositor
            .render_if_due(now, cadence, camera, self.transform)?
        {
            Some(canvas) => self.capture.push_frame(canvas),
            None => Ok(()),
        };
        let pumped = pushed.and_then(|()| self.capture.pump());
        if let Err(e) = pumped {
            self.fail_attempt(&e);
            return Err(e);
        }
        Ok(())
    }

    fn on_playback(&mut self, ev: PlaybackEvent, now: Duration) -> PhotocardResult<()> {
        let SessionState::Recording { phase, .. } = self.state else {
            return Ok(());
        };
        match (ev, phase) {
            (PlaybackEvent::Playing, RecordingPhase::AwaitingOverlay { .. }) => self.arm(),
            (PlaybackEvent::Ended, RecordingPhase::Capturing) => {
                tracing::info!("overlay ended; stopping");
                self.stop(now).map(|_| ())
            }
            _ => Ok(()),
        }
    }

    fn begin_filming(&mut self, now: Duration) -> PhotocardResult<()> {
        if self.config.audio == AudioPolicy::AtCapture {
            self.acquire_microphone();
            self.prepare_encoder()?;
        }
        if self.compositor.rewind_and_play_overlay(now) {
            self.state = SessionState::Recording {
                phase: RecordingPhase::AwaitingOverlay {
                    deadline: now + self.config.overlay_wait(),
                },
                started_at: now,
            };
            Ok(())
        } else {
            self.state = SessionState::Recording {
                phase: RecordingPhase::Capturing,
                started_at: now,
            };
            self.arm()
        }
    }

    fn arm(&mut self) -> PhotocardResult<()> {
        if let Err(e) = self.capture.arm() {
            self.fail_attempt(&e);
            return Err(e);
        }
        if let SessionState::Recording { phase, .. } = &mut self.state {
            *phase = RecordingPhase::Capturing;
        }
        self.status.set("Recording...", None);
        tracing::info!("encoder armed");
        Ok(())
    }

    fn prepare_encoder(&mut self) -> PhotocardResult<()> {
        let audio = self.audio.clone();
        if let Err(e) = self.capture.prepare(self.encoders.as_mut(), audio) {
            tracing::error!("encoder unavailable: {e}");
            self.abandon_attempt();
            self.status.set("Recording not supported.", None);
            return Err(e);
        }
        Ok(())
    }

    fn finish_recording(&mut self) -> PhotocardResult<()> {
        self.compositor.pause_overlay();
        self.release_microphone();
        let started_at = match self.state {
            SessionState::Recording { started_at, .. } => started_at,
            _ => self.now,
        };
        match self.capture.finalize() {
            Ok(file) => {
                tracing::info!(
                    bytes = file.len(),
                    mime = %file.mime_type,
                    elapsed_ms = self.now.saturating_sub(started_at).as_millis() as u64,
                    "recording ready for preview"
                );
                self.state = SessionState::Previewing { file };
                self.status.set("Previewing Recording", None);
                Ok(())
            }
            Err(e) => {
                self.fail_attempt(&e);
                Err(e)
            }
        }
    }

    /// Tear down everything an attempt holds and return to idle.
    fn abandon_attempt(&mut self) {
        self.capture.discard();
        self.release_microphone();
        self.compositor.pause_overlay();
        self.state = SessionState::Idle;
    }

    fn fail_attempt(&mut self, e: &PhotocardError) {
        tracing::error!("recording failed: {e}");
        self.abandon_attempt();
        self.status.set("Recording failed.", None);
    }

    fn acquire_microphone(&mut self) {
        if self.audio.is_some() {
            return;
        }
        match self.microphone.acquire() {
            Ok(track) => {
                tracing::debug!(label = %track.label, "microphone acquired");
                self.audio = Some(track);
            }
            Err(e) => {
                tracing::warn!("could not get microphone access: {e}");
                self.audio_denied = true;
            }
        }
    }

    fn release_microphone(&mut self) {
        if let Some(track) = self.audio.take() {
            tracing::debug!(label = %track.label, "microphone released");
            self.microphone.release(track);
        }
    }

    fn status_ready(&mut self, now: Duration) {
        self.status.set(READY, Some(now + self.config.status_hide()));
    }

    fn status_countdown(&mut self, remaining: u32) {
        let text = if self.audio_denied {
            format!("Starting in {remaining}... (no microphone)")
        } else {
            format!("Starting in {remaining}...")
        };
        self.status.set(text, None);
    }

    // --- view ---

    pub fn ui(&self) -> UiView {
        let now = self.now;
        let (record_button, show_playback) = match &self.state {
            SessionState::Idle => (RecordButton::Start, false),
            SessionState::CountingDown { .. } => (RecordButton::Cancel, false),
            SessionState::Recording { .. } => (RecordButton::Stop, false),
            SessionState::Previewing { .. } => (RecordButton::Hidden, true),
        };
        let idle = self.state.is_idle();
        let countdown_progress = match self.state {
            SessionState::CountingDown {
                remaining,
                next_tick_at,
            } => {
                let total = self.config.countdown_ticks.max(1) as f64;
                let tick = self.config.countdown_tick().as_secs_f64();
                let left_in_tick = next_tick_at.saturating_sub(now).as_secs_f64();
                let partial = if tick > 0.0 { 1.0 - left_in_tick / tick } else { 1.0 };
                let done = (self.config.countdown_ticks - remaining) as f64 + partial;
                Some((done / total).clamp(0.0, 1.0))
            }
            _ => None,
        };

        UiView {
            state: self.state.name(),
            record_button,
            record_enabled: self.camera.is_open(),
            selection_visible: idle,
            flip_visible: idle,
            countdown_progress,
            show_playback,
            overlay_visible: self.compositor.has_overlay() && !show_playback,
            export_visible: show_playback,
            reset_visible: show_playback,
            gestures_enabled: self.gestures_enabled(),
            status: self.status.visible_at(now).map(str::to_string),
        }
    }
}
