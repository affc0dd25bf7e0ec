//! Recorder configuration.
//!
//! The product iterations of the widget differ only in a handful of knobs, so they are expressed
//! as [`Variant`] presets over one [`RecorderConfig`] rather than as separate code paths.

use std::{path::Path, time::Duration};

use anyhow::Context as _;

use crate::{
    capture::pipeline::CaptureFormat,
    foundation::core::{FacingMode, OutputSide, ResolutionHint},
    foundation::error::{PhotocardError, PhotocardResult},
    layout::overlay::ProportionalLayout,
    render::compositor::{CardStyle, CompositorSettings, MirrorRule},
};

pub const ENV_OUTPUT_SIDE: &str = "PHOTOCARD_OUTPUT_SIDE";
pub const ENV_OVERLAY_WAIT_MS: &str = "PHOTOCARD_OVERLAY_WAIT_MS";
pub const ENV_ACTIVE_FPS: &str = "PHOTOCARD_ACTIVE_FPS";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// Three-second countdown, microphone requested before it starts.
    #[default]
    Countdown,
    /// No countdown; microphone requested when capture begins.
    Instant,
    /// Tighter crop, never mirrored, microphone requested when capture begins.
    Classic,
}

/// When the microphone is requested.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioPolicy {
    #[default]
    BeforeCountdown,
    AtCapture,
    Never,
}

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct RecorderConfig {
    pub output_side: u32,
    pub idle_fps: u32,
    pub active_fps: u32,
    /// Countdown length in ticks; zero starts recording immediately.
    pub countdown_ticks: u32,
    pub countdown_tick_ms: u64,
    /// How long to wait for the overlay to start producing frames before arming anyway.
    pub overlay_wait_ms: u64,
    pub facing_debounce_ms: u64,
    pub status_hide_ms: u64,
    pub crop_ratio: f64,
    pub mirror: MirrorRule,
    pub audio: AudioPolicy,
    pub initial_facing: FacingMode,
    pub resolution: ResolutionHint,
    pub style: CardStyle,
    pub layout: ProportionalLayout,
}

impl Default for RecorderConfig {
    fn default() -> Self {
        Self {
            output_side: 1080,
            idle_fps: 1,
            active_fps: 30,
            countdown_ticks: 3,
            countdown_tick_ms: 1000,
            overlay_wait_ms: 5000,
            facing_debounce_ms: 800,
            status_hide_ms: 2000,
            crop_ratio: 1.0,
            mirror: MirrorRule::UserFacing,
            audio: AudioPolicy::BeforeCountdown,
            initial_facing: FacingMode::Environment,
            resolution: ResolutionHint::default(),
            style: CardStyle::default(),
            layout: ProportionalLayout::default(),
        }
    }
}

impl RecorderConfig {
    pub fn variant(variant: Variant) -> Self {
        let base = Self::default();
        match variant {
            Variant::Countdown => base,
            Variant::Instant => Self {
                countdown_ticks: 0,
                audio: AudioPolicy::AtCapture,
                ..base
            },
            Variant::Classic => Self {
                crop_ratio: 0.9,
                mirror: MirrorRule::Never,
                audio: AudioPolicy::AtCapture,
                ..base
            },
        }
    }

    pub fn from_json(text: &str) -> PhotocardResult<Self> {
        let cfg: Self = serde_json::from_str(text)
            .map_err(|e| PhotocardError::serde(format!("config json: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    pub fn load(path: &Path) -> PhotocardResult<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("read config '{}'", path.display()))?;
        Self::from_json(&text)
    }

    /// Apply `PHOTOCARD_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> PhotocardResult<()> {
        self.apply_overrides(|k| std::env::var(k).ok())
    }

    /// Apply overrides from any key lookup. Malformed values are errors, not ignored.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> PhotocardResult<()> {
        fn parse<T: std::str::FromStr>(key: &str, v: &str) -> PhotocardResult<T> {
            v.trim()
                .parse()
                .map_err(|_| PhotocardError::validation(format!("{key}: invalid value '{v}'")))
        }

        if let Some(v) = lookup(ENV_OUTPUT_SIDE) {
            self.output_side = parse(ENV_OUTPUT_SIDE, &v)?;
        }
        if let Some(v) = lookup(ENV_OVERLAY_WAIT_MS) {
            self.overlay_wait_ms = parse(ENV_OVERLAY_WAIT_MS, &v)?;
        }
        if let Some(v) = lookup(ENV_ACTIVE_FPS) {
            self.active_fps = parse(ENV_ACTIVE_FPS, &v)?;
        }
        self.validate()
    }

    pub fn validate(&self) -> PhotocardResult<()> {
        OutputSide::new(self.output_side)?;
        if self.idle_fps == 0 || self.active_fps == 0 {
            return Err(PhotocardError::validation("frame rates must be non-zero"));
        }
        if self.countdown_ticks > 0 && self.countdown_tick_ms == 0 {
            return Err(PhotocardError::validation(
                "countdown_tick_ms must be non-zero when counting down",
            ));
        }
        if !(self.crop_ratio > 0.0 && self.crop_ratio <= 1.0) {
            return Err(PhotocardError::validation("crop_ratio must be in (0, 1]"));
        }
        self.layout.validate()?;
        self.style.validate()?;
        Ok(())
    }

    pub fn countdown_tick(&self) -> Duration {
        Duration::from_millis(self.countdown_tick_ms)
    }

    pub fn overlay_wait(&self) -> Duration {
        Duration::from_millis(self.overlay_wait_ms)
    }

    pub fn facing_debounce(&self) -> Duration {
        Duration::from_millis(self.facing_debounce_ms)
    }

    pub fn status_hide(&self) -> Duration {
        Duration::from_millis(self.status_hide_ms)
    }

    pub fn compositor_settings(&self) -> CompositorSettings {
        CompositorSettings {
            side: OutputSide(self.output_side),
            style: self.style,
            mirror: self.mirror,
            crop_ratio: self.crop_ratio,
            layout: self.layout,
            idle_fps: self.idle_fps,
            active_fps: self.active_fps,
        }
    }

    pub fn capture_format(&self) -> CaptureFormat {
        CaptureFormat {
            side: self.output_side,
            fps: self.active_fps,
            background: self.style.background.to_array(),
        }
    }
}

#[cfg(test)]
#[path = "../tests/unit/config.rs"]
mod tests;
