use std::time::Duration;

use crate::{capture::buffer::RecordedFile, render::cadence::Cadence};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordingPhase {
    /// The overlay was told to play; the encoder arms on its `Playing` signal or at `deadline`.
    AwaitingOverlay { deadline: Duration },
    Capturing,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    CountingDown {
        remaining: u32,
        next_tick_at: Duration,
    },
    Recording {
        phase: RecordingPhase,
        started_at: Duration,
    },
    Previewing {
        file: RecordedFile,
    },
}

impl SessionState {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::CountingDown { .. } => "counting_down",
            Self::Recording {
                phase: RecordingPhase::AwaitingOverlay { .. },
                ..
            } => "awaiting_overlay",
            Self::Recording { .. } => "recording",
            Self::Previewing { .. } => "previewing",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_recording(&self) -> bool {
        matches!(self, Self::Recording { .. })
    }

    /// Compositor cadence: fast while a capture is imminent or running.
    pub fn cadence(&self) -> Cadence {
        match self {
            Self::CountingDown { .. } | Self::Recording { .. } => Cadence::High,
            Self::Idle | Self::Previewing { .. } => Cadence::Low,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/session/state.rs"]
mod tests;
