use std::time::Duration;

/// Target render rate for the compositor.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cadence {
    /// Nothing is being captured; keep the canvas alive cheaply.
    Low,
    /// Counting down or recording; the capture stream must never see a stale frame.
    High,
}

/// Throttles a refresh-rate callback down to a target fps.
#[derive(Clone, Debug)]
pub struct FrameThrottle {
    low_fps: u32,
    high_fps: u32,
    last: Option<Duration>,
}

impl FrameThrottle {
    pub fn new(low_fps: u32, high_fps: u32) -> Self {
        Self {
            low_fps: low_fps.max(1),
            high_fps: high_fps.max(1),
            last: None,
        }
    }

    pub fn interval(&self, cadence: Cadence) -> Duration {
        let fps = match cadence {
            Cadence::Low => self.low_fps,
            Cadence::High => self.high_fps,
        };
        Duration::from_secs_f64(1.0 / f64::from(fps))
    }

    /// Whether a frame is due at `now`. A due frame is recorded as rendered.
    pub fn due(&mut self, now: Duration, cadence: Cadence) -> bool {
        if let Some(last) = self.last
            && now.saturating_sub(last) < self.interval(cadence)
        {
            return false;
        }
        self.last = Some(now);
        true
    }

    /// Make the next call to [`FrameThrottle::due`] render unconditionally.
    pub fn force_next(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/cadence.rs"]
mod tests;
