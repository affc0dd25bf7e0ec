use std::time::Duration;

/// What the single record button does when pressed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordButton {
    Start,
    Cancel,
    Stop,
    Hidden,
}

/// Status text with an optional auto-hide deadline.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StatusLine {
    text: String,
    hide_at: Option<Duration>,
}

impl StatusLine {
    pub fn set(&mut self, text: impl Into<String>, hide_at: Option<Duration>) {
        self.text = text.into();
        self.hide_at = hide_at;
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn visible_at(&self, now: Duration) -> Option<&str> {
        if self.text.is_empty() || self.hide_at.is_some_and(|t| now >= t) {
            return None;
        }
        Some(&self.text)
    }
}

/// Everything the host needs to lay out the widget, derived from the session state.
#[derive(Clone, Debug, PartialEq, serde::Serialize)]
pub struct UiView {
    pub state: &'static str,
    pub record_button: RecordButton,
    pub record_enabled: bool,
    pub selection_visible: bool,
    pub flip_visible: bool,
    /// Countdown progress in `[0, 1]` while counting down.
    pub countdown_progress: Option<f64>,
    /// Show the recorded file instead of the live preview.
    pub show_playback: bool,
    pub overlay_visible: bool,
    pub export_visible: bool,
    pub reset_visible: bool,
    pub gestures_enabled: bool,
    pub status: Option<String>,
}

#[cfg(test)]
#[path = "../../tests/unit/session/ui.rs"]
mod tests;
