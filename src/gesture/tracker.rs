//! Multi-touch gesture tracking for the overlay.
//!
//! All deltas are computed against the snapshot taken in [`GestureTracker::begin`], so a long
//! gesture never accumulates rounding drift.

use crate::foundation::core::TransformState;

/// One active pointer, in device pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TouchPoint {
    pub id: u64,
    pub x: f64,
    pub y: f64,
}

impl TouchPoint {
    pub fn new(id: u64, x: f64, y: f64) -> Self {
        Self { id, x, y }
    }
}

#[derive(Clone, Debug)]
struct Snapshot {
    touches: Vec<TouchPoint>,
    start: TransformState,
}

/// Converts touch sequences into a translate/rotate/scale [`TransformState`].
#[derive(Clone, Debug, Default)]
pub struct GestureTracker {
    snapshot: Option<Snapshot>,
}

impl GestureTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.snapshot.is_some()
    }

    /// Record the touch set and the transform at gesture start.
    ///
    /// Calling `begin` again mid-gesture (a finger was added) re-anchors on the new set.
    pub fn begin(&mut self, touches: &[TouchPoint], current: TransformState) {
        if touches.is_empty() {
            self.snapshot = None;
            return;
        }
        self.snapshot = Some(Snapshot {
            touches: touches.to_vec(),
            start: current,
        });
    }

    /// Transform for the current touch set.
    ///
    /// `None` means "leave the transform as it is": no gesture is tracked, or the finger count
    /// changed between one and many since `begin`.
    pub fn update(&self, touches: &[TouchPoint]) -> Option<TransformState> {
        let snap = self.snapshot.as_ref()?;
        let start = snap.start;
        let first = &snap.touches;

        match (first.len(), touches.len()) {
            (1, 1) => Some(TransformState {
                x: start.x + (touches[0].x - first[0].x),
                y: start.y + (touches[0].y - first[0].y),
                ..start
            }),
            (a, b) if a >= 2 && b >= 2 => {
                let (s0, s1) = (first[0], first[1]);
                let (c0, c1) = (touches[0], touches[1]);

                let (smx, smy) = midpoint(s0, s1);
                let (cmx, cmy) = midpoint(c0, c1);

                let start_dist = distance(s0, s1);
                let cur_dist = distance(c0, c1);
                let ratio = if start_dist > 0.0 {
                    cur_dist / start_dist
                } else {
                    1.0
                };

                Some(TransformState {
                    x: start.x + (cmx - smx),
                    y: start.y + (cmy - smy),
                    scale: start.scale * ratio,
                    rotation_deg: start.rotation_deg + (angle_deg(c0, c1) - angle_deg(s0, s1)),
                })
            }
            _ => None,
        }
    }

    /// All touches lifted. The last transform stays with the caller.
    pub fn end(&mut self) {
        self.snapshot = None;
    }
}

fn midpoint(a: TouchPoint, b: TouchPoint) -> (f64, f64) {
    ((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
}

fn distance(a: TouchPoint, b: TouchPoint) -> f64 {
    (b.x - a.x).hypot(b.y - a.y)
}

fn angle_deg(a: TouchPoint, b: TouchPoint) -> f64 {
    (b.y - a.y).atan2(b.x - a.x).to_degrees()
}

#[cfg(test)]
#[path = "../../tests/unit/gesture/tracker.rs"]
mod tests;
