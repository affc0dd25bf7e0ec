use crate::foundation::{
    core::{OutputSide, Point, Rect, Size},
    error::{PhotocardError, PhotocardResult},
};

/// Live layout measurements of the on-screen card, in device (CSS) pixels.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct LayoutMeasurements {
    pub card_width: f64,
    pub overlay_width: f64,
    pub overlay_height: f64,
    pub overlay_left: f64,
    pub overlay_bottom: f64,
}

impl LayoutMeasurements {
    fn is_usable(&self) -> bool {
        self.card_width > 0.0 && self.overlay_width > 0.0 && self.overlay_height > 0.0
    }
}

/// Host hook that reads the live layout. Reading may be expensive (style recalculation), so
/// the compositor goes through a [`LayoutCache`].
pub trait LayoutProbe {
    fn measure(&mut self) -> Option<LayoutMeasurements>;
}

/// Fixed proportional placement used when no live layout is available.
///
/// Fractions are relative to the card width; `aspect` is overlay height / width.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ProportionalLayout {
    pub card_width_px: f64,
    pub width_frac: f64,
    pub aspect: f64,
    pub left_frac: f64,
    pub bottom_frac: f64,
}

impl Default for ProportionalLayout {
    fn default() -> Self {
        Self {
            card_width_px: 360.0,
            width_frac: 0.32,
            aspect: 1.556,
            left_frac: 0.05,
            bottom_frac: 0.05,
        }
    }
}

impl ProportionalLayout {
    pub fn validate(&self) -> PhotocardResult<()> {
        for (name, v) in [
            ("card_width_px", self.card_width_px),
            ("width_frac", self.width_frac),
            ("aspect", self.aspect),
        ] {
            if !(v.is_finite() && v > 0.0) {
                return Err(PhotocardError::validation(format!(
                    "layout.{name} must be finite and positive, got {v}"
                )));
            }
        }
        if !(self.left_frac.is_finite() && self.bottom_frac.is_finite()) {
            return Err(PhotocardError::validation(
                "layout.left_frac/bottom_frac must be finite",
            ));
        }
        Ok(())
    }

    pub fn measurements(&self) -> LayoutMeasurements {
        let cw = self.card_width_px;
        let w = cw * self.width_frac;
        LayoutMeasurements {
            card_width: cw,
            overlay_width: w,
            overlay_height: w * self.aspect,
            overlay_left: cw * self.left_frac,
            overlay_bottom: cw * self.bottom_frac,
        }
    }
}

/// Where the overlay box lands on the output canvas before the gesture transform.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OverlayPlacement {
    pub center: Point,
    pub size: Size,
    /// Canvas pixels per device pixel; gesture offsets are multiplied by this.
    pub px_ratio: f64,
}

impl OverlayPlacement {
    pub fn from_measurements(m: &LayoutMeasurements, side: OutputSide) -> Self {
        let out = side.as_f64();
        let ratio = out / m.card_width;
        let bw = m.overlay_width * ratio;
        let bh = m.overlay_height * ratio;
        let bx = m.overlay_left * ratio;
        let by = out - bh - m.overlay_bottom * ratio;
        Self {
            center: Point::new(bx + bw / 2.0, by + bh / 2.0),
            size: Size::new(bw, bh),
            px_ratio: ratio,
        }
    }

    /// Box centred on the origin, as drawn under the overlay transform.
    pub fn local_rect(&self) -> Rect {
        Rect::from_center_size(Point::ZERO, self.size)
    }
}

/// Memoized layout lookup. Measurements are read once and reused until
/// [`LayoutCache::invalidate`] is called (viewport resize or orientation change).
pub struct LayoutCache {
    probe: Option<Box<dyn LayoutProbe>>,
    fallback: ProportionalLayout,
    cached: Option<LayoutMeasurements>,
    probes: u64,
}

impl LayoutCache {
    pub fn new(fallback: ProportionalLayout) -> Self {
        Self {
            probe: None,
            fallback,
            cached: None,
            probes: 0,
        }
    }

    pub fn with_probe(mut self, probe: Box<dyn LayoutProbe>) -> Self {
        self.probe = Some(probe);
        self
    }

    pub fn set_probe(&mut self, probe: Option<Box<dyn LayoutProbe>>) {
        self.probe = probe;
        self.cached = None;
    }

    pub fn invalidate(&mut self) {
        self.cached = None;
    }

    /// How many times the live probe has been read.
    pub fn probe_count(&self) -> u64 {
        self.probes
    }

    pub fn measurements(&mut self) -> LayoutMeasurements {
        if let Some(m) = self.cached {
            return m;
        }

        let live = match self.probe.as_mut() {
            Some(probe) => {
                self.probes += 1;
                probe.measure().filter(LayoutMeasurements::is_usable)
            }
            None => None,
        };

        let m = match live {
            Some(m) => m,
            None => {
                if self.probe.is_some() {
                    tracing::debug!("layout probe unavailable, using proportional layout");
                }
                self.fallback.measurements()
            }
        };
        self.cached = Some(m);
        m
    }

    pub fn placement(&mut self, side: OutputSide) -> OverlayPlacement {
        let m = self.measurements();
        OverlayPlacement::from_measurements(&m, side)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/layout/overlay.rs"]
mod tests;
