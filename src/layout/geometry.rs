use crate::foundation::core::{Rect, Size};

/// Centred square crop of a `width x height` frame.
///
/// The crop side is `min(width, height) * ratio`; `ratio` is clamped to `(0, 1]`.
pub fn center_square_crop(width: f64, height: f64, ratio: f64) -> Rect {
    let ratio = if ratio.is_finite() && ratio > 0.0 {
        ratio.min(1.0)
    } else {
        1.0
    };
    let side = width.min(height).max(0.0) * ratio;
    let sx = (width - side) / 2.0;
    let sy = (height - side) / 2.0;
    Rect::new(sx, sy, sx + side, sy + side)
}

/// Source region that cover-fits a frame into a target box.
///
/// The returned rect has the target's aspect ratio and is centred in the source, so scaling it
/// uniformly onto the box fills the box completely. Only the relatively longer source dimension
/// is cropped.
pub fn cover_fit_source(source: Size, target: Size) -> Rect {
    if source.width <= 0.0 || source.height <= 0.0 || target.width <= 0.0 || target.height <= 0.0
    {
        return Rect::ZERO;
    }

    let (vw, vh) = (source.width, source.height);
    let target_ratio = target.width / target.height;

    if vw / vh > target_ratio {
        let draw_w = vh * target_ratio;
        let x = (vw - draw_w) / 2.0;
        Rect::new(x, 0.0, x + draw_w, vh)
    } else {
        let draw_h = vw / target_ratio;
        let y = (vh - draw_h) / 2.0;
        Rect::new(0.0, y, vw, y + draw_h)
    }
}

/// Uniform scale that maps a [`cover_fit_source`] region onto `target`.
pub fn cover_fit_scale(source_region: Rect, target: Size) -> f64 {
    if source_region.width() <= 0.0 {
        return 0.0;
    }
    target.width / source_region.width()
}

/// Rounded rectangle outline as a path, flattened at the given tolerance.
pub fn rounded_rect_path(rect: Rect, radius: f64) -> kurbo::BezPath {
    use kurbo::Shape as _;

    let max_r = (rect.width().min(rect.height()) / 2.0).max(0.0);
    kurbo::RoundedRect::from_rect(rect, radius.clamp(0.0, max_r)).to_path(0.1)
}

#[cfg(test)]
#[path = "../../tests/unit/layout/geometry.rs"]
mod tests;
