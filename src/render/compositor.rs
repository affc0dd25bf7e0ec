//! Per-tick canvas compositor.
//!
//! Each rendered tick produces one square [`FrameRGBA`] built from three layers:
//!
//! 1. **Base**: background fill, then the centre-cropped camera frame clipped to the card shape.
//! 2. **Shadow**: the overlay's drop shadow. It only depends on the overlay geometry, so it is
//!    rasterized and blurred once per geometry and reused while the transform is unchanged.
//! 3. **Overlay**: the transformed, cover-fit overlay frame clipped to its rounded box, with the
//!    border stroked on top.
//!
//! Layers are rasterized with `vello_cpu` and merged with premultiplied source-over.

use std::{sync::Arc, time::Duration};

use crate::{
    devices::{OverlaySource, PlaybackEvent},
    foundation::core::{Affine, FacingMode, OutputSide, Rect, Rgba8, Size, TransformState, Vec2},
    foundation::error::{PhotocardError, PhotocardResult},
    layout::{
        geometry::{center_square_crop, cover_fit_scale, cover_fit_source, rounded_rect_path},
        overlay::{LayoutCache, LayoutProbe, OverlayPlacement, ProportionalLayout},
    },
    render::{
        blur::{PixelRect, blur_region_in_place},
        cadence::{Cadence, FrameThrottle},
        composite::{mask_in_place, over_in_place},
        frame::{FrameRGBA, VideoFrame, video_frame_to_image},
    },
};

/// When the camera image is mirrored horizontally.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MirrorRule {
    /// Mirror the selfie camera only.
    #[default]
    UserFacing,
    Never,
    Always,
}

impl MirrorRule {
    pub fn mirrors(self, facing: FacingMode) -> bool {
        match self {
            Self::UserFacing => facing == FacingMode::User,
            Self::Never => false,
            Self::Always => true,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct ShadowStyle {
    pub color: Rgba8,
    /// Canvas-style blur length; the gaussian sigma is half of it.
    pub blur: f64,
    pub offset_y: f64,
}

impl Default for ShadowStyle {
    fn default() -> Self {
        Self {
            color: Rgba8::new(0, 0, 0, 153),
            blur: 30.0,
            offset_y: 12.0,
        }
    }
}

/// Card look. Lengths are given for a 1080 canvas and scaled to the actual output side.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct CardStyle {
    pub background: Rgba8,
    pub corner_radius: f64,
    pub overlay_radius: f64,
    pub border_width: f64,
    pub border_color: Rgba8,
    pub shadow: ShadowStyle,
}

impl CardStyle {
    /// Lengths are canvas pixels at the card reference width.
    pub fn validate(&self) -> PhotocardResult<()> {
        for (name, v) in [
            ("corner_radius", self.corner_radius),
            ("overlay_radius", self.overlay_radius),
            ("border_width", self.border_width),
            ("shadow.blur", self.shadow.blur),
        ] {
            if !(v.is_finite() && v >= 0.0) {
                return Err(PhotocardError::validation(format!(
                    "style.{name} must be finite and non-negative, got {v}"
                )));
            }
        }
        if !self.shadow.offset_y.is_finite() {
            return Err(PhotocardError::validation("style.shadow.offset_y must be finite"));
        }
        Ok(())
    }
}

impl Default for CardStyle {
    fn default() -> Self {
        Self {
            background: Rgba8::opaque(0x11, 0x11, 0x11),
            corner_radius: 36.0,
            overlay_radius: 24.0,
            border_width: 8.0,
            border_color: Rgba8::opaque(255, 255, 255),
            shadow: ShadowStyle::default(),
        }
    }
}

#[derive(Clone, Debug)]
pub struct CompositorSettings {
    pub side: OutputSide,
    pub style: CardStyle,
    pub mirror: MirrorRule,
    /// Fraction of the shorter camera dimension kept by the square crop.
    pub crop_ratio: f64,
    pub layout: ProportionalLayout,
    pub idle_fps: u32,
    pub active_fps: u32,
}

impl Default for CompositorSettings {
    fn default() -> Self {
        Self {
            side: OutputSide(1080),
            style: CardStyle::default(),
            mirror: MirrorRule::default(),
            crop_ratio: 1.0,
            layout: ProportionalLayout::default(),
            idle_fps: 1,
            active_fps: 30,
        }
    }
}

/// What the camera layer should show this tick.
#[derive(Clone, Copy, Debug)]
pub struct CameraInput<'a> {
    pub frame: Option<&'a VideoFrame>,
    pub facing: FacingMode,
}

struct ShadowCache {
    key: ([f64; 6], Size),
    pixels: Vec<u8>,
}

#[derive(Default)]
struct ImageCache {
    source: Option<Arc<Vec<u8>>>,
    image: Option<vello_cpu::Image>,
}

impl ImageCache {
    fn image_for(&mut self, frame: &VideoFrame) -> PhotocardResult<vello_cpu::Image> {
        if let (Some(src), Some(img)) = (&self.source, &self.image)
            && Arc::ptr_eq(src, &frame.rgba8)
        {
            return Ok(img.clone());
        }
        let img = video_frame_to_image(frame)?;
        self.source = Some(frame.rgba8.clone());
        self.image = Some(img.clone());
        Ok(img)
    }

    fn clear(&mut self) {
        self.source = None;
        self.image = None;
    }
}

pub struct Compositor {
    settings: CompositorSettings,
    side_u16: u16,
    layout: LayoutCache,
    overlay: Option<Box<dyn OverlaySource>>,
    throttle: FrameThrottle,
    base: vello_cpu::Pixmap,
    overlay_layer: vello_cpu::Pixmap,
    card_mask: Vec<u8>,
    shadow: Option<ShadowCache>,
    camera_images: ImageCache,
    overlay_images: ImageCache,
    output: FrameRGBA,
    frames_rendered: u64,
}

impl Compositor {
    pub fn new(settings: CompositorSettings) -> PhotocardResult<Self> {
        let side = OutputSide::new(settings.side.0)?;
        let side_u16: u16 = side
            .0
            .try_into()
            .map_err(|_| PhotocardError::validation("output side exceeds u16"))?;

        let card_mask = render_card_mask(side, side_u16, &settings.style);
        let len = side.0 as usize * side.0 as usize * 4;

        Ok(Self {
            layout: LayoutCache::new(settings.layout),
            throttle: FrameThrottle::new(settings.idle_fps, settings.active_fps),
            settings,
            side_u16,
            overlay: None,
            base: vello_cpu::Pixmap::new(side_u16, side_u16),
            overlay_layer: vello_cpu::Pixmap::new(side_u16, side_u16),
            card_mask,
            shadow: None,
            camera_images: ImageCache::default(),
            overlay_images: ImageCache::default(),
            output: FrameRGBA {
                width: side.0,
                height: side.0,
                data: vec![0; len],
                premultiplied: true,
            },
            frames_rendered: 0,
        })
    }

    pub fn settings(&self) -> &CompositorSettings {
        &self.settings
    }

    pub fn side(&self) -> OutputSide {
        self.settings.side
    }

    pub fn frames_rendered(&self) -> u64 {
        self.frames_rendered
    }

    /// Most recently rendered frame (all zeros before the first render).
    pub fn last_frame(&self) -> &FrameRGBA {
        &self.output
    }

    pub fn set_layout_probe(&mut self, probe: Option<Box<dyn LayoutProbe>>) {
        self.layout.set_probe(probe);
    }

    /// Drop cached layout measurements (viewport resize or orientation change).
    pub fn invalidate_layout(&mut self) {
        self.layout.invalidate();
        self.throttle.force_next();
    }

    pub fn layout_probe_count(&self) -> u64 {
        self.layout.probe_count()
    }

    pub fn has_overlay(&self) -> bool {
        self.overlay.is_some()
    }

    /// Replace the overlay source. The previous source is paused and dropped.
    pub fn set_overlay(&mut self, overlay: Option<Box<dyn OverlaySource>>) {
        if let Some(old) = self.overlay.as_mut() {
            old.pause();
        }
        self.overlay = overlay;
        self.overlay_images.clear();
        self.throttle.force_next();
    }

    pub fn rewind_and_play_overlay(&mut self, now: Duration) -> bool {
        match self.overlay.as_mut() {
            Some(o) => {
                o.rewind();
                o.play(now);
                true
            }
            None => false,
        }
    }

    pub fn pause_overlay(&mut self) {
        if let Some(o) = self.overlay.as_mut() {
            o.pause();
        }
    }

    pub fn advance_overlay(&mut self, now: Duration, events: &mut Vec<PlaybackEvent>) {
        if let Some(o) = self.overlay.as_mut() {
            o.advance(now, events);
        }
    }

    /// Render if the throttle says a frame is due at this cadence.
    pub fn render_if_due(
        &mut self,
        now: Duration,
        cadence: Cadence,
        camera: CameraInput<'_>,
        transform: TransformState,
    ) -> PhotocardResult<Option<&FrameRGBA>> {
        if !self.throttle.due(now, cadence) {
            return Ok(None);
        }
        self.render(camera, transform).map(Some)
    }

    pub fn render(
        &mut self,
        camera: CameraInput<'_>,
        transform: TransformState,
    ) -> PhotocardResult<&FrameRGBA> {
        self.render_base(camera)?;

        if self.overlay.is_some() {
            let placement = self.layout.placement(self.settings.side);
            let affine = transform.to_affine(placement.center, placement.px_ratio);
            self.ensure_shadow(affine, &placement);
            if let Some(shadow) = &self.shadow {
                over_in_place(self.base.data_as_u8_slice_mut(), &shadow.pixels, 1.0)?;
            }
            self.render_overlay(affine, &placement)?;
            over_in_place(
                self.base.data_as_u8_slice_mut(),
                self.overlay_layer.data_as_u8_slice(),
                1.0,
            )?;
        }

        self.output
            .data
            .copy_from_slice(self.base.data_as_u8_slice());
        self.frames_rendered += 1;
        Ok(&self.output)
    }

    fn card_path(&self) -> vello_cpu::kurbo::BezPath {
        let side = self.settings.side;
        let rect = Rect::new(0.0, 0.0, side.as_f64(), side.as_f64());
        bezpath_to_cpu(&rounded_rect_path(
            rect,
            side.scaled(self.settings.style.corner_radius),
        ))
    }

    fn render_base(&mut self, camera: CameraInput<'_>) -> PhotocardResult<()> {
        let side = self.settings.side.as_f64();
        let bg = self.settings.style.background;
        let card = self.card_path();

        let mut ctx = vello_cpu::RenderContext::new(self.side_u16, self.side_u16);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(bg.r, bg.g, bg.b, bg.a));
        ctx.fill_rect(&vello_cpu::kurbo::Rect::new(0.0, 0.0, side, side));

        ctx.push_clip_layer(&card);
        if let Some(frame) = camera.frame {
            let image = self.camera_images.image_for(frame)?;
            let crop = center_square_crop(
                f64::from(frame.width),
                f64::from(frame.height),
                self.settings.crop_ratio,
            );
            if crop.width() > 0.0 {
                let k = side / crop.width();
                let place =
                    Affine::scale(k) * Affine::translate(Vec2::new(-crop.x0, -crop.y0));
                let transform = if self.settings.mirror.mirrors(camera.facing) {
                    Affine::translate(Vec2::new(side, 0.0))
                        * Affine::scale_non_uniform(-1.0, 1.0)
                        * place
                } else {
                    place
                };
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(image);
                ctx.fill_rect(&rect_to_cpu(crop));
            }
        }
        ctx.pop_layer();

        ctx.flush();
        ctx.render_to_pixmap(&mut self.base);
        Ok(())
    }

    fn ensure_shadow(&mut self, affine: Affine, placement: &OverlayPlacement) {
        let key = (affine.as_coeffs(), placement.size);
        if self.shadow.as_ref().is_some_and(|s| s.key == key) {
            return;
        }

        let side = self.settings.side;
        let style = self.settings.style;
        let rect = placement.local_rect();
        let shadow_affine =
            Affine::translate(Vec2::new(0.0, side.scaled(style.shadow.offset_y))) * affine;
        let path = rounded_rect_path(rect, side.scaled(style.overlay_radius));
        let c = style.shadow.color;

        let mut pixmap = vello_cpu::Pixmap::new(self.side_u16, self.side_u16);
        let mut ctx = vello_cpu::RenderContext::new(self.side_u16, self.side_u16);
        ctx.set_transform(affine_to_cpu(shadow_affine));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(c.r, c.g, c.b, c.a));
        ctx.fill_path(&bezpath_to_cpu(&path));
        ctx.flush();
        ctx.render_to_pixmap(&mut pixmap);

        let mut pixels = pixmap.data_as_u8_slice().to_vec();
        let sigma = (side.scaled(style.shadow.blur) / 2.0) as f32;
        if sigma > 0.0 {
            let radius = (sigma * 3.0).ceil() as u32;
            let region = PixelRect::covering(
                shadow_affine.transform_rect_bbox(rect),
                f64::from(radius),
                side.0,
                side.0,
            );
            if let Err(e) = blur_region_in_place(&mut pixels, side.0, side.0, region, radius, sigma)
            {
                tracing::warn!("overlay shadow blur failed: {e}");
            }
        }
        if let Err(e) = mask_in_place(&mut pixels, &self.card_mask) {
            tracing::warn!("overlay shadow mask failed: {e}");
        }

        tracing::debug!(?key, "rebuilt overlay shadow");
        self.shadow = Some(ShadowCache { key, pixels });
    }

    fn render_overlay(&mut self, affine: Affine, placement: &OverlayPlacement) -> PhotocardResult<()> {
        let side = self.settings.side;
        let style = self.settings.style;
        let rect = placement.local_rect();
        let rounded = bezpath_to_cpu(&rounded_rect_path(rect, side.scaled(style.overlay_radius)));
        let card = self.card_path();

        let mut ctx = vello_cpu::RenderContext::new(self.side_u16, self.side_u16);
        ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        ctx.push_clip_layer(&card);

        ctx.set_transform(affine_to_cpu(affine));
        ctx.push_clip_layer(&rounded);
        // A source without a buffered frame is skipped for this tick only.
        let frame = self.overlay.as_ref().and_then(|o| o.current_frame());
        if let Some(frame) = frame {
            let image = self.overlay_images.image_for(frame)?;
            let source = Size::new(f64::from(frame.width), f64::from(frame.height));
            let region = cover_fit_source(source, rect.size());
            let k = cover_fit_scale(region, rect.size());
            if k > 0.0 {
                let transform = affine
                    * Affine::translate(Vec2::new(rect.x0, rect.y0))
                    * Affine::scale(k)
                    * Affine::translate(Vec2::new(-region.x0, -region.y0));
                ctx.set_transform(affine_to_cpu(transform));
                ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
                ctx.set_paint(image);
                ctx.fill_rect(&rect_to_cpu(region));
            }
        }
        ctx.pop_layer();

        let b = style.border_color;
        ctx.set_transform(affine_to_cpu(affine));
        ctx.set_stroke(vello_cpu::kurbo::Stroke::new(side.scaled(style.border_width)));
        ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(b.r, b.g, b.b, b.a));
        ctx.stroke_path(&rounded);
        ctx.pop_layer();

        ctx.flush();
        clear_pixmap(&mut self.overlay_layer);
        ctx.render_to_pixmap(&mut self.overlay_layer);
        Ok(())
    }
}

fn render_card_mask(side: OutputSide, side_u16: u16, style: &CardStyle) -> Vec<u8> {
    let rect = Rect::new(0.0, 0.0, side.as_f64(), side.as_f64());
    let path = rounded_rect_path(rect, side.scaled(style.corner_radius));
    let mut pixmap = vello_cpu::Pixmap::new(side_u16, side_u16);
    let mut ctx = vello_cpu::RenderContext::new(side_u16, side_u16);
    ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(255, 255, 255, 255));
    ctx.fill_path(&bezpath_to_cpu(&path));
    ctx.flush();
    ctx.render_to_pixmap(&mut pixmap);
    pixmap.data_as_u8_slice().to_vec()
}

fn clear_pixmap(pixmap: &mut vello_cpu::Pixmap) {
    pixmap.data_as_u8_slice_mut().fill(0);
}

fn affine_to_cpu(a: Affine) -> vello_cpu::kurbo::Affine {
    vello_cpu::kurbo::Affine::new(a.as_coeffs())
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: kurbo::Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &kurbo::BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
