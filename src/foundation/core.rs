use crate::foundation::error::{PhotocardError, PhotocardResult};

pub use kurbo::{Affine, Point, Rect, Size, Vec2};

/// Straight (non-premultiplied) RGBA8 colour, as written in configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8 {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba8 {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn opaque(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub fn to_premul(self) -> [u8; 4] {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        [
            premul(self.r, self.a),
            premul(self.g, self.a),
            premul(self.b, self.a),
            self.a,
        ]
    }

    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

/// Which way the active camera faces.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum FacingMode {
    /// Selfie camera.
    User,
    /// Back camera.
    #[default]
    Environment,
}

impl FacingMode {
    pub fn flipped(self) -> Self {
        match self {
            Self::User => Self::Environment,
            Self::Environment => Self::User,
        }
    }
}

/// Ideal capture resolution requested from the camera. Devices may ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct ResolutionHint {
    pub width: u32,
    pub height: u32,
}

impl Default for ResolutionHint {
    fn default() -> Self {
        Self {
            width: 1080,
            height: 1920,
        }
    }
}

/// Overlay placement chosen by the user's gestures.
///
/// `x`/`y` are in device (CSS) pixels, `rotation_deg` in degrees. The compositor maps the
/// offset into canvas space with the card's pixel ratio.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TransformState {
    pub x: f64,
    pub y: f64,
    pub scale: f64,
    pub rotation_deg: f64,
}

impl Default for TransformState {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl TransformState {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        scale: 1.0,
        rotation_deg: 0.0,
    };

    pub fn is_identity(&self) -> bool {
        *self == Self::IDENTITY
    }

    /// Affine placing a box centred on the origin at `center`.
    ///
    /// Order: T(center) * T(offset * px_ratio) * R(rotation) * S(scale).
    pub fn to_affine(self, center: Point, px_ratio: f64) -> Affine {
        let t_center = Affine::translate(center.to_vec2());
        let t_offset = Affine::translate(Vec2::new(self.x * px_ratio, self.y * px_ratio));
        let t_rotate = Affine::rotate(self.rotation_deg.to_radians());
        let t_scale = Affine::scale(self.scale);
        t_center * t_offset * t_rotate * t_scale
    }
}

/// Side length of the square output canvas.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct OutputSide(pub u32);

impl OutputSide {
    pub fn new(side: u32) -> PhotocardResult<Self> {
        if side == 0 {
            return Err(PhotocardError::validation("output side must be > 0"));
        }
        if !side.is_multiple_of(2) {
            return Err(PhotocardError::validation(
                "output side must be even (required for yuv420p output)",
            ));
        }
        if side > u32::from(u16::MAX) {
            return Err(PhotocardError::validation("output side exceeds u16"));
        }
        Ok(Self(side))
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.0)
    }

    /// Length scaled from the 1080 reference design.
    pub fn scaled(self, at_1080: f64) -> f64 {
        at_1080 * self.as_f64() / 1080.0
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
