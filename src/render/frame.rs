use std::sync::Arc;

use crate::foundation::error::{PhotocardError, PhotocardResult};

/// A composited canvas frame. Pixels are premultiplied RGBA8.
#[derive(Clone, Debug)]
pub struct FrameRGBA {
    pub width: u32,
    pub height: u32,
    pub data: Vec<u8>,
    pub premultiplied: bool,
}

impl FrameRGBA {
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y as usize) * (self.width as usize) + (x as usize)) * 4;
        let px = self.data.get(idx..idx + 4)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Straight RGBA8 copy with every pixel composited over an opaque `background`.
    pub fn to_opaque_rgba8(&self, background: [u8; 4]) -> PhotocardResult<Vec<u8>> {
        let mut out = vec![0u8; self.data.len()];
        crate::render::composite::flatten_to_opaque_rgba8(&mut out, &self.data, background)?;
        Ok(out)
    }
}

/// One decoded input frame from a camera or overlay source.
///
/// Pixels are straight-alpha RGBA8 and shared, so cloning a frame is cheap. The compositor
/// keys its upload cache on the pixel buffer's identity; `seq` counts frames per source.
#[derive(Clone, Debug)]
pub struct VideoFrame {
    pub width: u32,
    pub height: u32,
    pub seq: u64,
    pub rgba8: Arc<Vec<u8>>,
}

impl VideoFrame {
    pub fn new(width: u32, height: u32, seq: u64, rgba8: Vec<u8>) -> PhotocardResult<Self> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|v| v.checked_mul(4))
            .ok_or_else(|| PhotocardError::validation("video frame size overflow"))?;
        if width == 0 || height == 0 {
            return Err(PhotocardError::validation(
                "video frame width/height must be non-zero",
            ));
        }
        if rgba8.len() != expected {
            return Err(PhotocardError::validation(format!(
                "video frame byte length mismatch: got {}, expected {expected}",
                rgba8.len()
            )));
        }
        Ok(Self {
            width,
            height,
            seq,
            rgba8: Arc::new(rgba8),
        })
    }

    /// Single-colour frame, handy for tests and placeholder devices.
    pub fn solid(width: u32, height: u32, seq: u64, rgba: [u8; 4]) -> PhotocardResult<Self> {
        let px = (width as usize) * (height as usize);
        Self::new(width, height, seq, rgba.repeat(px))
    }
}

pub(crate) fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        if a == 0 {
            px[0] = 0;
            px[1] = 0;
            px[2] = 0;
            continue;
        }
        px[0] = ((px[0] as u16 * a + 127) / 255) as u8;
        px[1] = ((px[1] as u16 * a + 127) / 255) as u8;
        px[2] = ((px[2] as u16 * a + 127) / 255) as u8;
    }
}

/// Upload a straight-alpha frame into a `vello_cpu` image paint.
pub(crate) fn video_frame_to_image(frame: &VideoFrame) -> PhotocardResult<vello_cpu::Image> {
    let w: u16 = frame
        .width
        .try_into()
        .map_err(|_| PhotocardError::validation("video frame width exceeds u16"))?;
    let h: u16 = frame
        .height
        .try_into()
        .map_err(|_| PhotocardError::validation("video frame height exceeds u16"))?;

    let mut premul = frame.rgba8.as_ref().clone();
    premultiply_rgba8_in_place(&mut premul);

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(frame.width as usize * frame.height as usize);
    for px in premul.chunks_exact(4) {
        let a = px[3];
        may_have_opacities |= a != 255;
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: px[0],
            g: px[1],
            b: px[2],
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
