use crate::foundation::error::{PhotocardError, PhotocardResult};

/// Integer pixel rectangle, `x0..x1` by `y0..y1`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PixelRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl PixelRect {
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn is_empty(&self) -> bool {
        self.width() == 0 || self.height() == 0
    }

    /// Smallest pixel rect covering `rect` grown by `pad`, clamped to `width x height`.
    pub fn covering(rect: kurbo::Rect, pad: f64, width: u32, height: u32) -> Self {
        let clamp_x = |v: f64| v.clamp(0.0, f64::from(width)) as u32;
        let clamp_y = |v: f64| v.clamp(0.0, f64::from(height)) as u32;
        Self {
            x0: clamp_x((rect.x0 - pad).floor()),
            y0: clamp_y((rect.y0 - pad).floor()),
            x1: clamp_x((rect.x1 + pad).ceil()),
            y1: clamp_y((rect.y1 + pad).ceil()),
        }
    }
}

pub fn blur_rgba8_premul(
    src: &[u8],
    width: u32,
    height: u32,
    radius: u32,
    sigma: f32,
) -> PhotocardResult<Vec<u8>> {
    let expected_len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|v| v.checked_mul(4))
        .ok_or_else(|| PhotocardError::validation("blur buffer size overflow"))?;
    if src.len() != expected_len {
        return Err(PhotocardError::validation(
            "blur_rgba8_premul expects src matching width*height*4",
        ));
    }
    if radius == 0 || expected_len == 0 {
        return Ok(src.to_vec());
    }

    let kernel = gaussian_kernel_q16(radius, sigma)?;
    let mut tmp = vec![0u8; expected_len];
    let mut out = vec![0u8; expected_len];

    horizontal_pass(src, &mut tmp, width, height, &kernel);
    vertical_pass(&tmp, &mut out, width, height, &kernel);
    Ok(out)
}

/// Blur only `region` of a `width x height` buffer in place.
///
/// The region should already include the blur padding; pixels outside it are untouched.
pub fn blur_region_in_place(
    buf: &mut [u8],
    width: u32,
    height: u32,
    region: PixelRect,
    radius: u32,
    sigma: f32,
) -> PhotocardResult<()> {
    if buf.len() != width as usize * height as usize * 4 {
        return Err(PhotocardError::validation(
            "blur_region_in_place expects buf matching width*height*4",
        ));
    }
    if region.x1 > width || region.y1 > height {
        return Err(PhotocardError::validation(
            "blur region exceeds buffer bounds",
        ));
    }
    if region.is_empty() || radius == 0 {
        return Ok(());
    }

    let (rw, rh) = (region.width() as usize, region.height() as usize);
    let stride = width as usize * 4;
    let mut sub = Vec::with_capacity(rw * rh * 4);
    for y in region.y0 as usize..region.y1 as usize {
        let off = y * stride + region.x0 as usize * 4;
        sub.extend_from_slice(&buf[off..off + rw * 4]);
    }

    let blurred = blur_rgba8_premul(&sub, region.width(), region.height(), radius, sigma)?;

    for (row, y) in (region.y0 as usize..region.y1 as usize).enumerate() {
        let off = y * stride + region.x0 as usize * 4;
        buf[off..off + rw * 4].copy_from_slice(&blurred[row * rw * 4..(row + 1) * rw * 4]);
    }
    Ok(())
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> PhotocardResult<Vec<u32>> {
    if radius == 0 {
        return Ok(vec![1 << 16]);
    }
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(PhotocardError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let mut weights_f = Vec::<f64>::with_capacity((2 * r + 1) as usize);
    let mut sum = 0.0f64;
    let sigma = sigma as f64;
    let denom = 2.0 * sigma * sigma;
    for i in -r..=r {
        let x = i as f64;
        let w = (-x * x / denom).exp();
        weights_f.push(w);
        sum += w;
    }

    let mut weights = Vec::<u32>::with_capacity(weights_f.len());
    let mut acc: i64 = 0;
    for &wf in &weights_f {
        let q = ((wf / sum) * 65536.0).round() as i64;
        let q = q.clamp(0, 65536);
        weights.push(q as u32);
        acc += q;
    }
    // Push the rounding residue into the centre tap so the kernel sums to exactly 1.0.
    let delta = 65536 - acc;
    if delta != 0 {
        let mid = weights.len() / 2;
        weights[mid] = (i64::from(weights[mid]) + delta).clamp(0, 65536) as u32;
    }

    Ok(weights)
}

fn horizontal_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    for y in 0..height as i32 {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sx = (x + ki as i32 - radius).clamp(0, w - 1);
                let idx = ((y * w + sx) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn vertical_pass(src: &[u8], dst: &mut [u8], width: u32, height: u32, k: &[u32]) {
    let radius = (k.len() / 2) as i32;
    let w = width as i32;
    let h = height as i32;
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let sy = (y + ki as i32 - radius).clamp(0, h - 1);
                let idx = ((sy * w + x) as usize) * 4;
                for c in 0..4 {
                    acc[c] += (kw as u64) * (src[idx + c] as u64);
                }
            }
            let out_idx = ((y * w + x) as usize) * 4;
            for c in 0..4 {
                dst[out_idx + c] = q16_to_u8(acc[c]);
            }
        }
    }
}

fn q16_to_u8(acc: u64) -> u8 {
    let v = (acc + 32768) >> 16;
    (v.min(255)) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
