use super::*;

#[test]
fn blur_radius_0_is_identity() {
    let src = vec![1u8, 2, 3, 4, 5, 6, 7, 8];
    let out = blur_rgba8_premul(&src, 1, 2, 0, 1.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn blur_constant_image_is_identity() {
    let (w, h) = (4u32, 3u32);
    let px = [10u8, 20u8, 30u8, 40u8];
    let src = px.repeat((w * h) as usize);
    let out = blur_rgba8_premul(&src, w, h, 3, 2.0).unwrap();
    assert_eq!(out, src);
}

#[test]
fn region_blur_leaves_outside_untouched() {
    let (w, h) = (8u32, 8u32);
    let mut buf = vec![0u8; (w * h * 4) as usize];
    let center = ((3 * w + 3) * 4) as usize;
    buf[center..center + 4].copy_from_slice(&[255, 255, 255, 255]);
    // A marker pixel outside the region.
    let corner = ((7 * w + 7) * 4) as usize;
    buf[corner..corner + 4].copy_from_slice(&[9, 9, 9, 9]);

    let region = PixelRect {
        x0: 0,
        y0: 0,
        x1: 6,
        y1: 6,
    };
    blur_region_in_place(&mut buf, w, h, region, 2, 1.2).unwrap();

    assert_eq!(&buf[corner..corner + 4], &[9, 9, 9, 9]);
    let spread = buf
        .chunks_exact(4)
        .take((w * 6) as usize)
        .filter(|px| px[3] != 0)
        .count();
    assert!(spread > 1);
}

#[test]
fn region_outside_buffer_is_rejected() {
    let mut buf = vec![0u8; 16];
    let region = PixelRect {
        x0: 0,
        y0: 0,
        x1: 3,
        y1: 1,
    };
    assert!(blur_region_in_place(&mut buf, 2, 2, region, 1, 1.0).is_err());
}

#[test]
fn covering_rect_pads_and_clamps() {
    let r = PixelRect::covering(kurbo::Rect::new(5.2, -3.0, 10.1, 4.0), 2.0, 12, 5);
    assert_eq!(
        r,
        PixelRect {
            x0: 3,
            y0: 0,
            x1: 12,
            y1: 5,
        }
    );
}
