use super::*;

#[test]
fn video_frame_validates_length() {
    assert!(VideoFrame::new(2, 2, 0, vec![0; 16]).is_ok());
    assert!(VideoFrame::new(2, 2, 0, vec![0; 15]).is_err());
    assert!(VideoFrame::new(0, 2, 0, vec![]).is_err());
}

#[test]
fn solid_frame_fills_every_pixel() {
    let f = VideoFrame::solid(3, 2, 7, [1, 2, 3, 4]).unwrap();
    assert_eq!(f.seq, 7);
    assert!(f.rgba8.chunks_exact(4).all(|px| px == [1, 2, 3, 4]));
}

#[test]
fn premultiply_handles_edges() {
    let mut px = vec![255, 255, 255, 0, 200, 100, 50, 255, 255, 0, 0, 128];
    premultiply_rgba8_in_place(&mut px);
    assert_eq!(px, vec![0, 0, 0, 0, 200, 100, 50, 255, 128, 0, 0, 128]);
}

#[test]
fn frame_pixel_lookup_is_bounds_checked() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![1, 2, 3, 4, 5, 6, 7, 8],
        premultiplied: true,
    };
    assert_eq!(f.pixel(1, 0), Some([5, 6, 7, 8]));
    assert_eq!(f.pixel(2, 0), None);
}

#[test]
fn opaque_copy_fills_transparent_pixels_with_background() {
    let f = FrameRGBA {
        width: 2,
        height: 1,
        data: vec![0, 0, 0, 0, 10, 20, 30, 255],
        premultiplied: true,
    };
    let out = f.to_opaque_rgba8([0x11, 0x22, 0x33, 255]).unwrap();
    assert_eq!(out, vec![0x11, 0x22, 0x33, 255, 10, 20, 30, 255]);
}
