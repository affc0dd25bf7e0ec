use super::*;
use crate::capture::encoder::{RAW_MIME_TYPE, RawEncoderFactory};

fn format() -> CaptureFormat {
    CaptureFormat {
        side: 2,
        fps: 30,
        background: [0, 0, 0, 255],
    }
}

fn frame() -> FrameRGBA {
    FrameRGBA {
        width: 2,
        height: 2,
        data: vec![255; 16],
        premultiplied: true,
    }
}

#[test]
fn frames_before_arm_are_ignored() {
    let mut p = CapturePipeline::new(format());
    p.prepare(&mut RawEncoderFactory, None).unwrap();
    p.push_frame(&frame()).unwrap();
    assert_eq!(p.frames_pushed(), 0);
    p.arm().unwrap();
    p.push_frame(&frame()).unwrap();
    assert_eq!(p.frames_pushed(), 1);
}

#[test]
fn finalize_concatenates_in_order_and_reset_clears() {
    let mut p = CapturePipeline::new(format());
    let profile = p.prepare(&mut RawEncoderFactory, None).unwrap();
    assert_eq!(profile.mime_type, None);
    p.arm().unwrap();
    p.push_frame(&frame()).unwrap();
    p.pump().unwrap();
    p.push_frame(&frame()).unwrap();

    let file = p.finalize().unwrap();
    assert_eq!(file.mime_type, RAW_MIME_TYPE);
    assert_eq!(file.len(), 32);
    assert_eq!(p.buffer().len(), 2);
    assert!(!p.is_prepared());

    p.reset();
    assert!(p.buffer().is_empty());
}

#[test]
fn discard_drops_encoder_and_chunks() {
    let mut p = CapturePipeline::new(format());
    p.prepare(&mut RawEncoderFactory, None).unwrap();
    p.arm().unwrap();
    p.push_frame(&frame()).unwrap();
    p.pump().unwrap();
    p.discard();
    assert!(!p.is_armed());
    assert!(p.buffer().is_empty());
    assert!(p.finalize().is_err());
}

#[test]
fn arm_without_prepare_is_an_error() {
    let mut p = CapturePipeline::new(format());
    assert!(p.arm().is_err());
    assert!(p.push_frame(&frame()).is_ok());
}

#[test]
fn odd_side_fails_at_prepare() {
    let mut p = CapturePipeline::new(CaptureFormat {
        side: 3,
        ..format()
    });
    assert!(p.prepare(&mut RawEncoderFactory, None).is_err());
    assert!(!p.is_prepared());
}
