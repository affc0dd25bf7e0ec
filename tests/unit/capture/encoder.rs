use super::*;

fn request(w: u32, h: u32) -> EncodeRequest {
    EncodeRequest {
        profile: EncodingProfile::host_default(),
        width: w,
        height: h,
        fps: 30,
        audio: None,
        background: [0, 0, 0, 255],
    }
}

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameRGBA {
    FrameRGBA {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

#[test]
fn request_validation_catches_bad_values() {
    assert!(request(0, 2).validate().is_err());
    assert!(request(3, 2).validate().is_err());
    assert!(
        EncodeRequest {
            fps: 0,
            ..request(2, 2)
        }
        .validate()
        .is_err()
    );
    assert!(request(2, 2).validate().is_ok());
}

#[test]
fn raw_encoder_flattens_and_emits_per_frame() {
    let mut f = RawEncoderFactory;
    let mut enc = f.create(&request(2, 2)).unwrap();
    assert_eq!(enc.mime_type(), RAW_MIME_TYPE);

    enc.push_frame(&frame(2, 2, [128, 0, 0, 128])).unwrap();
    let mut out = Vec::new();
    enc.poll_chunks(&mut out).unwrap();
    assert_eq!(out.len(), 1);
    assert_eq!(&out[0][..4], &[128, 0, 0, 255]);

    enc.push_frame(&frame(2, 2, [0, 0, 0, 0])).unwrap();
    let rest = enc.finish().unwrap();
    assert_eq!(rest.len(), 1);
}

#[test]
fn raw_encoder_rejects_wrong_frame_size() {
    let mut enc = RawEncoderFactory.create(&request(2, 2)).unwrap();
    assert!(enc.push_frame(&frame(4, 4, [0, 0, 0, 255])).is_err());
}

#[test]
fn raw_encoder_refuses_foreign_profiles() {
    let req = EncodeRequest {
        profile: EncodingProfile {
            mime_type: Some("video/mp4".to_string()),
            video_bits_per_second: 1,
        },
        ..request(2, 2)
    };
    assert!(RawEncoderFactory.create(&req).is_err());
}
