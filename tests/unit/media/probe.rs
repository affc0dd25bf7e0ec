use super::*;

fn info(fps_num: u32, fps_den: u32, duration_sec: f64) -> VideoSourceInfo {
    VideoSourceInfo {
        source_path: PathBuf::from("clip.mp4"),
        width: 2,
        height: 2,
        fps_num,
        fps_den,
        duration_sec,
        has_audio: false,
    }
}

#[test]
fn ratio_parsing_rejects_zero_denominator() {
    assert_eq!(parse_ff_ratio("30000/1001"), Some((30000, 1001)));
    assert_eq!(parse_ff_ratio("30/0"), None);
    assert_eq!(parse_ff_ratio("abc"), None);
}

#[test]
fn frame_index_follows_source_rate() {
    let v = info(30, 1, 2.0);
    assert_eq!(v.frame_index_at(0.0), 0);
    assert_eq!(v.frame_index_at(0.5), 15);
    assert_eq!(v.frame_index_at(-1.0), 0);
    assert_eq!(v.frame_count(), 60);
}

#[test]
fn unknown_rate_pins_to_first_frame() {
    let v = info(0, 1, 2.0);
    assert_eq!(v.frame_index_at(1.0), 0);
    assert_eq!(v.frame_count(), 1);
}

#[test]
fn raw_frames_are_split_and_capped() {
    let raw = vec![7u8; 2 * 2 * 4 * 3];
    let frames = split_raw_frames(&raw, 2, 2, 2).unwrap();
    assert_eq!(frames.len(), 2);
    assert_eq!(frames[0].len(), 16);
}

#[test]
fn partial_raw_frame_is_rejected() {
    assert!(split_raw_frames(&[0u8; 17], 2, 2, 4).is_err());
    assert!(split_raw_frames(&[], 0, 2, 4).is_err());
}
