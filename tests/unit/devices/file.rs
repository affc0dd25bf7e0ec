use super::*;

#[test]
fn loader_resolves_locators_under_root() {
    let l = FileOverlayLoader::new("/media");
    assert_eq!(
        l.resolve("videos/tripleS/Binary02 501z/binary02-chaewon-501z.mp4"),
        PathBuf::from("/media/videos/tripleS/Binary02 501z/binary02-chaewon-501z.mp4")
    );
}

#[test]
fn missing_overlay_file_is_a_device_error() {
    let mut l = FileOverlayLoader::new("/definitely/not/here");
    assert!(l.open("clip.mp4").is_err());
}

#[test]
fn file_microphone_tracks_acquire_and_release() {
    let path = std::env::temp_dir().join(format!("photocard_mic_{}.wav", std::process::id()));
    std::fs::write(&path, b"RIFF").unwrap();

    let mut mic = FileMicrophone::new(&path);
    let a = mic.acquire().unwrap();
    let b = mic.acquire().unwrap();
    assert_ne!(a.id, b.id);
    assert_eq!(a.source.as_deref(), Some(path.as_path()));
    assert_eq!(mic.active_tracks(), 2);
    mic.release(a);
    mic.release(b);
    assert_eq!(mic.active_tracks(), 0);

    let _ = std::fs::remove_file(&path);
}

#[test]
fn file_microphone_without_file_is_denied() {
    let mut mic = FileMicrophone::new("/no/such/audio.wav");
    assert!(mic.acquire().is_err());
    assert_eq!(mic.active_tracks(), 0);
}

#[test]
fn file_camera_is_closed_until_opened() {
    let mut cam = FileCamera::new("/no/such/camera.mp4");
    assert!(!cam.is_open());
    assert!(cam.frame(Duration::ZERO).is_none());
    assert!(cam.open(FacingMode::User, ResolutionHint::default()).is_err());
}

#[test]
fn decoder_tuning_reads_lookup_and_keeps_defaults_on_bad_values() {
    let t = DecoderTuning::from_lookup(|k| match k {
        ENV_VIDEO_CACHE_CAPACITY => Some(" 8 ".to_string()),
        ENV_VIDEO_PREFETCH_FRAMES => Some("4".to_string()),
        _ => None,
    });
    assert_eq!(
        t,
        DecoderTuning {
            cache_capacity: 8,
            prefetch_frames: 4
        }
    );

    let t = DecoderTuning::from_lookup(|k| match k {
        ENV_VIDEO_CACHE_CAPACITY => Some("0".to_string()),
        ENV_VIDEO_PREFETCH_FRAMES => Some("lots".to_string()),
        _ => None,
    });
    assert_eq!(t, DecoderTuning::default());
    assert_eq!(DecoderTuning::from_lookup(|_| None), DecoderTuning::default());
}

#[test]
fn decoder_takes_its_sizes_from_tuning() {
    let info = Arc::new(VideoSourceInfo {
        source_path: PathBuf::from("/no/such/clip.mp4"),
        width: 2,
        height: 2,
        fps_num: 30,
        fps_den: 1,
        duration_sec: 1.0,
        has_audio: false,
    });
    let d = ClipDecoder::new(
        info,
        DecoderTuning {
            cache_capacity: 3,
            prefetch_frames: 5,
        },
    );
    assert_eq!(d.capacity, 3);
    assert_eq!(d.prefetch_frames, 5);
    assert_eq!(d.info().width, 2);
}
