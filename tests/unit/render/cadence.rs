use super::*;

fn ms(v: u64) -> Duration {
    Duration::from_millis(v)
}

#[test]
fn first_tick_always_renders() {
    let mut t = FrameThrottle::new(1, 30);
    assert!(t.due(ms(0), Cadence::Low));
}

#[test]
fn low_cadence_renders_about_once_per_second() {
    let mut t = FrameThrottle::new(1, 30);
    let rendered = (0..120)
        .map(|i| ms(i * 16))
        .filter(|&now| t.due(now, Cadence::Low))
        .count();
    // 0..1.9s at 60 Hz: frames at 0 and ~1s.
    assert_eq!(rendered, 2);
}

#[test]
fn high_cadence_renders_about_thirty_per_second() {
    let mut t = FrameThrottle::new(1, 30);
    let rendered = (0..240)
        .map(|i| Duration::from_micros(i * 4_167))
        .filter(|&now| t.due(now, Cadence::High))
        .count();
    // One second of 240 Hz refresh.
    assert!((28..=31).contains(&rendered), "rendered {rendered}");
}

#[test]
fn force_next_bypasses_interval() {
    let mut t = FrameThrottle::new(1, 30);
    assert!(t.due(ms(0), Cadence::Low));
    assert!(!t.due(ms(10), Cadence::Low));
    t.force_next();
    assert!(t.due(ms(20), Cadence::Low));
}
