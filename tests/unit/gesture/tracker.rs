use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn single_touch_drag_is_exact_pointer_delta() {
    let start = TransformState {
        x: 12.5,
        y: -3.0,
        scale: 1.7,
        rotation_deg: 20.0,
    };
    let mut g = GestureTracker::new();
    g.begin(&[TouchPoint::new(1, 100.0, 200.0)], start);

    for (dx, dy) in [(0.0, 0.0), (7.25, -1.5), (-300.0, 42.0)] {
        let t = g
            .update(&[TouchPoint::new(1, 100.0 + dx, 200.0 + dy)])
            .unwrap();
        assert_eq!(t.x, start.x + dx);
        assert_eq!(t.y, start.y + dy);
        assert_eq!(t.scale, start.scale);
        assert_eq!(t.rotation_deg, start.rotation_deg);
    }
}

#[test]
fn pinch_scale_is_distance_ratio() {
    let mut g = GestureTracker::new();
    let start = TransformState {
        scale: 1.5,
        ..TransformState::IDENTITY
    };
    g.begin(
        &[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 100.0, 0.0)],
        start,
    );
    let t = g
        .update(&[TouchPoint::new(1, -50.0, 0.0), TouchPoint::new(2, 150.0, 0.0)])
        .unwrap();
    assert!(close(t.scale, 3.0));
    assert!(close(t.x, 0.0));
    assert!(close(t.rotation_deg, 0.0));
}

#[test]
fn pinch_scale_is_invariant_to_uniform_translation() {
    let mut g = GestureTracker::new();
    g.begin(
        &[TouchPoint::new(1, 10.0, 10.0), TouchPoint::new(2, 40.0, 50.0)],
        TransformState::IDENTITY,
    );
    let t = g
        .update(&[TouchPoint::new(1, 110.0, -90.0), TouchPoint::new(2, 140.0, -50.0)])
        .unwrap();
    assert!(close(t.scale, 1.0));
    assert!(close(t.rotation_deg, 0.0));
    assert!(close(t.x, 100.0));
    assert!(close(t.y, -100.0));
}

#[test]
fn two_finger_rotation_uses_vector_angle() {
    let mut g = GestureTracker::new();
    g.begin(
        &[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 10.0, 0.0)],
        TransformState {
            rotation_deg: 5.0,
            ..TransformState::IDENTITY
        },
    );
    let t = g
        .update(&[TouchPoint::new(1, 0.0, 0.0), TouchPoint::new(2, 0.0, 10.0)])
        .unwrap();
    assert!(close(t.rotation_deg, 95.0));
    assert!(close(t.scale, 1.0));
}

#[test]
fn coincident_start_fingers_do_not_divide_by_zero() {
    let mut g = GestureTracker::new();
    g.begin(
        &[TouchPoint::new(1, 5.0, 5.0), TouchPoint::new(2, 5.0, 5.0)],
        TransformState::IDENTITY,
    );
    let t = g
        .update(&[TouchPoint::new(1, 0.0, 5.0), TouchPoint::new(2, 10.0, 5.0)])
        .unwrap();
    assert!(t.scale.is_finite());
    assert!(close(t.scale, 1.0));
}

#[test]
fn mismatched_finger_counts_leave_transform_alone() {
    let mut g = GestureTracker::new();
    g.begin(&[TouchPoint::new(1, 0.0, 0.0)], TransformState::IDENTITY);
    assert!(
        g.update(&[TouchPoint::new(1, 1.0, 1.0), TouchPoint::new(2, 5.0, 5.0)])
            .is_none()
    );
}

#[test]
fn end_clears_tracking() {
    let mut g = GestureTracker::new();
    g.begin(&[TouchPoint::new(1, 0.0, 0.0)], TransformState::IDENTITY);
    assert!(g.is_active());
    g.end();
    assert!(!g.is_active());
    assert!(g.update(&[TouchPoint::new(1, 3.0, 3.0)]).is_none());
}
