use super::*;

fn approx(a: Point, b: Point) -> bool {
    (a.x - b.x).abs() < 1e-9 && (a.y - b.y).abs() < 1e-9
}

#[test]
fn identity_transform_only_centers() {
    let a = TransformState::IDENTITY.to_affine(Point::new(100.0, 50.0), 3.0);
    assert_eq!(a, Affine::translate(Vec2::new(100.0, 50.0)));
}

#[test]
fn offset_is_scaled_by_pixel_ratio() {
    let t = TransformState {
        x: 10.0,
        y: -4.0,
        ..TransformState::IDENTITY
    };
    let p = t.to_affine(Point::ZERO, 3.0) * Point::ZERO;
    assert!(approx(p, Point::new(30.0, -12.0)));
}

#[test]
fn rotation_applies_before_translation_and_after_scale() {
    let t = TransformState {
        x: 0.0,
        y: 0.0,
        scale: 2.0,
        rotation_deg: 90.0,
    };
    let p = t.to_affine(Point::new(5.0, 5.0), 1.0) * Point::new(1.0, 0.0);
    assert!(approx(p, Point::new(5.0, 7.0)));
}

#[test]
fn premul_matches_reference_rounding() {
    assert_eq!(Rgba8::new(255, 0, 0, 128).to_premul(), [128, 0, 0, 128]);
    assert_eq!(Rgba8::opaque(17, 17, 17).to_premul(), [17, 17, 17, 255]);
}

#[test]
fn output_side_rejects_zero_and_odd() {
    assert!(OutputSide::new(0).is_err());
    assert!(OutputSide::new(1081).is_err());
    assert_eq!(OutputSide::new(540).unwrap().scaled(36.0), 18.0);
}

#[test]
fn facing_flips() {
    assert_eq!(FacingMode::User.flipped(), FacingMode::Environment);
    assert_eq!(FacingMode::Environment.flipped(), FacingMode::User);
}
