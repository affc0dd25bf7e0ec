use super::*;

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn portrait_frame_crops_vertically() {
    let r = center_square_crop(1080.0, 1920.0, 1.0);
    assert_eq!(r, Rect::new(0.0, 420.0, 1080.0, 1500.0));
}

#[test]
fn landscape_frame_crops_horizontally() {
    let r = center_square_crop(1920.0, 1080.0, 1.0);
    assert_eq!(r, Rect::new(420.0, 0.0, 1500.0, 1080.0));
}

#[test]
fn crop_ratio_shrinks_around_center() {
    let r = center_square_crop(100.0, 100.0, 0.5);
    assert_eq!(r, Rect::new(25.0, 25.0, 75.0, 75.0));
    assert_eq!(center_square_crop(100.0, 100.0, f64::NAN).width(), 100.0);
}

#[test]
fn cover_fit_always_fills_without_letterboxing() {
    let sources = [
        Size::new(1920.0, 1080.0),
        Size::new(1080.0, 1920.0),
        Size::new(640.0, 640.0),
        Size::new(333.0, 517.0),
    ];
    let targets = [
        Size::new(300.0, 460.0),
        Size::new(460.0, 300.0),
        Size::new(200.0, 200.0),
    ];

    for src in sources {
        for dst in targets {
            let region = cover_fit_source(src, dst);
            // Region stays inside the source.
            assert!(region.x0 >= -1e-9 && region.y0 >= -1e-9);
            assert!(region.x1 <= src.width + 1e-9 && region.y1 <= src.height + 1e-9);
            // Region has the target aspect, so a uniform scale covers the box exactly.
            let k = cover_fit_scale(region, dst);
            assert!(close(region.width() * k, dst.width));
            assert!(close(region.height() * k, dst.height));
            // Exactly one dimension is full-length (the shorter relative one).
            let full_w = close(region.width(), src.width);
            let full_h = close(region.height(), src.height);
            assert!(full_w || full_h);
            // Centred overflow.
            assert!(close(region.x0, src.width - region.x1));
            assert!(close(region.y0, src.height - region.y1));
        }
    }
}

#[test]
fn cover_fit_of_degenerate_input_is_empty() {
    assert_eq!(
        cover_fit_source(Size::new(0.0, 10.0), Size::new(5.0, 5.0)),
        Rect::ZERO
    );
    assert_eq!(cover_fit_scale(Rect::ZERO, Size::new(5.0, 5.0)), 0.0);
}

#[test]
fn rounded_path_stays_within_rect() {
    use kurbo::Shape as _;
    let rect = Rect::new(0.0, 0.0, 100.0, 50.0);
    let p = rounded_rect_path(rect, 400.0);
    let bb = p.bounding_box();
    assert!(bb.x0 >= -1e-6 && bb.y0 >= -1e-6);
    assert!(bb.x1 <= 100.0 + 1e-6 && bb.y1 <= 50.0 + 1e-6);
}
