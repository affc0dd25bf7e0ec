use std::{cell::Cell, rc::Rc};

use super::*;

struct CountingProbe {
    calls: Rc<Cell<u32>>,
    m: Option<LayoutMeasurements>,
}

impl LayoutProbe for CountingProbe {
    fn measure(&mut self) -> Option<LayoutMeasurements> {
        self.calls.set(self.calls.get() + 1);
        self.m
    }
}

fn live() -> LayoutMeasurements {
    LayoutMeasurements {
        card_width: 360.0,
        overlay_width: 100.0,
        overlay_height: 150.0,
        overlay_left: 20.0,
        overlay_bottom: 10.0,
    }
}

#[test]
fn placement_maps_css_box_into_canvas() {
    let side = OutputSide::new(1080).unwrap();
    let p = OverlayPlacement::from_measurements(&live(), side);
    assert_eq!(p.px_ratio, 3.0);
    assert_eq!(p.size, Size::new(300.0, 450.0));
    // left 60, top = 1080 - 450 - 30 = 600.
    assert_eq!(p.center, Point::new(60.0 + 150.0, 600.0 + 225.0));
    assert_eq!(p.local_rect(), Rect::new(-150.0, -225.0, 150.0, 225.0));
}

#[test]
fn cache_reads_probe_once_until_invalidated() {
    let calls = Rc::new(Cell::new(0));
    let mut cache = LayoutCache::new(ProportionalLayout::default()).with_probe(Box::new(
        CountingProbe {
            calls: calls.clone(),
            m: Some(live()),
        },
    ));

    for _ in 0..5 {
        assert_eq!(cache.measurements(), live());
    }
    assert_eq!(calls.get(), 1);

    cache.invalidate();
    cache.measurements();
    assert_eq!(calls.get(), 2);
    assert_eq!(cache.probe_count(), 2);
}

#[test]
fn unusable_probe_falls_back_until_invalidated() {
    let calls = Rc::new(Cell::new(0));
    let fallback = ProportionalLayout::default();
    let mut cache = LayoutCache::new(fallback).with_probe(Box::new(CountingProbe {
        calls: calls.clone(),
        m: None,
    }));

    for _ in 0..5 {
        assert_eq!(cache.measurements(), fallback.measurements());
    }
    assert_eq!(calls.get(), 1);

    cache.invalidate();
    assert_eq!(cache.measurements(), fallback.measurements());
    assert_eq!(calls.get(), 2);
}

#[test]
fn proportional_layout_without_probe() {
    let mut cache = LayoutCache::new(ProportionalLayout::default());
    let p = cache.placement(OutputSide::new(1080).unwrap());
    assert_eq!(p.px_ratio, 3.0);
    assert!(p.center.x > 0.0 && p.center.y > 540.0);
    assert_eq!(cache.probe_count(), 0);
}
