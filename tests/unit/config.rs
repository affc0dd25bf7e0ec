use std::collections::HashMap;

use super::*;

fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let map: HashMap<String, String> = pairs
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |k| map.get(k).cloned()
}

#[test]
fn defaults_match_the_countdown_variant() {
    let cfg = RecorderConfig::default();
    assert_eq!(cfg, RecorderConfig::variant(Variant::Countdown));
    assert_eq!(cfg.countdown_ticks, 3);
    assert_eq!(cfg.overlay_wait(), Duration::from_secs(5));
    assert!(cfg.validate().is_ok());
}

#[test]
fn variants_only_change_knobs() {
    let instant = RecorderConfig::variant(Variant::Instant);
    assert_eq!(instant.countdown_ticks, 0);
    assert_eq!(instant.audio, AudioPolicy::AtCapture);

    let classic = RecorderConfig::variant(Variant::Classic);
    assert_eq!(classic.mirror, MirrorRule::Never);
    assert!(classic.crop_ratio < 1.0);
    assert!(classic.validate().is_ok());
}

#[test]
fn partial_json_fills_defaults() {
    let cfg = RecorderConfig::from_json(r#"{ "output_side": 720, "mirror": "always" }"#).unwrap();
    assert_eq!(cfg.output_side, 720);
    assert_eq!(cfg.mirror, MirrorRule::Always);
    assert_eq!(cfg.active_fps, 30);
}

#[test]
fn invalid_json_values_are_rejected() {
    assert!(RecorderConfig::from_json(r#"{ "output_side": 721 }"#).is_err());
    assert!(RecorderConfig::from_json(r#"{ "idle_fps": 0 }"#).is_err());
    assert!(RecorderConfig::from_json(r#"{ "crop_ratio": 0.0 }"#).is_err());
    assert!(RecorderConfig::from_json("not json").is_err());
}

#[test]
fn degenerate_layout_and_style_are_rejected() {
    for json in [
        r#"{ "layout": { "card_width_px": 0.0 } }"#,
        r#"{ "layout": { "width_frac": -0.2 } }"#,
        r#"{ "layout": { "aspect": 0.0 } }"#,
        r#"{ "style": { "border_width": -1.0 } }"#,
        r#"{ "style": { "corner_radius": -4.0 } }"#,
        r#"{ "style": { "shadow": { "blur": -30.0 } } }"#,
    ] {
        assert!(RecorderConfig::from_json(json).is_err(), "{json}");
    }

    let mut cfg = RecorderConfig::default();
    cfg.layout.aspect = f64::NAN;
    assert!(cfg.validate().is_err());
    cfg.layout.aspect = f64::INFINITY;
    assert!(cfg.validate().is_err());

    let cfg = RecorderConfig::from_json(r#"{ "style": { "border_width": 0.0 } }"#).unwrap();
    assert_eq!(cfg.style.border_width, 0.0);
}

#[test]
fn overrides_apply_and_validate() {
    let mut cfg = RecorderConfig::default();
    cfg.apply_overrides(lookup(&[
        (ENV_OUTPUT_SIDE, "540"),
        (ENV_OVERLAY_WAIT_MS, "250"),
        (ENV_ACTIVE_FPS, " 24 "),
    ]))
    .unwrap();
    assert_eq!(cfg.output_side, 540);
    assert_eq!(cfg.overlay_wait(), Duration::from_millis(250));
    assert_eq!(cfg.active_fps, 24);

    let mut cfg = RecorderConfig::default();
    assert!(cfg.apply_overrides(lookup(&[(ENV_ACTIVE_FPS, "fast")])).is_err());
    assert!(cfg.apply_overrides(lookup(&[(ENV_OUTPUT_SIDE, "0")])).is_err());
}

#[test]
fn derived_settings_follow_config() {
    let cfg = RecorderConfig {
        output_side: 64,
        ..RecorderConfig::variant(Variant::Classic)
    };
    let s = cfg.compositor_settings();
    assert_eq!(s.side, OutputSide(64));
    assert_eq!(s.mirror, MirrorRule::Never);
    let f = cfg.capture_format();
    assert_eq!(f.side, 64);
    assert_eq!(f.background, [0x11, 0x11, 0x11, 255]);
}
