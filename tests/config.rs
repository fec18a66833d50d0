use pixelruler::data::hotkeys::{Hotkey, Modifier};
use pixelruler::{ExtraPointPolicy, PixelRulerConfig};

#[test]
fn empty_yaml_is_all_defaults() {
    let cfg = PixelRulerConfig::from_yaml("{}").unwrap();
    assert_eq!(cfg.title, "PixelRuler");
    assert_eq!(cfg.unit_label, "units");
    assert_eq!(cfg.extra_point_policy, ExtraPointPolicy::StartOver);
    assert!(cfg.fit_to_window);
    assert!(!cfg.camera.require_rear);
    assert_eq!(cfg.overlay.marker_rgba, [255, 0, 0, 255]);
}

#[test]
fn partial_yaml_overrides_some_fields() {
    let yaml = "\
unit_label: mm
extra_point_policy: Slide
camera:
  require_rear: true
hotkeys:
  measure: Ctrl+M
overlay:
  marker_radius: 8.0
";
    let cfg = PixelRulerConfig::from_yaml(yaml).unwrap();
    assert_eq!(cfg.unit_label, "mm");
    assert_eq!(cfg.extra_point_policy, ExtraPointPolicy::Slide);
    assert!(cfg.camera.require_rear);
    assert_eq!(cfg.camera.device, None);
    assert_eq!(cfg.hotkeys.measure, Some(Hotkey::new(Modifier::Ctrl, 'M')));
    assert_eq!(cfg.hotkeys.calibrate, Some(Hotkey::new(Modifier::None, 'C')));
    assert_eq!(cfg.overlay.marker_radius, 8.0);
    assert_eq!(cfg.overlay.line_width, 1.0);

    let opts = cfg.session_options();
    assert_eq!(opts.unit_label, "mm");
    assert_eq!(opts.extra_point_policy, ExtraPointPolicy::Slide);
}

#[test]
fn malformed_yaml_is_an_error() {
    assert!(PixelRulerConfig::from_yaml("extra_point_policy: Sometimes\n").is_err());
    assert!(PixelRulerConfig::from_yaml("fit_to_window: [").is_err());
}

#[test]
fn missing_file_gives_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = PixelRulerConfig::load_from(&dir.path().join("absent.yaml")).unwrap();
    assert_eq!(cfg.unit_label, "units");
}

#[test]
fn save_then_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.yaml");
    let mut cfg = PixelRulerConfig::default();
    cfg.unit_label = "cm".to_string();
    cfg.fit_to_window = false;
    cfg.camera.device = Some("brio".to_string());
    cfg.save_to(&path).unwrap();

    let loaded = PixelRulerConfig::load_from(&path).unwrap();
    assert_eq!(loaded.unit_label, "cm");
    assert!(!loaded.fit_to_window);
    assert_eq!(loaded.camera, cfg.camera);
    assert_eq!(loaded.hotkeys, cfg.hotkeys);
}
