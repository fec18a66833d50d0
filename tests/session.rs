use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use egui::{pos2, vec2, Rect};
use image::{Rgba, RgbaImage};
use pixelruler::acquire::{
    AcquisitionEvent, Acquirer, CameraStream, ImageOrigin, UnavailableCamera,
};
use pixelruler::{
    AcquisitionMode, DeviceError, ErrorClass, ExtraPointPolicy, MeasurementSession, Point,
    SessionError, SessionOptions, Status, SurfaceTransform,
};

fn session_with_image(w: u32, h: u32) -> MeasurementSession {
    let mut s = MeasurementSession::default();
    s.set_image(RgbaImage::new(w, h), ImageOrigin::Upload(PathBuf::from("test.png")));
    s
}

fn select(s: &mut MeasurementSession, a: (f64, f64), b: (f64, f64)) {
    s.select_point(Point::new(a.0, a.1)).unwrap();
    s.select_point(Point::new(b.0, b.1)).unwrap();
}

struct FakeCamera {
    frames: Vec<RgbaImage>,
}

impl CameraStream for FakeCamera {
    fn name(&self) -> &str {
        "Fake back camera"
    }

    fn latest_frame(&mut self) -> Option<RgbaImage> {
        self.frames.pop()
    }
}

#[test]
fn starts_waiting_with_unit_scale() {
    let s = MeasurementSession::default();
    assert!(s.image().is_none());
    assert_eq!(s.scale_factor().value(), 1.0);
    assert_eq!(s.mode(), AcquisitionMode::Upload);
    assert_eq!(s.status().to_string(), "Waiting for your image");
}

#[test]
fn second_point_reports_ready() {
    let mut s = session_with_image(100, 100);
    assert_eq!(s.select_point(Point::new(1.0, 1.0)).unwrap(), 1);
    assert_ne!(*s.status(), Status::ReadyForAction);
    assert_eq!(s.select_point(Point::new(2.0, 2.0)).unwrap(), 2);
    assert_eq!(s.status().to_string(), "Ready for calibration or measurement.");
}

#[test]
fn calibration_sets_scale_and_clears_points() {
    let mut s = session_with_image(100, 100);
    select(&mut s, (0.0, 0.0), (3.0, 4.0));
    let scale = s.calibrate("10").unwrap();
    assert_eq!(scale.value(), 2.0);
    assert_eq!(s.scale_factor().value(), 2.0);
    assert!(s.points().is_empty());
    assert_eq!(
        s.status().to_string(),
        "Calibration complete. Scale factor: 2.00 units/pixel. Ready to measure."
    );
}

#[test]
fn failed_calibration_keeps_state() {
    let mut s = session_with_image(100, 100);
    select(&mut s, (0.0, 0.0), (3.0, 4.0));
    s.calibrate("10").unwrap();

    select(&mut s, (0.0, 0.0), (6.0, 8.0));
    for bad in ["0", "-5", "abc"] {
        assert!(s.calibrate(bad).is_err());
        assert_eq!(s.scale_factor().value(), 2.0);
        assert_eq!(s.points().len(), 2);
        assert_eq!(
            s.status().to_string(),
            "Please enter a valid calibration distance."
        );
    }

    s.clear_points();
    assert!(matches!(
        s.calibrate("10"),
        Err(SessionError::CalibrationPointCount { found: 0 })
    ));
    s.select_point(Point::new(1.0, 1.0)).unwrap();
    assert!(matches!(
        s.calibrate("10"),
        Err(SessionError::CalibrationPointCount { found: 1 })
    ));
    assert_eq!(s.scale_factor().value(), 2.0);
    assert_eq!(s.points().len(), 1);
}

#[test]
fn measurement_uses_scale_and_clears_points() {
    let mut s = session_with_image(100, 100);
    select(&mut s, (0.0, 0.0), (3.0, 4.0));
    s.calibrate("10").unwrap();
    select(&mut s, (0.0, 0.0), (3.0, 4.0));
    let m = s.measure().unwrap();
    assert_eq!(m.distance, 10.0);
    assert!(s.points().is_empty());
    assert_eq!(s.status().to_string(), "Measured distance: 10.00 units");
    assert_eq!(s.history().count(), 1);
}

#[test]
fn measurement_without_points_reports_error() {
    let mut s = session_with_image(100, 100);
    let err = s.measure().unwrap_err();
    assert_eq!(err.class(), ErrorClass::InputValidation);
    assert_eq!(s.scale_factor().value(), 1.0);
    assert!(s.status().is_error());
    assert_eq!(
        s.status().to_string(),
        "Please select two points to measure the distance."
    );

    s.select_point(Point::new(5.0, 5.0)).unwrap();
    assert!(s.measure().is_err());
    assert_eq!(s.points().len(), 1);
}

#[test]
fn uncalibrated_measurement_is_pixel_distance() {
    let mut s = session_with_image(100, 100);
    select(&mut s, (10.0, 10.0), (10.0, 42.0));
    assert_eq!(s.measure().unwrap().distance, 32.0);
}

#[test]
fn repeated_measurement_is_stable() {
    let mut s = session_with_image(200, 200);
    select(&mut s, (0.0, 0.0), (30.0, 40.0));
    s.calibrate("25").unwrap();
    select(&mut s, (12.0, 7.0), (90.0, 150.0));
    let first = s.measure().unwrap();
    select(&mut s, (12.0, 7.0), (90.0, 150.0));
    let second = s.measure().unwrap();
    assert_eq!(first.distance, second.distance);
}

#[test]
fn points_need_an_image() {
    let mut s = MeasurementSession::default();
    assert!(matches!(
        s.select_point(Point::new(1.0, 1.0)),
        Err(SessionError::NoImage)
    ));
    assert!(s.points().is_empty());
}

#[test]
fn points_outside_image_are_rejected() {
    let mut s = session_with_image(10, 10);
    assert!(matches!(
        s.select_point(Point::new(11.0, 1.0)),
        Err(SessionError::OutsideImage)
    ));
}

#[test]
fn third_click_starts_over_and_drops_readiness() {
    let mut s = session_with_image(100, 100);
    select(&mut s, (1.0, 1.0), (2.0, 2.0));
    assert_eq!(*s.status(), Status::ReadyForAction);

    assert_eq!(s.select_point(Point::new(3.0, 3.0)).unwrap(), 1);
    assert_eq!(s.points(), &[Point::new(3.0, 3.0)]);
    assert_eq!(*s.status(), Status::FirstPointSelected);
    assert_eq!(
        s.status().to_string(),
        "First point selected. Select a second point."
    );

    assert_eq!(s.select_point(Point::new(4.0, 4.0)).unwrap(), 2);
    assert_eq!(*s.status(), Status::ReadyForAction);
}

#[test]
fn slide_policy_keeps_newest_pair_ready() {
    let mut s = MeasurementSession::new(SessionOptions {
        extra_point_policy: ExtraPointPolicy::Slide,
        ..SessionOptions::default()
    });
    s.set_image(RgbaImage::new(50, 50), ImageOrigin::Upload(PathBuf::from("a.png")));
    select(&mut s, (1.0, 1.0), (2.0, 2.0));
    assert_eq!(s.select_point(Point::new(3.0, 3.0)).unwrap(), 2);
    assert_eq!(s.points(), &[Point::new(2.0, 2.0), Point::new(3.0, 3.0)]);
    assert_eq!(*s.status(), Status::ReadyForAction);
}

#[test]
fn reject_policy_reports_full_buffer() {
    let mut s = MeasurementSession::new(SessionOptions {
        extra_point_policy: ExtraPointPolicy::Reject,
        ..SessionOptions::default()
    });
    s.set_image(RgbaImage::new(50, 50), ImageOrigin::Upload(PathBuf::from("a.png")));
    select(&mut s, (1.0, 1.0), (2.0, 2.0));
    assert!(matches!(
        s.select_point(Point::new(3.0, 3.0)),
        Err(SessionError::BufferFull)
    ));
    assert_eq!(s.points().len(), 2);
}

#[test]
fn new_image_clears_points_but_keeps_scale() {
    let mut s = session_with_image(100, 100);
    select(&mut s, (0.0, 0.0), (3.0, 4.0));
    s.calibrate("10").unwrap();
    s.select_point(Point::new(1.0, 1.0)).unwrap();
    let before = s.image().unwrap().revision();
    s.set_image(RgbaImage::new(20, 20), ImageOrigin::Upload(PathBuf::from("b.png")));
    assert!(s.points().is_empty());
    assert!(s.image().unwrap().revision() > before);
    assert_eq!(s.scale_factor().value(), 2.0);
}

#[test]
fn superseded_upload_is_discarded() {
    let mut s = MeasurementSession::default();
    let stale = s.begin_upload();
    let fresh = s.begin_upload();
    assert!(s.is_busy());

    s.apply(AcquisitionEvent::ImageDecoded {
        id: stale,
        path: PathBuf::from("old.png"),
        result: Ok(RgbaImage::new(1, 1)),
    })
    .unwrap();
    assert!(s.image().is_none());

    s.apply(AcquisitionEvent::ImageDecoded {
        id: fresh,
        path: PathBuf::from("new.png"),
        result: Ok(RgbaImage::new(8, 4)),
    })
    .unwrap();
    assert_eq!(s.image().unwrap().size(), [8, 4]);
    assert_eq!(
        s.image().unwrap().origin(),
        &ImageOrigin::Upload(PathBuf::from("new.png"))
    );
    assert!(!s.is_busy());
}

#[test]
fn switching_to_camera_abandons_upload() {
    let mut s = MeasurementSession::default();
    let upload = s.begin_upload();
    s.use_camera_mode();
    s.apply(AcquisitionEvent::ImageDecoded {
        id: upload,
        path: PathBuf::from("late.png"),
        result: Ok(RgbaImage::new(1, 1)),
    })
    .unwrap();
    assert!(s.image().is_none());
    assert_eq!(s.mode(), AcquisitionMode::Camera);
}

#[test]
fn camera_opened_after_leaving_camera_mode_is_dropped() {
    let mut s = MeasurementSession::default();
    let id = s.use_camera_mode();
    s.use_upload_mode();
    s.apply(AcquisitionEvent::CameraOpened {
        id,
        result: Ok(Box::new(FakeCamera { frames: vec![] })),
    })
    .unwrap();
    assert!(s.camera_name().is_none());
    assert_eq!(s.mode(), AcquisitionMode::Upload);
}

#[test]
fn capture_freezes_latest_frame() {
    let mut s = session_with_image(100, 100);
    s.select_point(Point::new(1.0, 1.0)).unwrap();
    let id = s.use_camera_mode();
    let mut frame = RgbaImage::new(64, 48);
    frame.put_pixel(0, 0, Rgba([1, 2, 3, 255]));
    s.apply(AcquisitionEvent::CameraOpened {
        id,
        result: Ok(Box::new(FakeCamera {
            frames: vec![frame],
        })),
    })
    .unwrap();
    assert_eq!(s.camera_name(), Some("Fake back camera"));

    s.capture().unwrap();
    let img = s.image().unwrap();
    assert_eq!(img.size(), [64, 48]);
    assert_eq!(*img.pixels().get_pixel(0, 0), Rgba([1, 2, 3, 255]));
    assert_eq!(img.origin(), &ImageOrigin::Camera("Fake back camera".into()));
    assert!(s.points().is_empty());
}

#[test]
fn capture_leaves_no_request_pending() {
    let mut s = MeasurementSession::default();
    let id = s.use_camera_mode();
    assert!(s.is_busy());
    s.apply(AcquisitionEvent::CameraOpened {
        id,
        result: Ok(Box::new(FakeCamera {
            frames: vec![RgbaImage::new(4, 4)],
        })),
    })
    .unwrap();
    s.capture().unwrap();
    assert!(!s.is_busy());

    // A repeated completion for the consumed id changes nothing.
    s.apply(AcquisitionEvent::CameraOpened {
        id,
        result: Err(DeviceError::NoDevice),
    })
    .unwrap();
    assert_eq!(*s.status(), Status::Captured);
}

#[test]
fn capture_without_frame_or_camera_fails() {
    let mut s = MeasurementSession::default();
    assert!(matches!(s.capture(), Err(SessionError::NotInCameraMode)));

    let id = s.use_camera_mode();
    assert!(matches!(s.capture(), Err(SessionError::NoFrame)));
    s.apply(AcquisitionEvent::CameraOpened {
        id,
        result: Ok(Box::new(FakeCamera { frames: vec![] })),
    })
    .unwrap();
    assert!(matches!(s.capture(), Err(SessionError::NoFrame)));
    assert!(s.image().is_none());
}

#[test]
fn camera_failure_is_reported() {
    let mut s = MeasurementSession::default();
    let id = s.use_camera_mode();
    let err = s
        .apply(AcquisitionEvent::CameraOpened {
            id,
            result: Err(DeviceError::NoRearCamera),
        })
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::DeviceAccess);
    assert_eq!(s.status().to_string(), "Camera access failed!");
    assert!(s.camera_name().is_none());
}

#[test]
fn unavailable_backend_reports_device_error() {
    let acquirer = Acquirer::new(Arc::new(UnavailableCamera));
    let mut s = MeasurementSession::default();
    let id = s.use_camera_mode();
    acquirer.open_camera(id, &Default::default());
    let event = acquirer.wait(Duration::from_secs(5)).expect("camera result");
    let err = s.apply(event).unwrap_err();
    assert!(matches!(err, SessionError::Device(DeviceError::Unsupported)));
}

#[test]
fn upload_click_calibrate_measure_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("photo.png");
    RgbaImage::from_pixel(100, 80, Rgba([200, 200, 200, 255]))
        .save(&path)
        .unwrap();

    let acquirer = Acquirer::new(Arc::new(UnavailableCamera));
    let mut s = MeasurementSession::default();
    let id = s.begin_upload();
    acquirer.load_file(id, &path);
    let event = acquirer.wait(Duration::from_secs(5)).expect("decode result");
    s.apply(event).unwrap();
    assert_eq!(s.image().unwrap().size(), [100, 80]);

    // Surface drawn at natural size, offset inside the window.
    let rect = Rect::from_min_size(pos2(20.0, 30.0), vec2(100.0, 80.0));
    let surface = SurfaceTransform::new(rect, [100, 80]);
    let click = |s: &mut MeasurementSession, x: f32, y: f32| {
        s.click_at(pos2(20.0 + x, 30.0 + y), &surface).unwrap()
    };

    assert_eq!(click(&mut s, 10.0, 10.0), Some(1));
    assert_eq!(click(&mut s, 10.0, 60.0), Some(2));
    s.calibrate("50").unwrap();
    assert_eq!(s.scale_factor().value(), 1.0);

    click(&mut s, 10.0, 10.0);
    click(&mut s, 60.0, 10.0);
    let m = s.measure().unwrap();
    assert_eq!(m.to_string(), "50.00 units");
    assert!(s.status().to_string().ends_with("50.00 units"));

    // Clicks off the image are ignored.
    assert_eq!(s.click_at(pos2(0.0, 0.0), &surface).unwrap(), None);
    assert!(s.points().is_empty());
}

#[test]
fn broken_file_keeps_previous_image() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.png");
    std::fs::write(&path, b"definitely not a png").unwrap();

    let acquirer = Acquirer::new(Arc::new(UnavailableCamera));
    let mut s = session_with_image(5, 5);
    let id = s.begin_upload();
    acquirer.load_file(id, &path);
    let err = s
        .apply(acquirer.wait(Duration::from_secs(5)).expect("decode result"))
        .unwrap_err();
    assert_eq!(err.class(), ErrorClass::ImageLoad);
    assert_eq!(s.image().unwrap().size(), [5, 5]);
    assert!(s.status().to_string().starts_with("Could not load image"));
}
