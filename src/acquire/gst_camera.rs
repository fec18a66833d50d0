//! GStreamer camera backend: `<device source> ! videoconvert ! appsink(RGBA)`.

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;
use image::RgbaImage;

use crate::error::DeviceError;

use super::camera::{
    facing_from_name, pick_device, CameraBackend, CameraCandidate, CameraConfig, CameraStream,
    Facing,
};

/// How long to wait for the pipeline to reach PLAYING before giving up.
const START_TIMEOUT_SECS: u64 = 5;

#[derive(Debug, Default, Clone, Copy)]
pub struct GstCamera;

impl CameraBackend for GstCamera {
    fn open(&self, cfg: &CameraConfig) -> Result<Box<dyn CameraStream>, DeviceError> {
        gst::init().map_err(|e| DeviceError::Backend(e.to_string()))?;

        let monitor = gst::DeviceMonitor::new();
        monitor.add_filter(Some("Video/Source"), None);
        monitor
            .start()
            .map_err(|e| DeviceError::Backend(e.to_string()))?;
        let devices: Vec<gst::Device> = monitor.devices().into_iter().collect();
        monitor.stop();

        let candidates: Vec<CameraCandidate> = devices
            .iter()
            .map(|d| {
                let name = d.display_name().to_string();
                let facing = location_property(d).or_else(|| facing_from_name(&name));
                CameraCandidate { name, facing }
            })
            .collect();
        log::debug!("camera candidates: {:?}", candidates);

        let idx = pick_device(&candidates, cfg)?;
        let device = &devices[idx];
        let name = candidates[idx].name.clone();
        log::info!("opening camera '{}'", name);

        let src = device
            .create_element(None)
            .map_err(|e| DeviceError::Backend(format!("failed to create source for '{name}': {e}")))?;
        let convert = gst::ElementFactory::make("videoconvert")
            .build()
            .map_err(|e| DeviceError::Backend(format!("failed to create videoconvert: {e}")))?;
        let caps = gst_video::VideoCapsBuilder::new()
            .format(gst_video::VideoFormat::Rgba)
            .build();
        let sink = gst_app::AppSink::builder()
            .caps(&caps)
            .max_buffers(1)
            .drop(true)
            .build();

        let pipeline = gst::Pipeline::new();
        pipeline
            .add_many([&src, &convert, sink.upcast_ref()])
            .map_err(|e| DeviceError::Backend(e.to_string()))?;
        gst::Element::link_many([&src, &convert, sink.upcast_ref()])
            .map_err(|e| DeviceError::Backend(e.to_string()))?;

        let stream = GstStream {
            name,
            pipeline,
            sink,
        };
        stream.start()?;
        Ok(Box::new(stream))
    }
}

/// libcamera exposes the mounting location as a device property.
fn location_property(device: &gst::Device) -> Option<Facing> {
    let props = device.properties()?;
    let location = props.get::<String>("api.libcamera.location").ok()?;
    match location.as_str() {
        "back" => Some(Facing::Environment),
        "front" => Some(Facing::User),
        _ => None,
    }
}

struct GstStream {
    name: String,
    pipeline: gst::Pipeline,
    sink: gst_app::AppSink,
}

impl GstStream {
    fn start(&self) -> Result<(), DeviceError> {
        let started = self
            .pipeline
            .set_state(gst::State::Playing)
            .is_ok()
            && self
                .pipeline
                .state(gst::ClockTime::from_seconds(START_TIMEOUT_SECS))
                .0
                .is_ok();
        if started {
            return Ok(());
        }
        let err = self.bus_error().unwrap_or_else(|| {
            DeviceError::Backend(format!("camera '{}' did not start", self.name))
        });
        let _ = self.pipeline.set_state(gst::State::Null);
        Err(err)
    }

    fn bus_error(&self) -> Option<DeviceError> {
        let bus = self.pipeline.bus()?;
        let msg = bus.pop_filtered(&[gst::MessageType::Error])?;
        let gst::MessageView::Error(err) = msg.view() else {
            return None;
        };
        let e = err.error();
        if e.matches(gst::ResourceError::NotAuthorized) {
            Some(DeviceError::PermissionDenied(e.to_string()))
        } else {
            Some(DeviceError::Backend(e.to_string()))
        }
    }
}

impl CameraStream for GstStream {
    fn name(&self) -> &str {
        &self.name
    }

    fn latest_frame(&mut self) -> Option<RgbaImage> {
        let sample = self.sink.try_pull_sample(gst::ClockTime::ZERO)?;
        let info = gst_video::VideoInfo::from_caps(sample.caps()?).ok()?;
        let buffer = sample.buffer()?;
        let map = buffer.map_readable().ok()?;
        let (w, h) = (info.width(), info.height());
        let stride = info.stride()[0] as usize;
        let row = w as usize * 4;
        let data = map.as_slice();
        let mut pixels = Vec::with_capacity(row * h as usize);
        for y in 0..h as usize {
            let start = y * stride;
            pixels.extend_from_slice(data.get(start..start + row)?);
        }
        RgbaImage::from_raw(w, h, pixels)
    }
}

impl Drop for GstStream {
    fn drop(&mut self) {
        let _ = self.pipeline.set_state(gst::State::Null);
    }
}
