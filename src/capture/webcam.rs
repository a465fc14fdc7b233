use super::CaptureSource;
use crate::error::DeviceError;
use image::RgbImage;
use nokhwa::pixel_format::RgbFormat;
use nokhwa::utils::{CameraFormat, CameraIndex, FrameFormat, RequestedFormat, RequestedFormatType};
use nokhwa::Camera;
use std::sync::atomic::{AtomicBool, Ordering};

/// Set while any `WebcamCapture` holds an open camera.
static CAMERA_OPEN: AtomicBool = AtomicBool::new(false);

const REQUESTED_FPS: u32 = 30;

pub struct WebcamCapture {
    device_index: u32,
    camera: Option<Camera>,
}

impl WebcamCapture {
    /// Nothing is opened until [`CaptureSource::acquire`].
    pub fn new(device_index: u32) -> Self {
        Self {
            device_index,
            camera: None,
        }
    }

    fn open(&self, width: u32, height: u32) -> Result<Camera, DeviceError> {
        let index = CameraIndex::Index(self.device_index);
        let format = CameraFormat::new_from(width, height, FrameFormat::MJPEG, REQUESTED_FPS);
        let requested = RequestedFormat::new::<RgbFormat>(RequestedFormatType::Closest(format));

        let mut camera = Camera::new(index, requested)
            .map_err(|err| DeviceError::Unavailable(self.device_index, err.to_string()))?;

        camera
            .open_stream()
            .map_err(|err| DeviceError::Stream(err.to_string()))?;

        Ok(camera)
    }
}

impl CaptureSource for WebcamCapture {
    fn acquire(&mut self, resolution: (u32, u32)) -> Result<(), DeviceError> {
        if self.camera.is_some()
            || CAMERA_OPEN
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .is_err()
        {
            return Err(DeviceError::Busy);
        }

        let (width, height) = resolution;
        tracing::info!("Opening webcam {} at {}x{}", self.device_index, width, height);

        let camera = match self.open(width, height) {
            Ok(camera) => camera,
            Err(err) => {
                CAMERA_OPEN.store(false, Ordering::Release);
                return Err(err);
            }
        };

        let actual = camera.resolution();
        if (actual.width(), actual.height()) != (width, height) {
            tracing::info!(
                "Webcam delivers {}x{} instead of requested {}x{}",
                actual.width(),
                actual.height(),
                width,
                height
            );
        }

        self.camera = Some(camera);
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RgbImage, DeviceError> {
        let camera = self.camera.as_mut().ok_or(DeviceError::Closed)?;

        let frame = camera
            .frame()
            .map_err(|err| DeviceError::Read(err.to_string()))?;

        let decoded = frame
            .decode_image::<RgbFormat>()
            .map_err(|err| DeviceError::Read(err.to_string()))?;

        Ok(decoded)
    }

    fn release(&mut self) {
        let Some(mut camera) = self.camera.take() else {
            return;
        };

        if let Err(err) = camera.stop_stream() {
            tracing::warn!("Failed to stop webcam stream: {}", err);
        }
        drop(camera);
        CAMERA_OPEN.store(false, Ordering::Release);
        tracing::info!("Webcam {} released", self.device_index);
    }

    fn is_open(&self) -> bool {
        self.camera.is_some()
    }
}

impl Drop for WebcamCapture {
    fn drop(&mut self) {
        self.release();
    }
}
