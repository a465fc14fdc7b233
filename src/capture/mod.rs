mod webcam;

#[cfg(test)]
pub mod mock;

pub use webcam::WebcamCapture;

use crate::error::DeviceError;
use image::RgbImage;

/// Trait for camera capture sources
///
/// `acquire` and `release` bracket one burst. Prefer [`DeviceGuard::acquire`]
/// over calling them directly so release also happens on early returns.
pub trait CaptureSource {
    /// Open the device and request the given (width, height)
    ///
    /// The request is best effort: the device may clamp or ignore it, so
    /// frames can come back at a different size.
    fn acquire(&mut self, resolution: (u32, u32)) -> Result<(), DeviceError>;

    /// Capture a single frame
    fn read_frame(&mut self) -> Result<RgbImage, DeviceError>;

    /// Close the device. Calling this on a closed device is a no-op.
    fn release(&mut self);

    fn is_open(&self) -> bool;
}

/// An acquired capture source that is released when dropped.
pub struct DeviceGuard<'a, S: CaptureSource + ?Sized> {
    source: &'a mut S,
}

impl<'a, S: CaptureSource + ?Sized> DeviceGuard<'a, S> {
    pub fn acquire(source: &'a mut S, resolution: (u32, u32)) -> Result<Self, DeviceError> {
        source.acquire(resolution)?;
        Ok(Self { source })
    }

    pub fn read_frame(&mut self) -> Result<RgbImage, DeviceError> {
        self.source.read_frame()
    }
}

impl<S: CaptureSource + ?Sized> Drop for DeviceGuard<'_, S> {
    fn drop(&mut self) {
        self.source.release();
        tracing::debug!("Camera released");
    }
}
