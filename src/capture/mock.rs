//! Scripted capture source for testing without hardware.

use super::CaptureSource;
use crate::error::DeviceError;
use image::{Rgb, RgbImage};

/// Test pattern types for mock frame generation.
#[derive(Debug, Clone, Copy)]
pub enum TestPattern {
    /// Eight vertical bars, shifted by one bar per frame.
    ColorBars,
    /// Solid color.
    Solid(u8, u8, u8),
}

/// Mock device that yields generated frames and fails on request.
#[derive(Debug)]
pub struct ScriptedSource {
    pattern: TestPattern,
    resolution: Option<(u32, u32)>,
    clamp_to: Option<(u32, u32)>,
    fail_acquire: bool,
    fail_on_read: Option<u32>,
    frames_read: u32,
    acquire_count: u32,
    release_count: u32,
    close_transitions: u32,
}

impl Default for ScriptedSource {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            pattern: TestPattern::ColorBars,
            resolution: None,
            clamp_to: None,
            fail_acquire: false,
            fail_on_read: None,
            frames_read: 0,
            acquire_count: 0,
            release_count: 0,
            close_transitions: 0,
        }
    }

    pub fn with_pattern(mut self, pattern: TestPattern) -> Self {
        self.pattern = pattern;
        self
    }

    /// Ignore the requested resolution and always deliver this one.
    pub fn clamp_to(mut self, width: u32, height: u32) -> Self {
        self.clamp_to = Some((width, height));
        self
    }

    pub fn fail_acquire(mut self) -> Self {
        self.fail_acquire = true;
        self
    }

    /// Fail the n-th read (1-based) of every acquisition.
    pub fn fail_on_read(mut self, n: u32) -> Self {
        self.fail_on_read = Some(n);
        self
    }

    pub fn acquire_count(&self) -> u32 {
        self.acquire_count
    }

    pub fn release_count(&self) -> u32 {
        self.release_count
    }

    pub fn close_transitions(&self) -> u32 {
        self.close_transitions
    }

    pub fn frames_read(&self) -> u32 {
        self.frames_read
    }
}

impl CaptureSource for ScriptedSource {
    fn acquire(&mut self, resolution: (u32, u32)) -> Result<(), DeviceError> {
        if self.resolution.is_some() {
            return Err(DeviceError::Busy);
        }
        if self.fail_acquire {
            return Err(DeviceError::Unavailable(0, "scripted failure".to_owned()));
        }
        self.acquire_count += 1;
        self.frames_read = 0;
        self.resolution = Some(self.clamp_to.unwrap_or(resolution));
        Ok(())
    }

    fn read_frame(&mut self) -> Result<RgbImage, DeviceError> {
        let (width, height) = self.resolution.ok_or(DeviceError::Closed)?;
        self.frames_read += 1;
        if self.fail_on_read == Some(self.frames_read) {
            return Err(DeviceError::Read(format!(
                "scripted failure on frame {}",
                self.frames_read
            )));
        }
        Ok(generate_test_frame(
            width,
            height,
            self.pattern,
            self.frames_read,
        ))
    }

    fn release(&mut self) {
        self.release_count += 1;
        if self.resolution.take().is_some() {
            self.close_transitions += 1;
        }
    }

    fn is_open(&self) -> bool {
        self.resolution.is_some()
    }
}

/// Generate test frame data based on pattern.
fn generate_test_frame(width: u32, height: u32, pattern: TestPattern, seq: u32) -> RgbImage {
    // White, Yellow, Cyan, Green, Magenta, Red, Blue, Black
    const BARS: [[u8; 3]; 8] = [
        [235, 235, 235],
        [235, 235, 16],
        [16, 235, 235],
        [16, 235, 16],
        [235, 16, 235],
        [235, 16, 16],
        [16, 16, 235],
        [16, 16, 16],
    ];

    match pattern {
        TestPattern::ColorBars => {
            let bar_width = (width / 8).max(1);
            RgbImage::from_fn(width, height, |x, _| {
                let idx = ((x / bar_width + seq) % 8) as usize;
                Rgb(BARS[idx])
            })
        }
        TestPattern::Solid(r, g, b) => RgbImage::from_pixel(width, height, Rgb([r, g, b])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frames_follow_requested_resolution() {
        let mut source = ScriptedSource::new();
        source.acquire((64, 48)).expect("acquire");
        let frame = source.read_frame().expect("frame");
        assert_eq!(frame.dimensions(), (64, 48));
    }

    #[test]
    fn test_clamped_resolution() {
        let mut source = ScriptedSource::new().clamp_to(32, 32);
        source.acquire((1080, 800)).expect("acquire");
        let frame = source.read_frame().expect("frame");
        assert_eq!(frame.dimensions(), (32, 32));
    }

    #[test]
    fn test_successive_frames_differ() {
        let mut source = ScriptedSource::new();
        source.acquire((64, 8)).expect("acquire");
        let first = source.read_frame().expect("frame");
        let second = source.read_frame().expect("frame");
        assert_ne!(first, second);
    }

    #[test]
    fn test_second_acquire_rejected() {
        let mut source = ScriptedSource::new();
        source.acquire((4, 4)).expect("acquire");
        assert!(matches!(source.acquire((4, 4)), Err(DeviceError::Busy)));
        assert_eq!(source.acquire_count(), 1);
    }

    #[test]
    fn test_read_requires_acquire() {
        let mut source = ScriptedSource::new();
        assert!(matches!(source.read_frame(), Err(DeviceError::Closed)));
    }

    #[test]
    fn test_solid_pattern() {
        let mut source = ScriptedSource::new().with_pattern(TestPattern::Solid(10, 20, 30));
        source.acquire((4, 4)).expect("acquire");
        let frame = source.read_frame().expect("frame");
        assert_eq!(frame.get_pixel(3, 3), &Rgb([10, 20, 30]));
    }
}
