//! Capture settings and on-disk layout.
//!
//! Everything here is an immutable value built once at startup and handed to
//! the components that need it.

use crate::error::ConfigError;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Upper bound on photos per burst.
pub const MAX_PHOTO_COUNT: u32 = 10;

/// Upper bound on the delay between two photos of a burst, in seconds.
pub const MAX_DELAY_SECS: f64 = 5.0;

/// Default number of retired log files kept next to the active one.
pub const LOG_ROTATION_LIMIT: usize = 5;

/// Default time between the starts of two scheduled bursts.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(3 * 60);

/// Resolutions offered to the operator.
///
/// The camera treats these as a request and may deliver something else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Resolution {
    #[value(name = "1080x800")]
    Wide,
    #[value(name = "600x600")]
    Square,
}

impl Resolution {
    /// Returns (width, height)
    pub fn dimensions(self) -> (u32, u32) {
        match self {
            Self::Wide => (1080, 800),
            Self::Square => (600, 600),
        }
    }
}

/// How each frame is persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// JPEG image
    #[value(name = "jpg")]
    Jpeg,
    /// Single-page PDF sized to the frame
    #[value(name = "pdf")]
    Pdf,
}

impl OutputFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpg",
            Self::Pdf => "pdf",
        }
    }
}

/// What a burst does after a frame fails to persist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum FailurePolicy {
    /// Stop the burst at the first failed write
    #[default]
    Abort,
    /// Log the failure and move on to the next frame
    Skip,
}

/// Settings for a single burst.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureConfig {
    resolution: Resolution,
    photo_count: u32,
    delay: Duration,
    format: OutputFormat,
    on_persist_error: FailurePolicy,
    jpeg_quality: u8,
}

impl CaptureConfig {
    pub fn new(
        resolution: Resolution,
        photo_count: u32,
        delay_secs: f64,
        format: OutputFormat,
    ) -> Result<Self, ConfigError> {
        if photo_count == 0 || photo_count > MAX_PHOTO_COUNT {
            return Err(ConfigError::PhotoCount {
                got: photo_count,
                max: MAX_PHOTO_COUNT,
            });
        }
        if !(0.0..=MAX_DELAY_SECS).contains(&delay_secs) {
            return Err(ConfigError::Delay {
                got: delay_secs,
                max: MAX_DELAY_SECS,
            });
        }

        Ok(Self {
            resolution,
            photo_count,
            delay: Duration::from_secs_f64(delay_secs),
            format,
            on_persist_error: FailurePolicy::default(),
            jpeg_quality: 90,
        })
    }

    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.on_persist_error = policy;
        self
    }

    /// Quality is clamped to 1..=100.
    pub fn with_jpeg_quality(mut self, quality: u8) -> Self {
        self.jpeg_quality = quality.clamp(1, 100);
        self
    }

    pub fn resolution(&self) -> Resolution {
        self.resolution
    }

    pub fn photo_count(&self) -> u32 {
        self.photo_count
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    pub fn failure_policy(&self) -> FailurePolicy {
        self.on_persist_error
    }

    pub fn jpeg_quality(&self) -> u8 {
        self.jpeg_quality
    }
}

/// Directory layout rooted at an explicit application directory.
///
/// ```text
/// {root}/
/// ├── images/
/// │   └── image_<timestamp>.<jpg|pdf>
/// └── logs/
///     ├── log.log
///     └── log_1.log ... log_N.log
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppPaths {
    root: PathBuf,
}

impl AppPaths {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn images_dir(&self) -> PathBuf {
        self.root.join("images")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }
}
