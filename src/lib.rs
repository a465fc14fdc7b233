//! Burstcam: scheduled webcam snapshot bursts with a rotating event log.
//!
//! A [`schedule::Scheduler`] runs a [`session::CaptureSession`] immediately and
//! then on a fixed interval. Each burst opens the camera once, saves every frame
//! as a JPEG or single-page PDF under `images/`, and records one line per frame
//! in `logs/`.

pub mod capture;
pub mod config;
pub mod error;
pub mod logbook;
pub mod naming;
pub mod output;
pub mod schedule;
pub mod session;

pub use capture::{CaptureSource, DeviceGuard, WebcamCapture};
pub use config::{AppPaths, CaptureConfig, FailurePolicy, OutputFormat, Resolution};
pub use logbook::LogRotator;
pub use schedule::{CancellationToken, Scheduler, SystemTimer, Timer};
pub use session::{BurstOutcome, BurstReport, CaptureSession};
