//! One burst: acquire the camera once, capture and persist `count` frames,
//! release the camera on every exit path.

use crate::capture::{CaptureSource, DeviceGuard};
use crate::config::{AppPaths, CaptureConfig, FailurePolicy};
use crate::error::{BurstError, PersistError};
use crate::logbook::LogRotator;
use crate::naming::{artifact_path, frame_identifier, Clock, SystemClock};
use crate::output::{writer_for, ArtifactWriter};
use crate::schedule::{CancellationToken, Timer};
use std::fs;
use std::path::PathBuf;

/// How a burst ended.
#[derive(Debug)]
pub enum BurstOutcome {
    /// Every frame was attempted
    Completed,
    /// Stopped early on a device or persist error
    Aborted(BurstError),
    /// Stopped early by the cancellation token
    Cancelled,
}

/// Summary of one burst.
#[derive(Debug)]
pub struct BurstReport {
    pub attempted: u32,
    /// Distinct artifact paths written. Frames that share a one-second
    /// identifier overwrite each other and appear once.
    pub persisted: Vec<PathBuf>,
    pub failed: u32,
    pub outcome: BurstOutcome,
}

impl BurstReport {
    fn empty(outcome: BurstOutcome) -> Self {
        Self {
            attempted: 0,
            persisted: Vec::new(),
            failed: 0,
            outcome,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.outcome, BurstOutcome::Completed)
    }
}

pub struct CaptureSession<C: Clock = SystemClock, L: Clock = SystemClock> {
    config: CaptureConfig,
    images_dir: PathBuf,
    writer: Box<dyn ArtifactWriter>,
    log: LogRotator<L>,
    clock: C,
}

impl<L: Clock> CaptureSession<SystemClock, L> {
    pub fn new(config: CaptureConfig, paths: &AppPaths, log: LogRotator<L>) -> Self {
        Self::with_clock(config, paths, log, SystemClock)
    }
}

impl<C: Clock, L: Clock> CaptureSession<C, L> {
    pub fn with_clock(config: CaptureConfig, paths: &AppPaths, log: LogRotator<L>, clock: C) -> Self {
        let writer = writer_for(config.format(), config.jpeg_quality());
        Self {
            config,
            images_dir: paths.images_dir(),
            writer,
            log,
            clock,
        }
    }

    /// Run one burst against `source`.
    ///
    /// The inter-frame delay is skipped after the last frame. Errors end up in
    /// the returned report and the event log; they never escape as a panic or
    /// leave the device open.
    pub fn run_burst<S, T>(&self, source: &mut S, timer: &T, cancel: &CancellationToken) -> BurstReport
    where
        S: CaptureSource + ?Sized,
        T: Timer + ?Sized,
    {
        let count = self.config.photo_count();
        tracing::info!(
            "Starting burst of {} {} frames",
            count,
            self.writer.extension()
        );

        if let Err(io_err) = fs::create_dir_all(&self.images_dir) {
            let err = PersistError::Io {
                path: self.images_dir.clone(),
                source: io_err,
            };
            tracing::error!("{}", err);
            return BurstReport::empty(BurstOutcome::Aborted(err.into()));
        }

        let mut device = match DeviceGuard::acquire(source, self.config.resolution().dimensions()) {
            Ok(device) => device,
            Err(err) => {
                tracing::error!("Failed to acquire camera: {}", err);
                self.record(&format!("Failed to open camera: {err}"));
                return BurstReport::empty(BurstOutcome::Aborted(err.into()));
            }
        };

        let mut report = BurstReport::empty(BurstOutcome::Completed);

        for n in 1..=count {
            report.attempted += 1;

            let frame = match device.read_frame() {
                Ok(frame) => frame,
                Err(err) => {
                    tracing::error!("Frame {}/{}: {}", n, count, err);
                    self.record(&format!("Failed to capture image {n}/{count}: {err}"));
                    report.failed += 1;
                    report.outcome = BurstOutcome::Aborted(err.into());
                    break;
                }
            };

            let identifier = frame_identifier(self.clock.now());
            let path = artifact_path(&self.images_dir, &identifier, self.writer.extension());

            match self.writer.write(&frame, &path) {
                Ok(()) => {
                    tracing::info!("Frame {}/{} saved to {}", n, count, path.display());
                    self.record(&format!("Image {n}/{count} saved to {}", path.display()));
                    if !report.persisted.contains(&path) {
                        report.persisted.push(path);
                    }
                }
                Err(err) => {
                    tracing::error!("Frame {}/{}: {}", n, count, err);
                    self.record(&format!("Failed to save image {n}/{count}: {err}"));
                    report.failed += 1;
                    if self.config.failure_policy() == FailurePolicy::Abort {
                        report.outcome = BurstOutcome::Aborted(err.into());
                        break;
                    }
                }
            }

            if n < count && !timer.sleep(self.config.delay(), cancel) {
                tracing::info!("Burst cancelled after {} of {} frames", n, count);
                report.outcome = BurstOutcome::Cancelled;
                break;
            }
        }

        drop(device);

        tracing::info!(
            "Burst finished: {} attempted, {} saved, {} failed",
            report.attempted,
            report.persisted.len(),
            report.failed
        );
        report
    }

    /// Append to the event log. A failed append is reported but never stops the burst.
    fn record(&self, message: &str) {
        if let Err(err) = self.log.append(message) {
            tracing::warn!("Event log: {}", err);
        }
    }
}
