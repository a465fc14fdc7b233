//! Timestamp identifiers for captured frames.
//!
//! Identifiers have one-second granularity. Two frames captured within the
//! same second get the same identifier, and the later artifact replaces the
//! earlier one on disk. Existing deployments rely on these exact file names, so
//! no disambiguator is appended.

use chrono::{DateTime, Local};
use std::path::{Path, PathBuf};

const IDENTIFIER_FORMAT: &str = "%Y-%m-%dT%H-%M-%S";

/// Source of wall-clock time.
pub trait Clock {
    fn now(&self) -> DateTime<Local>;
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now(&self) -> DateTime<Local> {
        (**self).now()
    }
}

/// The system's local clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

/// Format `now` truncated to whole seconds as `YYYY-MM-DDTHH-MM-SS`.
pub fn frame_identifier(now: DateTime<Local>) -> String {
    now.format(IDENTIFIER_FORMAT).to_string()
}

/// `<dir>/image_<identifier>.<extension>`
pub fn artifact_path(dir: &Path, identifier: &str, extension: &str) -> PathBuf {
    dir.join(format!("image_{identifier}.{extension}"))
}
