//! Append-only event log kept as a bounded set of rotated files.
//!
//! Every append retires the current `log.log` into the numbered history before
//! writing, so each file holds exactly one entry:
//!
//! ```text
//! logs/
//! ├── log.log     # newest entry
//! ├── log_1.log   # previous entry
//! └── log_N.log   # oldest retained entry, N <= rotation limit
//! ```

use crate::error::{ConfigError, LogError};
use crate::naming::{Clock, SystemClock};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};

const ACTIVE_LOG: &str = "log.log";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f";

pub struct LogRotator<C: Clock = SystemClock> {
    dir: PathBuf,
    limit: usize,
    clock: C,
    // Steps of a rotation are not atomic; serialize concurrent appenders.
    lock: Mutex<()>,
}

impl LogRotator<SystemClock> {
    pub fn new(dir: impl Into<PathBuf>, limit: usize) -> Result<Self, ConfigError> {
        Self::with_clock(dir, limit, SystemClock)
    }
}

impl<C: Clock> LogRotator<C> {
    pub fn with_clock(dir: impl Into<PathBuf>, limit: usize, clock: C) -> Result<Self, ConfigError> {
        if limit == 0 {
            return Err(ConfigError::RotationLimit);
        }
        Ok(Self {
            dir: dir.into(),
            limit,
            clock,
            lock: Mutex::new(()),
        })
    }

    pub fn active_path(&self) -> PathBuf {
        self.dir.join(ACTIVE_LOG)
    }

    /// Path of the retired file with the given index (1 = most recent).
    pub fn retired_path(&self, index: usize) -> PathBuf {
        self.dir.join(format!("log_{index}.log"))
    }

    /// Rotate the history and write `<timestamp> - <message>` to a fresh `log.log`.
    pub fn append(&self, message: &str) -> Result<(), LogError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);

        fs::create_dir_all(&self.dir).map_err(|source| LogError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        self.prune()?;
        self.shift()?;

        let active = self.active_path();
        if active.exists() {
            self.move_file(&active, &self.retired_path(1))?;
        }

        let line = format!(
            "{} - {}\n",
            self.clock.now().format(TIMESTAMP_FORMAT),
            message
        );
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&active)
            .map_err(|source| LogError::Write {
                path: active.clone(),
                source,
            })?;
        file.write_all(line.as_bytes())
            .map_err(|source| LogError::Write {
                path: active.clone(),
                source,
            })
    }

    /// Indices of retired files present on disk, ascending.
    fn retired_indices(&self) -> Result<Vec<usize>, LogError> {
        let entries = fs::read_dir(&self.dir).map_err(|source| LogError::List {
            path: self.dir.clone(),
            source,
        })?;

        let mut indices = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|source| LogError::List {
                path: self.dir.clone(),
                source,
            })?;
            let name = entry.file_name();
            if let Some(index) = name.to_str().and_then(parse_retired_index) {
                indices.push(index);
            }
        }
        indices.sort_unstable();
        Ok(indices)
    }

    /// Delete retired files beyond the limit, oldest first.
    fn prune(&self) -> Result<(), LogError> {
        let indices = self.retired_indices()?;
        let mut remaining = indices.len();

        for &index in indices.iter().rev() {
            if remaining <= self.limit && index <= self.limit {
                break;
            }
            let path = self.retired_path(index);
            fs::remove_file(&path).map_err(|source| LogError::Remove { path, source })?;
            tracing::debug!("Deleted retired log {}", index);
            remaining -= 1;
        }
        Ok(())
    }

    /// Move `log_i` to `log_{i+1}` for i = limit-1 down to 1.
    fn shift(&self) -> Result<(), LogError> {
        for index in (1..self.limit).rev() {
            let from = self.retired_path(index);
            if from.exists() {
                self.move_file(&from, &self.retired_path(index + 1))?;
            }
        }
        Ok(())
    }

    fn move_file(&self, from: &Path, to: &Path) -> Result<(), LogError> {
        // Only the oldest slot can be occupied here; it is dropped from history.
        if to.exists() {
            fs::remove_file(to).map_err(|source| LogError::Remove {
                path: to.to_path_buf(),
                source,
            })?;
        }
        fs::rename(from, to).map_err(|source| LogError::Rotate {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            source,
        })
    }
}

fn parse_retired_index(name: &str) -> Option<usize> {
    let index: usize = name.strip_prefix("log_")?.strip_suffix(".log")?.parse().ok()?;
    (index >= 1).then_some(index)
}
