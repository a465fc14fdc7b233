use std::path::PathBuf;

/// Failure to open, configure or read from the camera.
#[derive(Debug, thiserror::Error)]
pub enum DeviceError {
    #[error("Camera {0} is unavailable: {1}")]
    Unavailable(u32, String),

    #[error("A camera is already acquired by this process")]
    Busy,

    #[error("Failed to open camera stream: {0}")]
    Stream(String),

    #[error("Failed to read frame: {0}")]
    Read(String),

    #[error("Camera is not acquired")]
    Closed,
}

/// Failure to turn a frame into an artifact on disk.
#[derive(Debug, thiserror::Error)]
pub enum PersistError {
    #[error("Failed to encode {path}: {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to assemble document {path}: {reason}")]
    Document { path: PathBuf, reason: String },
}

/// Filesystem failure while rotating or appending to the event log.
#[derive(Debug, thiserror::Error)]
pub enum LogError {
    #[error("Failed to create log directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to list log directory {path}: {source}")]
    List {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to remove retired log {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rotate {from} to {to}: {source}")]
    Rotate {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write log entry to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Reason a burst stopped before capturing every frame.
#[derive(Debug, thiserror::Error)]
pub enum BurstError {
    #[error(transparent)]
    Device(#[from] DeviceError),

    #[error(transparent)]
    Persist(#[from] PersistError),
}

/// Invalid capture settings.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ConfigError {
    #[error("Photo count must be between 1 and {max}, got {got}")]
    PhotoCount { got: u32, max: u32 },

    #[error("Delay must be between 0 and {max} seconds, got {got}")]
    Delay { got: f64, max: f64 },

    #[error("Interval must be at least one second")]
    Interval,

    #[error("Log rotation limit must be at least 1")]
    RotationLimit,
}
