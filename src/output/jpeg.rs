use super::ArtifactWriter;
use crate::error::PersistError;
use image::codecs::jpeg::JpegEncoder;
use image::RgbImage;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

pub struct JpegWriter {
    quality: u8,
}

impl JpegWriter {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

/// Encode `frame` as JPEG in memory.
pub(super) fn encode_jpeg(frame: &RgbImage, quality: u8) -> Result<Vec<u8>, image::ImageError> {
    let mut bytes = Vec::new();
    JpegEncoder::new_with_quality(&mut bytes, quality).encode_image(frame)?;
    Ok(bytes)
}

/// Encode `frame` as JPEG into a new file at `path`.
pub(super) fn write_jpeg(frame: &RgbImage, quality: u8, path: &Path) -> Result<(), PersistError> {
    let file = File::create(path).map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = BufWriter::new(file);

    JpegEncoder::new_with_quality(&mut writer, quality)
        .encode_image(frame)
        .map_err(|source| PersistError::Encode {
            path: path.to_path_buf(),
            source,
        })?;

    writer.flush().map_err(|source| PersistError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl ArtifactWriter for JpegWriter {
    fn extension(&self) -> &'static str {
        "jpg"
    }

    fn write(&self, frame: &RgbImage, path: &Path) -> Result<(), PersistError> {
        write_jpeg(frame, self.quality, path)
    }
}
