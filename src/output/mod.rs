mod jpeg;
mod pdf;

pub use jpeg::JpegWriter;
pub use pdf::PdfWriter;

use crate::config::OutputFormat;
use crate::error::PersistError;
use image::RgbImage;
use std::path::Path;

/// Trait for artifact formats
pub trait ArtifactWriter {
    /// File extension of the artifacts, without the dot
    fn extension(&self) -> &'static str;

    /// Persist one frame as a new file at `path`
    fn write(&self, frame: &RgbImage, path: &Path) -> Result<(), PersistError>;
}

/// Create the writer for an output format
pub fn writer_for(format: OutputFormat, jpeg_quality: u8) -> Box<dyn ArtifactWriter> {
    match format {
        OutputFormat::Jpeg => Box::new(JpegWriter::new(jpeg_quality)),
        OutputFormat::Pdf => Box::new(PdfWriter::new(jpeg_quality)),
    }
}
