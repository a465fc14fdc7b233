//! Single-page PDF artifacts.
//!
//! The frame is encoded to JPEG and embedded as a DCT-encoded image on a page
//! whose media box equals the frame's pixel dimensions (one point per pixel),
//! so the picture is never stretched to a paper size.

use super::jpeg::encode_jpeg;
use super::ArtifactWriter;
use crate::error::PersistError;
use image::RgbImage;
use pdf_writer::{Content, Filter, Finish, Name, Pdf, Rect, Ref};
use std::fs;
use std::path::Path;

const IMAGE_NAME: Name<'static> = Name(b"Im0");

pub struct PdfWriter {
    quality: u8,
}

impl PdfWriter {
    pub fn new(quality: u8) -> Self {
        Self { quality }
    }
}

impl ArtifactWriter for PdfWriter {
    fn extension(&self) -> &'static str {
        "pdf"
    }

    fn write(&self, frame: &RgbImage, path: &Path) -> Result<(), PersistError> {
        let (width, height) = frame.dimensions();
        if width == 0 || height == 0 {
            return Err(PersistError::Document {
                path: path.to_path_buf(),
                reason: format!("frame has no pixels ({width}x{height})"),
            });
        }
        let (Ok(pixel_width), Ok(pixel_height)) = (i32::try_from(width), i32::try_from(height))
        else {
            return Err(PersistError::Document {
                path: path.to_path_buf(),
                reason: format!("frame is too large ({width}x{height})"),
            });
        };

        let jpeg = encode_jpeg(frame, self.quality).map_err(|source| PersistError::Encode {
            path: path.to_path_buf(),
            source,
        })?;
        let document = single_page_pdf(&jpeg, pixel_width, pixel_height);

        fs::write(path, document).map_err(|source| PersistError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

/// Build a PDF with one `width` x `height` point page showing `jpeg`.
fn single_page_pdf(jpeg: &[u8], width: i32, height: i32) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let page_id = Ref::new(3);
    let image_id = Ref::new(4);
    let content_id = Ref::new(5);

    #[allow(clippy::cast_precision_loss)]
    let (w, h) = (width as f32, height as f32);

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id).kids([page_id]).count(1);

    let mut page = pdf.page(page_id);
    page.media_box(Rect::new(0.0, 0.0, w, h));
    page.parent(page_tree_id);
    page.contents(content_id);
    page.resources().x_objects().pair(IMAGE_NAME, image_id);
    page.finish();

    let mut image = pdf.image_xobject(image_id, jpeg);
    image.filter(Filter::DctDecode);
    image.width(width);
    image.height(height);
    image.color_space().device_rgb();
    image.bits_per_component(8);
    image.finish();

    let mut content = Content::new();
    content.save_state();
    content.transform([w, 0.0, 0.0, h, 0.0, 0.0]);
    content.x_object(IMAGE_NAME);
    content.restore_state();
    pdf.stream(content_id, &content.finish());

    pdf.finish()
}
