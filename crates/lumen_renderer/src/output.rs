//! Image sinks for intermediate and final renders.

use std::path::Path;

use image::{ColorType, ImageFormat};

use crate::image::Image;
use crate::renderer::RenderError;

/// Destination for rendered images.
///
/// `save` is called from the autosave thread while workers are still
/// writing, so implementations only get shared access to the image.
pub trait ImageSink: Send + Sync {
    fn save(&self, path: &Path, image: &Image) -> Result<(), RenderError>;
}

/// Writes 8-bit RGBA PNG files.
#[derive(Debug, Clone, Copy, Default)]
pub struct PngSink;

impl ImageSink for PngSink {
    fn save(&self, path: &Path, image: &Image) -> Result<(), RenderError> {
        let bytes = image.to_rgba8();
        image::save_buffer_with_format(
            path,
            &bytes,
            image.width(),
            image.height(),
            ColorType::Rgba8,
            ImageFormat::Png,
        )
        .map_err(|source| RenderError::Save {
            path: path.to_path_buf(),
            source,
        })
    }
}
