//! Pure Rust image probe over the `image` crate.
//!
//! Only the header is read, so probing a large banner is cheap. Decoders for
//! JPEG, PNG, GIF, WebP and BMP are compiled in.

use super::backend::{Dimensions, ImageProbe, ProbeError};
use image::ImageError;
use std::path::Path;

#[derive(Debug, Default, Clone, Copy)]
pub struct ImageCrateProbe;

impl ImageProbe for ImageCrateProbe {
    fn probe(&self, path: &Path) -> Result<Dimensions, ProbeError> {
        let (width, height) = image::image_dimensions(path).map_err(|e| match e {
            ImageError::IoError(source) => ProbeError::Io {
                path: path.to_path_buf(),
                source,
            },
            other => ProbeError::Decode {
                path: path.to_path_buf(),
                message: other.to_string(),
            },
        })?;
        Ok(Dimensions { width, height })
    }
}
