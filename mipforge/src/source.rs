//! Source image decoding.
//!
//! Decodes any raster the `image` crate understands and normalizes it to
//! tightly packed 24-bit RGB. Alpha is discarded.

use std::io;
use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageReader, RgbImage};
use thiserror::Error;

/// Errors raised while loading a source image.
#[derive(Debug, Error)]
pub enum SourceError {
    /// The file could not be opened or sniffed.
    #[error("failed to open '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file content is not a supported or valid image.
    #[error("failed to decode '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The image decoded to zero pixels.
    #[error("image '{path}' has empty dimensions {width}×{height}")]
    Empty {
        path: PathBuf,
        width: u32,
        height: u32,
    },
}

/// A decoded RGB24 source image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl SourceImage {
    /// Wrap an already normalized RGB24 image.
    pub fn from_rgb(image: RgbImage) -> Self {
        let (width, height) = image.dimensions();
        Self {
            width,
            height,
            pixels: image.into_raw(),
        }
    }

    /// Normalize any decoded image to RGB24.
    pub fn from_dynamic(image: DynamicImage) -> Self {
        Self::from_rgb(image.to_rgb8())
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Row-major RGB24 pixels, stride `width * 3`.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// Decode the file at `path` into a [`SourceImage`].
///
/// The container format is sniffed from the content, so a mislabelled
/// extension still decodes.
pub fn load_source(path: &Path) -> Result<SourceImage, SourceError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let decoded = reader.decode().map_err(|source| SourceError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let image = SourceImage::from_dynamic(decoded);
    if image.width == 0 || image.height == 0 {
        return Err(SourceError::Empty {
            path: path.to_path_buf(),
            width: image.width,
            height: image.height,
        });
    }

    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};
    use tempfile::TempDir;

    #[test]
    fn test_load_png_normalizes_to_rgb() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("alpha.png");

        let mut rgba = RgbaImage::new(3, 2);
        for pixel in rgba.pixels_mut() {
            *pixel = Rgba([10, 20, 30, 40]);
        }
        rgba.save(&path).unwrap();

        let image = load_source(&path).unwrap();
        assert_eq!(image.dimensions(), (3, 2));
        assert_eq!(image.pixels().len(), 3 * 2 * 3);
        assert_eq!(&image.pixels()[0..3], &[10, 20, 30]);
    }

    #[test]
    fn test_load_sniffs_content_not_extension() {
        let dir = TempDir::new().unwrap();
        let png_path = dir.path().join("real.png");
        RgbImage::new(4, 4).save(&png_path).unwrap();

        let renamed = dir.path().join("mislabelled.jpg");
        std::fs::rename(&png_path, &renamed).unwrap();

        let image = load_source(&renamed).unwrap();
        assert_eq!(image.dimensions(), (4, 4));
    }

    #[test]
    fn test_missing_file_is_open_error() {
        let dir = TempDir::new().unwrap();
        let err = load_source(&dir.path().join("nope.png")).unwrap_err();
        assert!(matches!(err, SourceError::Open { .. }));
        assert!(err.to_string().contains("nope.png"));
    }

    #[test]
    fn test_corrupt_file_is_decode_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("corrupt.png");
        std::fs::write(&path, b"\x89PNG\r\n\x1a\nthis is not a png").unwrap();

        let err = load_source(&path).unwrap_err();
        assert!(matches!(err, SourceError::Decode { .. }));
    }
}
