//! In-process BC1 compressor.
//!
//! Reads the lossless raster back, pads it to whole 4×4 blocks by
//! replicating the last row and column, runs `intel_tex_2`'s BC1 kernel and
//! writes the result as a single-level PVR v3 container.

use std::fs;
use std::path::Path;

use image::RgbaImage;
use intel_tex_2::{bc1, RgbaSurface};

use super::pvr::{PvrHeader, PVR_FORMAT_BC1};
use super::{BlockCompressor, CompressError};

/// Bytes per compressed 4×4 BC1 block.
pub const BC1_BLOCK_SIZE: usize = 8;

/// BC1 compressor backed by `intel_tex_2`.
#[derive(Debug, Clone, Copy, Default)]
pub struct Bc1Compressor;

impl Bc1Compressor {
    pub fn new() -> Self {
        Self
    }

    /// BC1 payload size for a `width`×`height` image.
    pub fn payload_size(width: u32, height: u32) -> usize {
        width.div_ceil(4) as usize * height.div_ceil(4) as usize * BC1_BLOCK_SIZE
    }

    /// Grow `image` to multiples of 4 by edge replication.
    fn pad_to_blocks(image: &RgbaImage) -> RgbaImage {
        let (width, height) = image.dimensions();
        let padded_width = width.div_ceil(4) * 4;
        let padded_height = height.div_ceil(4) * 4;
        if (padded_width, padded_height) == (width, height) {
            return image.clone();
        }

        RgbaImage::from_fn(padded_width, padded_height, |x, y| {
            *image.get_pixel(x.min(width - 1), y.min(height - 1))
        })
    }

    /// Compress an RGBA image into raw BC1 blocks.
    pub fn compress_image(image: &RgbaImage) -> Vec<u8> {
        let padded = Self::pad_to_blocks(image);
        let surface = RgbaSurface {
            data: padded.as_raw(),
            width: padded.width(),
            height: padded.height(),
            stride: padded.width() * 4,
        };
        bc1::compress_blocks(&surface)
    }
}

impl BlockCompressor for Bc1Compressor {
    fn name(&self) -> &str {
        "builtin-bc1"
    }

    fn compress(&self, raster: &Path, output: &Path) -> Result<(), CompressError> {
        let image = image::open(raster)
            .map_err(|source| CompressError::ReadRaster {
                path: raster.to_path_buf(),
                source,
            })?
            .to_rgba8();

        let blocks = Self::compress_image(&image);
        let header = PvrHeader::new(PVR_FORMAT_BC1, image.width(), image.height());

        let mut bytes = Vec::with_capacity(header.to_bytes().len() + blocks.len());
        bytes.extend_from_slice(&header.to_bytes());
        bytes.extend_from_slice(&blocks);

        fs::write(output, bytes).map_err(|source| CompressError::WriteOutput {
            path: output.to_path_buf(),
            source,
        })
    }
}
