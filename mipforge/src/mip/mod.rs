//! Mip level enumeration and export.
//!
//! [`MipLevels`] walks a texture's chain exactly as the device reports it,
//! and [`LevelExporter`] turns each reported level into a pixel buffer plus,
//! for compressible levels, a lossless PNG intermediate.

mod enumerator;
mod error;
mod export;

pub use enumerator::MipLevels;
pub use error::ExportError;
pub use export::{raster_file_name, write_raster, ExportedLevel, LevelExporter};

/// Smallest width and height that block compression accepts.
pub const MIN_COMPRESSIBLE_EDGE: u32 = 4;

/// Bytes per RGB24 pixel.
pub const RGB_BYTES_PER_PIXEL: usize = 3;

/// Position and size of one mip level as reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LevelInfo {
    pub index: u32,
    pub width: u32,
    pub height: u32,
}

impl LevelInfo {
    /// Whether this level is stored block compressed.
    pub fn is_compressible(&self) -> bool {
        is_compressible(self.width, self.height)
    }

    /// Whether this is the last level of the chain.
    pub fn is_terminal(&self) -> bool {
        self.width == 1 && self.height == 1
    }

    /// Size of this level as raw RGB24.
    pub fn raw_size(&self) -> usize {
        self.width as usize * self.height as usize * RGB_BYTES_PER_PIXEL
    }
}

/// Block compression needs at least one full 4×4 tile.
pub fn is_compressible(width: u32, height: u32) -> bool {
    width >= MIN_COMPRESSIBLE_EDGE && height >= MIN_COMPRESSIBLE_EDGE
}

/// Number of levels in a full chain for a `width`×`height` base.
///
/// Equals `1 + floor(log2(max(width, height)))`.
pub fn full_chain_length(width: u32, height: u32) -> u32 {
    let largest = width.max(height).max(1);
    u32::BITS - largest.leading_zeros()
}

/// One finished level, ready for the container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MipLevel {
    pub index: u32,
    pub width: u16,
    pub height: u16,
    pub payload: Vec<u8>,
    pub compressed: bool,
}

impl MipLevel {
    /// Store `pixels` uncompressed.
    pub fn raw(info: LevelInfo, pixels: Vec<u8>) -> Result<Self, ExportError> {
        Self::build(info, pixels, false)
    }

    /// Store an already block-compressed payload.
    pub fn compressed(info: LevelInfo, payload: Vec<u8>) -> Result<Self, ExportError> {
        Self::build(info, payload, true)
    }

    fn build(info: LevelInfo, payload: Vec<u8>, compressed: bool) -> Result<Self, ExportError> {
        let too_large = || ExportError::DimensionsTooLarge {
            width: info.width,
            height: info.height,
        };
        let width = u16::try_from(info.width).map_err(|_| too_large())?;
        let height = u16::try_from(info.height).map_err(|_| too_large())?;

        if i32::try_from(payload.len()).is_err() {
            return Err(ExportError::PayloadTooLarge {
                index: info.index,
                size: payload.len(),
            });
        }

        Ok(Self {
            index: info.index,
            width,
            height,
            payload,
            compressed,
        })
    }

    /// Payload length as stored in the container.
    pub fn payload_size(&self) -> i32 {
        // Checked on construction.
        self.payload.len() as i32
    }
}
