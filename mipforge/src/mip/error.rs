//! Error types for level enumeration and export.

use std::path::PathBuf;

use thiserror::Error;

use crate::device::DeviceError;

/// Errors raised while walking or exporting mip levels.
#[derive(Debug, Error)]
pub enum ExportError {
    /// The device failed a query or readback.
    #[error("device error: {0}")]
    Device(#[from] DeviceError),

    /// The chain ended before reaching a 1×1 level.
    #[error("mip level {index} missing before the chain reached 1×1")]
    MissingLevel { index: u32 },

    /// Level 0 does not match the uploaded image.
    #[error("level 0 is {actual:?}, expected source dimensions {expected:?}")]
    BaseMismatch {
        expected: (u32, u32),
        actual: (u32, u32),
    },

    /// Readback returned the wrong number of bytes.
    #[error("level {index} readback returned {actual} bytes, expected {expected}")]
    ShortReadback {
        index: u32,
        expected: usize,
        actual: usize,
    },

    /// The lossless intermediate could not be written.
    #[error("failed to write raster '{path}': {source}")]
    RasterWrite {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Level dimensions do not fit the container's 16-bit fields.
    #[error("level dimensions {width}×{height} exceed 65535")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// Payload does not fit the container's 32-bit size field.
    #[error("level {index} payload of {size} bytes exceeds i32::MAX")]
    PayloadTooLarge { index: u32, size: usize },
}
