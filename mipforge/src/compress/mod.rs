//! Block compression of exported levels.
//!
//! The [`BlockCompressor`] trait is the seam to whatever produces the
//! GPU-native payload. Every backend takes a lossless raster on disk and
//! writes a PVR v3 container next to it; [`CompressionInvoker`] then strips
//! the fixed header and keeps the block data.
//!
//! # Available Compressors
//!
//! - [`Bc1Compressor`] - in-process BC1 via `intel_tex_2`
//! - [`ExternalCompressor`] - runs an encoder binary such as `etcpak`
//!
//! Tests substitute their own implementation to decouple container
//! correctness from a real encoder.

mod builtin;
mod error;
mod external;
pub mod pvr;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

pub use builtin::Bc1Compressor;
pub use error::CompressError;
pub use external::{ExternalCompressor, DEFAULT_PROGRAM};
pub use pvr::{PvrHeader, PVR_HEADER_LEN};

use crate::mip::LevelInfo;

/// Extension of the compressor's output container.
pub const CONTAINER_EXTENSION: &str = "pvr";

/// Strategy that turns a lossless raster into a PVR v3 container.
pub trait BlockCompressor {
    /// Human-readable backend name.
    fn name(&self) -> &str;

    /// Check once at startup that the backend can run.
    fn probe(&self) -> Result<(), CompressError> {
        Ok(())
    }

    /// Compress the image at `raster` into a container at `output`.
    fn compress(&self, raster: &Path, output: &Path) -> Result<(), CompressError>;
}

/// Block data of one level, with the container it was cut from.
#[derive(Debug, Clone)]
pub struct CompressedPayload {
    pub payload: Vec<u8>,
    pub container: PathBuf,
}

/// Drives a [`BlockCompressor`] for one level at a time.
pub struct CompressionInvoker<'c> {
    compressor: &'c dyn BlockCompressor,
}

impl<'c> CompressionInvoker<'c> {
    pub fn new(compressor: &'c dyn BlockCompressor) -> Self {
        Self { compressor }
    }

    pub fn compressor_name(&self) -> &str {
        self.compressor.name()
    }

    /// Compress the level exported at `raster`.
    ///
    /// The payload is the container minus its first [`PVR_HEADER_LEN`]
    /// bytes. There is no fallback to raw storage on failure.
    pub fn compress_level(
        &self,
        info: LevelInfo,
        raster: &Path,
    ) -> Result<CompressedPayload, CompressError> {
        let container = container_path(raster);

        // A stale container from an earlier run must not pass for fresh output.
        match fs::remove_file(&container) {
            Ok(()) => debug!(path = %container.display(), "removed stale container"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(source) => {
                return Err(CompressError::WriteOutput {
                    path: container,
                    source,
                })
            }
        }

        self.compressor.compress(raster, &container)?;

        let bytes = match fs::read(&container) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(CompressError::MissingOutput(container))
            }
            Err(source) => {
                return Err(CompressError::ReadOutput {
                    path: container,
                    source,
                })
            }
        };

        let payload = strip_container_header(&bytes, info, &container)?;
        debug!(
            level = info.index,
            compressor = self.compressor.name(),
            container_size = bytes.len(),
            payload_size = payload.len(),
            "level compressed"
        );

        Ok(CompressedPayload { payload, container })
    }
}

/// Output path for the container produced from `raster`.
pub fn container_path(raster: &Path) -> PathBuf {
    raster.with_extension(CONTAINER_EXTENSION)
}

/// Validate the PVR v3 header of `bytes` against `info` and return the rest.
pub fn strip_container_header(
    bytes: &[u8],
    info: LevelInfo,
    path: &Path,
) -> Result<Vec<u8>, CompressError> {
    let header = PvrHeader::parse(bytes).map_err(|reason| CompressError::InvalidHeader {
        path: path.to_path_buf(),
        reason,
    })?;

    if (header.width, header.height) != (info.width, info.height) {
        return Err(CompressError::DimensionMismatch {
            path: path.to_path_buf(),
            expected: (info.width, info.height),
            actual: (header.width, header.height),
        });
    }

    Ok(bytes[PVR_HEADER_LEN..].to_vec())
}
