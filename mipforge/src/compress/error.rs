//! Error types for block compression.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised by a compressor or while unwrapping its output.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The compressor cannot run on this system.
    #[error("compressor '{program}' is unavailable: {reason}")]
    Unavailable { program: String, reason: String },

    /// The compressor process could not be started.
    #[error("failed to run '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: io::Error,
    },

    /// The compressor ran and reported failure.
    #[error("'{program}' exited with {status}: {stderr}")]
    Failed {
        program: String,
        status: String,
        stderr: String,
    },

    /// The compressor reported success but left no output file.
    #[error("compressor produced no output at '{0}'")]
    MissingOutput(PathBuf),

    /// The lossless input raster could not be read.
    #[error("failed to read raster '{path}': {source}")]
    ReadRaster {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// The compressed container could not be read.
    #[error("failed to read '{path}': {source}")]
    ReadOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The compressed container could not be written.
    #[error("failed to write '{path}': {source}")]
    WriteOutput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The container header is not the expected PVR v3 layout.
    #[error("invalid container header in '{path}': {reason}")]
    InvalidHeader { path: PathBuf, reason: String },

    /// The container describes a different image than the level.
    #[error("'{path}' is {actual:?}, expected {expected:?}")]
    DimensionMismatch {
        path: PathBuf,
        expected: (u32, u32),
        actual: (u32, u32),
    },
}
