//! Per-file pipeline errors.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::compress::CompressError;
use crate::container::ContainerError;
use crate::device::DeviceError;
use crate::mip::ExportError;
use crate::source::SourceError;

/// Why one input file was abandoned.
///
/// None of these stop a batch; the orchestrator logs them and moves on.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Source(#[from] SourceError),

    #[error("texture setup failed: {0}")]
    Device(#[from] DeviceError),

    #[error("output '{path}' would overwrite its own input")]
    OutputIsInput { path: PathBuf },

    #[error("failed to create output '{path}': {source}")]
    OutputOpen {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("export failed: {0}")]
    Export(#[from] ExportError),

    #[error("compression of level {index} failed: {source}")]
    Compress {
        index: u32,
        #[source]
        source: CompressError,
    },

    #[error("container write failed: {0}")]
    Container(#[from] ContainerError),
}
