//! Error types for container reading and writing.

use std::io;

use thiserror::Error;

/// Errors that can occur while writing or parsing a `.bin` container.
#[derive(Debug, Error)]
pub enum ContainerError {
    /// Underlying stream failed.
    #[error("container I/O error: {0}")]
    Io(#[from] io::Error),

    /// More levels than the one-byte footer can count.
    #[error("container cannot hold more than 255 levels")]
    TooManyLevels,

    /// The stream ends without a level count footer.
    #[error("container ends after {levels} level record(s) without a footer")]
    MissingFooter { levels: usize },

    /// A record extends past the end of the stream.
    #[error("record at offset {offset} needs {needed} bytes, only {available} remain")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    /// A record declares a negative payload size.
    #[error("record at offset {offset} declares negative payload size {size}")]
    NegativePayloadSize { offset: usize, size: i32 },

    /// The footer disagrees with the number of records.
    #[error("footer declares {declared} level(s) but {actual} record(s) were found")]
    LevelCountMismatch { declared: u8, actual: usize },

    /// The container holds no levels at all.
    #[error("container holds no levels")]
    Empty,

    /// The level sequence is not a valid mip chain.
    #[error("invalid mip chain: {0}")]
    InvalidChain(String),
}
