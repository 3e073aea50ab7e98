//! Streaming container writer.

use std::io::Write;

use super::ContainerError;
use crate::mip::MipLevel;

/// Writes level records as they are produced and the footer at the end.
///
/// Nothing is buffered beyond what `W` buffers itself, so a writer dropped
/// without [`finish`](Self::finish) leaves the records written so far and
/// no footer.
pub struct ContainerWriter<W: Write> {
    inner: W,
    levels_written: usize,
    bytes_written: u64,
}

impl<W: Write> ContainerWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner,
            levels_written: 0,
            bytes_written: 0,
        }
    }

    /// Number of level records written so far.
    pub fn levels_written(&self) -> usize {
        self.levels_written
    }

    /// Total bytes handed to the underlying stream.
    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Append one level record.
    pub fn write_level(&mut self, level: &MipLevel) -> Result<(), ContainerError> {
        if self.levels_written >= u8::MAX as usize {
            return Err(ContainerError::TooManyLevels);
        }

        self.inner.write_all(&level.width.to_le_bytes())?;
        self.inner.write_all(&level.height.to_le_bytes())?;
        self.inner.write_all(&level.payload_size().to_le_bytes())?;
        self.inner.write_all(&level.payload)?;

        self.levels_written += 1;
        self.bytes_written += (super::RECORD_HEADER_LEN + level.payload.len()) as u64;
        Ok(())
    }

    /// Append the level count footer, flush, and hand back the stream.
    pub fn finish(mut self) -> Result<W, ContainerError> {
        // write_level caps the count at u8::MAX.
        let count = self.levels_written as u8;
        self.inner.write_all(&[count])?;
        self.inner.flush()?;
        self.bytes_written += super::FOOTER_LEN as u64;
        Ok(self.inner)
    }
}
