//! The `.bin` mip container.
//!
//! Little-endian, no magic, no header. One record per level in ascending
//! index order, then a single footer byte:
//!
//! ```text
//! repeat for each level:
//!     u16  width
//!     u16  height
//!     i32  payload_size
//!     u8[payload_size] payload
//! u8   level_count
//! ```
//!
//! Because the count is a footer, a reader can only trust a container after
//! consuming it to the end. A file cut short by a failed export has no
//! footer and is rejected by [`read_container`].

mod error;
mod reader;
mod writer;

pub use error::ContainerError;
pub use reader::{read_container, read_container_file, Container, ContainerLevel};
pub use writer::ContainerWriter;

/// Bytes in a record header: width, height, payload size.
pub const RECORD_HEADER_LEN: usize = 2 + 2 + 4;

/// Bytes in the trailing level count.
pub const FOOTER_LEN: usize = 1;

/// Extension of generated containers.
pub const CONTAINER_EXTENSION: &str = "bin";
