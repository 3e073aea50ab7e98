//! PVR v3 container header.
//!
//! Block compressors hand back their output wrapped in a PowerVR v3
//! container. Only the fixed 52-byte header is modelled; the container
//! payload starts right after it as long as the metadata block is empty.
//!
//! The header size is tied to version 3 of the format. Any other version,
//! or a non-empty metadata block, shifts the payload offset and is rejected
//! instead of being stripped blindly.

/// Size of the PVR v3 header in bytes.
pub const PVR_HEADER_LEN: usize = 52;

/// `"PVR\x03"` read as a little-endian u32.
pub const PVR_VERSION_V3: u32 = 0x0352_5650;

/// Same magic written by a big-endian producer.
const PVR_VERSION_V3_SWAPPED: u32 = 0x5056_5203;

/// Pixel format id for ETC1.
pub const PVR_FORMAT_ETC1: u64 = 6;

/// Pixel format id for BC1 / DXT1.
pub const PVR_FORMAT_BC1: u64 = 7;

/// Parsed PVR v3 header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PvrHeader {
    pub flags: u32,
    pub pixel_format: u64,
    pub colour_space: u32,
    pub channel_type: u32,
    pub height: u32,
    pub width: u32,
    pub depth: u32,
    pub num_surfaces: u32,
    pub num_faces: u32,
    pub mip_map_count: u32,
    pub metadata_size: u32,
}

impl PvrHeader {
    /// Header for a single-surface, single-level 2D texture.
    pub fn new(pixel_format: u64, width: u32, height: u32) -> Self {
        Self {
            flags: 0,
            pixel_format,
            colour_space: 0,
            channel_type: 0,
            height,
            width,
            depth: 1,
            num_surfaces: 1,
            num_faces: 1,
            mip_map_count: 1,
            metadata_size: 0,
        }
    }

    /// Serialize to exactly [`PVR_HEADER_LEN`] bytes.
    pub fn to_bytes(&self) -> [u8; PVR_HEADER_LEN] {
        let mut bytes = [0u8; PVR_HEADER_LEN];
        bytes[0..4].copy_from_slice(&PVR_VERSION_V3.to_le_bytes());
        bytes[4..8].copy_from_slice(&self.flags.to_le_bytes());
        bytes[8..16].copy_from_slice(&self.pixel_format.to_le_bytes());
        bytes[16..20].copy_from_slice(&self.colour_space.to_le_bytes());
        bytes[20..24].copy_from_slice(&self.channel_type.to_le_bytes());
        bytes[24..28].copy_from_slice(&self.height.to_le_bytes());
        bytes[28..32].copy_from_slice(&self.width.to_le_bytes());
        bytes[32..36].copy_from_slice(&self.depth.to_le_bytes());
        bytes[36..40].copy_from_slice(&self.num_surfaces.to_le_bytes());
        bytes[40..44].copy_from_slice(&self.num_faces.to_le_bytes());
        bytes[44..48].copy_from_slice(&self.mip_map_count.to_le_bytes());
        bytes[48..52].copy_from_slice(&self.metadata_size.to_le_bytes());
        bytes
    }

    /// Parse the header at the start of `bytes`.
    ///
    /// Returns a human-readable reason on failure.
    pub fn parse(bytes: &[u8]) -> Result<Self, String> {
        if bytes.len() < PVR_HEADER_LEN {
            return Err(format!(
                "file is {} bytes, shorter than the {}-byte header",
                bytes.len(),
                PVR_HEADER_LEN
            ));
        }

        let u32_at = |offset: usize| {
            let mut buf = [0u8; 4];
            buf.copy_from_slice(&bytes[offset..offset + 4]);
            u32::from_le_bytes(buf)
        };

        match u32_at(0) {
            PVR_VERSION_V3 => {}
            PVR_VERSION_V3_SWAPPED => {
                return Err("big-endian PVR v3 container is not supported".to_string())
            }
            other => return Err(format!("unexpected version tag 0x{:08x}", other)),
        }

        let mut format = [0u8; 8];
        format.copy_from_slice(&bytes[8..16]);

        let header = Self {
            flags: u32_at(4),
            pixel_format: u64::from_le_bytes(format),
            colour_space: u32_at(16),
            channel_type: u32_at(20),
            height: u32_at(24),
            width: u32_at(28),
            depth: u32_at(32),
            num_surfaces: u32_at(36),
            num_faces: u32_at(40),
            mip_map_count: u32_at(44),
            metadata_size: u32_at(48),
        };

        if header.metadata_size != 0 {
            return Err(format!(
                "metadata block of {} bytes would move the payload offset",
                header.metadata_size
            ));
        }

        Ok(header)
    }
}
