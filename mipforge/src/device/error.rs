//! Error types for mip device operations.

use std::fmt;

use super::TextureId;

/// Errors that can occur while talking to a mip device.
#[derive(Debug, Clone, PartialEq)]
pub enum DeviceError {
    /// The device context could not be created.
    InitFailed(String),
    /// Texture dimensions are unsupported by the device.
    InvalidDimensions {
        width: u32,
        height: u32,
        reason: String,
    },
    /// Uploaded pixel data does not match the declared dimensions.
    InvalidData { expected: usize, actual: usize },
    /// The texture handle does not refer to a live texture.
    UnknownTexture(TextureId),
    /// The requested mip level does not exist on the texture.
    LevelOutOfRange { texture: TextureId, level: u32 },
}

impl fmt::Display for DeviceError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeviceError::InitFailed(msg) => write!(f, "Device initialization failed: {}", msg),
            DeviceError::InvalidDimensions {
                width,
                height,
                reason,
            } => {
                write!(f, "Invalid texture dimensions {}×{}: {}", width, height, reason)
            }
            DeviceError::InvalidData { expected, actual } => write!(
                f,
                "Invalid pixel data: expected {} bytes, got {}",
                expected, actual
            ),
            DeviceError::UnknownTexture(id) => write!(f, "Unknown texture {}", id),
            DeviceError::LevelOutOfRange { texture, level } => {
                write!(f, "Texture {} has no mip level {}", texture, level)
            }
        }
    }
}

impl std::error::Error for DeviceError {}
