//! Mip device abstraction.
//!
//! A [`MipDevice`] is the oracle that owns texture storage, generates the
//! mip chain with its own downsampling filter, and answers per-level
//! dimension and pixel queries. Consumers never recompute level sizes
//! locally; whatever rounding the device applies is authoritative.
//!
//! ```text
//! ┌─────────────────────┐
//! │      Pipeline       │
//! │  &mut dyn MipDevice │
//! └──────────┬──────────┘
//!            │ BoundTexture (one per input file)
//!            ▼
//! ┌─────────────────────┐
//! │     MipDevice       │ (trait)
//! └──────────┬──────────┘
//!            │
//!       ┌────┴─────┐
//!       ▼          ▼
//! ┌──────────┐ ┌──────────┐
//! │ Software │ │  Test    │
//! │  Device  │ │  fakes   │
//! └──────────┘ └──────────┘
//! ```
//!
//! The device context is created once per run and passed by reference.
//! Textures are scoped to a [`BoundTexture`] guard which destroys the
//! texture when dropped, whether or not the file succeeded.

mod error;
mod software;

use std::fmt;

pub use error::DeviceError;
pub use software::{DeviceConfig, SoftwareDevice};

use crate::source::SourceImage;

/// Opaque handle to a texture owned by a device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureId(pub u32);

impl fmt::Display for TextureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Texture minification/magnification filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Nearest,
    Linear,
    /// Trilinear: linear within and between mip levels.
    LinearMipmapLinear,
}

/// Texture coordinate wrap mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Wrap {
    Repeat,
    ClampToEdge,
}

/// Sampler state applied to a texture after upload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextureParams {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
    pub max_anisotropy: f32,
}

impl TextureParams {
    /// Trilinear filtering with edge clamping at the given anisotropy.
    pub fn trilinear_clamped(max_anisotropy: f32) -> Self {
        Self {
            min_filter: Filter::LinearMipmapLinear,
            mag_filter: Filter::Linear,
            wrap_s: Wrap::ClampToEdge,
            wrap_t: Wrap::ClampToEdge,
            max_anisotropy,
        }
    }
}

/// Mip chain oracle.
///
/// Implementations must generate a chain that converges to a 1×1 level;
/// the level enumerator relies on that to terminate.
pub trait MipDevice {
    /// Human-readable device name.
    fn name(&self) -> &str;

    /// Largest anisotropy the device supports.
    ///
    /// Queried once per run and cached by the caller.
    fn max_anisotropy(&self) -> f32;

    /// Upload an RGB24 image as level 0 of a new texture.
    fn create_texture(&mut self, image: &SourceImage) -> Result<TextureId, DeviceError>;

    /// Apply sampler state to a texture.
    fn set_params(&mut self, texture: TextureId, params: TextureParams)
        -> Result<(), DeviceError>;

    /// Build the full mip chain of a texture from its level 0.
    fn generate_mipmaps(&mut self, texture: TextureId) -> Result<(), DeviceError>;

    /// Dimensions of `level`, or `None` if the level does not exist.
    fn level_dimensions(
        &self,
        texture: TextureId,
        level: u32,
    ) -> Result<Option<(u32, u32)>, DeviceError>;

    /// Read back `level` as tightly packed RGB24 (stride = width × 3).
    fn read_level(&self, texture: TextureId, level: u32) -> Result<Vec<u8>, DeviceError>;

    /// Release a texture. Unknown handles are ignored.
    fn destroy_texture(&mut self, texture: TextureId);
}

/// A texture scoped to one input file.
///
/// Destroys the texture on drop.
pub struct BoundTexture<'d, D: MipDevice + ?Sized> {
    device: &'d mut D,
    id: TextureId,
}

impl<'d, D: MipDevice + ?Sized> BoundTexture<'d, D> {
    /// Upload `image` into a fresh texture on `device`.
    pub fn upload(device: &'d mut D, image: &SourceImage) -> Result<Self, DeviceError> {
        let id = device.create_texture(image)?;
        Ok(Self { device, id })
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn set_params(&mut self, params: TextureParams) -> Result<(), DeviceError> {
        self.device.set_params(self.id, params)
    }

    pub fn generate_mipmaps(&mut self) -> Result<(), DeviceError> {
        self.device.generate_mipmaps(self.id)
    }

    pub fn level_dimensions(&self, level: u32) -> Result<Option<(u32, u32)>, DeviceError> {
        self.device.level_dimensions(self.id, level)
    }

    pub fn read_level(&self, level: u32) -> Result<Vec<u8>, DeviceError> {
        self.device.read_level(self.id, level)
    }
}

impl<D: MipDevice + ?Sized> Drop for BoundTexture<'_, D> {
    fn drop(&mut self) {
        tracing::trace!(texture = %self.id, "destroying texture");
        self.device.destroy_texture(self.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;

    #[test]
    fn test_bound_texture_destroyed_on_drop() {
        let mut device = SoftwareDevice::init(DeviceConfig::default()).unwrap();
        let image = SourceImage::from_rgb(RgbImage::new(8, 8));

        {
            let texture = BoundTexture::upload(&mut device, &image).unwrap();
            assert_eq!(texture.level_dimensions(0).unwrap(), Some((8, 8)));
        }

        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn test_bound_texture_destroyed_on_error_path() {
        fn failing(device: &mut SoftwareDevice, image: &SourceImage) -> Result<(), DeviceError> {
            let texture = BoundTexture::upload(device, image)?;
            texture.read_level(42)?;
            Ok(())
        }

        let mut device = SoftwareDevice::init(DeviceConfig::default()).unwrap();
        let image = SourceImage::from_rgb(RgbImage::new(4, 4));

        assert!(failing(&mut device, &image).is_err());
        assert_eq!(device.live_textures(), 0);
    }

    #[test]
    fn test_trilinear_clamped_params() {
        let params = TextureParams::trilinear_clamped(8.0);
        assert_eq!(params.min_filter, Filter::LinearMipmapLinear);
        assert_eq!(params.mag_filter, Filter::Linear);
        assert_eq!(params.wrap_s, Wrap::ClampToEdge);
        assert_eq!(params.wrap_t, Wrap::ClampToEdge);
        assert_eq!(params.max_anisotropy, 8.0);
    }

    #[test]
    fn test_works_through_trait_object() {
        let mut device = SoftwareDevice::init(DeviceConfig::default()).unwrap();
        let dyn_device: &mut dyn MipDevice = &mut device;
        let image = SourceImage::from_rgb(RgbImage::new(2, 2));

        let mut texture = BoundTexture::upload(dyn_device, &image).unwrap();
        texture.generate_mipmaps().unwrap();
        assert_eq!(texture.level_dimensions(1).unwrap(), Some((1, 1)));
    }
}
