//! CPU-backed mip device.
//!
//! Stores each texture as a chain of `RgbImage`s and builds mip levels with
//! a 2×2 box filter. Level sizes follow the usual GPU rule: each axis is
//! halved with floor and clamped to 1, so a 5×3 base yields 2×1 then 1×1.

use std::collections::HashMap;

use image::{ImageBuffer, Rgb, RgbImage};
use tracing::{debug, warn};

use super::{DeviceError, MipDevice, TextureId, TextureParams};
use crate::source::SourceImage;

/// Default anisotropy limit reported by the software device.
pub const DEFAULT_MAX_ANISOTROPY: f32 = 16.0;

/// Default largest accepted texture edge, in pixels.
pub const DEFAULT_MAX_TEXTURE_SIZE: u32 = 16384;

/// Capabilities of a [`SoftwareDevice`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DeviceConfig {
    /// Anisotropy reported to callers (must be ≥ 1).
    pub max_anisotropy: f32,
    /// Largest accepted width or height.
    pub max_texture_size: u32,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            max_anisotropy: DEFAULT_MAX_ANISOTROPY,
            max_texture_size: DEFAULT_MAX_TEXTURE_SIZE,
        }
    }
}

struct SoftTexture {
    params: Option<TextureParams>,
    levels: Vec<RgbImage>,
}

/// Software implementation of [`MipDevice`].
pub struct SoftwareDevice {
    config: DeviceConfig,
    textures: HashMap<TextureId, SoftTexture>,
    next_id: u32,
}

impl SoftwareDevice {
    /// Create the device context.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::InitFailed`] if the configuration describes a
    /// device that cannot hold any texture.
    pub fn init(config: DeviceConfig) -> Result<Self, DeviceError> {
        if config.max_texture_size == 0 {
            return Err(DeviceError::InitFailed(
                "max texture size must be at least 1".to_string(),
            ));
        }
        if config.max_anisotropy.is_nan() || config.max_anisotropy < 1.0 {
            return Err(DeviceError::InitFailed(format!(
                "max anisotropy must be at least 1.0, got {}",
                config.max_anisotropy
            )));
        }

        debug!(
            max_anisotropy = config.max_anisotropy,
            max_texture_size = config.max_texture_size,
            "software mip device initialized"
        );

        Ok(Self {
            config,
            textures: HashMap::new(),
            next_id: 1,
        })
    }

    /// Tear down the device context.
    pub fn shutdown(self) {
        if !self.textures.is_empty() {
            warn!(
                count = self.textures.len(),
                "device shut down with live textures"
            );
        }
        debug!("software mip device shut down");
    }

    /// Number of textures currently allocated.
    pub fn live_textures(&self) -> usize {
        self.textures.len()
    }

    /// Sampler state last applied to `texture`, if any.
    pub fn params(&self, texture: TextureId) -> Option<TextureParams> {
        self.textures.get(&texture).and_then(|t| t.params)
    }

    fn texture(&self, id: TextureId) -> Result<&SoftTexture, DeviceError> {
        self.textures.get(&id).ok_or(DeviceError::UnknownTexture(id))
    }

    fn texture_mut(&mut self, id: TextureId) -> Result<&mut SoftTexture, DeviceError> {
        self.textures
            .get_mut(&id)
            .ok_or(DeviceError::UnknownTexture(id))
    }

    /// Halve `source` with a 2×2 box filter.
    ///
    /// Axes of size 1 stay 1; odd trailing rows/columns are dropped.
    fn downsample_box_2x(source: &RgbImage) -> RgbImage {
        let (width, height) = source.dimensions();
        let new_width = (width / 2).max(1);
        let new_height = (height / 2).max(1);

        ImageBuffer::from_fn(new_width, new_height, |x, y| {
            let x0 = (x * 2).min(width - 1);
            let x1 = (x * 2 + 1).min(width - 1);
            let y0 = (y * 2).min(height - 1);
            let y1 = (y * 2 + 1).min(height - 1);

            let p00 = source.get_pixel(x0, y0);
            let p10 = source.get_pixel(x1, y0);
            let p01 = source.get_pixel(x0, y1);
            let p11 = source.get_pixel(x1, y1);

            let avg = |c: usize| {
                ((p00[c] as u16 + p10[c] as u16 + p01[c] as u16 + p11[c] as u16) / 4) as u8
            };

            Rgb([avg(0), avg(1), avg(2)])
        })
    }
}

impl MipDevice for SoftwareDevice {
    fn name(&self) -> &str {
        "software"
    }

    fn max_anisotropy(&self) -> f32 {
        self.config.max_anisotropy
    }

    fn create_texture(&mut self, image: &SourceImage) -> Result<TextureId, DeviceError> {
        let (width, height) = image.dimensions();
        if width == 0 || height == 0 {
            return Err(DeviceError::InvalidDimensions {
                width,
                height,
                reason: "must be non-zero".to_string(),
            });
        }
        if width > self.config.max_texture_size || height > self.config.max_texture_size {
            return Err(DeviceError::InvalidDimensions {
                width,
                height,
                reason: format!(
                    "exceeds maximum texture size {}",
                    self.config.max_texture_size
                ),
            });
        }

        let expected = width as usize * height as usize * 3;
        let base = RgbImage::from_raw(width, height, image.pixels().to_vec()).ok_or(
            DeviceError::InvalidData {
                expected,
                actual: image.pixels().len(),
            },
        )?;

        let id = TextureId(self.next_id);
        self.next_id += 1;
        self.textures.insert(
            id,
            SoftTexture {
                params: None,
                levels: vec![base],
            },
        );

        debug!(texture = %id, width, height, "texture created");
        Ok(id)
    }

    fn set_params(
        &mut self,
        texture: TextureId,
        mut params: TextureParams,
    ) -> Result<(), DeviceError> {
        params.max_anisotropy = params
            .max_anisotropy
            .clamp(1.0, self.config.max_anisotropy);
        self.texture_mut(texture)?.params = Some(params);
        Ok(())
    }

    fn generate_mipmaps(&mut self, texture: TextureId) -> Result<(), DeviceError> {
        let tex = self.texture_mut(texture)?;
        tex.levels.truncate(1);

        loop {
            let last = &tex.levels[tex.levels.len() - 1];
            if last.dimensions() == (1, 1) {
                break;
            }
            let next = Self::downsample_box_2x(last);
            tex.levels.push(next);
        }

        debug!(texture = %texture, levels = tex.levels.len(), "mip chain generated");
        Ok(())
    }

    fn level_dimensions(
        &self,
        texture: TextureId,
        level: u32,
    ) -> Result<Option<(u32, u32)>, DeviceError> {
        let tex = self.texture(texture)?;
        Ok(tex.levels.get(level as usize).map(|l| l.dimensions()))
    }

    fn read_level(&self, texture: TextureId, level: u32) -> Result<Vec<u8>, DeviceError> {
        let tex = self.texture(texture)?;
        tex.levels
            .get(level as usize)
            .map(|l| l.as_raw().clone())
            .ok_or(DeviceError::LevelOutOfRange { texture, level })
    }

    fn destroy_texture(&mut self, texture: TextureId) {
        if self.textures.remove(&texture).is_some() {
            debug!(texture = %texture, "texture destroyed");
        }
    }
}
