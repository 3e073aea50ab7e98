//! Level readback and lossless intermediate export.

use std::path::{Path, PathBuf};

use image::{ColorType, ImageFormat};
use tracing::debug;

use super::{ExportError, LevelInfo};
use crate::device::{BoundTexture, MipDevice};

/// Pixels of one level, plus the PNG written for it when compressible.
#[derive(Debug, Clone)]
pub struct ExportedLevel {
    pub info: LevelInfo,
    /// RGB24, stride `width * 3`.
    pub pixels: Vec<u8>,
    /// Lossless intermediate; only present for compressible levels.
    pub raster: Option<PathBuf>,
}

/// Reads levels off a texture and writes intermediates into a work directory.
#[derive(Debug, Clone)]
pub struct LevelExporter {
    work_dir: PathBuf,
}

impl LevelExporter {
    pub fn new(work_dir: impl Into<PathBuf>) -> Self {
        Self {
            work_dir: work_dir.into(),
        }
    }

    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Path of the PNG intermediate for level `index` of `input`.
    pub fn raster_path(&self, index: u32, input: &Path) -> PathBuf {
        self.work_dir.join(raster_file_name(index, input))
    }

    /// Read back `info` from `texture` and export it.
    pub fn export<D: MipDevice + ?Sized>(
        &self,
        texture: &BoundTexture<'_, D>,
        info: LevelInfo,
        input: &Path,
    ) -> Result<ExportedLevel, ExportError> {
        let pixels = texture.read_level(info.index)?;
        if pixels.len() != info.raw_size() {
            return Err(ExportError::ShortReadback {
                index: info.index,
                expected: info.raw_size(),
                actual: pixels.len(),
            });
        }

        let raster = if info.is_compressible() {
            let path = self.raster_path(info.index, input);
            write_raster(&path, &pixels, info.width, info.height)?;
            debug!(level = info.index, path = %path.display(), "raster exported");
            Some(path)
        } else {
            None
        };

        Ok(ExportedLevel {
            info,
            pixels,
            raster,
        })
    }
}

/// Deterministic intermediate name: `mip{index:02}-{input file name}.png`.
///
/// Keeping the full input file name (extension included) keeps `a.png` and
/// `a.jpg` apart when both are in one batch.
pub fn raster_file_name(index: u32, input: &Path) -> String {
    let name = input
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    format!("mip{:02}-{}.png", index, name)
}

/// Write an RGB24 buffer as PNG.
pub fn write_raster(
    path: &Path,
    pixels: &[u8],
    width: u32,
    height: u32,
) -> Result<(), ExportError> {
    image::save_buffer_with_format(path, pixels, width, height, ColorType::Rgb8, ImageFormat::Png)
        .map_err(|source| ExportError::RasterWrite {
            path: path.to_path_buf(),
            source,
        })
}
