//! Level-by-level walk over a texture's mip chain.

use super::{ExportError, LevelInfo};
use crate::device::{BoundTexture, MipDevice};

/// Iterator over the levels of a texture, smallest index first.
///
/// Each step asks the device for the dimensions at the current index. The
/// walk ends after yielding the 1×1 level. If the device reports no level
/// before that, a [`ExportError::MissingLevel`] is yielded and the walk
/// stops. A device that never converges to 1×1 keeps this iterator going;
/// convergence is part of the [`MipDevice`] contract.
pub struct MipLevels<'t, 'd, D: MipDevice + ?Sized> {
    texture: &'t BoundTexture<'d, D>,
    index: u32,
    done: bool,
}

impl<'t, 'd, D: MipDevice + ?Sized> MipLevels<'t, 'd, D> {
    pub fn new(texture: &'t BoundTexture<'d, D>) -> Self {
        Self {
            texture,
            index: 0,
            done: false,
        }
    }
}

impl<D: MipDevice + ?Sized> Iterator for MipLevels<'_, '_, D> {
    type Item = Result<LevelInfo, ExportError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let index = self.index;
        let info = match self.texture.level_dimensions(index) {
            Ok(Some((width, height))) => LevelInfo {
                index,
                width,
                height,
            },
            Ok(None) => {
                self.done = true;
                return Some(Err(ExportError::MissingLevel { index }));
            }
            Err(e) => {
                self.done = true;
                return Some(Err(e.into()));
            }
        };

        self.done = info.is_terminal();
        self.index += 1;
        Some(Ok(info))
    }
}
