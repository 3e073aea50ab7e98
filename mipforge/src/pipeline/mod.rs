//! Per-file orchestration and batch processing.
//!
//! [`Pipeline`] owns nothing but borrows the long-lived device and
//! compressor for the duration of a run. Each input goes through:
//!
//! ```text
//! decode ─► upload ─► sampler params ─► generate mips
//!                                            │
//!        ┌───────────────────────────────────┘
//!        ▼
//! for each level: export ─► compress (≥4×4) or keep raw ─► write record
//!        │
//!        ▼
//! footer ─► sync
//! ```
//!
//! A failure at any step abandons that file only. Its texture is released
//! by [`BoundTexture`]'s drop and any partially written `.bin` stays on disk
//! without a footer.

mod error;

pub use error::PipelineError;

use std::fs::{self, File};
use std::io::{self, BufWriter};
use std::path::{Path, PathBuf};

use tracing::{debug, error, info, warn};

use crate::compress::{container_path, BlockCompressor, CompressionInvoker};
use crate::config::{BakeConfig, OutputSettings};
use crate::container::{ContainerError, ContainerWriter, CONTAINER_EXTENSION, FOOTER_LEN};
use crate::device::{BoundTexture, MipDevice, TextureParams};
use crate::mip::{ExportError, LevelExporter, MipLevel, MipLevels};
use crate::source::load_source;

/// Container path for `input`: same directory and stem, `.bin` extension.
pub fn output_path(input: &Path) -> PathBuf {
    input.with_extension(CONTAINER_EXTENSION)
}

/// Outcome of one successfully converted file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileReport {
    pub input: PathBuf,
    pub output: PathBuf,
    /// Level records written.
    pub levels: usize,
    /// How many of those were block compressed.
    pub compressed_levels: usize,
    /// Container size including the footer.
    pub bytes: u64,
}

/// Counts for a whole batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchSummary {
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchSummary {
    pub fn total(&self) -> usize {
        self.succeeded + self.failed
    }
}

/// Converts input images into mip containers, one file at a time.
pub struct Pipeline<'d, 'c, D: MipDevice + ?Sized> {
    device: &'d mut D,
    compressor: &'c dyn BlockCompressor,
    output: OutputSettings,
    max_anisotropy: f32,
}

impl<'d, 'c, D: MipDevice + ?Sized> Pipeline<'d, 'c, D> {
    /// Create a pipeline. The device's anisotropy limit is read here once
    /// and reused for every texture.
    pub fn new(
        device: &'d mut D,
        compressor: &'c dyn BlockCompressor,
        config: &BakeConfig,
    ) -> Self {
        let max_anisotropy = device.max_anisotropy();
        debug!(
            device = device.name(),
            compressor = compressor.name(),
            max_anisotropy,
            "pipeline ready"
        );
        Self {
            device,
            compressor,
            output: config.output.clone(),
            max_anisotropy,
        }
    }

    pub fn device(&self) -> &D {
        &*self.device
    }

    pub fn max_anisotropy(&self) -> f32 {
        self.max_anisotropy
    }

    /// Directory that receives the intermediates for `input`.
    pub fn work_dir_for(&self, input: &Path) -> PathBuf {
        match &self.output.work_dir {
            Some(dir) => dir.clone(),
            None => match input.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
                _ => PathBuf::from("."),
            },
        }
    }

    /// Convert `input` into `input.with_extension("bin")`.
    pub fn process_file(&mut self, input: &Path) -> Result<FileReport, PipelineError> {
        let output = output_path(input);
        if output.as_path() == input {
            return Err(PipelineError::OutputIsInput { path: output });
        }

        let exporter = LevelExporter::new(self.work_dir_for(input));
        let invoker = CompressionInvoker::new(self.compressor);
        let keep_intermediates = self.output.keep_intermediates;
        debug!(
            input = %input.display(),
            work_dir = %exporter.work_dir().display(),
            compressor = invoker.compressor_name(),
            "processing"
        );

        let source = load_source(input)?;
        let base = source.dimensions();
        debug!(input = %input.display(), width = base.0, height = base.1, "decoded");

        let mut texture = BoundTexture::upload(&mut *self.device, &source)?;
        drop(source);
        texture.set_params(TextureParams::trilinear_clamped(self.max_anisotropy))?;
        texture.generate_mipmaps()?;

        let file = File::create(&output).map_err(|source| PipelineError::OutputOpen {
            path: output.clone(),
            source,
        })?;
        let mut writer = ContainerWriter::new(BufWriter::new(file));
        let mut compressed_levels = 0;

        for info in MipLevels::new(&texture) {
            let info = info?;
            if info.index == 0 && (info.width, info.height) != base {
                return Err(ExportError::BaseMismatch {
                    expected: base,
                    actual: (info.width, info.height),
                }
                .into());
            }

            let exported = exporter.export(&texture, info, input)?;
            let level = match &exported.raster {
                Some(raster) => {
                    let compressed = invoker.compress_level(info, raster);
                    if !keep_intermediates {
                        remove_intermediate(raster);
                        remove_intermediate(&container_path(raster));
                    }
                    let compressed = compressed.map_err(|source| PipelineError::Compress {
                        index: info.index,
                        source,
                    })?;
                    compressed_levels += 1;
                    MipLevel::compressed(info, compressed.payload)?
                }
                None => MipLevel::raw(info, exported.pixels)?,
            };

            writer.write_level(&level)?;
            debug!(
                level = info.index,
                width = info.width,
                height = info.height,
                payload_size = level.payload.len(),
                compressed = level.compressed,
                "level written"
            );
        }

        let levels = writer.levels_written();
        let bytes = writer.bytes_written() + FOOTER_LEN as u64;
        let file = writer
            .finish()?
            .into_inner()
            .map_err(|e| ContainerError::Io(e.into_error()))?;
        if let Err(e) = file.sync_all() {
            warn!(output = %output.display(), error = %e, "failed to sync container");
        }

        Ok(FileReport {
            input: input.to_path_buf(),
            output,
            levels,
            compressed_levels,
            bytes,
        })
    }

    /// Process every input in order, logging and skipping failures.
    pub fn run_batch<I, P>(&mut self, inputs: I) -> BatchSummary
    where
        I: IntoIterator<Item = P>,
        P: AsRef<Path>,
    {
        let mut summary = BatchSummary::default();

        for input in inputs {
            let input = input.as_ref();
            match self.process_file(input) {
                Ok(report) => {
                    info!(
                        input = %report.input.display(),
                        output = %report.output.display(),
                        levels = report.levels,
                        compressed = report.compressed_levels,
                        bytes = report.bytes,
                        "converted"
                    );
                    summary.succeeded += 1;
                }
                Err(e) => {
                    error!(input = %input.display(), error = %e, "skipping file");
                    summary.failed += 1;
                }
            }
        }

        summary
    }
}

fn remove_intermediate(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => {}
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to remove intermediate"),
    }
}
