//! End-to-end conversion tests against the public API.

use std::fs;
use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};
use proptest::prelude::*;
use tempfile::TempDir;

use mipforge::compress::pvr::PVR_FORMAT_BC1;
use mipforge::compress::{Bc1Compressor, BlockCompressor, CompressError, PvrHeader, PVR_HEADER_LEN};
use mipforge::config::BakeConfig;
use mipforge::container::{read_container_file, ContainerError};
use mipforge::device::{BoundTexture, DeviceConfig, SoftwareDevice};
use mipforge::mip::{full_chain_length, MipLevels};
use mipforge::pipeline::{output_path, BatchSummary, Pipeline};
use mipforge::source::SourceImage;

/// Header plus a payload whose length encodes the level size, so payload
/// sizes can be checked against the compressor output on disk.
struct RecordingCompressor;

impl BlockCompressor for RecordingCompressor {
    fn name(&self) -> &str {
        "recording"
    }

    fn compress(&self, raster: &Path, output: &Path) -> Result<(), CompressError> {
        let (width, height) =
            image::image_dimensions(raster).map_err(|source| CompressError::ReadRaster {
                path: raster.to_path_buf(),
                source,
            })?;
        let mut bytes = PvrHeader::new(PVR_FORMAT_BC1, width, height)
            .to_bytes()
            .to_vec();
        bytes.extend((0..width + height).map(|i| i as u8));
        fs::write(output, bytes).map_err(|source| CompressError::WriteOutput {
            path: output.to_path_buf(),
            source,
        })
    }
}

fn device() -> SoftwareDevice {
    SoftwareDevice::init(DeviceConfig::default()).unwrap()
}

fn write_image(dir: &Path, name: &str, width: u32, height: u32) -> PathBuf {
    let path = dir.join(name);
    RgbImage::from_fn(width, height, |x, y| {
        Rgb([(x * 7) as u8, (y * 13) as u8, ((x + y) * 3) as u8])
    })
    .save(&path)
    .unwrap();
    path
}

#[test]
fn sixteen_square_produces_five_levels() {
    let temp = TempDir::new().unwrap();
    let input = write_image(temp.path(), "grass.png", 16, 16);
    let mut device = device();
    let config = BakeConfig::default();

    Pipeline::new(&mut device, &RecordingCompressor, &config)
        .process_file(&input)
        .unwrap();

    let container = read_container_file(&temp.path().join("grass.bin")).unwrap();
    assert_eq!(container.level_count, 5);
    let shape: Vec<_> = container
        .levels
        .iter()
        .map(|l| (l.width, l.height, l.is_raw()))
        .collect();
    assert_eq!(
        shape,
        vec![
            (16, 16, false),
            (8, 8, false),
            (4, 4, false),
            (2, 2, true),
            (1, 1, true),
        ]
    );
    assert_eq!(container.levels[3].payload.len(), 12);
    assert_eq!(container.levels[4].payload.len(), 3);
    container.check_chain().unwrap();
}

#[test]
fn compressed_payload_is_container_minus_header() {
    let temp = TempDir::new().unwrap();
    let input = write_image(temp.path(), "rock.png", 8, 4);
    let mut device = device();
    let config = BakeConfig::default();

    Pipeline::new(&mut device, &RecordingCompressor, &config)
        .process_file(&input)
        .unwrap();

    let container = read_container_file(&output_path(&input)).unwrap();
    let pvr = fs::read(temp.path().join("mip00-rock.png.pvr")).unwrap();
    assert_eq!(container.levels[0].payload.len(), pvr.len() - PVR_HEADER_LEN);
    assert_eq!(container.levels[0].payload, pvr[PVR_HEADER_LEN..]);
}

#[test]
fn raw_levels_match_device_readback() {
    let temp = TempDir::new().unwrap();
    let input = write_image(temp.path(), "dirt.png", 4, 4);
    let mut device = device();
    let config = BakeConfig::default();

    Pipeline::new(&mut device, &RecordingCompressor, &config)
        .process_file(&input)
        .unwrap();
    let container = read_container_file(&output_path(&input)).unwrap();

    let source = SourceImage::from_rgb(image::open(&input).unwrap().to_rgb8());
    let mut texture = BoundTexture::upload(&mut device, &source).unwrap();
    texture.generate_mipmaps().unwrap();
    assert_eq!(container.levels[1].payload, texture.read_level(1).unwrap());
    assert_eq!(container.levels[2].payload, texture.read_level(2).unwrap());
}

#[test]
fn builtin_bc1_end_to_end() {
    let temp = TempDir::new().unwrap();
    let input = write_image(temp.path(), "sand.png", 16, 8);
    let mut device = device();
    let config = BakeConfig::default().with_keep_intermediates(false);

    let report = Pipeline::new(&mut device, &Bc1Compressor::new(), &config)
        .process_file(&input)
        .unwrap();
    assert_eq!(report.levels, 5);
    assert_eq!(report.compressed_levels, 2);

    let container = read_container_file(&report.output).unwrap();
    assert_eq!(container.levels[0].payload.len(), Bc1Compressor::payload_size(16, 8));
    assert_eq!(container.levels[1].payload.len(), Bc1Compressor::payload_size(8, 4));
    assert_eq!(container.levels[2].payload.len(), 4 * 2 * 3);
    container.check_chain().unwrap();
}

#[test]
fn batch_skips_corrupt_file_and_keeps_going() {
    let temp = TempDir::new().unwrap();
    let first = write_image(temp.path(), "first.png", 8, 8);
    let broken = temp.path().join("broken.jpg");
    fs::write(&broken, [0xFF, 0xD8, 0xFF, 0x00, 0x01]).unwrap();
    let last = write_image(temp.path(), "last.bmp", 4, 4);

    let mut device = device();
    let config = BakeConfig::default();
    let summary = Pipeline::new(&mut device, &RecordingCompressor, &config)
        .run_batch([&first, &broken, &last]);

    assert_eq!(
        summary,
        BatchSummary {
            succeeded: 2,
            failed: 1
        }
    );
    read_container_file(&temp.path().join("first.bin")).unwrap();
    read_container_file(&temp.path().join("last.bin")).unwrap();
    assert!(!temp.path().join("broken.bin").exists());
    assert_eq!(device.live_textures(), 0);
}

#[test]
fn failed_compression_leaves_rejectable_container() {
    struct BreaksAtSecondLevel;

    impl BlockCompressor for BreaksAtSecondLevel {
        fn name(&self) -> &str {
            "breaks"
        }

        fn compress(&self, raster: &Path, output: &Path) -> Result<(), CompressError> {
            if raster.to_string_lossy().contains("mip01-") {
                return Err(CompressError::MissingOutput(output.to_path_buf()));
            }
            RecordingCompressor.compress(raster, output)
        }
    }

    let temp = TempDir::new().unwrap();
    let input = write_image(temp.path(), "road.png", 8, 8);
    let mut device = device();
    let config = BakeConfig::default();

    let result = Pipeline::new(&mut device, &BreaksAtSecondLevel, &config).process_file(&input);
    assert!(result.is_err());

    let err = read_container_file(&output_path(&input)).unwrap_err();
    assert!(matches!(err, ContainerError::MissingFooter { levels: 1 }));
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn chain_length_is_one_plus_log2_of_longest_edge(width in 1u32..300, height in 1u32..300) {
        let mut device = device();
        let source = SourceImage::from_rgb(RgbImage::new(width, height));
        let mut texture = BoundTexture::upload(&mut device, &source).unwrap();
        texture.generate_mipmaps().unwrap();

        let levels: Vec<_> = MipLevels::new(&texture).collect::<Result<_, _>>().unwrap();
        let expected = 1 + (31 - width.max(height).leading_zeros());
        prop_assert_eq!(levels.len() as u32, expected);
        prop_assert_eq!(levels.len() as u32, full_chain_length(width, height));

        let last = levels.last().unwrap();
        prop_assert_eq!((last.width, last.height), (1, 1));
        for pair in levels.windows(2) {
            prop_assert_eq!(pair[1].width, (pair[0].width / 2).max(1));
            prop_assert_eq!(pair[1].height, (pair[0].height / 2).max(1));
        }
    }
}
