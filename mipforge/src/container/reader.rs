//! Validating container reader.

use std::fs;
use std::path::Path;

use super::{ContainerError, FOOTER_LEN, RECORD_HEADER_LEN};

/// One parsed level record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerLevel {
    pub width: u16,
    pub height: u16,
    pub payload: Vec<u8>,
}

impl ContainerLevel {
    pub fn payload_size(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is raw RGB24 rather than block data.
    pub fn is_raw(&self) -> bool {
        !crate::mip::is_compressible(self.width as u32, self.height as u32)
    }
}

/// A fully parsed container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub levels: Vec<ContainerLevel>,
    pub level_count: u8,
}

impl Container {
    /// Check the records form a mip chain.
    ///
    /// Each step must halve both axes (floor, clamped to 1), the chain must
    /// end at 1×1, and raw levels must hold exactly `3·w·h` bytes.
    pub fn check_chain(&self) -> Result<(), ContainerError> {
        let last = self.levels.last().ok_or(ContainerError::Empty)?;
        if (last.width, last.height) != (1, 1) {
            return Err(ContainerError::InvalidChain(format!(
                "last level is {}×{}, expected 1×1",
                last.width, last.height
            )));
        }

        for pair in self.levels.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            let expected = ((prev.width / 2).max(1), (prev.height / 2).max(1));
            if (next.width, next.height) != expected {
                return Err(ContainerError::InvalidChain(format!(
                    "{}×{} follows {}×{}, expected {}×{}",
                    next.width, next.height, prev.width, prev.height, expected.0, expected.1
                )));
            }
        }

        for level in self.levels.iter().filter(|l| l.is_raw()) {
            let expected = level.width as usize * level.height as usize * 3;
            if level.payload_size() != expected {
                return Err(ContainerError::InvalidChain(format!(
                    "raw {}×{} level holds {} bytes, expected {}",
                    level.width,
                    level.height,
                    level.payload_size(),
                    expected
                )));
            }
        }

        Ok(())
    }
}

/// Parse `bytes` as a complete container.
///
/// Records are consumed using their own payload sizes. The stream must end
/// exactly at a footer byte equal to the number of records consumed.
pub fn read_container(bytes: &[u8]) -> Result<Container, ContainerError> {
    let mut levels = Vec::new();
    let mut offset = 0;

    loop {
        let remaining = bytes.len() - offset;
        if remaining == 0 {
            return Err(ContainerError::MissingFooter {
                levels: levels.len(),
            });
        }
        if remaining == FOOTER_LEN {
            break;
        }
        if remaining < RECORD_HEADER_LEN {
            return Err(ContainerError::Truncated {
                offset,
                needed: RECORD_HEADER_LEN,
                available: remaining,
            });
        }

        let width = u16::from_le_bytes([bytes[offset], bytes[offset + 1]]);
        let height = u16::from_le_bytes([bytes[offset + 2], bytes[offset + 3]]);
        let size = i32::from_le_bytes([
            bytes[offset + 4],
            bytes[offset + 5],
            bytes[offset + 6],
            bytes[offset + 7],
        ]);
        if size < 0 {
            return Err(ContainerError::NegativePayloadSize { offset, size });
        }

        let size = size as usize;
        let start = offset + RECORD_HEADER_LEN;
        if bytes.len() - start < size {
            return Err(ContainerError::Truncated {
                offset,
                needed: RECORD_HEADER_LEN + size,
                available: remaining,
            });
        }

        levels.push(ContainerLevel {
            width,
            height,
            payload: bytes[start..start + size].to_vec(),
        });
        offset = start + size;
    }

    let level_count = bytes[offset];
    if level_count as usize != levels.len() {
        return Err(ContainerError::LevelCountMismatch {
            declared: level_count,
            actual: levels.len(),
        });
    }
    if levels.is_empty() {
        return Err(ContainerError::Empty);
    }

    Ok(Container {
        levels,
        level_count,
    })
}

/// Read and parse the container at `path`.
pub fn read_container_file(path: &Path) -> Result<Container, ContainerError> {
    let bytes = fs::read(path)?;
    read_container(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(width: u16, height: u16, payload: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&width.to_le_bytes());
        bytes.extend_from_slice(&height.to_le_bytes());
        bytes.extend_from_slice(&(payload.len() as i32).to_le_bytes());
        bytes.extend_from_slice(payload);
        bytes
    }

    fn chain_4x4() -> Vec<u8> {
        let mut bytes = record(4, 4, &[0x11; 8]);
        bytes.extend(record(2, 2, &[0; 12]));
        bytes.extend(record(1, 1, &[0; 3]));
        bytes.push(3);
        bytes
    }

    #[test]
    fn test_reads_well_formed_container() {
        let container = read_container(&chain_4x4()).unwrap();

        assert_eq!(container.level_count, 3);
        assert_eq!(container.levels.len(), 3);
        assert_eq!(container.levels[0].payload, vec![0x11; 8]);
        assert!(!container.levels[0].is_raw());
        assert!(container.levels[1].is_raw());
        container.check_chain().unwrap();
    }

    #[test]
    fn test_missing_footer() {
        let mut bytes = chain_4x4();
        bytes.pop();

        let err = read_container(&bytes).unwrap_err();
        assert!(matches!(err, ContainerError::MissingFooter { levels: 3 }));
    }

    #[test]
    fn test_empty_stream_has_no_footer() {
        assert!(matches!(
            read_container(&[]),
            Err(ContainerError::MissingFooter { levels: 0 })
        ));
    }

    #[test]
    fn test_footer_mismatch() {
        let mut bytes = chain_4x4();
        *bytes.last_mut().unwrap() = 7;

        let err = read_container(&bytes).unwrap_err();
        assert!(matches!(
            err,
            ContainerError::LevelCountMismatch {
                declared: 7,
                actual: 3
            }
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = record(4, 4, &[0; 8]);
        bytes.truncate(12);

        let err = read_container(&bytes).unwrap_err();
        assert!(matches!(err, ContainerError::Truncated { offset: 0, .. }));
    }

    #[test]
    fn test_truncated_record_header() {
        let mut bytes = record(1, 1, &[0; 3]);
        bytes.extend_from_slice(&[1, 0, 1]);

        let err = read_container(&bytes).unwrap_err();
        assert!(matches!(err, ContainerError::Truncated { offset: 11, .. }));
    }

    #[test]
    fn test_negative_payload_size() {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&1u16.to_le_bytes());
        bytes.extend_from_slice(&(-5i32).to_le_bytes());
        bytes.push(1);

        assert!(matches!(
            read_container(&bytes),
            Err(ContainerError::NegativePayloadSize { size: -5, .. })
        ));
    }

    #[test]
    fn test_lone_zero_footer_is_empty() {
        assert!(matches!(read_container(&[0]), Err(ContainerError::Empty)));
    }

    #[test]
    fn test_check_chain_rejects_skipped_level() {
        let mut bytes = record(4, 4, &[0; 8]);
        bytes.extend(record(1, 1, &[0; 3]));
        bytes.push(2);

        let container = read_container(&bytes).unwrap();
        assert!(matches!(
            container.check_chain(),
            Err(ContainerError::InvalidChain(_))
        ));
    }

    #[test]
    fn test_check_chain_rejects_wrong_raw_size() {
        let mut bytes = record(2, 2, &[0; 4]);
        bytes.extend(record(1, 1, &[0; 3]));
        bytes.push(2);

        let container = read_container(&bytes).unwrap();
        assert!(container.check_chain().is_err());
    }

    #[test]
    fn test_check_chain_non_square() {
        let mut bytes = record(8, 2, &[0; 48]);
        bytes.extend(record(4, 1, &[0; 12]));
        bytes.extend(record(2, 1, &[0; 6]));
        bytes.extend(record(1, 1, &[0; 3]));
        bytes.push(4);

        read_container(&bytes).unwrap().check_chain().unwrap();
    }
}
