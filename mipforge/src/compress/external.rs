//! Block compression through an external encoder binary.
//!
//! Follows the `etcpak` calling convention: `<program> [args..] <input> <output>`,
//! writing a PVR v3 container to `<output>`.

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use tracing::debug;

use super::{BlockCompressor, CompressError};

/// Default encoder binary looked up on `PATH`.
pub const DEFAULT_PROGRAM: &str = "etcpak";

/// Runs an encoder as a child process, blocking until it exits.
#[derive(Debug, Clone)]
pub struct ExternalCompressor {
    program: PathBuf,
    args: Vec<String>,
    label: String,
}

impl ExternalCompressor {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let label = program.display().to_string();
        Self {
            program,
            args: Vec::new(),
            label,
        }
    }

    /// Extra arguments placed before the input and output paths.
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl Default for ExternalCompressor {
    fn default() -> Self {
        Self::new(DEFAULT_PROGRAM)
    }
}

impl BlockCompressor for ExternalCompressor {
    fn name(&self) -> &str {
        &self.label
    }

    /// The program must be spawnable; its exit status is not checked since
    /// encoders disagree on what a bare `--help` returns.
    fn probe(&self) -> Result<(), CompressError> {
        let result = Command::new(&self.program)
            .arg("--help")
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match result {
            Ok(_) => Ok(()),
            Err(e) => Err(CompressError::Unavailable {
                program: self.label.clone(),
                reason: e.to_string(),
            }),
        }
    }

    fn compress(&self, raster: &Path, output: &Path) -> Result<(), CompressError> {
        debug!(
            program = %self.label,
            input = %raster.display(),
            output = %output.display(),
            "running external compressor"
        );

        let result = Command::new(&self.program)
            .args(&self.args)
            .arg(raster)
            .arg(output)
            .stdin(Stdio::null())
            .output()
            .map_err(|source| CompressError::Spawn {
                program: self.label.clone(),
                source,
            })?;

        if !result.status.success() {
            return Err(CompressError::Failed {
                program: self.label.clone(),
                status: result.status.to_string(),
                stderr: String::from_utf8_lossy(&result.stderr).trim().to_string(),
            });
        }

        if !output.exists() {
            return Err(CompressError::MissingOutput(output.to_path_buf()));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const MISSING_PROGRAM: &str = "mipforge-test-no-such-encoder";

    #[test]
    fn test_default_program() {
        let compressor = ExternalCompressor::default();
        assert_eq!(compressor.program(), Path::new("etcpak"));
        assert_eq!(compressor.name(), "etcpak");
    }

    #[test]
    fn test_probe_missing_program() {
        let err = ExternalCompressor::new(MISSING_PROGRAM).probe().unwrap_err();
        assert!(matches!(err, CompressError::Unavailable { .. }));
    }

    #[test]
    fn test_compress_missing_program() {
        let dir = TempDir::new().unwrap();
        let err = ExternalCompressor::new(MISSING_PROGRAM)
            .compress(&dir.path().join("in.png"), &dir.path().join("out.pvr"))
            .unwrap_err();
        assert!(matches!(err, CompressError::Spawn { .. }));
    }

    #[cfg(unix)]
    #[test]
    fn test_non_zero_exit_is_failure() {
        let dir = TempDir::new().unwrap();
        let compressor =
            ExternalCompressor::new("sh").with_args(["-c", "echo broken >&2; exit 3", "sh"]);

        let err = compressor
            .compress(&dir.path().join("in.png"), &dir.path().join("out.pvr"))
            .unwrap_err();
        match err {
            CompressError::Failed { stderr, .. } => assert_eq!(stderr, "broken"),
            other => panic!("Expected Failed, got {:?}", other),
        }
    }

    #[cfg(unix)]
    #[test]
    fn test_success_without_output_is_missing_output() {
        let dir = TempDir::new().unwrap();
        let compressor = ExternalCompressor::new("sh").with_args(["-c", "true", "sh"]);

        let err = compressor
            .compress(&dir.path().join("in.png"), &dir.path().join("out.pvr"))
            .unwrap_err();
        assert!(matches!(err, CompressError::MissingOutput(_)));
    }

    #[cfg(unix)]
    #[test]
    fn test_receives_input_and_output_paths() {
        let dir = TempDir::new().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.pvr");
        std::fs::write(&input, b"raster").unwrap();

        let compressor = ExternalCompressor::new("sh").with_args(["-c", "cp \"$1\" \"$2\"", "sh"]);
        compressor.compress(&input, &output).unwrap();

        assert_eq!(std::fs::read(&output).unwrap(), b"raster");
    }
}
