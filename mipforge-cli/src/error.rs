//! Fatal CLI errors.
//!
//! Anything here stops the run before or around the batch. Per-file
//! failures never reach this type.

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::process;

use mipforge::compress::CompressError;
use mipforge::config::ConfigError;
use mipforge::device::DeviceError;

/// CLI-specific errors with user-friendly messages.
#[derive(Debug)]
pub enum CliError {
    /// Configuration file could not be loaded
    Config(ConfigError),
    /// Failed to initialize logging
    LoggingInit(io::Error),
    /// Mip device could not be created
    DeviceInit(DeviceError),
    /// Selected compressor cannot run
    Compressor(CompressError),
    /// Intermediate directory could not be created
    WorkDir { path: PathBuf, error: io::Error },
}

impl CliError {
    /// Exit the process with an error message and code 1.
    pub fn exit(&self) -> ! {
        eprintln!("Error: {}", self);

        if let CliError::Compressor(CompressError::Unavailable { .. }) = self {
            eprintln!();
            eprintln!("Install the encoder or select the built-in one:");
            eprintln!("  mipforge --compressor builtin <FILES>...");
        }

        process::exit(1)
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {}", e),
            CliError::LoggingInit(e) => write!(f, "Failed to initialize logging: {}", e),
            CliError::DeviceInit(e) => write!(f, "Failed to initialize mip device: {}", e),
            CliError::Compressor(e) => write!(f, "Compressor unavailable: {}", e),
            CliError::WorkDir { path, error } => {
                write!(
                    f,
                    "Failed to create work directory '{}': {}",
                    path.display(),
                    error
                )
            }
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::LoggingInit(e) => Some(e),
            CliError::DeviceInit(e) => Some(e),
            CliError::Compressor(e) => Some(e),
            CliError::WorkDir { error, .. } => Some(error),
        }
    }
}

impl From<ConfigError> for CliError {
    fn from(e: ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<DeviceError> for CliError {
    fn from(e: DeviceError) -> Self {
        CliError::DeviceInit(e)
    }
}

impl From<CompressError> for CliError {
    fn from(e: CompressError) -> Self {
        CliError::Compressor(e)
    }
}
