//! Configuration for a conversion run.
//!
//! Settings come from defaults, then an optional INI file, then CLI
//! overrides. The file lives at `<config dir>/mipforge/config.ini` unless a
//! path is given explicitly:
//!
//! ```ini
//! [compressor]
//! backend = builtin        ; builtin | external
//! program = etcpak         ; used by the external backend
//!
//! [output]
//! work_dir = /tmp/mips     ; defaults to each input's directory
//! keep_intermediates = true
//!
//! [device]
//! max_anisotropy = 16
//! max_texture_size = 16384
//!
//! [logging]
//! level = info
//! file = /var/log/mipforge.log
//! ```

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use ini::Ini;
use thiserror::Error;

use crate::compress::{Bc1Compressor, BlockCompressor, ExternalCompressor};
use crate::device::DeviceConfig;

/// Default log level when neither config nor `RUST_LOG` say otherwise.
pub const DEFAULT_LOG_LEVEL: &str = "info";

/// Configuration file errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read or parse the config file.
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] ini::Error),

    /// Invalid configuration value.
    #[error("Invalid configuration: {section}.{key} = '{value}' - {reason}")]
    InvalidValue {
        section: String,
        key: String,
        value: String,
        reason: String,
    },
}

/// Which block compressor to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CompressorBackend {
    /// In-process BC1.
    #[default]
    Builtin,
    /// External encoder binary.
    External,
}

impl FromStr for CompressorBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "builtin" | "bc1" => Ok(Self::Builtin),
            "external" | "etcpak" => Ok(Self::External),
            _ => Err("must be 'builtin' or 'external'".to_string()),
        }
    }
}

impl fmt::Display for CompressorBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Builtin => write!(f, "builtin"),
            Self::External => write!(f, "external"),
        }
    }
}

/// `[compressor]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressorSettings {
    pub backend: CompressorBackend,
    pub program: PathBuf,
}

impl Default for CompressorSettings {
    fn default() -> Self {
        Self {
            backend: CompressorBackend::default(),
            program: PathBuf::from(crate::compress::DEFAULT_PROGRAM),
        }
    }
}

impl CompressorSettings {
    /// Instantiate the configured backend.
    pub fn build(&self) -> Box<dyn BlockCompressor> {
        match self.backend {
            CompressorBackend::Builtin => Box::new(Bc1Compressor::new()),
            CompressorBackend::External => Box::new(ExternalCompressor::new(&self.program)),
        }
    }
}

/// `[output]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputSettings {
    /// Where intermediates go; `None` means next to each input.
    pub work_dir: Option<PathBuf>,
    /// Leave PNG/PVR intermediates on disk after a level is written.
    pub keep_intermediates: bool,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            work_dir: None,
            keep_intermediates: true,
        }
    }
}

/// `[logging]` section.
#[derive(Debug, Clone, PartialEq)]
pub struct LoggingSettings {
    pub level: String,
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: DEFAULT_LOG_LEVEL.to_string(),
            file: None,
        }
    }
}

/// All settings for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BakeConfig {
    pub compressor: CompressorSettings,
    pub output: OutputSettings,
    pub device: DeviceConfig,
    pub logging: LoggingSettings,
}

impl BakeConfig {
    /// Load from the default location, falling back to defaults.
    pub fn load() -> Result<Self, ConfigError> {
        match config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Load from `path`. A missing file yields defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let ini = Ini::load_from_file(path)?;
        parse_ini(&ini)
    }

    pub fn with_backend(mut self, backend: CompressorBackend) -> Self {
        self.compressor.backend = backend;
        self
    }

    pub fn with_program(mut self, program: impl Into<PathBuf>) -> Self {
        self.compressor.program = program.into();
        self
    }

    pub fn with_work_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output.work_dir = Some(dir.into());
        self
    }

    pub fn with_keep_intermediates(mut self, keep: bool) -> Self {
        self.output.keep_intermediates = keep;
        self
    }
}

/// Default config file path, if the platform has a config directory.
pub fn config_file_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("mipforge").join("config.ini"))
}

fn invalid(section: &str, key: &str, value: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidValue {
        section: section.to_string(),
        key: key.to_string(),
        value: value.to_string(),
        reason: reason.into(),
    }
}

fn parse_bool(section: &str, key: &str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "yes" | "on" | "1" => Ok(true),
        "false" | "no" | "off" | "0" => Ok(false),
        _ => Err(invalid(section, key, value, "must be true or false")),
    }
}

/// Overlay the values found in `ini` on top of the defaults.
fn parse_ini(ini: &Ini) -> Result<BakeConfig, ConfigError> {
    let mut config = BakeConfig::default();

    if let Some(section) = ini.section(Some("compressor")) {
        if let Some(v) = section.get("backend") {
            config.compressor.backend = v
                .parse()
                .map_err(|reason: String| invalid("compressor", "backend", v, reason))?;
        }
        if let Some(v) = section.get("program") {
            let v = v.trim();
            if v.is_empty() {
                return Err(invalid("compressor", "program", v, "must not be empty"));
            }
            config.compressor.program = PathBuf::from(v);
        }
    }

    if let Some(section) = ini.section(Some("output")) {
        if let Some(v) = section.get("work_dir") {
            let v = v.trim();
            if !v.is_empty() {
                config.output.work_dir = Some(PathBuf::from(v));
            }
        }
        if let Some(v) = section.get("keep_intermediates") {
            config.output.keep_intermediates = parse_bool("output", "keep_intermediates", v)?;
        }
    }

    if let Some(section) = ini.section(Some("device")) {
        if let Some(v) = section.get("max_anisotropy") {
            config.device.max_anisotropy = v
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|a| *a >= 1.0)
                .ok_or_else(|| invalid("device", "max_anisotropy", v, "must be a number >= 1"))?;
        }
        if let Some(v) = section.get("max_texture_size") {
            config.device.max_texture_size = v
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|s| *s > 0)
                .ok_or_else(|| {
                    invalid("device", "max_texture_size", v, "must be a positive integer")
                })?;
        }
    }

    if let Some(section) = ini.section(Some("logging")) {
        if let Some(v) = section.get("level") {
            let level = v.trim().to_lowercase();
            let valid = ["error", "warn", "info", "debug", "trace"];
            if !valid.contains(&level.as_str()) {
                return Err(invalid(
                    "logging",
                    "level",
                    v,
                    "must be one of: error, warn, info, debug, trace",
                ));
            }
            config.logging.level = level;
        }
        if let Some(v) = section.get("file") {
            let v = v.trim();
            if !v.is_empty() {
                config.logging.file = Some(PathBuf::from(v));
            }
        }
    }

    Ok(config)
}
