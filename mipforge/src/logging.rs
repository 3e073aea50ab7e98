//! Logging setup for mipforge.
//!
//! Human-readable events go to stderr so stdout stays free for anything a
//! caller might pipe. An optional log file receives the same events without
//! ANSI colors. `RUST_LOG` overrides the configured level.

use std::fs;
use std::io;
use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

use crate::config::LoggingSettings;

/// Guard that must be kept alive for the duration of logging.
///
/// Dropping this guard flushes and closes the log file writer, if any.
pub struct LoggingGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Filter directive used when `RUST_LOG` is unset.
pub fn default_directive(level: &str, verbose: bool) -> String {
    if verbose {
        "debug".to_string()
    } else {
        level.to_string()
    }
}

/// Initialize the global subscriber.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a global
/// subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings, verbose: bool) -> Result<LoggingGuard, io::Error> {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(&settings.level, verbose)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_ansi(atty::is(atty::Stream::Stderr))
        .with_target(false);

    let (file_layer, file_guard) = match &settings.file {
        Some(path) => {
            let (dir, name) = split_log_path(path)?;
            fs::create_dir_all(dir)?;
            // Each run starts a fresh log.
            fs::write(path, "")?;

            let appender = tracing_appender::rolling::never(dir, name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(writer)
                .with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .with(file_layer)
        .try_init()
        .map_err(io::Error::other)?;

    Ok(LoggingGuard {
        _file_guard: file_guard,
    })
}

fn split_log_path(path: &Path) -> Result<(&Path, &std::ffi::OsStr), io::Error> {
    let name = path.file_name().ok_or_else(|| {
        io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("log path '{}' has no file name", path.display()),
        )
    })?;
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    Ok((dir, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_default_directive() {
        assert_eq!(default_directive("warn", false), "warn");
        assert_eq!(default_directive("warn", true), "debug");
    }

    #[test]
    fn test_split_log_path() {
        let path = PathBuf::from("logs/mipforge.log");
        let (dir, name) = split_log_path(&path).unwrap();
        assert_eq!(dir, Path::new("logs"));
        assert_eq!(name, "mipforge.log");
    }

    #[test]
    fn test_split_bare_file_name() {
        let path = PathBuf::from("mipforge.log");
        let (dir, _) = split_log_path(&path).unwrap();
        assert_eq!(dir, Path::new("."));
    }

    #[test]
    fn test_split_rejects_directory_only() {
        assert!(split_log_path(Path::new("/")).is_err());
    }
}
