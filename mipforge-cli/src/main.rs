//! mipforge CLI - convert images into mip chain containers.
//!
//! Each input `name.ext` produces `name.bin` next to it. Files that fail are
//! reported and skipped; the exit code only reflects setup failures.

mod error;
mod runner;

use std::ffi::OsStr;
use std::path::PathBuf;
use std::process;

use clap::error::ErrorKind;
use clap::{CommandFactory, Parser, ValueEnum};
use mipforge::config::CompressorBackend;

use runner::CliRunner;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CompressorChoice {
    /// In-process BC1 encoder
    Builtin,
    /// External encoder binary (etcpak calling convention)
    External,
}

impl From<CompressorChoice> for CompressorBackend {
    fn from(choice: CompressorChoice) -> Self {
        match choice {
            CompressorChoice::Builtin => CompressorBackend::Builtin,
            CompressorChoice::External => CompressorBackend::External,
        }
    }
}

#[derive(Parser)]
#[command(name = "mipforge")]
#[command(version = mipforge::VERSION)]
#[command(about = "Convert images into mip chain texture containers", long_about = None)]
struct Args {
    /// Images to convert
    files: Vec<PathBuf>,

    /// Block compressor backend (overrides config)
    #[arg(long, value_enum)]
    compressor: Option<CompressorChoice>,

    /// Encoder binary for the external backend
    #[arg(long, value_name = "PATH")]
    compressor_program: Option<PathBuf>,

    /// Directory for PNG and PVR intermediates (default: next to each input)
    #[arg(long, value_name = "DIR")]
    work_dir: Option<PathBuf>,

    /// Delete intermediates once each level is written
    #[arg(long)]
    clean_intermediates: bool,

    /// Config file (default: <config dir>/mipforge/config.ini)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Whether `-h`/`--help` appears before any `--` separator.
fn help_requested<I, S>(args: I) -> bool
where
    I: IntoIterator<Item = S>,
    S: AsRef<OsStr>,
{
    args.into_iter()
        .skip(1)
        .map(|a| a.as_ref().to_owned())
        .take_while(|a| a != "--")
        .any(|a| a == "-h" || a == "--help")
}

fn main() {
    // Help wins even when other arguments would fail to parse.
    if help_requested(std::env::args_os()) {
        let _ = Args::command().print_help();
        process::exit(0);
    }

    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(e) => match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => e.exit(),
            _ => {
                let _ = e.print();
                process::exit(1);
            }
        },
    };

    if args.files.is_empty() {
        let _ = Args::command().write_help(&mut std::io::stderr());
        process::exit(1);
    }

    let runner = match CliRunner::new(args.config.as_deref(), args.verbose, |mut config| {
        if let Some(choice) = args.compressor {
            config = config.with_backend(choice.into());
        }
        if let Some(program) = &args.compressor_program {
            config = config.with_program(program);
        }
        if let Some(dir) = &args.work_dir {
            config = config.with_work_dir(dir);
        }
        if args.clean_intermediates {
            config = config.with_keep_intermediates(false);
        }
        config
    }) {
        Ok(runner) => runner,
        Err(e) => e.exit(),
    };

    let result = runner.run(&args.files);
    // Flush the log file before any exit.
    drop(runner);

    match result {
        Ok(summary) => {
            if summary.failed > 0 {
                eprintln!(
                    "{} of {} file(s) failed; see log for details",
                    summary.failed,
                    summary.total()
                );
            }
        }
        Err(e) => e.exit(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_accept_files_and_flags() {
        let args = Args::try_parse_from([
            "mipforge",
            "--compressor",
            "external",
            "--clean-intermediates",
            "a.png",
            "b.jpg",
        ])
        .unwrap();

        assert_eq!(args.files, vec![PathBuf::from("a.png"), PathBuf::from("b.jpg")]);
        assert!(matches!(args.compressor, Some(CompressorChoice::External)));
        assert!(args.clean_intermediates);
    }

    #[test]
    fn test_args_files_optional() {
        let args = Args::try_parse_from(["mipforge"]).unwrap();
        assert!(args.files.is_empty());
    }

    #[test]
    fn test_help_wins_over_files() {
        let err = Args::try_parse_from(["mipforge", "a.png", "--help"])
            .err()
            .unwrap();
        assert_eq!(err.kind(), ErrorKind::DisplayHelp);
    }

    #[test]
    fn test_help_detected_before_parse_errors() {
        assert!(help_requested(["mipforge", "--bogus", "--help"]));
        assert!(help_requested(["mipforge", "--compressor", "bogus", "-h"]));
        assert!(!help_requested(["mipforge", "a.png"]));
        assert!(!help_requested(["mipforge", "--", "--help"]));
        // argv[0] is never treated as a flag.
        assert!(!help_requested(["--help"]));
    }

    #[test]
    fn test_cli_definition_is_consistent() {
        Args::command().debug_assert();
    }
}
