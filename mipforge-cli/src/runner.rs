//! CLI runner: config, logging and the long-lived device for one run.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use mipforge::config::BakeConfig;
use mipforge::device::SoftwareDevice;
use mipforge::logging::{init_logging, LoggingGuard};
use mipforge::pipeline::{BatchSummary, Pipeline};

use crate::error::CliError;

/// Runner that manages CLI lifecycle.
pub struct CliRunner {
    /// Logging guard - keeps logging active while runner exists
    #[allow(dead_code)]
    logging_guard: LoggingGuard,
    config: BakeConfig,
}

impl CliRunner {
    /// Load configuration and start logging.
    ///
    /// `overrides` is applied to the loaded file before logging starts, so
    /// command-line settings win over the config file.
    pub fn new<F>(config_path: Option<&Path>, verbose: bool, overrides: F) -> Result<Self, CliError>
    where
        F: FnOnce(BakeConfig) -> BakeConfig,
    {
        let config = match config_path {
            Some(path) => BakeConfig::load_from(path)?,
            None => BakeConfig::load()?,
        };
        let config = overrides(config);

        let logging_guard =
            init_logging(&config.logging, verbose).map_err(CliError::LoggingInit)?;

        Ok(Self {
            logging_guard,
            config,
        })
    }

    /// Convert every file in `inputs`.
    ///
    /// Errors returned here are fatal. Individual file failures only show
    /// up in the summary.
    pub fn run(&self, inputs: &[PathBuf]) -> Result<BatchSummary, CliError> {
        info!("mipforge v{}", mipforge::VERSION);

        let compressor = self.config.compressor.build();
        compressor.probe()?;
        debug!(compressor = compressor.name(), "compressor ready");

        if let Some(dir) = &self.config.output.work_dir {
            fs::create_dir_all(dir).map_err(|error| CliError::WorkDir {
                path: dir.clone(),
                error,
            })?;
        }

        let mut device = SoftwareDevice::init(self.config.device)?;
        let summary = Pipeline::new(&mut device, compressor.as_ref(), &self.config)
            .run_batch(inputs);
        device.shutdown();

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch complete"
        );
        Ok(summary)
    }
}
