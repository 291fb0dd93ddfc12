//! These structs provide the CLI interface for the statements CLI.

use crate::model::Period;
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::filter::LevelFilter;

/// statements: A batch job that renders and distributes monthly bank statements.
///
/// The purpose of this program is to read partitioned parquet transaction data from an S3
/// bucket, render one password-protected PDF statement per customer for a billing period, and
/// distribute the statements by uploading them back to the bucket and emailing them via SES.
///
/// Configuration lives in a JSON file whose path is given by --config or STATEMENTS_CONFIG.
/// AWS credentials come from the ambient environment, the same way the AWS CLI finds them.
///
/// There is also a mode in which the whole program runs against in-memory clients, for trying
/// it out without AWS. Set STATEMENTS_IN_TEST_MODE=1 to use it.
#[derive(Debug, Parser, Clone)]
pub struct Args {
    #[clap(flatten)]
    common: Common,

    /// The billing period to process, like 2025-11. Defaults to the previous calendar month.
    period: Option<Period>,
}

impl Args {
    pub fn new(common: Common, period: Option<Period>) -> Self {
        Self { common, period }
    }

    pub fn common(&self) -> &Common {
        &self.common
    }

    pub fn period(&self) -> Option<Period> {
        self.period
    }
}

/// Arguments that affect the whole program.
#[derive(Debug, Parser, Clone)]
pub struct Common {
    /// The logging verbosity. One of, from least to most verbose:
    /// off, error, warn, info, debug, trace
    ///
    /// This can be overridden by RUST_LOG. See the tracing-subscriber crate for instructions.
    #[arg(long, default_value_t = LevelFilter::INFO)]
    log_level: LevelFilter,

    /// The path to the JSON configuration file.
    #[arg(long, env = "STATEMENTS_CONFIG")]
    config: PathBuf,
}

impl Common {
    pub fn new(log_level: LevelFilter, config: PathBuf) -> Self {
        Self { log_level, config }
    }

    pub fn log_level(&self) -> LevelFilter {
        self.log_level
    }

    pub fn config(&self) -> &Path {
        &self.config
    }
}
