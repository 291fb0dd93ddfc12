use chrono::Utc;
use clap::Parser;
use statement_mailer::args::Args;
use statement_mailer::{mail, run, store, Config, Mode, Period, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let config = Config::load(args.common().config()).await?;
    let period = args
        .period()
        .unwrap_or_else(|| Period::previous(Utc::now().date_naive()));

    // This allows for running the program without hitting AWS. When STATEMENTS_IN_TEST_MODE
    // is set and non-zero in length, then the mode will be Mode::Test, otherwise it will be
    // Mode::Aws.
    let mode = Mode::from_env();

    let store = store::client(&config, mode).await?;
    let mailer = mail::client(&config, mode).await?;
    let report = run::process_period(&config, store, mailer, period).await?;
    report.print();
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use the default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                level,
                env!("CARGO_BIN_NAME"),
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
