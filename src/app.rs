use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::application::{BatchClassifier, Pacer, RunSummary};
use crate::domain::error::{AppError, Result};
use crate::infrastructure::config::ConfigService;
use crate::infrastructure::oracle::FuelEconomyClient;
use crate::infrastructure::progress::FileProgressReporter;
use crate::infrastructure::spreadsheet::SpreadsheetFormat;
use crate::infrastructure::storage::{output_path, progress_path};
use crate::interfaces::cli::Cli;

/// Install the stderr log subscriber (`RUST_LOG`, default `info`).
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Validate the input, load config and run one batch over the file.
pub async fn run(cli: Cli) -> Result<RunSummary> {
    let input = cli.input;
    if !input.exists() {
        return Err(AppError::NotFound(input.display().to_string()));
    }
    if !input.is_file() {
        return Err(AppError::ValidationError(format!(
            "Not a file: {}",
            input.display()
        )));
    }
    SpreadsheetFormat::from_path(&input)?;

    let config = ConfigService::new(cli.config).load()?;
    let oracle = FuelEconomyClient::new(&config.oracle)?;

    let progress_file = progress_path(&input, cli.run_id.as_deref());
    let output = output_path(&input);
    info!(
        oracle = %config.oracle.base_url,
        pacing = ?config.pacing,
        progress_file = %progress_file.display(),
        "Starting inference"
    );

    let progress = FileProgressReporter::new(progress_file, config.progress.grace_period());
    let mut classifier = BatchClassifier::new(
        oracle,
        progress,
        Pacer::new(config.pacing.clone()),
        config.columns.clone(),
    );
    classifier.run(&input, &output).await
}
