mod config;
mod telemetry;

use clap::{Parser, Subcommand};
use config::Config;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "truckstat", about = "Truck registration report service")]
struct Cli {
    #[arg(long, global = true, default_value = "truckstat.yaml")]
    config_file_path: PathBuf,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Serve every configured report over HTTP
    Serve,
    /// Build one report and print its JSON response to stdout
    Render {
        /// Report name as configured
        report: String,
    },
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Config(#[from] config::ConfigError),
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error(transparent)]
    ReportApi(#[from] report_api::errors::ReportApiError),
    #[error("unknown report: {0}")]
    UnknownReport(String),
    #[error("report {0} failed")]
    ReportFailed(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "truckstat exited with an error");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = Config::from_file(&cli.config_file_path)?;

    let level = config.common.logging.level_filter()?;
    let _sentry = telemetry::init_logging(&config.common.logging, level);
    if let Some(metrics) = &config.common.metrics {
        telemetry::init_metrics(metrics)?;
    }

    let rt = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    match cli.command {
        CliCommand::Serve => {
            tracing::info!(path = %cli.config_file_path.display(), "Starting truckstat");
            let source = config.report_api.dataset_store.build();
            rt.block_on(report_api::run(config.report_api, source))?;
            Ok(())
        }
        CliCommand::Render { report } => rt.block_on(render(&config, &report)),
    }
}

async fn render(config: &Config, name: &str) -> Result<(), CliError> {
    let endpoint = config
        .report_api
        .resolve_reports()
        .map_err(report_api::errors::ReportApiError::from)?
        .into_iter()
        .find(|endpoint| endpoint.name == name)
        .ok_or_else(|| CliError::UnknownReport(name.to_string()))?;

    let source = config.report_api.dataset_store.build();
    let result = reports::render(source.as_ref(), &endpoint.dataset, &endpoint.definition).await;
    let body = report_api::router::encode_envelope(&result)
        .map_err(report_api::errors::ReportApiError::from)?;

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(&body)?;
    stdout.write_all(b"\n")?;

    match result {
        Ok(_) => Ok(()),
        Err(_) => Err(CliError::ReportFailed(name.to_string())),
    }
}
