//! catalog-harvester: harvest product records for the given product page URLs
//!
//! Usage: `catalog-harvester [--config <path>] <product-url>...`
//!
//! Records are written to stdout, one JSON object per line. Logs go to stderr
//! and the log file.

use anyhow::{Context, Result};
use clap::Parser;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{error, info};

use catalog_harvester_lib::crawling::CatalogPipeline;
use catalog_harvester_lib::infrastructure::logging::{init_logging_with_config, log_system_info};
use catalog_harvester_lib::infrastructure::ConfigManager;

#[derive(Parser, Debug)]
#[command(
    name = "catalog-harvester",
    about = "Harvest product records for the given product page URLs",
    version
)]
struct CliArgs {
    /// Path to the JSON config file (defaults to the per-user config directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Product page URLs to harvest
    #[arg(required = true)]
    urls: Vec<String>,
}

async fn run(cli: CliArgs) -> Result<ExitCode> {
    let manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };
    let config = manager.load_config().await?;

    init_logging_with_config(config.logging.clone())?;
    log_system_info();
    info!("🚀 Harvesting {} product URL(s)", cli.urls.len());

    let pipeline = CatalogPipeline::from_config(&config)?;
    let report = pipeline.run(cli.urls).await;

    let mut stdout = std::io::stdout().lock();
    for record in &report.records {
        let line = serde_json::to_string(record).context("Failed to serialize product record")?;
        writeln!(stdout, "{line}").context("Failed to write product record")?;
    }

    for failure in &report.failures {
        error!("{} ({}): {}", failure.url, failure.stage, failure.error);
    }

    if report.all_failed() {
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("catalog-harvester: {e:#}");
            ExitCode::FAILURE
        }
    }
}
