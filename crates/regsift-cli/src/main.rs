//! Regsift — regulatory document harvester.
//! Entry point for the command line binary.
//!
//! Modes:
//!   regsift                      harvest per regsift.toml (the default)
//!   regsift harvest              same as above
//!   regsift extract <dir> <csv>  extract text from an existing PDF folder

use std::path::{Path, PathBuf};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use regsift_common::client::ThrottledClient;
use regsift_common::config::HarvestConfig;
use regsift_ingestion::folder::extract_folder;
use regsift_ingestion::pipeline::run_harvest;
use regsift_ingestion::sink::CsvSink;
use regsift_ingestion::sources::regulations_gov::RegulationsGovClient;
use regsift_ingestion::sources::HarvestQuery;
use regsift_ingestion::storage::FsArtifactStore;

const OUTPUT_CSV_NAME: &str = "regulations_data.csv";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialise structured logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("regsift=debug,info")),
        )
        .init();

    info!("Regsift starting up...");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let args: Vec<String> = std::env::args().skip(1).collect();
    match args.first().map(String::as_str) {
        None | Some("harvest") => harvest().await,
        Some("extract") => {
            let [dir, output] = &args[1..] else {
                eprintln!("Usage: regsift extract <pdf-dir> <output-csv>");
                std::process::exit(2);
            };
            extract(Path::new(dir), Path::new(output))
        }
        Some(other) => {
            eprintln!("Unknown command: {other}");
            eprintln!("Usage: regsift [harvest | extract <pdf-dir> <output-csv>]");
            std::process::exit(2);
        }
    }
}

async fn harvest() -> anyhow::Result<()> {
    let config = match HarvestConfig::load() {
        Ok(c) => {
            info!(
                keywords = c.keywords.len(),
                lookback_years = c.lookback_years,
                max_documents = c.max_documents,
                "Configuration loaded"
            );
            c
        }
        Err(e) => {
            warn!("Could not load regsift.toml: {e}");
            warn!("Copy regsift.example.toml to regsift.toml and edit it (or set REGSIFT_API_KEY).");
            return Ok(());
        }
    };

    let client = ThrottledClient::new()?;
    let source = RegulationsGovClient::new(client, &config.api_base, &config.api_key);

    let output_dir = PathBuf::from(&config.output_dir);
    let store = FsArtifactStore::create(&output_dir)?;
    let csv_path = output_dir.join(OUTPUT_CSV_NAME);
    let mut sink = CsvSink::create(&csv_path)?;

    let query = HarvestQuery::from_config(&config);
    let result = run_harvest(&query, &source, &store, &mut sink).await?;

    if result.documents_found == 0 {
        info!("No documents retrieved.");
        return Ok(());
    }

    info!(
        records = result.records_written,
        attachments = result.attachments_downloaded,
        output = %csv_path.display(),
        "Harvest finished"
    );
    for error in &result.errors {
        warn!("Recoverable failure during run: {error}");
    }
    Ok(())
}

fn extract(dir: &Path, output: &Path) -> anyhow::Result<()> {
    let summary = extract_folder(dir, output)?;
    info!(
        processed = summary.processed,
        failed = summary.failed,
        output = %output.display(),
        "Extraction finished"
    );
    Ok(())
}
