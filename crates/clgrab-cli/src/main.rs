use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use clgrab_export::{write_listings, OutputFormat};
use clgrab_scraper::Catalog;

#[derive(Debug, Parser)]
#[command(name = "clgrab")]
#[command(about = "Extract classified listings into CSV or JSON")]
struct Cli {
    /// City to scrape. Omit to sweep every site in the configured region.
    #[arg(long)]
    location: Option<String>,

    /// Category label to resolve in each location's tree.
    #[arg(long, default_value = "lessons & tutoring")]
    category: String,

    /// Output encoding.
    #[arg(long, value_enum, default_value_t = Format::Csv)]
    format: Format,

    /// Directory for the output file. Defaults to CLGRAB_OUTPUT_DIR.
    #[arg(long)]
    output_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Csv,
    Json,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Csv => OutputFormat::Csv,
            Format::Json => OutputFormat::Json,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loads .env before the filter below reads RUST_LOG.
    let config = clgrab_core::load_app_config()?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| config.output_dir.clone());
    let deadline_secs = config.deadline_secs;

    let catalog = Catalog::new(config)?;
    let scrape = catalog.scrape(cli.location.as_deref(), &cli.category);
    let outcome = match deadline_secs {
        Some(secs) => tokio::time::timeout(Duration::from_secs(secs), scrape)
            .await
            .map_err(|_| anyhow::anyhow!("run exceeded deadline of {secs}s"))??,
        None => scrape.await?,
    };

    let path = write_listings(
        &outcome.listings,
        cli.format.into(),
        &output_dir,
        cli.location.as_deref(),
        &cli.category,
    )?;

    let summary = outcome.summary;
    println!(
        "locations: {} attempted, {} succeeded; items: {} decoded, {} skipped",
        summary.locations_attempted,
        summary.locations_succeeded,
        summary.items_decoded,
        summary.items_skipped
    );
    println!("saved {} listings to {}", outcome.listings.len(), path.display());

    if outcome.listings.is_empty() && summary.is_total_failure() {
        anyhow::bail!("run failed: every attempted location failed");
    }
    Ok(())
}
