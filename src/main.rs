//! silo: a batch tool for cleansing product CSV files and loading them
//! into PostgreSQL.
//!
//! One run reads a delimited product file, replaces missing skus with a
//! sentinel, drops duplicate (sku, name) rows, and overwrites two tables:
//! the cleansed descriptions and the per-name product counts.

use clap::Parser;
use snafu::prelude::*;
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

use silo::config::ConnectionSettings;
use silo::error::{AddressParseSnafu, ConfigSnafu, EtlError, MetricsSnafu};
use silo::pipeline::{TargetTables, run_pipeline};

/// Product CSV to PostgreSQL batch loader.
#[derive(Parser, Debug)]
#[command(name = "silo")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the database properties file.
    #[arg(short, long)]
    config: PathBuf,

    /// Path to the delimited source file.
    #[arg(short, long)]
    input: PathBuf,

    /// Destination table for cleansed product descriptions.
    #[arg(long, default_value = "prod_desc")]
    desc_table: String,

    /// Destination table for per-name product counts.
    #[arg(long, default_value = "prod_count")]
    count_table: String,

    /// Address to expose Prometheus metrics on (disabled when omitted).
    #[arg(long)]
    metrics_address: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Dry run - validate configuration without reading or writing.
    #[arg(long)]
    dry_run: bool,
}

#[snafu::report]
#[tokio::main]
async fn main() -> Result<(), EtlError> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    info!("silo starting");

    let settings = ConnectionSettings::from_file(&args.config).context(ConfigSnafu)?;

    // Initialize metrics if requested
    if let Some(address) = &args.metrics_address {
        let addr = address.parse().context(AddressParseSnafu)?;
        silo::metrics::init(addr).context(MetricsSnafu)?;
        debug!("Metrics endpoint listening on http://{}/metrics", address);
    }

    let targets = TargetTables {
        description: args.desc_table,
        count: args.count_table,
    };

    if args.dry_run {
        info!("Dry run mode - validating configuration");
        info!("Input: {}", args.input.display());
        info!("Database: {}", settings.display_url());
        info!("Driver: {}", settings.driver);
        info!("Batch size: {}", settings.batch_size);
        info!("Tables: {}, {}", targets.description, targets.count);
        info!("Configuration is valid");
        return Ok(());
    }

    let stats = run_pipeline(&settings, &args.input, &targets).await?;

    info!("Run completed successfully");
    info!("  Rows read: {}", stats.rows_read);
    info!("  Rows cleansed: {}", stats.rows_cleansed);
    info!("  Duplicates removed: {}", stats.duplicates_removed);
    info!("  Distinct product names: {}", stats.distinct_names);
    info!("  Tables written: {}", stats.tables_written);

    Ok(())
}
