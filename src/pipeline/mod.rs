//! Run orchestration.
//!
//! A run is a straight line: load settings, read the source, cleanse, write
//! the description table, aggregate, write the count table. Every step
//! returns a `Result` and any failure aborts the run, so a missing source
//! file means no database connection is ever opened, and a failed
//! description write means the count table is never touched.

use snafu::prelude::*;
use std::path::Path;
use tracing::info;

use crate::config::ConnectionSettings;
use crate::emit;
use crate::error::{EtlError, ProcessingSnafu, SinkSnafu, SourceSnafu};
use crate::metrics::events::{DuplicatesRemoved, RowsCleansed};
use crate::sink::PostgresSink;
use crate::{source, transform};

/// Statistics about a completed run.
#[derive(Debug, Clone, Default)]
pub struct EtlStats {
    pub rows_read: usize,
    pub rows_cleansed: usize,
    pub duplicates_removed: usize,
    pub distinct_names: usize,
    pub tables_written: usize,
}

/// Destination table names for the two writes.
#[derive(Debug, Clone)]
pub struct TargetTables {
    pub description: String,
    pub count: String,
}

impl Default for TargetTables {
    fn default() -> Self {
        Self {
            description: "prod_desc".to_string(),
            count: "prod_count".to_string(),
        }
    }
}

/// Run the full ETL: read, cleanse, write, aggregate, write.
pub async fn run_pipeline(
    settings: &ConnectionSettings,
    input: impl AsRef<Path>,
    targets: &TargetTables,
) -> Result<EtlStats, EtlError> {
    let mut stats = EtlStats::default();

    // Source is read before the sink connection opens; a missing input
    // aborts with zero database side effects.
    let raw = source::read_delimited(input).context(SourceSnafu)?;
    stats.rows_read = raw.num_rows();

    let cleansed = transform::cleanse(&raw).context(ProcessingSnafu)?;
    stats.rows_cleansed = cleansed.num_rows();
    stats.duplicates_removed = stats.rows_read - stats.rows_cleansed;
    emit!(RowsCleansed {
        count: stats.rows_cleansed as u64,
    });
    emit!(DuplicatesRemoved {
        count: stats.duplicates_removed as u64,
    });

    let sink = PostgresSink::connect(settings).await.context(SinkSnafu)?;

    sink.write_table(&cleansed, &targets.description)
        .await
        .context(SinkSnafu)?;
    stats.tables_written += 1;
    info!(
        "Product description written into the {} table",
        targets.description
    );

    let aggregated = transform::aggregate(&cleansed).context(ProcessingSnafu)?;
    stats.distinct_names = aggregated.num_rows();

    sink.write_table(&aggregated, &targets.count)
        .await
        .context(SinkSnafu)?;
    stats.tables_written += 1;
    info!(
        "Product name and count written into the {} table",
        targets.count
    );

    Ok(stats)
}
