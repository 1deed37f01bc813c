//! Delimited source file reading.
//!
//! Loads a CSV file into a [`Table`]. The first record is the header; every
//! other record is a row of string-typed cells. No type inference happens
//! here — empty fields become nulls and everything else stays text.

use snafu::prelude::*;
use std::path::Path;
use tracing::{debug, info};

use crate::emit;
use crate::error::{CsvSnafu, NotFoundSnafu, ReadSnafu, SourceError};
use crate::metrics::events::RowsRead;
use crate::table::Table;

/// Read a delimited file with a header row into a [`Table`].
///
/// Fails with [`SourceError::NotFound`] before any open when the path does
/// not resolve, so a missing input aborts the run with no side effects.
pub fn read_delimited(path: impl AsRef<Path>) -> Result<Table, SourceError> {
    let path = path.as_ref();
    let path_str = path.display().to_string();

    ensure!(
        path.is_file(),
        NotFoundSnafu {
            path: path_str.clone()
        }
    );

    let file = std::fs::File::open(path).context(ReadSnafu {
        path: path_str.clone(),
    })?;
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_reader(file);

    let headers = reader
        .headers()
        .context(CsvSnafu {
            path: path_str.clone(),
        })?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let mut table = Table::new(headers);

    for record in reader.records() {
        let record = record.context(CsvSnafu {
            path: path_str.clone(),
        })?;
        let row = record
            .iter()
            .map(|field| {
                if field.is_empty() {
                    None
                } else {
                    Some(field.to_string())
                }
            })
            .collect();
        table.push_row(row);
    }

    emit!(RowsRead {
        count: table.num_rows() as u64,
    });
    debug!(
        columns = table.columns().len(),
        rows = table.num_rows(),
        "Parsed delimited file {}",
        path_str
    );
    info!("Source file read successfully: {}", path_str);

    Ok(table)
}
