//! Error types for silo using snafu.
//!
//! One enum per component, aggregated into the top-level [`EtlError`]
//! that `main` reports.

use snafu::prelude::*;

// ============ Config Errors ============

/// Errors that can occur while loading the database properties file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ConfigError {
    /// Failed to read the properties file.
    #[snafu(display("Failed to read properties file {path}"))]
    ReadFile {
        source: std::io::Error,
        path: String,
    },

    /// A required key is absent from the properties file.
    #[snafu(display("Missing required property: {key}"))]
    MissingKey { key: String },

    /// A non-blank, non-comment line has no key/value separator.
    #[snafu(display("Malformed property on line {line_no}: expected KEY=VALUE"))]
    Syntax { line_no: usize },

    /// BATCH_SIZE is not a positive integer.
    #[snafu(display("BATCH_SIZE must be a positive integer, got {value:?}"))]
    InvalidBatchSize { value: String },

    /// Environment variable interpolation failed.
    #[snafu(display("Environment variable interpolation failed:\n{message}"))]
    EnvInterpolation { message: String },
}

// ============ Source Errors ============

/// Errors that can occur while reading the delimited source file.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SourceError {
    /// Input path does not exist.
    #[snafu(display("Source file not found: {path}"))]
    NotFound { path: String },

    /// IO failure while reading the source file.
    #[snafu(display("Failed to read source file {path}"))]
    Read {
        source: std::io::Error,
        path: String,
    },

    /// Malformed delimited content.
    #[snafu(display("Failed to parse delimited file {path}"))]
    Csv { source: csv::Error, path: String },
}

// ============ Processing Errors ============

/// Errors that can occur during in-memory transformation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum ProcessingError {
    /// A column required by the transformation is absent from the header.
    #[snafu(display("Input is missing required column: {column}"))]
    MissingColumn { column: String },
}

// ============ Sink Errors ============

/// Errors that can occur while writing to PostgreSQL.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SinkError {
    /// Failed to open the connection pool.
    #[snafu(display("Failed to connect to database"))]
    Connect { source: sqlx::Error },

    /// A statement failed against the target table.
    #[snafu(display("Failed to write table {table}"))]
    Write { source: sqlx::Error, table: String },

    /// A table or column name is not a safe SQL identifier.
    #[snafu(display("Invalid SQL identifier: {name:?}"))]
    InvalidIdentifier { name: String },
}

// ============ Metrics Errors ============

/// Errors that can occur during metrics initialization.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum MetricsError {
    /// Failed to initialize Prometheus recorder.
    #[snafu(display("Failed to initialize Prometheus recorder"))]
    PrometheusInit {
        source: metrics_exporter_prometheus::BuildError,
    },
}

// ============ Etl Error (top-level) ============

/// Top-level errors that aggregate all component error types.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum EtlError {
    /// Configuration error.
    #[snafu(display("Configuration error"))]
    Config { source: ConfigError },

    /// Source reader error.
    #[snafu(display("Source error"))]
    Source { source: SourceError },

    /// Transformation error.
    #[snafu(display("Processing error"))]
    Processing { source: ProcessingError },

    /// Sink writer error.
    #[snafu(display("Sink error"))]
    Sink { source: SinkError },

    /// Metrics error.
    #[snafu(display("Metrics error"))]
    Metrics { source: MetricsError },

    /// Address parsing error.
    #[snafu(display("Failed to parse metrics address"))]
    AddressParse { source: std::net::AddrParseError },
}
