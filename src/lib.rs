//! silo: A batch tool for loading product CSV files into PostgreSQL.
//!
//! This library provides components for reading delimited product files,
//! cleansing them (null-sku substitution and deduplication), aggregating
//! per-name counts, and overwriting the results into relational tables.
//!
//! # Example
//!
//! ```ignore
//! use silo::{ConnectionSettings, TargetTables, run_pipeline};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), silo::error::EtlError> {
//!     let settings = ConnectionSettings::from_file("db-config.properties")?;
//!     let stats = run_pipeline(&settings, "products.csv", &TargetTables::default()).await?;
//!     println!("Cleansed {} rows", stats.rows_cleansed);
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod sink;
pub mod source;
pub mod table;
pub mod transform;

// Re-export main types
pub use config::ConnectionSettings;
pub use pipeline::{EtlStats, TargetTables, run_pipeline};
pub use table::Table;
