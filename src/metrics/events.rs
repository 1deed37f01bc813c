//! Internal events for metrics emission.
//!
//! Each event struct represents a measurable occurrence in the run. Events
//! implement the `InternalEvent` trait which records the corresponding
//! Prometheus counter.

use metrics::counter;
use tracing::trace;

/// Trait for internal events that can be emitted as metrics.
pub trait InternalEvent {
    /// Emit this event as a metric.
    fn emit(self);
}

/// Event emitted when source rows are read into memory.
pub struct RowsRead {
    pub count: u64,
}

impl InternalEvent for RowsRead {
    fn emit(self) {
        trace!(count = self.count, "Rows read");
        counter!("silo_rows_read_total").increment(self.count);
    }
}

/// Event emitted after cleansing completes.
pub struct RowsCleansed {
    pub count: u64,
}

impl InternalEvent for RowsCleansed {
    fn emit(self) {
        trace!(count = self.count, "Rows cleansed");
        counter!("silo_rows_cleansed_total").increment(self.count);
    }
}

/// Event emitted for rows dropped by deduplication.
pub struct DuplicatesRemoved {
    pub count: u64,
}

impl InternalEvent for DuplicatesRemoved {
    fn emit(self) {
        trace!(count = self.count, "Duplicates removed");
        counter!("silo_duplicates_removed_total").increment(self.count);
    }
}

/// Event emitted when a table overwrite commits.
pub struct TableWritten {
    pub table: String,
    pub rows: u64,
}

impl InternalEvent for TableWritten {
    fn emit(self) {
        trace!(table = %self.table, rows = self.rows, "Table written");
        counter!("silo_tables_written_total", "table" => self.table.clone()).increment(1);
        counter!("silo_rows_written_total", "table" => self.table).increment(self.rows);
    }
}

/// Event emitted when a table overwrite fails.
pub struct WriteFailed {
    pub table: String,
}

impl InternalEvent for WriteFailed {
    fn emit(self) {
        trace!(table = %self.table, "Write failed");
        counter!("silo_write_failures_total", "table" => self.table).increment(1);
    }
}
