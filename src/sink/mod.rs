//! Relational sink.
//!
//! Writes tables into PostgreSQL with an overwrite policy: the target is
//! created if missing, truncated, and reloaded in batched inserts.

mod postgres;

pub use postgres::PostgresSink;
